//! Channel acquisition through full scheduler ticks.

use crate::mock_board::Rig;
use labshield::channels::analog::{AnalogState, SampleRate};
use labshield::pins;
use labshield::protocol::Source;
use labshield::protocol::opcodes::*;

const PERIOD_10MS: u32 = 10_000;

fn arm(rig: &mut Rig, sources: &[Source]) {
    let mask = sources.iter().fold(0, |m, s| m | s.mask());
    rig.command(&[ARM, mask]);
}

#[test]
fn immediate_run_of_three_then_halt() {
    let mut rig = Rig::new();
    rig.command(&[MDE_ASAMPTIME, SampleRate::Hz100 as u8]);
    rig.command(&[MDE_ASTOP, 0x00, 0x03]);
    arm(&mut rig, &[Source::Ana105]);

    let mut seqs = Vec::new();
    for _ in 0..3 {
        let blobs = rig.step(PERIOD_10MS);
        assert_eq!(blobs.len(), 1);
        seqs.push(blobs[0].sequence);
    }
    assert_eq!(seqs, [1, 2, 3]);

    assert!(rig.step(PERIOD_10MS).is_empty());
    assert_eq!(rig.scheduler.context().analog[0].state(), AnalogState::Halt);
    assert!(rig.step(PERIOD_10MS).is_empty());

    // Re-arming starts a fresh run.
    arm(&mut rig, &[Source::Ana105]);
    let blobs = rig.step(PERIOD_10MS);
    assert_eq!(blobs[0].sequence, 1);
}

#[test]
fn timestamps_are_relative_to_sync() {
    let mut rig = Rig::new();
    rig.command(&[MDE_ASAMPTIME, SampleRate::Hz100 as u8]);
    rig.board.advance_us(5_000);
    rig.command(&[MDE_SYNC]);
    arm(&mut rig, &[Source::Ana205]);

    let blobs = rig.step(PERIOD_10MS);
    assert_eq!(blobs[0].timestamp_us, PERIOD_10MS);
    assert_eq!(blobs[0].source, Source::Ana205.id());
}

#[test]
fn poll_order_is_fixed() {
    let mut rig = Rig::new();
    rig.command(&[MDE_ASAMPTIME, SampleRate::Hz100 as u8]);
    arm(
        &mut rig,
        &[
            Source::Ana210,
            Source::Ana105,
            Source::Dig1,
            Source::Ana110,
            Source::Ana205,
        ],
    );

    rig.board.set_level(pins::BTD01_GPIO, false);
    let sources: Vec<u8> = rig.step(PERIOD_10MS).iter().map(|b| b.source).collect();
    assert_eq!(
        sources,
        [
            Source::Ana105.id(),
            Source::Ana205.id(),
            Source::Ana110.id(),
            Source::Ana210.id(),
            Source::Dig1.id(),
        ]
    );
}

#[test]
fn rise_above_trigger_waits_for_signal() {
    let mut rig = Rig::new();
    rig.command(&[MDE_ASAMPTIME, SampleRate::Hz100 as u8]);
    // rise above 700 on channel 1
    let v: u16 = (2 << 12) | (0b01 << 10) | 700;
    rig.command(&[MDE_ATRIG, (v >> 7) as u8, (v & 0x7F) as u8]);
    arm(&mut rig, &[Source::Ana105]);

    for _ in 0..5 {
        assert!(rig.step(PERIOD_10MS).is_empty());
    }
    rig.board.set_analog(pins::BTA01_5V_GPIO, 800);
    assert!(rig.step(PERIOD_10MS).is_empty()); // trigger tick
    let blobs = rig.step(PERIOD_10MS);
    assert_eq!(blobs.len(), 1);
    assert_eq!(blobs[0].raw, 800);
}

#[test]
fn button_gated_sampling_never_blocks() {
    let mut rig = Rig::new();
    rig.command(&[MDE_ASAMPTIME, SampleRate::ButtonPress as u8]);
    arm(&mut rig, &[Source::Ana110]);
    rig.tick();

    rig.board.press_button(true);
    for _ in 0..10 {
        // Each tick returns while the button is still held.
        assert!(rig.step(10_000).is_empty());
    }
    rig.board.press_button(false);
    let blobs = rig.step(1_000);
    assert_eq!(blobs.len(), 1);
    assert_eq!(blobs[0].sequence, 1);
    assert_eq!(blobs[0].source, Source::Ana110.id());
}

#[test]
fn digital_square_wave_counts() {
    for (mode, expected) in [(0x00u8, 10usize), (0x01, 5), (0x02, 5)] {
        let mut rig = Rig::new();
        rig.board.set_level(pins::BTD01_GPIO, false);
        rig.command(&[MDE_DTRIG, mode]);
        arm(&mut rig, &[Source::Dig1]);

        let mut total = Vec::new();
        for _ in 0..5 {
            rig.board.set_level(pins::BTD01_GPIO, true);
            total.extend(rig.step(1_000));
            rig.board.set_level(pins::BTD01_GPIO, false);
            total.extend(rig.step(1_000));
        }
        assert_eq!(total.len(), expected, "mode {mode}");
        let seqs: Vec<u16> = total.iter().map(|b| b.sequence).collect();
        assert_eq!(seqs, (1..=expected as u16).collect::<Vec<_>>());
    }
}

#[test]
fn digital_blob_carries_edge_direction() {
    let mut rig = Rig::new();
    arm(&mut rig, &[Source::Dig2]);
    rig.board.set_level(pins::BTD02_GPIO, false);
    let falling = rig.step(700);
    rig.board.set_level(pins::BTD02_GPIO, true);
    let rising = rig.step(300);
    assert_eq!(falling[0].raw, 2);
    assert_eq!(rising[0].raw, 1);
    assert_eq!(rising[0].timestamp_us - falling[0].timestamp_us, 300);
}

#[test]
fn halt_stops_everything() {
    let mut rig = Rig::new();
    rig.command(&[MDE_ASAMPTIME, SampleRate::Fastest as u8]);
    arm(&mut rig, &[Source::Ana105, Source::Dig1]);
    assert!(!rig.step(10).is_empty());
    rig.command(&[HALT]);
    rig.board.set_level(pins::BTD01_GPIO, false);
    assert!(rig.step(10).is_empty());
    assert!(rig.step(10_000).is_empty());
}
