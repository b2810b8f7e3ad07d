//! Command framing and dispatch through the scheduler.

use crate::mock_board::{Out, Rig};
use labshield::channels::analog::{AnalogState, AnalogTrigger, SampleRate};
use labshield::channels::digital::EdgeMode;
use labshield::protocol::Source;
use labshield::protocol::opcodes::*;

#[test]
fn every_table_opcode_acks() {
    let cases: &[&[u8]] = &[
        &[HALT],
        &[ARM, 0x00],
        &[BLINKLED, 0x11],
        &[MDE_ASAMPTIME, 9],
        &[MDE_ASTOP, 0x00, 0x64],
        &[MDE_ATRIG, 0x00, 0x00],
        &[MDE_DTRIG, 0x33],
        &[MDE_SYNC],
    ];
    let mut rig = Rig::new();
    for bytes in cases {
        assert_eq!(rig.command(bytes), [Out::Ack], "opcode 0x{:02X}", bytes[0]);
    }
}

#[test]
fn unknown_opcodes_nak_whatever_their_count() {
    let mut rig = Rig::new();
    assert_eq!(rig.command(&[0xFC]), [Out::Nak]);
    assert_eq!(rig.command(&[0xF1, 0x05]), [Out::Nak]);
    assert_eq!(rig.command(&[0xF2, 0x05, 0x06]), [Out::Nak]);
    assert!(rig.scheduler.framer().is_ready_to_receive());
}

#[test]
fn reserved_count_naks_without_consuming_params() {
    let mut rig = Rig::new();
    // 0x87 is ARM's function code with count 3. The trailing byte is a stray.
    assert_eq!(rig.command(&[0x87, 0x3F]), [Out::Nak]);
    assert!(
        rig.scheduler
            .context()
            .analog
            .iter()
            .all(|c| c.state() == AnalogState::Halt)
    );
}

#[test]
fn partial_command_is_abandoned_by_next_opcode() {
    let mut rig = Rig::new();
    // MDE_ASTOP loses its second parameter; HALT starts cleanly.
    assert_eq!(rig.command(&[MDE_ASTOP, 0x01, HALT]), [Out::Ack]);
    assert!(
        rig.scheduler
            .context()
            .analog
            .iter()
            .all(|c| c.stop_condition() == 100)
    );
}

#[test]
fn command_split_across_ticks() {
    let mut rig = Rig::new();
    assert!(rig.command(&[MDE_ASAMPTIME]).is_empty());
    assert!(rig.scheduler.framer().is_building());
    assert_eq!(rig.command(&[SampleRate::Hz50 as u8]), [Out::Ack]);
    assert!(
        rig.scheduler
            .context()
            .analog
            .iter()
            .all(|c| c.sample_rate() == SampleRate::Hz50)
    );
}

#[test]
fn stray_bytes_are_silent() {
    let mut rig = Rig::new();
    assert!(rig.command(&[0x01, 0x7F, 0x00]).is_empty());
    assert!(rig.scheduler.framer().is_ready_to_receive());
}

#[test]
fn bad_sample_rate_naks_and_keeps_rate() {
    let mut rig = Rig::new();
    assert_eq!(rig.command(&[MDE_ASAMPTIME, 16]), [Out::Nak]);
    assert_eq!(
        rig.scheduler.context().analog[0].sample_rate(),
        SampleRate::Hz10
    );
}

#[test]
fn stop_count_is_fourteen_bits() {
    let mut rig = Rig::new();
    rig.command(&[MDE_ASTOP, 0x7F, 0x7F]);
    assert!(
        rig.scheduler
            .context()
            .analog
            .iter()
            .all(|c| c.stop_condition() == 0x3FFF)
    );
}

#[test]
fn analog_trigger_both_channels() {
    let mut rig = Rig::new();
    // fall below 0x100 on both channel pairs
    let v: u16 = (1 << 12) | (0b11 << 10) | 0x100;
    rig.command(&[MDE_ATRIG, (v >> 7) as u8, (v & 0x7F) as u8]);
    for ch in &rig.scheduler.context().analog {
        assert_eq!(ch.trigger(), AnalogTrigger::FallBelow(0x100));
    }
}

#[test]
fn digital_modes_per_port() {
    let mut rig = Rig::new();
    rig.command(&[MDE_DTRIG, 0x12]);
    let ctx = rig.scheduler.context();
    assert_eq!(ctx.digital[0].mode(), EdgeMode::FallingOnly);
    assert_eq!(ctx.digital[1].mode(), EdgeMode::RisingOnly);
}

#[test]
fn immediate_reads_ack_then_blob() {
    let mut rig = Rig::new();
    rig.board.set_analog(labshield::pins::BTA01_10V_GPIO, 900);
    let out = rig.command(&[IMM_AN101]);
    assert_eq!(out.len(), 2);
    assert_eq!(out[0], Out::Ack);
    let Out::Blob(b) = &out[1] else {
        panic!("expected blob, got {out:?}");
    };
    assert_eq!((b.sequence, b.raw, b.source), (0, 900, Source::Ana110.id()));

    rig.board.set_level(labshield::pins::BTD02_GPIO, false);
    let out = rig.command(&[IMM_DIG2]);
    let Out::Blob(b) = &out[1] else {
        panic!("expected blob, got {out:?}");
    };
    assert_eq!((b.raw, b.source), (0, Source::Dig2.id()));
}

#[test]
fn button_state_reports_pressed() {
    let mut rig = Rig::new();
    rig.board.press_button(true);
    let out = rig.command(&[IMM_BUTSTATE]);
    let Out::Blob(b) = &out[1] else {
        panic!("expected blob, got {out:?}");
    };
    assert_eq!((b.sequence, b.raw, b.source), (0, 1, Source::Button.id()));
}

#[test]
fn blink_reaches_board() {
    let mut rig = Rig::new();
    rig.command(&[BLINKLED, 0x34]);
    assert_eq!(rig.board.blinks, [(3, Some(4 << 7))]);
}

#[test]
fn link_failures_are_counted_not_fatal() {
    let mut rig = Rig::new();
    rig.link.fail_writes = true;
    rig.link.send(&[HALT, ST_VERS]);
    let report = rig.tick();
    assert_eq!(report.acked, 2);
    // HALT's ACK, ST_VERS's ACK, and the first write of its text line.
    assert_eq!(report.link_errors, 3);
    assert!(rig.scheduler.framer().is_ready_to_receive());
}
