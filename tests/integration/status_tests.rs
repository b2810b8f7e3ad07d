//! Text replies: banner, version and per-source status lines.

use crate::mock_board::{MockBoard, MockLink, Out, Rig};
use labshield::config::ShieldConfig;
use labshield::protocol::Source;
use labshield::protocol::opcodes::*;
use labshield::scheduler::Scheduler;

#[test]
fn banner_is_first_output() {
    let mut board = MockBoard::new();
    let mut link = MockLink::default();
    let mut s = Scheduler::new(ShieldConfig::default(), &mut board).unwrap();
    s.start(&mut board, &mut link).unwrap();
    assert_eq!(link.drain(), [Out::Text("*HELLO* ver:1.03".into())]);
}

#[test]
fn custom_version_in_banner_and_reply() {
    let config = ShieldConfig::from_json(
        r#"{"version_major":2,"version_minor":7,"boot_banner":"*LAB*",
            "default_sample_rate":9,"default_stop_count":100,
            "button_debounce_ms":20,"led_blink_period_ms":200,
            "max_rx_bytes_per_tick":64}"#,
    )
    .unwrap();
    let mut board = MockBoard::new();
    let mut link = MockLink::default();
    let mut s = Scheduler::new(config, &mut board).unwrap();
    s.start(&mut board, &mut link).unwrap();
    assert_eq!(link.drain(), [Out::Text("*LAB* ver:2.07".into())]);

    link.send(&[ST_VERS]);
    s.tick(&mut board, &mut link);
    assert_eq!(link.drain(), [Out::Ack, Out::Text("v:2.07".into())]);
}

#[test]
fn status_for_every_source() {
    let mut rig = Rig::new();
    let out = rig.command(&[ST_ANALOG, 0x7F]);
    assert_eq!(out[0], Out::Ack);
    let labels: Vec<String> = out[1..]
        .iter()
        .map(|o| match o {
            Out::Text(t) => t.split(':').next().unwrap_or_default().to_string(),
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(
        labels,
        [
            "\"BTA01_5V\"",
            "\"BTA02_5V\"",
            "\"BTA01_10V\"",
            "\"BTA02_10V\"",
            "\"BTD01\"",
            "\"BTD02\"",
            "\"BTN\"",
        ]
    );
}

#[test]
fn analog_status_reflects_configuration() {
    let mut rig = Rig::new();
    rig.command(&[MDE_ASAMPTIME, 11]);
    rig.command(&[MDE_ASTOP, 0x00, 0x0A]);
    rig.command(&[ARM, Source::Ana210.mask()]);
    let out = rig.command(&[ST_ANALOG, Source::Ana210.mask()]);
    assert_eq!(
        out,
        [
            Out::Ack,
            Out::Text(
                r#""BTA02_10V":{"state":"R","period":1000000,"trigger":"I","stop":10,"units":"V","name":"Voltage +/- 10V","shortname":"V10"}"#
                    .into()
            ),
        ]
    );
}

#[test]
fn digital_and_button_status() {
    let mut rig = Rig::new();
    rig.command(&[MDE_DTRIG, 0x02]);
    rig.board.press_button(true);
    let out = rig.command(&[ST_ANALOG, Source::Dig1.mask() | Source::Button.mask()]);
    assert_eq!(
        out,
        [
            Out::Ack,
            Out::Text(r#""BTD01":{"state":"H","trigger":"F","transitions":0}"#.into()),
            Out::Text(r#""BTN":true"#.into()),
        ]
    );
}

#[test]
fn empty_mask_acks_with_no_lines() {
    let mut rig = Rig::new();
    assert_eq!(rig.command(&[ST_ANALOG, 0x00]), [Out::Ack]);
}
