//! Integration tests for the DeviceLoop: inbound commands, local menu
//! editing, sensor publishing, the dial and the GPS heartbeat node.

use crate::mock_hw::{Node, Rendered};

use homenode::app::events::AppEvent;
use homenode::codec::GpsFix;
use homenode::config::{InboundRangePolicy, NodeConfig};
use homenode::error::CodecError;
use homenode::profile::{
    self, ChannelSpec, ClientIdPolicy, DeviceProfile, GPS, HALL, LAWN_CONTROL, LAWN_SONAR,
    ValueDomain,
};
use homenode::ui::{LinkStatus, UiMode};

const LIGHT: usize = 0;
const FAN: usize = 1;
const TEMPERATURE: usize = 4;

/// Single four-step channel on a display node.
static DIMMER: DeviceProfile = DeviceProfile {
    name: "dimmer",
    client_id: ClientIdPolicy::Fixed("dimmer"),
    channels: &[ChannelSpec {
        label: "Level",
        topic: "den/level",
        domain: ValueDomain::Bounded { max: 4 },
        glyph: None,
    }],
    aux: &[],
    media_topic: None,
    dial: None,
    heartbeat: None,
    gps_topic: None,
    has_display: true,
};

fn hall_with_policy(policy: InboundRangePolicy) -> Node {
    let mut cfg = NodeConfig::for_profile(&HALL);
    cfg.inbound_range = policy;
    Node::with_config(&HALL, cfg).boot()
}

// ── Boot ──────────────────────────────────────────────────────

#[test]
fn boot_subscribes_and_draws_connected_menu() {
    let node = Node::online(&HALL);

    assert!(node.device.network_up() && node.device.broker_up());
    assert_eq!(node.broker.client_ids, ["hallNode"]);
    assert_eq!(node.broker.subscribe_calls.len(), 8, "6 channels + 2 aux topics");
    assert!(node.sink.contains(&AppEvent::Started { profile: "hall" }));
    assert_eq!(
        node.hw.last_frame(),
        Some(&Rendered::Menu { selected: "Light 1", value: 0, status: LinkStatus::Connected })
    );
}

#[test]
fn mac_suffix_client_id_without_mac_is_zero_padded() {
    let node = Node::online(&LAWN_SONAR);
    assert_eq!(node.broker.client_ids, ["ESP8266Client-0000"]);
    assert_eq!(node.device.client_id(), "ESP8266Client-0000");
}

// ── Inbound ───────────────────────────────────────────────────

#[test]
fn toggle_accepts_only_exact_tokens() {
    let mut node = Node::online(&HALL);

    node.receive("hall/light", b"1");
    assert_eq!(node.device.channels().value(LIGHT), Some(1));
    assert_eq!(node.hw.output(LIGHT), Some(1));
    assert!(node.sink.contains(&AppEvent::ChannelChanged { channel: LIGHT, value: 1, remote: true }));

    node.receive("hall/light", b"7");
    assert_eq!(node.device.channels().value(LIGHT), Some(1), "invalid token must not change state");
    assert!(node.sink.contains(&AppEvent::InboundRejected {
        channel: LIGHT,
        error: CodecError::NotToggle
    }));

    // Redelivery of the current value is not re-applied.
    node.receive("hall/light", b"1");
    assert_eq!(node.hw.applied, [(LIGHT, 1)]);
}

#[test]
fn unknown_topics_are_ignored() {
    let mut node = Node::online(&HALL);
    let events = node.sink.events.len();
    node.receive("hall/lightbulb", b"1");
    node.receive("c/playbackcontrol", b"1");
    assert_eq!(node.sink.events.len(), events);
    assert!(node.hw.applied.is_empty());
}

#[test]
fn out_of_range_bounded_value_follows_policy() {
    let mut reject = hall_with_policy(InboundRangePolicy::Reject);
    reject.receive("hall/fan", b"250");
    assert_eq!(reject.device.channels().value(FAN), Some(0));
    assert!(reject.sink.contains(&AppEvent::InboundRejected {
        channel: FAN,
        error: CodecError::OutOfRange
    }));
    reject.receive("hall/fan", b"abc");
    assert!(reject.sink.contains(&AppEvent::InboundRejected {
        channel: FAN,
        error: CodecError::NotInteger
    }));

    let mut clamp = hall_with_policy(InboundRangePolicy::Clamp);
    clamp.receive("hall/fan", b"250");
    assert_eq!(clamp.device.channels().value(FAN), Some(100));

    let mut accept = hall_with_policy(InboundRangePolicy::Accept);
    accept.receive("hall/fan", b"250");
    assert_eq!(accept.device.channels().value(FAN), Some(250));
}

#[test]
fn remote_sensor_readings_are_truncated() {
    let mut node = Node::online(&HALL);
    node.receive("hall/temperature", b"23.5");
    assert_eq!(node.device.channels().value(TEMPERATURE), Some(23));
}

#[test]
fn aux_text_updates_media_screen() {
    let mut node = Node::online(&HALL);
    assert_eq!(node.device.aux(0), Some("SongName"));

    node.press_mode();
    assert_eq!(node.device.cursor().mode, UiMode::Media);
    assert_eq!(
        node.hw.last_frame(),
        Some(&Rendered::Media { top: "SongName".into(), bottom: "Artist".into() })
    );

    node.receive("c/Song", b"Blue in Green");
    node.receive("c/Artist", b"Miles Davis");
    assert_eq!(node.device.aux(0), Some("Blue in Green"));
    assert!(node.sink.contains(&AppEvent::AuxUpdated { index: 1 }));
    assert_eq!(
        node.hw.last_frame(),
        Some(&Rendered::Media { top: "Blue in Green".into(), bottom: "Miles Davis".into() })
    );
}

// ── Local menu ────────────────────────────────────────────────

#[test]
fn leaving_edit_mode_publishes_retained_value() {
    let mut node = Node::online(&HALL);

    node.press_select();
    assert!(node.device.cursor().editing);
    assert_eq!(node.hw.last_frame(), Some(&Rendered::Edit { label: "Light 1", value: 0 }));

    node.press_prev();
    assert_eq!(node.hw.output(LIGHT), Some(1));
    assert!(node.broker.published.is_empty(), "edits publish only on exit");

    node.press_select();
    assert!(!node.device.cursor().editing);
    let sent = node.broker.published_on("hall/light");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].payload, "1");
    assert!(sent[0].retained);
}

#[test]
fn percentage_channel_steps_by_ten_and_clamps() {
    let mut node = Node::online(&HALL);
    node.press_next();
    assert_eq!(node.device.cursor().selected, FAN);

    node.press_select();
    node.press_next();
    assert_eq!(node.device.channels().value(FAN), Some(0), "floor at 0");
    node.press_prev();
    node.press_prev();
    node.press_next();
    node.press_select();

    assert_eq!(node.device.channels().value(FAN), Some(10));
    assert_eq!(node.broker.payloads_on("hall/fan"), ["10"]);
}

#[test]
fn small_bounded_channel_decrements_and_wraps() {
    let mut node = Node::online(&DIMMER);
    node.receive("den/level", b"4");

    node.press_select();
    node.press_next();
    node.press_next();
    assert_eq!(node.device.channels().value(0), Some(2));
    node.press_select();
    assert_eq!(node.broker.payloads_on("den/level"), ["2"]);

    node.receive("den/level", b"0");
    node.press_select();
    node.press_next();
    assert_eq!(node.device.channels().value(0), Some(4), "decrement at 0 wraps to max");
}

#[test]
fn sensor_channels_cannot_be_edited() {
    let mut node = Node::online(&HALL);
    node.press_prev();
    node.press_prev();
    assert_eq!(node.device.cursor().selected, TEMPERATURE);

    node.press_select();
    assert!(!node.device.cursor().editing);
    node.press_prev();
    assert_eq!(node.device.cursor().selected, 3, "still browsing");
}

#[test]
fn edit_is_not_published_while_broker_is_down() {
    let mut node = Node::online(&HALL);
    node.broker.available = false;
    node.broker.drop_session();
    node.tick_at(node.now + 10);
    assert!(!node.device.broker_up());

    node.press_select();
    node.press_prev();
    node.press_select();
    assert_eq!(node.device.channels().value(LIGHT), Some(1));
    assert!(node.broker.published.is_empty());
}

#[test]
fn held_button_repeats_at_debounce_interval() {
    let mut node = Node::online(&HALL);
    let start = node.now + 1_000;
    node.tick_at(start - 10);

    node.hw.inputs.next = true;
    node.run_for(990, 10);
    node.hw.inputs.next = false;

    // Accepted at +0, +300, +600 and +900.
    assert_eq!(node.device.cursor().selected, 4);
}

#[test]
fn simultaneous_presses_collapse_into_one() {
    let mut node = Node::online(&HALL);
    node.press(|s| {
        s.next = true;
        s.select = true;
    });
    assert_eq!(node.device.cursor().selected, 1);
    assert!(!node.device.cursor().editing);
}

#[test]
fn media_mode_sends_playback_codes() {
    let mut node = Node::online(&HALL);
    node.press_mode();
    node.press_select();
    node.press_next();
    node.press_prev();
    node.press_mode();

    assert_eq!(node.broker.payloads_on("c/playbackcontrol"), ["1", "2", "3"]);
    assert!(node.broker.published.iter().all(|p| !p.retained));
    assert_eq!(node.device.cursor().mode, UiMode::Channels);
    assert_eq!(node.device.cursor().selected, 0, "media keys leave the menu cursor alone");
}

#[test]
fn mode_button_ignored_without_media_topic() {
    let mut node = Node::online(&DIMMER);
    node.press_mode();
    assert_eq!(node.device.cursor().mode, UiMode::Channels);
}

// ── Sensors ───────────────────────────────────────────────────

#[test]
fn gas_publishes_on_threshold_crossings() {
    let mut node = Node::new(&LAWN_CONTROL);
    let gas = 4;
    node.hw.set_sample(gas, 100);
    let mut node = node.boot();

    for (t, reading) in [(500, 100), (1_000, 103), (1_500, 105), (2_000, 101), (2_500, 99)] {
        node.hw.set_sample(gas, reading);
        node.tick_at(t);
    }

    assert_eq!(node.broker.payloads_on("hall/gas"), ["100", "105", "99"]);
    assert!(node.broker.published_on("hall/gas").iter().all(|p| p.retained));
    assert_eq!(node.device.channels().value(gas), Some(99));
}

#[test]
fn sonar_publishes_every_interval() {
    let mut node = Node::online(&LAWN_SONAR);
    node.hw.set_sample(4, 120);
    node.run_for(4_000, 100);

    // Due at 2 s and 4 s after boot.
    assert_eq!(node.broker.payloads_on("lawn/ultrasonic1"), ["120", "120"]);
    assert!(node.broker.published_on("lawn/ultrasonic2").is_empty(), "no reading, no publish");
}

#[test]
fn sensor_read_errors_are_skipped() {
    let mut node = Node::online(&LAWN_CONTROL);
    node.hw.samples.insert(4, Err(homenode::error::SensorError::AdcReadFailed));
    node.run_for(2_000, 100);
    assert!(node.broker.published.is_empty());
}

// ── Dial ──────────────────────────────────────────────────────

#[test]
fn dial_publishes_settled_value_to_selected_target() {
    let mut node = Node::new(&LAWN_CONTROL);
    node.hw.inputs.encoder_count = Some(0);
    let mut node = node.boot();

    node.tick_at(500);
    assert_eq!(node.broker.payloads_on("lawn/ultrasonic1"), ["1"]);

    node.hw.inputs.encoder_count = Some(20);
    node.tick_at(1_000);
    node.tick_at(1_400);
    assert_eq!(node.broker.payloads_on("lawn/ultrasonic1").len(), 1, "still settling");
    node.tick_at(1_500);
    assert_eq!(node.broker.payloads_on("lawn/ultrasonic1"), ["1", "21"]);

    node.hw.inputs.dial_button = true;
    node.tick_at(2_000);
    node.hw.inputs.dial_button = false;
    assert!(node.sink.contains(&AppEvent::DialTarget { topic: "lawn/ultrasonic2" }));

    node.hw.inputs.encoder_count = Some(25);
    node.tick_at(2_100);
    node.tick_at(2_600);
    assert_eq!(node.broker.payloads_on("lawn/ultrasonic2"), ["26"]);
    assert_eq!(node.device.dial_value(), Some(26));
    assert!(node.broker.published.iter().all(|p| !p.retained));
}

#[test]
fn dial_clamps_to_range() {
    let mut node = Node::new(&LAWN_CONTROL);
    node.hw.inputs.encoder_count = Some(0);
    let mut node = node.boot();

    node.hw.inputs.encoder_count = Some(-40);
    node.tick_at(100);
    assert_eq!(node.device.dial_value(), Some(1));
    node.hw.inputs.encoder_count = Some(500);
    node.tick_at(200);
    assert_eq!(node.device.dial_value(), Some(100));
}

// ── GPS node ──────────────────────────────────────────────────

#[test]
fn heartbeat_counts_every_ten_seconds() {
    let mut node = Node::online(&GPS);
    node.tick_at(9_990);
    assert!(node.broker.published.is_empty());

    node.tick_at(10_000);
    node.tick_at(20_000);
    assert_eq!(node.broker.payloads_on("count"), ["1", "2"]);
    assert_eq!(node.device.heartbeat_count(), 2);

    node.broker.available = false;
    node.broker.drop_session();
    node.tick_at(30_000);
    assert_eq!(node.device.heartbeat_count(), 3, "counter advances offline");
    assert_eq!(node.broker.payloads_on("count").len(), 2);
}

#[test]
fn gps_fix_is_published_as_json() {
    let mut node = Node::online(&GPS);
    node.hw.gps.push_back(GpsFix {
        latitude: 1.5,
        longitude: -2.25,
        altitude: 10.0,
        satellites: 7,
        hdop: 0.9,
    });
    node.tick_at(100);

    let sent = node.broker.published_on("gps");
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].payload,
        r#"{"latitude": 1.500000,"longitude": -2.250000,"altitude": 10.00,"satellites": 7,"hdop": 0.90}"#
    );
    assert!(!sent[0].retained);
    assert!(node.sink.contains(&AppEvent::Published { topic: "gps", value: None, retained: false }));
}

#[test]
fn every_builtin_profile_boots() {
    for p in profile::ALL {
        let node = Node::online(p);
        assert!(node.device.broker_up(), "profile {}", p.name);
        assert_eq!(node.broker.subscribe_calls.len(), p.subscriptions().count());
    }
}
