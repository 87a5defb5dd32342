//! End-to-end tests: DeviceLoop → host simulation adapters.
//!
//! Runs the same wiring the firmware binary uses (Board, HardwareAdapter,
//! WifiAdapter, MqttAdapter) against the in-memory access point, broker
//! and GPIO/ADC stubs.

#![cfg(not(target_os = "espidf"))]

use homenode::adapters::device_id;
use homenode::adapters::hardware::{Board, HardwareAdapter};
use homenode::adapters::log_display::LogDisplay;
use homenode::adapters::log_sink::LogEventSink;
use homenode::adapters::mqtt::{MqttAdapter, SentMessage};
use homenode::adapters::wifi::WifiAdapter;
use homenode::app::service::DeviceLoop;
use homenode::config::NodeConfig;
use homenode::drivers::encoder::sim_rotate;
use homenode::drivers::hw_init::{self, sim_set_adc, sim_set_pulse_us};
use homenode::pins;
use homenode::profile::{DeviceProfile, LAWN_CONTROL, LAWN_SONAR};

struct SimNode {
    device: DeviceLoop,
    wifi: WifiAdapter,
    mqtt: MqttAdapter,
    hw: HardwareAdapter<LogDisplay>,
    sink: LogEventSink,
    now: u64,
}

impl SimNode {
    fn boot(profile: &'static DeviceProfile) -> Self {
        hw_init::init_peripherals(&Board::pin_plan(profile)).expect("sim init");
        let config = NodeConfig::for_profile(profile);
        let mut node = Self {
            wifi: WifiAdapter::new(&config.network),
            mqtt: MqttAdapter::new(&config),
            hw: HardwareAdapter::new(Board::wire(profile), LogDisplay::new()),
            device: DeviceLoop::new(profile, config).with_mac(&device_id::read_mac()),
            sink: LogEventSink::new(),
            now: 0,
        };
        node.device.start(&mut node.sink);
        node
    }

    fn run_for(&mut self, duration_ms: u64) {
        let end = self.now + duration_ms;
        while self.now < end {
            self.now += 50;
            self.device
                .tick(self.now, &mut self.wifi, &mut self.mqtt, &mut self.hw, &mut self.sink);
        }
    }

    fn sent_on(&self, topic: &str) -> Vec<&SentMessage> {
        self.mqtt.sent().iter().filter(|m| m.topic == topic).collect()
    }
}

// ── Lawn sonar ────────────────────────────────────────────────

#[test]
fn lawn_sonar_publishes_ranges_and_follows_light_commands() {
    sim_set_pulse_us(pins::lawn_sonar::ECHO1_GPIO, 5_700);
    let mut node = SimNode::boot(&LAWN_SONAR);
    assert_eq!(node.device.client_id(), "ESP8266Client-cafe");

    node.run_for(2_500);
    assert!(node.device.broker_up());
    assert_eq!(node.wifi.attempts(), 1);
    assert_eq!(node.mqtt.subscriptions().len(), 4, "lights only");

    let sonar1 = node.sent_on("lawn/ultrasonic1");
    assert_eq!(sonar1.len(), 1);
    assert_eq!(sonar1[0].payload, b"100");
    assert!(sonar1[0].retained);
    let sonar2 = node.sent_on("lawn/ultrasonic2");
    assert_eq!(sonar2[0].payload, b"200", "no echo reads as max range");

    node.mqtt.sim_inject("lawn/light2", b"1");
    node.run_for(50);
    assert_eq!(node.hw.relays().is_on(1), Some(true));
    assert_eq!(node.hw.relays().is_on(0), Some(false));

    node.mqtt.sim_bounce_session();
    assert!(node.mqtt.subscriptions().is_empty());
    node.run_for(50);
    assert_eq!(node.mqtt.subscriptions().len(), 4, "restored after the bounce");
}

// ── Lawn control ──────────────────────────────────────────────

#[test]
fn lawn_control_publishes_gas_and_dial() {
    sim_set_adc(pins::lawn_control::MQ6_ADC1_CHANNEL, 1_000);
    let mut node = SimNode::boot(&LAWN_CONTROL);
    assert_eq!(node.device.client_id(), "ESP32Client-cafe");

    node.run_for(1_000);
    let gas = node.sent_on("hall/gas");
    assert_eq!(gas.len(), 1);
    assert_eq!(gas[0].payload, b"1000");
    assert_eq!(node.sent_on("lawn/ultrasonic1")[0].payload, b"1", "dial starts at min");

    sim_rotate(9);
    node.run_for(1_000);
    assert_eq!(node.device.dial_value(), Some(10));
    let dial = node.sent_on("lawn/ultrasonic1");
    assert_eq!(dial.last().map(|m| m.payload.as_slice()), Some(&b"10"[..]));
    assert!(!dial[0].retained);

    sim_set_adc(pins::lawn_control::MQ6_ADC1_CHANNEL, 1_003);
    node.run_for(1_000);
    assert_eq!(node.sent_on("hall/gas").len(), 1, "below threshold");

    node.mqtt.sim_inject("lawn/light4", b"1");
    node.run_for(50);
    assert_eq!(node.hw.relays().is_on(3), Some(true));
}
