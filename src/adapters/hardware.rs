//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`], relay outputs, buttons, encoder and display,
//! exposing them through [`SensorPort`], [`ActuatorPort`], [`InputPort`] and
//! [`DisplayPort`]. [`Board`] wires those drivers for a given profile from
//! the pin map. On non-espidf targets the drivers use their simulation
//! stubs, so the same wiring runs on the host.

use crate::app::ports::{ActuatorPort, DisplayPort, InputPort, SensorPort};
use crate::codec::GpsFix;
use crate::drivers::button::ButtonPad;
use crate::drivers::encoder::EncoderCounter;
use crate::drivers::gpio::SysPin;
use crate::drivers::hw_init::PinPlan;
use crate::drivers::relay::RelayBank;
use crate::error::SensorError;
use crate::input::InputSnapshot;
use crate::pins;
use crate::profile::DeviceProfile;
use crate::sensors::gas::GasSensor;
use crate::sensors::ultrasonic::Ultrasonic;
use crate::sensors::{SensorHub, SensorSource};
use crate::ui::Frame;

// ── Board wiring ──────────────────────────────────────────────

const HALL_INPUTS: [i32; 4] = [
    pins::hall::NEXT_BUTTON_GPIO,
    pins::hall::PREV_BUTTON_GPIO,
    pins::hall::SELECT_BUTTON_GPIO,
    pins::hall::MODE_BUTTON_GPIO,
];
const HALL_OUTPUTS: [i32; 1] = [pins::hall::BUZZER_GPIO];

const SONAR_OUTPUTS: [i32; 6] = [
    pins::lawn_sonar::LIGHT_GPIOS[0],
    pins::lawn_sonar::LIGHT_GPIOS[1],
    pins::lawn_sonar::LIGHT_GPIOS[2],
    pins::lawn_sonar::LIGHT_GPIOS[3],
    pins::lawn_sonar::TRIGGER1_GPIO,
    pins::lawn_sonar::TRIGGER2_GPIO,
];
const SONAR_INPUTS: [i32; 2] = [pins::lawn_sonar::ECHO1_GPIO, pins::lawn_sonar::ECHO2_GPIO];

const CONTROL_INPUTS: [i32; 3] = [
    pins::lawn_control::ENCODER_A_GPIO,
    pins::lawn_control::ENCODER_B_GPIO,
    pins::lawn_control::ENCODER_BUTTON_GPIO,
];
const CONTROL_ADC: [u32; 1] = [pins::lawn_control::MQ6_ADC1_CHANNEL];

/// Drivers for one node, before they are handed to a [`HardwareAdapter`].
pub struct Board {
    pub sensors: SensorHub,
    pub relays: RelayBank<SysPin>,
    pub buttons: ButtonPad<SysPin>,
    /// Present on boards with a rotary dial. Create only after the encoder
    /// ISR is attached.
    pub has_encoder: bool,
}

impl Board {
    /// Which pins `hw_init` must configure for `profile`.
    pub fn pin_plan(profile: &DeviceProfile) -> PinPlan<'static> {
        match profile.name {
            "hall" => PinPlan {
                inputs_pull_up: &HALL_INPUTS,
                outputs: &HALL_OUTPUTS,
                ..PinPlan::default()
            },
            "lawn-sonar" => PinPlan {
                inputs_floating: &SONAR_INPUTS,
                outputs: &SONAR_OUTPUTS,
                ..PinPlan::default()
            },
            "lawn-control" => PinPlan {
                inputs_pull_up: &CONTROL_INPUTS,
                outputs: &pins::lawn_control::LIGHT_GPIOS,
                adc1_channels: &CONTROL_ADC,
                ..PinPlan::default()
            },
            _ => PinPlan::default(),
        }
    }

    /// Bind drivers to the channel indices of `profile`.
    ///
    /// Light channels are looked up by position: the first toggle channels
    /// of the lawn profiles map onto `LIGHT_GPIOS` in order.
    pub fn wire(profile: &DeviceProfile) -> Self {
        let mut board = Self {
            sensors: SensorHub::new(),
            relays: RelayBank::new(),
            buttons: ButtonPad::none(),
            has_encoder: false,
        };
        match profile.name {
            "hall" => {
                board.buttons = ButtonPad::menu(
                    SysPin(pins::hall::NEXT_BUTTON_GPIO),
                    SysPin(pins::hall::PREV_BUTTON_GPIO),
                    SysPin(pins::hall::SELECT_BUTTON_GPIO),
                    SysPin(pins::hall::MODE_BUTTON_GPIO),
                );
            }
            "lawn-sonar" => {
                use pins::lawn_sonar::*;
                board.relays = RelayBank::with_pins(LIGHT_GPIOS.map(SysPin));
                let sonar1 = Ultrasonic::new(TRIGGER1_GPIO, ECHO1_GPIO, MAX_DISTANCE_CM);
                let sonar2 = Ultrasonic::new(TRIGGER2_GPIO, ECHO2_GPIO, MAX_DISTANCE_CM);
                board.sensors = board
                    .sensors
                    .bind(channel_of(profile, "lawn/ultrasonic1"), SensorSource::Sonar(sonar1))
                    .bind(channel_of(profile, "lawn/ultrasonic2"), SensorSource::Sonar(sonar2));
            }
            "lawn-control" => {
                use pins::lawn_control::*;
                board.relays = RelayBank::with_pins(LIGHT_GPIOS.map(SysPin));
                board.sensors = board.sensors.bind(
                    channel_of(profile, "hall/gas"),
                    SensorSource::Gas(GasSensor::new(MQ6_ADC1_CHANNEL)),
                );
                board.buttons = ButtonPad::dial(SysPin(ENCODER_BUTTON_GPIO));
                board.has_encoder = true;
            }
            _ => {}
        }
        board
    }
}

fn channel_of(profile: &DeviceProfile, topic: &str) -> usize {
    profile
        .channels
        .iter()
        .position(|c| c.topic == topic)
        .unwrap_or(usize::MAX)
}

// ── Adapter ───────────────────────────────────────────────────

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<D: DisplayPort> {
    sensors: SensorHub,
    relays: RelayBank<SysPin>,
    buttons: ButtonPad<SysPin>,
    encoder: Option<EncoderCounter>,
    display: D,
}

impl<D: DisplayPort> HardwareAdapter<D> {
    pub fn new(board: Board, display: D) -> Self {
        let encoder = board.has_encoder.then(EncoderCounter::new);
        Self {
            sensors: board.sensors,
            relays: board.relays,
            buttons: board.buttons,
            encoder,
            display,
        }
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn relays(&self) -> &RelayBank<SysPin> {
        &self.relays
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<D: DisplayPort> SensorPort for HardwareAdapter<D> {
    fn sample(&mut self, channel: usize) -> Option<Result<i32, SensorError>> {
        self.sensors.sample(channel)
    }

    fn take_gps_fix(&mut self) -> Option<GpsFix> {
        self.sensors.take_gps_fix()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<D: DisplayPort> ActuatorPort for HardwareAdapter<D> {
    fn apply(&mut self, channel: usize, value: i32) {
        self.relays.set(channel, value);
    }
}

// ── InputPort implementation ──────────────────────────────────

impl<D: DisplayPort> InputPort for HardwareAdapter<D> {
    fn read_inputs(&mut self, _now_ms: u64) -> InputSnapshot {
        let mut snap = self.buttons.read();
        snap.encoder_count = self.encoder.as_ref().map(EncoderCounter::count);
        snap
    }
}

// ── DisplayPort implementation ────────────────────────────────

impl<D: DisplayPort> DisplayPort for HardwareAdapter<D> {
    fn render(&mut self, frame: &Frame<'_>) {
        self.display.render(frame);
    }
}
