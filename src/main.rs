//! HomeNode Firmware — Main Entry Point
//!
//! One binary serves every node; the profile is chosen at build time with
//! `HOMENODE_PROFILE` (`hall`, `lawn-sonar`, `lawn-control`, `gps`).
//! `HOMENODE_CONFIG` may carry a full JSON [`NodeConfig`] override.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  WifiAdapter      MqttAdapter     HardwareAdapter  LogEventSink│
//! │  (NetworkPort)    (BrokerPort)    (Sensor+Actuator (EventSink) │
//! │                                    +Input+Display)             │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              DeviceLoop (pure logic)                   │    │
//! │  │  Links · Channels · Menu · Sampling                    │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use anyhow::{Context, Result, anyhow};
use log::info;

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::gpio::AnyIOPin;
use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_svc::hal::prelude::*;
use esp_idf_svc::hal::uart::{self, UartDriver};
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::EspWifi;

use homenode::adapters::device_id;
use homenode::adapters::hardware::{Board, HardwareAdapter};
use homenode::adapters::log_display::LogDisplay;
use homenode::adapters::log_sink::LogEventSink;
use homenode::adapters::mqtt::MqttAdapter;
use homenode::adapters::time::MonotonicClock;
use homenode::adapters::wifi::WifiAdapter;
use homenode::app::ports::DisplayPort;
use homenode::app::service::DeviceLoop;
use homenode::config::NodeConfig;
use homenode::drivers::hw_init;
use homenode::drivers::oled::Ssd1306Panel;
use homenode::error::Error;
use homenode::pins;
use homenode::profile;
use homenode::ui::render::GraphicsDisplay;

/// Main-loop period. Buttons and the dial are sampled at this rate.
const LOOP_PERIOD_MS: u32 = 10;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  HomeNode v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Profile + config ───────────────────────────────────
    let profile_name = option_env!("HOMENODE_PROFILE").unwrap_or("hall");
    let profile = profile::by_name(profile_name)
        .ok_or_else(|| anyhow!("unknown profile '{}'", profile_name))?;
    profile.validate().map_err(Error::Config)?;

    let config = match option_env!("HOMENODE_CONFIG") {
        Some(json) => NodeConfig::from_json(json).map_err(Error::from)?,
        None => NodeConfig::for_profile(profile),
    };
    info!("Profile '{}', broker {}", profile.name, config.broker_url());

    // ── 3. Peripherals ────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    hw_init::init_peripherals(&Board::pin_plan(profile)).map_err(Error::from)?;
    if profile.dial.is_some() {
        hw_init::init_encoder_isr(
            pins::lawn_control::ENCODER_A_GPIO,
            pins::lawn_control::ENCODER_B_GPIO,
        )
        .map_err(Error::from)?;
    }

    let mut board = Board::wire(profile);
    if profile.gps_topic.is_some() {
        // SAFETY: each pin number comes from `pins` and is claimed exactly
        // once; nothing else takes these pins out of `peripherals.pins`.
        let (tx, rx) = unsafe {
            (
                AnyIOPin::new(pins::gps::GPS_TX_GPIO),
                AnyIOPin::new(pins::gps::GPS_RX_GPIO),
            )
        };
        let gps_uart = UartDriver::new(
            peripherals.uart2,
            tx,
            rx,
            Option::<AnyIOPin>::None,
            Option::<AnyIOPin>::None,
            &uart::config::Config::default().baudrate(Hertz(pins::gps::GPS_BAUD)),
        )
        .context("GPS UART")?;
        board.sensors = board.sensors.with_gps(Box::new(gps_uart));
        info!("GPS: UART2 at {} baud", pins::gps::GPS_BAUD);
    }

    // ── 4. Network adapters ───────────────────────────────────
    let esp_wifi = EspWifi::new(peripherals.modem, sysloop, Some(nvs))?;
    let wifi = WifiAdapter::new(esp_wifi, &config.network)?;
    let mqtt = MqttAdapter::new(&config);

    let mac = device_id::read_mac();
    info!("Station MAC: {}", device_id::format_mac(&mac));
    let device = DeviceLoop::new(profile, config).with_mac(&mac);

    // ── 5. Display + run ──────────────────────────────────────
    if profile.has_display {
        // SAFETY: as for the GPS UART pins above.
        let (sda, scl) = unsafe {
            (
                AnyIOPin::new(pins::hall::I2C_SDA_GPIO),
                AnyIOPin::new(pins::hall::I2C_SCL_GPIO),
            )
        };
        let i2c = I2cDriver::new(
            peripherals.i2c0,
            sda,
            scl,
            &I2cConfig::new().baudrate(Hertz(pins::hall::DISPLAY_I2C_HZ)),
        )
        .context("display I2C")?;
        let panel = Ssd1306Panel::new(i2c, pins::hall::DISPLAY_I2C_ADDR)?;
        run(device, wifi, mqtt, HardwareAdapter::new(board, GraphicsDisplay::new(panel)))
    } else {
        run(device, wifi, mqtt, HardwareAdapter::new(board, LogDisplay::new()))
    }
}

fn run<D: DisplayPort>(
    mut device: DeviceLoop,
    mut wifi: WifiAdapter,
    mut mqtt: MqttAdapter,
    mut hw: HardwareAdapter<D>,
) -> ! {
    let clock = MonotonicClock::new();
    let mut sink = LogEventSink::new();
    device.start(&mut sink);
    info!("System ready. Entering main loop.");

    loop {
        device.tick(clock.uptime_ms(), &mut wifi, &mut mqtt, &mut hw, &mut sink);
        FreeRtos::delay_ms(LOOP_PERIOD_MS);
    }
}
