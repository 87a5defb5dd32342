//! WiFi station-mode adapter.
//!
//! Implements [`NetworkPort`]. `begin_connect` only kicks off association;
//! the [`LinkSupervisor`](crate::link::LinkSupervisor) polls
//! `is_connected` until the station is up or the attempt times out.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: ESP-IDF WiFi driver via `esp_idf_svc::wifi`.
//! - **all other targets**: a simulated access point whose availability is
//!   scripted with [`sim_set_ap_available`].

use log::{debug, info, warn};

use crate::app::ports::NetworkPort;
use crate::config::NetworkConfig;
use crate::error::LinkError;

#[cfg(target_os = "espidf")]
use embedded_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};
#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::EspWifi;

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, Ordering};

/// Simulation: whether the access point answers association requests.
#[cfg(not(target_os = "espidf"))]
static SIM_AP_AVAILABLE: AtomicBool = AtomicBool::new(true);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_ap_available(available: bool) {
    SIM_AP_AVAILABLE.store(available, Ordering::Relaxed);
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    ssid: heapless::String<32>,
    attempts: u32,
    #[cfg(target_os = "espidf")]
    wifi: EspWifi<'static>,
    #[cfg(target_os = "espidf")]
    started: bool,
    #[cfg(not(target_os = "espidf"))]
    associated: bool,
}

impl WifiAdapter {
    /// Take ownership of the driver and load the station credentials.
    #[cfg(target_os = "espidf")]
    pub fn new(mut wifi: EspWifi<'static>, cfg: &NetworkConfig) -> anyhow::Result<Self> {
        let auth_method = if cfg.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: cfg
                .ssid
                .as_str()
                .try_into()
                .map_err(|_| anyhow::anyhow!("wifi ssid too long"))?,
            password: cfg
                .password
                .as_str()
                .try_into()
                .map_err(|_| anyhow::anyhow!("wifi password too long"))?,
            auth_method,
            ..Default::default()
        }))?;
        Ok(Self {
            ssid: ssid_of(cfg),
            attempts: 0,
            wifi,
            started: false,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(cfg: &NetworkConfig) -> Self {
        Self {
            ssid: ssid_of(cfg),
            attempts: 0,
            associated: false,
        }
    }

    /// Association attempts started since boot.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), LinkError> {
        if !self.started {
            self.wifi.start().map_err(|e| {
                warn!("WiFi: driver start failed: {:?}", e);
                LinkError::NetworkUnavailable
            })?;
            self.started = true;
        }
        // Associated but still waiting for DHCP: let the pending join finish.
        if self.wifi.is_connected().unwrap_or(false) {
            debug!("WiFi: association pending, not restarting it");
            return Ok(());
        }
        // A stale association must be dropped before connect() is accepted.
        if let Err(e) = self.wifi.disconnect() {
            debug!("WiFi: disconnect before reconnect failed: {:?}", e);
        }
        self.wifi.connect().map_err(|e| {
            warn!("WiFi: connect request failed: {:?}", e);
            LinkError::NetworkUnavailable
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), LinkError> {
        self.associated = SIM_AP_AVAILABLE.load(Ordering::Relaxed);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        self.wifi.is_up().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        self.associated && SIM_AP_AVAILABLE.load(Ordering::Relaxed)
    }
}

fn ssid_of(cfg: &NetworkConfig) -> heapless::String<32> {
    let mut s = heapless::String::new();
    let _ = s.push_str(cfg.ssid.as_str());
    s
}

// ───────────────────────────────────────────────────────────────
// NetworkPort
// ───────────────────────────────────────────────────────────────

impl NetworkPort for WifiAdapter {
    fn begin_connect(&mut self) -> Result<(), LinkError> {
        self.attempts = self.attempts.wrapping_add(1);
        info!("WiFi: connecting to '{}' (attempt {})", self.ssid, self.attempts);
        self.platform_connect()
    }

    fn is_connected(&self) -> bool {
        self.platform_is_connected()
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
