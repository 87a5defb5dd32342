//! One-shot hardware peripheral initialization and raw pin access.
//!
//! Configures GPIO directions, ADC1 channels and the GPIO ISR service using
//! raw ESP-IDF sys calls. Called once from `main()` before the loop starts.
//!
//! On host targets every function has a simulation twin backed by static
//! atomics, so drivers built on top of this module run unchanged in tests:
//! `sim_set_level` / `sim_set_adc` / `sim_set_pulse_us` script the inputs and
//! `sim_level` reads back what a driver wrote.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
#[cfg(target_os = "espidf")]
use log::info;

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use crate::error::SensorError;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
    IsrInstallFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
        }
    }
}

impl From<HwInitError> for crate::error::Error {
    fn from(e: HwInitError) -> Self {
        match e {
            HwInitError::AdcInitFailed(_) => Self::Init("ADC1"),
            HwInitError::GpioConfigFailed(_) => Self::Init("GPIO"),
            HwInitError::IsrInstallFailed(_) => Self::Init("GPIO ISR service"),
        }
    }
}

/// Everything one board needs configured at boot.
#[derive(Debug, Clone, Copy, Default)]
pub struct PinPlan<'a> {
    /// Inputs with the internal pull-up enabled (active-low buttons, echo).
    pub inputs_pull_up: &'a [i32],
    /// Inputs without pull resistors.
    pub inputs_floating: &'a [i32],
    /// Push-pull outputs, driven low at init.
    pub outputs: &'a [i32],
    /// ADC1 channels to configure for one-shot reads.
    pub adc1_channels: &'a [u32],
}

#[cfg(target_os = "espidf")]
pub fn init_peripherals(plan: &PinPlan<'_>) -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the loop; single-threaded.
    unsafe {
        if !plan.adc1_channels.is_empty() {
            init_adc(plan.adc1_channels)?;
        }
        init_gpio_inputs(plan.inputs_pull_up, true)?;
        init_gpio_inputs(plan.inputs_floating, false)?;
        init_gpio_outputs(plan.outputs)?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals(plan: &PinPlan<'_>) -> Result<(), HwInitError> {
    for &pin in plan.inputs_pull_up {
        sim_set_level(pin, true);
    }
    for &pin in plan.outputs {
        gpio_write(pin, false);
    }
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// main-loop ADC read path. `init_adc()` completes before the loop starts.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc(channels: &[u32]) -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    for &ch in channels {
        let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), ch, &chan_cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::AdcInitFailed(ret));
        }
    }

    info!("hw_init: ADC1 configured ({} channel(s))", channels.len());
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> Result<u16, SensorError> {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract; single-threaded main-loop access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return Err(SensorError::AdcReadFailed);
    }
    Ok(raw.max(0) as u16)
}

#[cfg(not(target_os = "espidf"))]
static SIM_ADC: [AtomicU32; 10] = [const { AtomicU32::new(0) }; 10];

#[cfg(not(target_os = "espidf"))]
pub fn adc1_read(channel: u32) -> Result<u16, SensorError> {
    SIM_ADC
        .get(channel as usize)
        .map(|a| a.load(Ordering::Relaxed) as u16)
        .ok_or(SensorError::AdcReadFailed)
}

/// Simulation: set the raw reading returned for an ADC1 channel.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_adc(channel: u32, raw: u16) {
    if let Some(a) = SIM_ADC.get(channel as usize) {
        a.store(u32::from(raw), Ordering::Relaxed);
    }
}

// ── GPIO ──────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_inputs(pins: &[i32], pull_up: bool) -> Result<(), HwInitError> {
    for &pin in pins {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: if pull_up {
                gpio_pullup_t_GPIO_PULLUP_ENABLE
            } else {
                gpio_pullup_t_GPIO_PULLUP_DISABLE
            },
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
    }
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs(pins: &[i32]) -> Result<(), HwInitError> {
    for &pin in pins {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
        unsafe { gpio_set_level(pin, 0) };
    }
    info!("hw_init: {} GPIO output(s) configured", pins.len());
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: read-only register access on an already-configured input pin.
    (unsafe { gpio_get_level(pin) }) != 0
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: writes to an already-configured output pin; main loop only.
    unsafe {
        gpio_set_level(pin, u32::from(high));
    }
}

/// Simulated pin levels, one bit per GPIO.
#[cfg(not(target_os = "espidf"))]
static SIM_LEVELS: AtomicU64 = AtomicU64::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(pin: i32) -> bool {
    sim_level(pin)
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(pin: i32, high: bool) {
    sim_set_level(pin, high);
}

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_level(pin: i32, high: bool) {
    let Ok(bit) = u32::try_from(pin) else {
        return;
    };
    if bit >= 64 {
        return;
    }
    if high {
        SIM_LEVELS.fetch_or(1 << bit, Ordering::Relaxed);
    } else {
        SIM_LEVELS.fetch_and(!(1 << bit), Ordering::Relaxed);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn sim_level(pin: i32) -> bool {
    u32::try_from(pin)
        .ok()
        .filter(|&b| b < 64)
        .is_some_and(|b| SIM_LEVELS.load(Ordering::Relaxed) & (1 << b) != 0)
}

// ── Pulse timing (ultrasonic echo) ────────────────────────────

/// Fire a 10 µs trigger pulse and time the echo's high phase.
/// Returns `None` when no echo arrives within `timeout_us`.
#[cfg(target_os = "espidf")]
pub fn ping(trigger: i32, echo: i32, timeout_us: u32) -> Option<u32> {
    // SAFETY: plain register writes/reads and ROM busy-waits on pins
    // configured at boot; called from the main loop only.
    unsafe {
        gpio_set_level(trigger, 0);
        esp_rom_delay_us(2);
        gpio_set_level(trigger, 1);
        esp_rom_delay_us(10);
        gpio_set_level(trigger, 0);

        let timeout = i64::from(timeout_us);
        let start = esp_timer_get_time();
        while gpio_get_level(echo) == 0 {
            if esp_timer_get_time() - start > timeout {
                return None;
            }
        }
        let rise = esp_timer_get_time();
        while gpio_get_level(echo) != 0 {
            if esp_timer_get_time() - rise > timeout {
                return None;
            }
        }
        Some((esp_timer_get_time() - rise) as u32)
    }
}

#[cfg(not(target_os = "espidf"))]
static SIM_PULSE_US: [AtomicU32; 40] = [const { AtomicU32::new(0) }; 40];

#[cfg(not(target_os = "espidf"))]
pub fn ping(_trigger: i32, echo: i32, timeout_us: u32) -> Option<u32> {
    let us = usize::try_from(echo)
        .ok()
        .and_then(|i| SIM_PULSE_US.get(i))
        .map_or(0, |a| a.load(Ordering::Relaxed));
    (us != 0 && us <= timeout_us).then_some(us)
}

/// Simulation: echo width seen on `echo` pin (0 = no echo).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_pulse_us(echo: i32, us: u32) {
    if let Some(a) = usize::try_from(echo).ok().and_then(|i| SIM_PULSE_US.get(i)) {
        a.store(us, Ordering::Relaxed);
    }
}

// ── GPIO ISR Service ──────────────────────────────────────────

/// Both encoder pins packed into the ISR argument: A in bits 8..16, B in 0..8.
fn pack_encoder_pins(a_pin: i32, b_pin: i32) -> usize {
    ((a_pin as usize & 0xFF) << 8) | (b_pin as usize & 0xFF)
}

fn unpack_encoder_pins(arg: usize) -> (i32, i32) {
    (((arg >> 8) & 0xFF) as i32, (arg & 0xFF) as i32)
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn encoder_gpio_isr(arg: *mut core::ffi::c_void) {
    let (a_pin, b_pin) = unpack_encoder_pins(arg as usize);
    // SAFETY: register reads; safe in ISR context.
    let a = unsafe { gpio_get_level(a_pin) } != 0;
    let b = unsafe { gpio_get_level(b_pin) } != 0;
    crate::drivers::encoder::encoder_isr_handler(a, b);
}

/// Install the GPIO ISR service and attach the quadrature encoder on `a_pin`
/// (both edges). Call after `init_peripherals()`.
#[cfg(target_os = "espidf")]
pub fn init_encoder_isr(a_pin: i32, b_pin: i32) -> Result<(), HwInitError> {
    // SAFETY: gpio_install_isr_service is idempotent; ESP_ERR_INVALID_STATE
    // means it was already installed. The handler only touches an atomic.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK as i32 && ret != ESP_ERR_INVALID_STATE as i32 {
            return Err(HwInitError::IsrInstallFailed(ret));
        }
        gpio_set_intr_type(a_pin, gpio_int_type_t_GPIO_INTR_ANYEDGE);
        let arg = pack_encoder_pins(a_pin, b_pin) as *mut core::ffi::c_void;
        let ret = gpio_isr_handler_add(a_pin, Some(encoder_gpio_isr), arg);
        if ret != ESP_OK as i32 {
            return Err(HwInitError::IsrInstallFailed(ret));
        }
        gpio_intr_enable(a_pin);
    }
    info!("hw_init: encoder ISR on GPIO{} (B=GPIO{})", a_pin, b_pin);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_encoder_isr(a_pin: i32, b_pin: i32) -> Result<(), HwInitError> {
    let (a, b) = unpack_encoder_pins(pack_encoder_pins(a_pin, b_pin));
    log::info!("hw_init(sim): encoder ISR skipped (A=GPIO{}, B=GPIO{})", a, b);
    Ok(())
}
