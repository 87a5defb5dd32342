//! GPIO / peripheral pin assignments for every node board.
//!
//! Drivers reference this module rather than hard-coding pin numbers. The
//! ESP8266 lawn board is listed by raw GPIO number (its silkscreen labels are
//! noted alongside).

// ---------------------------------------------------------------------------
// Hall desktop companion (ESP32 + SSD1306)
// ---------------------------------------------------------------------------

pub mod hall {
    /// Active-low, internal pull-up.
    pub const NEXT_BUTTON_GPIO: i32 = 13;
    pub const PREV_BUTTON_GPIO: i32 = 12;
    pub const SELECT_BUTTON_GPIO: i32 = 33;
    /// Switches between the channel menu and the media screen.
    pub const MODE_BUTTON_GPIO: i32 = 23;
    pub const BUZZER_GPIO: i32 = 14;

    pub const I2C_SDA_GPIO: i32 = 21;
    pub const I2C_SCL_GPIO: i32 = 22;
    /// SSD1306 7-bit address.
    pub const DISPLAY_I2C_ADDR: u8 = 0x3C;
    pub const DISPLAY_I2C_HZ: u32 = 400_000;
}

// ---------------------------------------------------------------------------
// Lawn ultrasonic node (ESP8266)
// ---------------------------------------------------------------------------

pub mod lawn_sonar {
    /// D4, D5, D6, D7.
    pub const LIGHT_GPIOS: [i32; 4] = [2, 14, 12, 13];
    /// D0 / D1.
    pub const TRIGGER1_GPIO: i32 = 16;
    pub const ECHO1_GPIO: i32 = 5;
    /// D2 / D3.
    pub const TRIGGER2_GPIO: i32 = 4;
    pub const ECHO2_GPIO: i32 = 0;
    /// Readings beyond this are reported as this value.
    pub const MAX_DISTANCE_CM: i32 = 200;
}

// ---------------------------------------------------------------------------
// Lawn control box (ESP32)
// ---------------------------------------------------------------------------

pub mod lawn_control {
    pub const LIGHT_GPIOS: [i32; 4] = [16, 17, 18, 19];
    /// Quadrature channel A; interrupts on both edges.
    pub const ENCODER_A_GPIO: i32 = 32;
    pub const ENCODER_B_GPIO: i32 = 33;
    /// Active-low, internal pull-up.
    pub const ENCODER_BUTTON_GPIO: i32 = 25;
    /// MQ-6 analog output on GPIO34, which is ADC1 channel 6.
    pub const MQ6_ADC1_CHANNEL: u32 = 6;
}

// ---------------------------------------------------------------------------
// GPS tracker (ESP32 + NEO-6M on UART2)
// ---------------------------------------------------------------------------

pub mod gps {
    /// UART2 receive, wired to the module's TX.
    pub const GPS_RX_GPIO: i32 = 17;
    /// UART2 transmit, wired to the module's RX.
    pub const GPS_TX_GPIO: i32 = 16;
    pub const GPS_BAUD: u32 = 9600;
}
