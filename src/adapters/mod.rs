//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to                   |
//! |----------------|--------------------|-------------------------------|
//! | `wifi`         | NetworkPort        | ESP-IDF WiFi STA / sim AP     |
//! | `mqtt`         | BrokerPort         | ESP-IDF MQTT / in-memory      |
//! | `hardware`     | SensorPort         | ADC, sonar, GPS UART          |
//! |                | ActuatorPort       | Relay / LED GPIO              |
//! |                | InputPort          | Buttons, encoder ISR          |
//! |                | DisplayPort        | Wrapped display               |
//! | `log_display`  | DisplayPort        | Serial log (headless boards)  |
//! | `log_sink`     | EventSink          | Serial log output             |
//! | `time`         | —                  | ESP32 system timer            |
//! | `device_id`    | —                  | eFuse MAC                     |

pub mod device_id;
pub mod hardware;
pub mod log_display;
pub mod log_sink;
pub mod mqtt;
pub mod time;
pub mod wifi;
