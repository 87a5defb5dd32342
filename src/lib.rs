//! HomeNode firmware library.
//!
//! Exposes the pure-logic modules for integration testing and the adapters
//! the firmware binary wires together. All ESP-IDF-specific code is guarded
//! by `#[cfg(target_os = "espidf")]` within each module; on the host the
//! same modules run against simulation stubs.

#![deny(unused_must_use)]

#[cfg(all(target_os = "espidf", not(feature = "espidf")))]
compile_error!("building for ESP-IDF requires `--features espidf`");

pub mod app;
pub mod channel;
pub mod codec;
pub mod config;
pub mod error;
pub mod input;
pub mod link;
pub mod pins;
pub mod profile;
pub mod ui;

pub mod adapters;
pub mod drivers;
pub mod sensors;
