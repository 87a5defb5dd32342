//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the node's synchronization loop: link supervision,
//! inbound message resolution, sensor sampling and publishing, and the local
//! menu. All interaction with hardware and the network happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
