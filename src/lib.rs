//! Pulse Lotus: light a flower in time with the heart beat of whoever holds the sensor.
//!
//! The pulse sensor feeds a beat detector. Each beat sends a pulse of light up the stem,
//! and when it reaches the top the petal glows and fades. Everything here is hardware
//! independent; the board is reached through the traits in [hal].
#![cfg_attr(not(test), no_std)]

pub mod colour;
pub mod configuration;
pub mod hal;
pub mod heartbeat;
pub mod installation;
pub mod orchestrator;
pub mod petal;
pub mod presence;
pub mod si1143;
pub mod stem;
pub mod tracker;
pub mod utils;

#[cfg(test)]
mod mock;
