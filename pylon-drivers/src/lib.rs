//! Service implementations for the delta calibration core
//!
//! Concrete implementations of the traits defined in pylon-core:
//!
//! - Delta mechanics (tower geometry, kinematics, reachability)
//! - Status output over an embassy-sync channel

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod mechanics;
pub mod status;
