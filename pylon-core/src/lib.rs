//! Board-agnostic core logic for the delta calibration firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Service traits (motion, probe, endstops, leveling, tools, status, geometry)
//! - Kinematic parameter types for delta frames
//! - The G33 auto-calibration engine (validator, probe planner, solver)
//! - Machine configuration types and parser
//! - Settings blob format for external persistence

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod calibration;
pub mod config;
pub mod kinematics;
pub mod traits;
