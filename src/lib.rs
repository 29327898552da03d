//! Hardware-independent core of a networked chronothermostat control panel
//!
//! This crate contains all platform-agnostic logic of the panel: the device
//! wire protocol, the settings store with its bank edit buffer, the per-day
//! sample history, and the interactive setpoint chart with its rendering.
//!
//! It is `no_std` with `extern crate alloc` so it runs on embedded targets
//! and on desktop hosts alike. The host owns the socket and the pointer
//! device; it feeds both into [`panel::ThermostatPanel`] and draws the panel
//! onto any `embedded-graphics` target.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod config;
pub mod framebuffer;
pub mod history;
pub mod panel;
pub mod protocol;
pub mod schedule;
pub mod ui;

pub use panel::{LiveStatus, PanelError, PanelResult, ThermostatPanel};
