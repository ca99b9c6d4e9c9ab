//! Humifan firmware library.
//!
//! Exposes the pure-logic modules for integration testing and the
//! composition root in `main.rs`. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod disturber;
pub mod error;
pub mod fan;
pub mod fsm;
pub mod heuristics;
pub mod history;

pub mod adapters;
pub mod drivers;
pub mod sensors;
