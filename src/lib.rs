//! `gapminder-dash` library crate.
//!
//! The binary is a thin eframe wrapper around this library, so the
//! filter → chart pipeline is testable without opening a window.
//!
//! Data flow:
//! ```text
//!  widget event ──► controls::ControlPanel ──► binder::ReactiveBinder
//!                                                  │
//!                     data::store ─► data::query ──┤
//!                                                  ▼
//!                                       chart::builders ─► ChartSpec ─► ui
//! ```

pub mod app;
pub mod binder;
pub mod chart;
pub mod color;
pub mod config;
pub mod controls;
pub mod data;
pub mod error;
pub mod state;
pub mod ui;
