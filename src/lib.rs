//! `salesdash` library crate.
//!
//! The binary (`salesdash`) is a thin wrapper around this library so that:
//!
//! - loading, filtering and aggregation are testable without a terminal
//! - the TUI, the text report and the SVG/JSON exporters share one pipeline
//! - code stays easy to navigate as the project grows

pub mod analysis;
pub mod app;
pub mod charts;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod plot;
pub mod report;
pub mod tui;
