//! Plain-text plots for the non-interactive `report` command.

pub mod ascii;

pub use ascii::render_ascii_plot;
