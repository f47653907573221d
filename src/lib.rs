//! Nearest-match lookup of a corresponding density from a table of
//! (measured density, observed temperature, corresponding density) rows.
//!
//! The [`data`] module holds the core: loading and validating a table and
//! finding the row nearest to a query point. Everything else is presentation.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod session;
pub mod state;
pub mod ui;
