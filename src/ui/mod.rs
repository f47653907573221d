//! egui rendering. Every function here reads or mutates [`crate::state::AppState`]
//! and nothing else.

pub mod panels;
pub mod plot;
