//! Client-side simulations: nothing here talks to the backend.

pub mod bots;
pub mod fields;
pub mod soil;
