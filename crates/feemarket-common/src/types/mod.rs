//! Core data types for the fee market

pub mod address;
pub mod coin;
pub mod genesis;
pub mod params;
pub mod state;
