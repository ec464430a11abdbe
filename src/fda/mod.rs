// src/fda/mod.rs
pub mod client;
pub mod models;

pub use client::{FetchPolicy, LabelClient};
pub use models::{load_input_records, InputRecord};
