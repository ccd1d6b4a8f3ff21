//! Built-in block definitions

pub mod basic_blocks;

pub use basic_blocks::{create_default_payload_table, register_basic_blocks};
