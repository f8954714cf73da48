//! The binding tables of every form.

pub mod advanced;
pub mod companion;
pub mod experimental;
pub mod offsets;
