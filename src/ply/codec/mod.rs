//! Codec layer for binary scalar values.
//!
//! # Submodules
//!
//! - [`scalar`][]: Fixed-width decode/encode of the eight PLY scalar types

pub mod scalar;
