//! Frag6 Core Library
//!
//! This crate provides the error taxonomy and result alias shared by the
//! frag6 packet-construction and transmission crates.

pub mod error;

pub use error::{Error, Result};
