//!
//! # Regif21 Register-Interface Compiler
//!
//! Compiles an interface spec, an ordered list of named signals,
//! into a register-mapped Verilog wrapper and a matching C header.
//!
//! ```text
//! go,        1, unsigned, input,  channel
//! done,      1, unsigned, output, channel
//! relu,      1, unsigned, input,  wire
//! memory,   20, unsigned, input,  master
//! ```
//!
//! Both artifacts are rendered from a single [RegisterMap], so hardware defines
//! and software macros always agree on offsets.
//!

// Re-export our utilities crate
pub use regif21utils as utils;

pub mod data;
pub use data::*;

pub mod read;
pub use read::{parse_file, parse_file_for, parse_str, parse_str_for};

pub mod backend;
pub use backend::*;

pub mod alloc;
pub use alloc::*;

pub mod handshake;
pub use handshake::*;

pub mod write;
pub use write::Design;

pub mod compile;
pub use compile::*;

#[cfg(test)]
mod tests;
