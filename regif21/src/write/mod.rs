//!
//! # Artifact Writers
//!
//! Both writers consume the same [Design]: one parsed spec, one register map,
//! and one set of handshake rules. Neither computes offsets of its own.
//!

// Standard Lib Imports
use std::io::Write;
use std::ops::{AddAssign, SubAssign};

// Local imports
use crate::alloc::RegisterMap;
use crate::backend::Backend;
use crate::data::*;
use crate::handshake::Handshake;

pub(crate) mod bus;
pub mod header;
pub mod verilog;

/// # Design
///
/// Everything the writers read, borrowed from one compilation.
#[derive(Debug, Clone, Copy)]
pub struct Design<'a> {
    pub spec: &'a InterfaceSpec,
    pub map: &'a RegisterMap,
    pub handshakes: &'a [Handshake],
    pub backend: &'a Backend,
    /// Wrapper module name
    pub module_name: &'a str,
    /// Module name of the HLS core to instantiate
    pub instance_name: &'a str,
    /// Accelerator base address, as seen by software
    pub base_address: u64,
}
impl<'a> Design<'a> {
    /// Get the handshake rule for channel `signal`
    pub fn handshake(&self, signal: &str) -> Option<&'a Handshake> {
        self.handshakes.iter().find(|h| h.signal == signal)
    }
}

/// Render with `f` into a [String]
pub(crate) fn render<F>(f: F) -> RegResult<String>
where
    F: FnOnce(&mut Vec<u8>) -> RegResult<()>,
{
    let mut buf = Vec::new();
    f(&mut buf)?;
    String::from_utf8(buf).map_err(|e| RegError::Boxed(Box::new(e)))
}

/// Write a line to `dest` at indentation `indent`.
/// Empty lines carry no trailing whitespace.
pub(crate) fn write_indented(
    dest: &mut dyn Write,
    indent: &Indent,
    args: std::fmt::Arguments,
) -> std::io::Result<()> {
    let line = args.to_string();
    if line.is_empty() {
        writeln!(dest)
    } else {
        writeln!(dest, "{}{}", indent.state, line)
    }
}

/// Indentation Helper
#[derive(Debug)]
pub(crate) struct Indent {
    unit: String,
    level: usize,
    state: String,
}
impl Indent {
    /// Create a new [Indent], initially at level 0
    pub(crate) fn new(unit: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            level: 0,
            state: String::new(),
        }
    }
}
impl AddAssign<usize> for Indent {
    fn add_assign(&mut self, rhs: usize) {
        self.level += rhs;
        self.state = self.unit.repeat(self.level);
    }
}
impl SubAssign<usize> for Indent {
    fn sub_assign(&mut self, rhs: usize) {
        self.level = self.level.saturating_sub(rhs);
        self.state = self.unit.repeat(self.level);
    }
}
