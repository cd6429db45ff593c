//!
//! # Spec Reader Module
//!
//! Line-oriented parsing of interface-spec files:
//!
//! ```text
//! <name>, <width 1-1024>, signed|unsigned, input|output, wire|channel|master
//! ```
//!
//! Lines starting with `#` or `//` are comments. Blank lines are skipped.
//! Parsing stops at the first offending line.
//!

// Standard Lib Imports
use std::collections::HashMap;
use std::path::Path;

// Crates.io Imports
use log::debug;

// Local imports
use super::data::*;
use crate::alloc::Allocator;
use crate::backend::Backend;
use crate::utils::{EnumStr, ErrorHelper, Unwrapper};

/// Parse an [InterfaceSpec] from file `fname`
pub fn parse_file(fname: impl AsRef<Path>) -> RegResult<InterfaceSpec> {
    let src = std::fs::read_to_string(fname)?;
    parse_str(&src)
}
/// Parse an [InterfaceSpec] from string `src`
pub fn parse_str(src: &str) -> RegResult<InterfaceSpec> {
    parse_lines(SpecParser::default(), src)
}
/// Parse an [InterfaceSpec] from file `fname`, checking each signal against `backend` as it is read
pub fn parse_file_for(fname: impl AsRef<Path>, backend: &Backend) -> RegResult<InterfaceSpec> {
    let src = std::fs::read_to_string(fname)?;
    parse_str_for(&src, backend)
}
/// Parse an [InterfaceSpec] from string `src`, checking each signal against `backend` as it is read.
/// Widths and generated names which `backend` cannot carry fail at their own line.
pub fn parse_str_for(src: &str, backend: &Backend) -> RegResult<InterfaceSpec> {
    parse_lines(SpecParser::for_backend(backend), src)
}
fn parse_lines(mut parser: SpecParser, src: &str) -> RegResult<InterfaceSpec> {
    for (idx, raw) in src.lines().enumerate() {
        parser.parse_line(idx + 1, raw)?;
    }
    Ok(parser.finish())
}

/// Collapse each whitespace run into a single space, and trim both ends.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
/// Boolean indication of whether (normalized) `line` is a comment
pub fn is_comment(line: &str) -> bool {
    line.starts_with('#') || line.starts_with("//")
}
/// Boolean indication of whether `s` is a valid signal name:
/// a letter or `_`, followed by letters, digits, `_` or `$`.
pub fn is_valid_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => (),
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// # Spec Parser
///
/// Accumulates [Signal]s line by line, along with the bookkeeping
/// needed to reject duplicate names and extra masters.
/// Parsers created with [SpecParser::for_backend] also run each signal through register allocation.
#[derive(Debug, Default)]
pub struct SpecParser<'b> {
    /// Signals parsed so far, in file order
    signals: Vec<Signal>,
    /// Upper-cased names seen so far, and the line declaring each
    names: HashMap<String, usize>,
    /// Line of the first master signal, if any
    master_line: Option<usize>,
    /// Backend allocation, run as each signal is parsed
    alloc: Option<Allocator<'b>>,
}
impl<'b> SpecParser<'b> {
    /// Create a parser which checks each signal against `backend`
    pub fn for_backend(backend: &'b Backend) -> Self {
        Self {
            alloc: Some(Allocator::new(backend)),
            ..Default::default()
        }
    }
    /// Parse raw line `raw`, number `line`.
    /// Comments and blank lines are accepted and ignored.
    pub fn parse_line(&mut self, line: usize, raw: &str) -> RegResult<Option<&Signal>> {
        let text = normalize_whitespace(raw);
        if text.is_empty() || is_comment(&text) {
            return Ok(None);
        }
        let signal = parse_signal(line, &text)?;
        self.check_unique(&signal)?;
        if let Some(alloc) = self.alloc.as_mut() {
            alloc.add(&signal)?;
        }
        debug!(
            "line {}: {} {} {} {} `{}`",
            line, signal.direction, signal.kind, signal.width, signal.signedness, signal.name
        );
        self.signals.push(signal);
        Ok(self.signals.last())
    }
    /// Reject duplicate names (case-insensitive) and any master beyond the first
    fn check_unique(&mut self, signal: &Signal) -> RegResult<()> {
        let ctx = LineCheck(signal.line);
        if let Some(first) = self.names.get(&signal.const_name()) {
            return ctx.fail(format!(
                "duplicate signal name `{}`, first declared at line {}",
                signal.name, first
            ));
        }
        if signal.is_master() {
            if let Some(first) = self.master_line {
                return ctx.fail(format!(
                    "second master signal `{}`, the first is declared at line {}",
                    signal.name, first
                ));
            }
            self.master_line = Some(signal.line);
        }
        self.names.insert(signal.const_name(), signal.line);
        Ok(())
    }
    /// Complete parsing, returning the [InterfaceSpec]
    pub fn finish(self) -> InterfaceSpec {
        InterfaceSpec::from(self.signals)
    }
}

/// Parse a single normalized, non-comment spec line into a [Signal]
fn parse_signal(line: usize, text: &str) -> RegResult<Signal> {
    let fields: Vec<String> = text.split(',').map(normalize_whitespace).collect();
    if fields.len() != 5 {
        return FieldCheck::new(line, SpecField::FieldCount, text).fail(format!(
            "expected 5 comma-separated fields, found {}",
            fields.len()
        ));
    }
    let name = parse_name(line, &fields[0])?;
    let width = parse_width(line, &fields[1])?;
    let signedness: Signedness = parse_keyword(line, SpecField::Signed, &fields[2])?;
    let direction: Direction = parse_keyword(line, SpecField::Direction, &fields[3])?;
    let kind: SignalKind = parse_keyword(line, SpecField::Kind, &fields[4])?;

    SignalBuilder::default()
        .name(name)
        .width(width)
        .signedness(signedness)
        .direction(direction)
        .kind(kind)
        .line(line)
        .build()
        .map_err(|e| RegError::Str(e.to_string()))
}
fn parse_name(line: usize, txt: &str) -> RegResult<String> {
    let ctx = FieldCheck::new(line, SpecField::Name, txt);
    ctx.assert(!txt.is_empty(), "signal name is empty")?;
    ctx.assert(
        is_valid_name(txt),
        "names start with a letter or `_`, and contain only letters, digits, `_` and `$`",
    )?;
    Ok(txt.to_string())
}
fn parse_width(line: usize, txt: &str) -> RegResult<u32> {
    let ctx = FieldCheck::new(line, SpecField::Width, txt);
    ctx.assert(!txt.is_empty(), "width is empty")?;
    ctx.assert(
        txt.chars().all(|c| c.is_ascii_digit()),
        "width must be a decimal integer",
    )?;
    let range = format!("width must be in [1, {}]", MAX_SIGNAL_WIDTH);
    let width = txt.parse::<u32>().unwrapper(&ctx, range.as_str())?;
    ctx.assert((1..=MAX_SIGNAL_WIDTH).contains(&width), range)?;
    Ok(width)
}
/// Parse a case-insensitive keyword field into enum `E`
fn parse_keyword<E: EnumStr>(line: usize, field: SpecField, txt: &str) -> RegResult<E> {
    let ctx = FieldCheck::new(line, field, txt);
    E::from_str_nocase(txt).unwrapper(&ctx, format!("expected one of {}", E::keywords()))
}

/// Error-helper for a single field of a spec line. Produces [RegError::Syntax].
struct FieldCheck<'t> {
    line: usize,
    field: SpecField,
    text: &'t str,
}
impl<'t> FieldCheck<'t> {
    fn new(line: usize, field: SpecField, text: &'t str) -> Self {
        Self { line, field, text }
    }
}
impl ErrorHelper for FieldCheck<'_> {
    type Error = RegError;
    fn err(&self, msg: impl Into<String>) -> RegError {
        RegError::Syntax {
            line: self.line,
            field: self.field,
            text: self.text.to_string(),
            help: msg.into(),
        }
    }
}
