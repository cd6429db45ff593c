//!
//! # Regif21 Data Model
//!
//! Signals, the ordered [InterfaceSpec] which holds them,
//! and the library-wide [RegError] type.
//!

// Std-Lib
use std::path::Path;

// Crates.io Imports
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

// Local Imports
use crate::utils::{enumstr, ErrorHelper, SerdeFile};

/// Widest signal the spec language accepts.
/// Backends narrow this further to their register width.
pub const MAX_SIGNAL_WIDTH: u32 = 1024;

enumstr!(
    /// # Signal Signedness
    /// Parsed and retained, but not used in register allocation.
    Signedness {
        Signed: "signed",
        Unsigned: "unsigned",
    }
);
enumstr!(
    /// # Signal Direction
    /// Relative to the generated hardware module.
    Direction {
        Input: "input",
        Output: "output",
    }
);
enumstr!(
    /// # Signal Kind
    SignalKind {
        Wire: "wire",
        Channel: "channel",
        Master: "master",
    }
);
enumstr!(
    /// # Spec-Line Fields
    /// Identifies the offending field in syntax errors.
    SpecField {
        Name: "name",
        Width: "width",
        Signed: "signed",
        Direction: "direction",
        Kind: "kind",
        FieldCount: "field count",
    }
);

/// # Signal
///
/// One declared interface point of the accelerator.
///
#[derive(Clone, Builder, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[builder(pattern = "owned", setter(into))]
pub struct Signal {
    /// Signal Name. Case is preserved in wire names, and upper-cased in generated constants.
    pub name: String,
    /// Width in bits
    pub width: u32,
    /// Signedness
    #[builder(default = "Signedness::Unsigned")]
    pub signedness: Signedness,
    /// Direction, relative to the generated module
    pub direction: Direction,
    /// Kind
    pub kind: SignalKind,
    /// Source line, 1-based. Zero for signals created in code.
    #[serde(default)]
    #[builder(default)]
    pub line: usize,
}
impl Signal {
    pub fn is_master(&self) -> bool {
        self.kind == SignalKind::Master
    }
    pub fn is_channel(&self) -> bool {
        self.kind == SignalKind::Channel
    }
    pub fn is_wire(&self) -> bool {
        self.kind == SignalKind::Wire
    }
    pub fn is_input(&self) -> bool {
        self.direction == Direction::Input
    }
    pub fn is_signed(&self) -> bool {
        self.signedness == Signedness::Signed
    }
    /// Name of the generated register constant, e.g. `IMAGE_WIDTH`
    pub fn const_name(&self) -> String {
        const_name(&self.name)
    }
}

/// Upper-cased constant name for signal-name `name`.
/// Always returns a fresh [String]; callers append suffixes to their own copy.
pub fn const_name(name: &str) -> String {
    name.to_ascii_uppercase()
}

/// # Interface Specification
///
/// The parsed, ordered collection of [Signal]s.
/// Order is significant: it sets register offsets and emission order.
/// An empty spec is valid, and compiles to a module with no registers.
///
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct InterfaceSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signals: Vec<Signal>,
}
impl InterfaceSpec {
    /// Create a new and initially empty [InterfaceSpec]
    pub fn new() -> Self {
        Self::default()
    }
    /// Parse an [InterfaceSpec] from spec-file `fname`
    pub fn open(fname: impl AsRef<Path>) -> RegResult<Self> {
        super::read::parse_file(fname)
    }
    /// Parse an [InterfaceSpec] from spec-format string `src`
    pub fn parse(src: &str) -> RegResult<Self> {
        super::read::parse_str(src)
    }
    /// Iterate over signals in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Signal> {
        self.signals.iter()
    }
    /// Iterate over all non-master signals, in declaration order
    pub fn registered(&self) -> impl Iterator<Item = &Signal> {
        self.signals.iter().filter(|s| !s.is_master())
    }
    /// The bus-master signal, if there is one
    pub fn master(&self) -> Option<&Signal> {
        self.signals.iter().find(|s| s.is_master())
    }
    pub fn has_master(&self) -> bool {
        self.master().is_some()
    }
    pub fn len(&self) -> usize {
        self.signals.len()
    }
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}
impl From<Vec<Signal>> for InterfaceSpec {
    fn from(signals: Vec<Signal>) -> Self {
        Self { signals }
    }
}

/// # Regif21 Error Enumeration
#[derive(Debug)]
pub enum RegError {
    /// File open, read, or write failures
    Io(std::io::Error),
    /// Malformed spec-line field
    Syntax {
        line: usize,
        field: SpecField,
        text: String,
        help: String,
    },
    /// Signal wider than the backend can hold in one register
    UnsupportedWidth {
        line: usize,
        signal: String,
        width: u32,
        max: u32,
    },
    /// Well-formed but inconsistent input, e.g. duplicate names
    Validation { line: usize, msg: String },
    /// Wrapped errors, generally from other crates
    Boxed(Box<dyn std::error::Error + Send + Sync>),
    /// String message-valued errors
    Str(String),
}
impl RegError {
    /// Source line of the error, if it has one
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Syntax { line, .. }
            | Self::UnsupportedWidth { line, .. }
            | Self::Validation { line, .. } => Some(*line),
            _ => None,
        }
    }
}
impl From<crate::utils::ser::Error> for RegError {
    fn from(e: crate::utils::ser::Error) -> Self {
        Self::Boxed(Box::new(e))
    }
}
impl From<std::io::Error> for RegError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
impl From<String> for RegError {
    fn from(e: String) -> Self {
        Self::Str(e)
    }
}
impl From<&str> for RegError {
    fn from(e: &str) -> Self {
        Self::Str(e.into())
    }
}
impl std::fmt::Display for RegError {
    /// Renders a single diagnostic line
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::Syntax {
                line,
                field,
                text,
                help,
            } => write!(f, "line {}: invalid {} `{}`: {}", line, field, text, help),
            Self::UnsupportedWidth {
                line,
                signal,
                width,
                max,
            } => write!(
                f,
                "line {}: signal `{}` is {} bits wide, the widest supported is {}",
                line, signal, width, max
            ),
            Self::Validation { line, msg } => write!(f, "line {}: {}", line, msg),
            Self::Boxed(e) => write!(f, "{}", e),
            Self::Str(s) => write!(f, "{}", s),
        }
    }
}
impl std::error::Error for RegError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Boxed(e) => Some(&**e),
            _ => None,
        }
    }
}

/// Error-helper for whole-line checks, producing [RegError::Validation] at its line
pub(crate) struct LineCheck(pub usize);
impl ErrorHelper for LineCheck {
    type Error = RegError;
    fn err(&self, msg: impl Into<String>) -> RegError {
        RegError::Validation {
            line: self.0,
            msg: msg.into(),
        }
    }
}

/// Regif21 Library-Wide Result Type
pub type RegResult<T> = Result<T, RegError>;

impl SerdeFile for InterfaceSpec {}
impl SerdeFile for Signal {}
