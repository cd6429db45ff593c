//!
//! # Backend Descriptors
//!
//! The narrow-bus and burst-bus backends share one allocator, one handshake synthesizer,
//! and one pair of writers. Everything that differs between them is captured here,
//! as plain (serializable) data.
//!

// Crates.io Imports
use serde::{Deserialize, Serialize};

// Local Imports
use crate::utils::{enumstr, SerdeFile};

enumstr!(
    /// # Backend Kinds
    BackendKind {
        Narrow: "narrow",
        Burst: "burst",
    }
);

/// # Master Control Slot
///
/// Register reserved for bus-master configuration, appended after all signal registers.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct MasterSlot {
    /// Register constant name, e.g. `ADDR_OFFSET`
    pub name: String,
    /// Reset value
    pub reset: u64,
    /// Internal wire driven from this register, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drives: Option<String>,
    /// Width of the driven wire
    pub width: u32,
}
impl MasterSlot {
    fn new(name: &str, reset: u64, drives: Option<&str>, width: u32) -> Self {
        Self {
            name: name.into(),
            reset,
            drives: drives.map(String::from),
            width,
        }
    }
}

/// # Backend Descriptor
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Backend {
    /// Backend kind, selecting the bus-protocol boilerplate
    pub kind: BackendKind,
    /// Register-bank width in bits
    pub reg_width: u32,
    /// Control registers consumed by a master signal, in allocation order
    pub master_slots: Vec<MasterSlot>,
    /// Accelerator base address used when none is provided
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_base_address: Option<u64>,
    /// Header file extension, replacing that of the spec file
    pub header_suffix: String,
    /// Widest master address the bus wiring supports
    pub max_master_width: u32,
    /// C type of one register in the software header
    pub c_access_type: String,
}
impl Backend {
    /// Narrow, single-beat bus.
    /// 32-bit registers, one `ADDR_OFFSET` master register, and a fixed base address.
    pub fn narrow() -> Self {
        Self {
            kind: BackendKind::Narrow,
            reg_width: 32,
            master_slots: vec![MasterSlot::new(
                "ADDR_OFFSET",
                0x4000_0000,
                Some("addr_offset"),
                32,
            )],
            default_base_address: Some(0xA000_0000),
            header_suffix: "h".into(),
            max_master_width: 30,
            c_access_type: "unsigned int".into(),
        }
    }
    /// Burst-capable, ID-tagged bus.
    /// 64-bit registers, three master registers, and a caller-provided base address.
    pub fn burst() -> Self {
        Self {
            kind: BackendKind::Burst,
            reg_width: 64,
            master_slots: vec![
                MasterSlot::new("ADDR_OFFSET_LOW", 0x6100_0000, Some("addr_offset"), 32),
                MasterSlot::new("ADDR_OFFSET_HIGH", 0, None, 32),
                MasterSlot::new("BURST_SIZE", 0xF, Some("burst_size"), 32),
            ],
            default_base_address: None,
            header_suffix: "sw.h".into(),
            max_master_width: 64,
            c_access_type: "unsigned long long".into(),
        }
    }
    /// Create the built-in [Backend] of kind `kind`
    pub fn from_kind(kind: BackendKind) -> Self {
        match kind {
            BackendKind::Narrow => Self::narrow(),
            BackendKind::Burst => Self::burst(),
        }
    }
    /// Number of registers consumed by a master signal
    pub fn master_cost(&self) -> usize {
        self.master_slots.len()
    }
    /// Verilog literal of `value` at register width, e.g. `32'h40000000`
    pub fn reg_literal(&self, value: u64) -> String {
        let digits = (self.reg_width as usize + 3) / 4;
        format!("{}'h{:0digits$X}", self.reg_width, value, digits = digits)
    }
}
impl Default for Backend {
    fn default() -> Self {
        Self::narrow()
    }
}
impl From<BackendKind> for Backend {
    fn from(kind: BackendKind) -> Self {
        Self::from_kind(kind)
    }
}

impl SerdeFile for Backend {}
