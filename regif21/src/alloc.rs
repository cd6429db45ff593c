//!
//! # Register Allocator
//!
//! Assigns every non-master signal, each channel's companion control bit,
//! and the backend's master control registers a slot in the register bank.
//! The resulting [RegisterMap] is the single source of offsets
//! for both the hardware and software artifacts.
//!

// Std-Lib
use std::collections::HashMap;

// Crates.io Imports
use log::debug;
use serde::{Deserialize, Serialize};

// Local Imports
use crate::backend::{Backend, BackendKind};
use crate::data::*;
use crate::write::bus;
use crate::utils::{ErrorHelper, SerdeFile};

/// # Slot Role
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum SlotRole {
    /// Signal data
    Data,
    /// Input-channel ready bit, mirrored from the consumer
    Ready,
    /// Output-channel valid bit, mirrored from the producer
    Valid,
    /// Bus-master control register
    Master,
}
impl SlotRole {
    /// Constant-name suffix for channel control slots
    pub fn suffix(&self) -> Option<&'static str> {
        match self {
            Self::Ready => Some("_READY"),
            Self::Valid => Some("_VALID"),
            _ => None,
        }
    }
    /// Control role for a channel of direction `dir`
    pub fn control(dir: Direction) -> Self {
        match dir {
            Direction::Input => Self::Ready,
            Direction::Output => Self::Valid,
        }
    }
}

/// Constant name of the `role` slot for signal `name`, e.g. `GO_READY`
pub fn slot_name(name: &str, role: SlotRole) -> String {
    let mut rv = const_name(name);
    if let Some(suffix) = role.suffix() {
        rv.push_str(suffix);
    }
    rv
}

/// # Register Slot
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RegisterSlot {
    /// Register constant name
    pub name: String,
    /// Offset into the register bank, in registers
    pub offset: usize,
    pub role: SlotRole,
    /// Name of the originating signal
    pub signal: String,
    /// Reset value
    #[serde(default)]
    pub reset: u64,
}

/// # Register Map
///
/// Ordered register slots. Offsets are exactly `0..register_count()`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct RegisterMap {
    /// Register width in bits
    pub reg_width: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slots: Vec<RegisterSlot>,
}
impl RegisterMap {
    /// Total number of registers
    pub fn register_count(&self) -> usize {
        self.slots.len()
    }
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
    pub fn has_master(&self) -> bool {
        self.slots.iter().any(|s| s.role == SlotRole::Master)
    }
    /// Whether a bus write to `addr` lands in the bank.
    /// Writes beyond the bank are dropped by the hardware.
    pub fn accepts_write(&self, addr: usize) -> bool {
        addr < self.register_count()
    }
    /// Get the slot with constant name `name`
    pub fn slot(&self, name: &str) -> Option<&RegisterSlot> {
        self.slots.iter().find(|s| s.name == name)
    }
    /// Get the offset of constant name `name`
    pub fn offset_of(&self, name: &str) -> Option<usize> {
        self.slot(name).map(|s| s.offset)
    }
    /// Get the data slot of signal `signal`
    pub fn data_slot(&self, signal: &str) -> Option<&RegisterSlot> {
        self.slots
            .iter()
            .find(|s| s.role == SlotRole::Data && s.signal == signal)
    }
    /// Get the ready or valid slot of channel `signal`
    pub fn control_slot(&self, signal: &str) -> Option<&RegisterSlot> {
        self.slots.iter().find(|s| {
            matches!(s.role, SlotRole::Ready | SlotRole::Valid) && s.signal == signal
        })
    }
    /// Iterate over the master control slots
    pub fn master_slots(&self) -> impl Iterator<Item = &RegisterSlot> {
        self.slots.iter().filter(|s| s.role == SlotRole::Master)
    }
    pub fn iter(&self) -> impl Iterator<Item = &RegisterSlot> {
        self.slots.iter()
    }
}
impl SerdeFile for RegisterMap {}

/// Allocate registers for `spec` on `backend`.
///
/// A single forward pass in declaration order: one data slot per wire, a data slot
/// plus a control slot per channel, then the backend's master slots, if the spec has a master.
pub fn allocate(spec: &InterfaceSpec, backend: &Backend) -> RegResult<RegisterMap> {
    let mut alloc = Allocator::new(backend);
    for signal in spec.iter() {
        alloc.add(signal)?;
    }
    Ok(alloc.finish())
}

/// # Allocator
///
/// Allocation state, fed one signal at a time in declaration order.
/// Besides register constants, claims every Verilog name the wrapper declares,
/// so that a signal colliding with a port, an internal wire,
/// or another signal's generated wires fails at its own line.
#[derive(Debug)]
pub(crate) struct Allocator<'b> {
    backend: &'b Backend,
    map: RegisterMap,
    /// Constant names allocated so far, and the line declaring each
    taken: HashMap<String, usize>,
    /// Verilog names claimed so far. `None` for the wrapper's fixed names.
    wires: HashMap<String, Option<usize>>,
    /// The master signal, whose slots come last
    master: Option<Signal>,
}
impl<'b> Allocator<'b> {
    pub(crate) fn new(backend: &'b Backend) -> Self {
        let wires = bus::reserved_names(backend.kind)
            .into_iter()
            .map(|n| (n.to_string(), None))
            .collect();
        Self {
            backend,
            map: RegisterMap {
                reg_width: backend.reg_width,
                slots: Vec::new(),
            },
            taken: HashMap::new(),
            wires,
            master: None,
        }
    }
    /// Add `signal`, checking its width and every name it generates
    pub(crate) fn add(&mut self, signal: &Signal) -> RegResult<()> {
        if signal.is_master() {
            return self.add_master(signal);
        }
        self.check_width(signal, self.backend.reg_width)?;
        self.push(signal, slot_name(&signal.name, SlotRole::Data), SlotRole::Data, 0)?;
        if signal.is_channel() {
            let role = SlotRole::control(signal.direction);
            self.push(signal, slot_name(&signal.name, role), role, 0)?;
        }
        let n = &signal.name;
        let wires = match signal.kind {
            SignalKind::Channel => vec![n.clone(), format!("{}_ready", n), format!("{}_valid", n)],
            _ => vec![n.clone(), format!("{}_tz", n)],
        };
        for wire in wires {
            self.claim_wire(signal, wire)?;
        }
        Ok(())
    }
    /// Check and claim the master's names. Its slots are appended by [Allocator::finish].
    fn add_master(&mut self, signal: &Signal) -> RegResult<()> {
        if let Some(ref first) = self.master {
            return LineCheck(signal.line).fail(format!(
                "second master signal `{}`, only `{}` is supported",
                signal.name, first.name
            ));
        }
        self.check_width(signal, self.backend.max_master_width)?;
        let backend = self.backend;
        for ms in backend.master_slots.iter() {
            self.claim_const(signal, &ms.name)?;
        }
        let mut wires: Vec<String> = backend
            .master_slots
            .iter()
            .filter_map(|ms| ms.drives.clone())
            .collect();
        wires.extend(bus::master_names(backend.kind).into_iter().map(String::from));
        if backend.kind == BackendKind::Burst {
            wires.push(format!("{}_triosy_lz", signal.name));
        }
        for wire in wires {
            self.claim_wire(signal, wire)?;
        }
        self.master = Some(signal.clone());
        Ok(())
    }
    /// Complete allocation, appending the master slots
    pub(crate) fn finish(mut self) -> RegisterMap {
        let backend = self.backend;
        if let Some(master) = self.master.take() {
            for ms in backend.master_slots.iter() {
                self.append(&master, ms.name.clone(), SlotRole::Master, ms.reset);
            }
        }
        self.map
    }
    fn check_width(&self, signal: &Signal, max: u32) -> RegResult<()> {
        if signal.width > max {
            return Err(RegError::UnsupportedWidth {
                line: signal.line,
                signal: signal.name.clone(),
                width: signal.width,
                max,
            });
        }
        Ok(())
    }
    /// Claim register constant `name` for `signal`
    fn claim_const(&mut self, signal: &Signal, name: &str) -> RegResult<()> {
        if let Some(line) = self.taken.get(name) {
            return LineCheck(signal.line).fail(format!(
                "register `{}` for signal `{}` collides with one generated for line {}",
                name, signal.name, line
            ));
        }
        self.taken.insert(name.to_string(), signal.line);
        Ok(())
    }
    /// Claim Verilog name `wire` for `signal`
    fn claim_wire(&mut self, signal: &Signal, wire: String) -> RegResult<()> {
        let ctx = LineCheck(signal.line);
        match self.wires.get(&wire) {
            Some(None) => ctx.fail(format!(
                "`{}` of signal `{}` is reserved by the wrapper",
                wire, signal.name
            )),
            Some(Some(line)) => ctx.fail(format!(
                "wire `{}` of signal `{}` collides with one generated for line {}",
                wire, signal.name, line
            )),
            None => {
                self.wires.insert(wire, Some(signal.line));
                Ok(())
            }
        }
    }
    /// Claim `name` and append its slot at the next offset
    fn push(&mut self, signal: &Signal, name: String, role: SlotRole, reset: u64) -> RegResult<()> {
        self.claim_const(signal, &name)?;
        self.append(signal, name, role, reset);
        Ok(())
    }
    fn append(&mut self, signal: &Signal, name: String, role: SlotRole, reset: u64) {
        let offset = self.map.slots.len();
        debug!("`define {} {} ({:?})", name, offset, role);
        self.map.slots.push(RegisterSlot {
            name,
            offset,
            role,
            signal: signal.name.clone(),
            reset,
        });
    }
}
