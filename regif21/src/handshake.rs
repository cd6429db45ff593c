//!
//! # Handshake Synthesizer
//!
//! Each channel gets one registered handshake bit, owned by the wrapper:
//!
//! * Input channels own `valid`. A bus write to the channel's data register sets it,
//!   and the consumer's `ready` clears it.
//! * Output channels own `ready`. A bus read of the channel's data register sets it,
//!   and the producer's `valid` clears it.
//!
//! The output rule is the input rule with `valid`/`ready` and write/read swapped,
//! and is produced by [Handshake::mirror] rather than written out separately.
//! When set and clear coincide, clear wins.
//!
//! The channel's `_READY` or `_VALID` register is a software-visible mirror of the peer's bit,
//! overwritten by the hardware every cycle, and never triggers the handshake.
//!

// Crates.io Imports
use serde::{Deserialize, Serialize};

// Local Imports
use crate::alloc::RegisterMap;
use crate::data::*;
use crate::utils::Unwrapper;

/// # Bus Access Kind
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum BusAccess {
    Read,
    Write,
}
impl BusAccess {
    pub fn mirror(&self) -> Self {
        match self {
            Self::Read => Self::Write,
            Self::Write => Self::Read,
        }
    }
    /// Name of the wrapper's enable wire for this access
    pub fn enable(&self) -> &'static str {
        match self {
            Self::Read => "read_enable",
            Self::Write => "write_enable",
        }
    }
    /// Name of the wrapper's address wire for this access
    pub fn address(&self) -> &'static str {
        match self {
            Self::Read => "read_address",
            Self::Write => "write_address",
        }
    }
}

/// # Handshake Bits
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum HandshakeBit {
    Valid,
    Ready,
}
impl HandshakeBit {
    pub fn mirror(&self) -> Self {
        match self {
            Self::Valid => Self::Ready,
            Self::Ready => Self::Valid,
        }
    }
    /// Wire-name suffix
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Ready => "ready",
        }
    }
}

/// # Handshake Rule
///
/// Transition rules for one channel's registered handshake bit:
/// reset to zero, set on a `trigger` access at `offset`, cleared while it and `peer` are both high.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Handshake {
    /// Channel signal name
    pub signal: String,
    /// Registered bit, owned by the wrapper
    pub state: HandshakeBit,
    /// Externally driven bit
    pub peer: HandshakeBit,
    /// Bus access which sets `state`
    pub trigger: BusAccess,
    /// Register constant matched by `trigger`
    pub register: String,
    /// Register offset matched by `trigger`
    pub offset: usize,
}
impl Handshake {
    /// Rule for an input channel, triggered by writes to `register` at `offset`
    pub fn input(signal: impl Into<String>, register: impl Into<String>, offset: usize) -> Self {
        Self {
            signal: signal.into(),
            state: HandshakeBit::Valid,
            peer: HandshakeBit::Ready,
            trigger: BusAccess::Write,
            register: register.into(),
            offset,
        }
    }
    /// Swap the roles of `valid` and `ready`, and of reads and writes
    pub fn mirror(&self) -> Self {
        Self {
            signal: self.signal.clone(),
            state: self.state.mirror(),
            peer: self.peer.mirror(),
            trigger: self.trigger.mirror(),
            register: self.register.clone(),
            offset: self.offset,
        }
    }
    /// Wire name of the registered bit, e.g. `go_valid`
    pub fn state_wire(&self) -> String {
        format!("{}_{}", self.signal, self.state.suffix())
    }
    /// Wire name of the external bit, e.g. `go_ready`
    pub fn peer_wire(&self) -> String {
        format!("{}_{}", self.signal, self.peer.suffix())
    }
    /// Next value of the registered bit
    pub fn next(&self, state: bool, bus: &BusCycle, peer: bool) -> bool {
        if state && peer {
            false
        } else if bus.hits(self.trigger, self.offset) {
            true
        } else {
            state
        }
    }
}

/// Derive the [Handshake] rule of every channel in `spec`, in declaration order
pub fn synthesize(spec: &InterfaceSpec, map: &RegisterMap) -> RegResult<Vec<Handshake>> {
    let mut rules = Vec::new();
    for signal in spec.iter().filter(|s| s.is_channel()) {
        let slot = map.data_slot(&signal.name).unwrapper(
            &LineCheck(signal.line),
            format!("channel `{}` has no data register", signal.name),
        )?;
        let rule = Handshake::input(&signal.name, &slot.name, slot.offset);
        rules.push(match signal.direction {
            Direction::Input => rule,
            Direction::Output => rule.mirror(),
        });
    }
    Ok(rules)
}

/// # Bus Cycle
///
/// Bus activity during one clock cycle. Reads and writes use separate ports,
/// and may occur in the same cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusCycle {
    /// Read address, if reading
    pub read: Option<usize>,
    /// Write address, if writing
    pub write: Option<usize>,
}
impl BusCycle {
    pub fn idle() -> Self {
        Self::default()
    }
    pub fn read(addr: usize) -> Self {
        Self {
            read: Some(addr),
            write: None,
        }
    }
    pub fn write(addr: usize) -> Self {
        Self {
            read: None,
            write: Some(addr),
        }
    }
    /// Whether this cycle includes an `access` of address `addr`
    pub fn hits(&self, access: BusAccess, addr: usize) -> bool {
        let port = match access {
            BusAccess::Read => self.read,
            BusAccess::Write => self.write,
        };
        port == Some(addr)
    }
}

/// # Handshake State
///
/// Cycle-by-cycle model of one [Handshake] rule, as the generated hardware evaluates it.
#[derive(Debug, Clone)]
pub struct HandshakeState<'h> {
    rule: &'h Handshake,
    bit: bool,
}
impl<'h> HandshakeState<'h> {
    /// Create a new state for `rule`, in reset
    pub fn new(rule: &'h Handshake) -> Self {
        Self { rule, bit: false }
    }
    pub fn reset(&mut self) {
        self.bit = false;
    }
    /// Current value of the registered bit
    pub fn get(&self) -> bool {
        self.bit
    }
    /// Advance one clock, with bus activity `bus` and external bit `peer`
    pub fn step(&mut self, bus: &BusCycle, peer: bool) -> bool {
        self.bit = self.rule.next(self.bit, bus, peer);
        self.bit
    }
}
