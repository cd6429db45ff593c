//!
//! # Verilog Writer Module
//!
//! Writes the register-mapped wrapper around an HLS core:
//! bus ports, the register bank and its read and write paths,
//! one handshake block per channel, and the core instance.
//!

// Standard Lib Imports
use std::io::Write;

// Crates.io Imports
use log::debug;

// Local imports
use super::bus;
use super::{render, write_indented, Design, Indent};
use crate::alloc::SlotRole;
use crate::backend::BackendKind;
use crate::data::*;
use crate::handshake::Handshake;

/// Write the wrapper module for `design` to a [String]
pub fn to_string(design: &Design) -> RegResult<String> {
    render(|buf| VerilogWriter::new(buf, design).write_module())
}

/// Range declaration for a `width`-bit wire, padded for alignment
fn wire_range(width: u32) -> String {
    if width > 1 {
        format!("[{:>3}:0]", width - 1)
    } else {
        " ".repeat(7)
    }
}
/// Slice selecting the low `width` bits of a `reg_width`-bit register
fn reg_slice(width: u32, reg_width: u32) -> String {
    if width == 1 {
        "[0]".into()
    } else if width < reg_width {
        format!("[{}:0]", width - 1)
    } else {
        String::new()
    }
}

/// # Verilog Writing Helper
pub struct VerilogWriter<'wr, 'd> {
    /// Write Destination
    dest: Box<dyn Write + 'wr>,
    /// Indentation Helper
    indent: Indent,
    /// Design being written
    design: &'d Design<'d>,
}
impl<'wr, 'd> VerilogWriter<'wr, 'd> {
    /// Create a new [VerilogWriter] to destination `dest`.
    pub fn new(dest: impl Write + 'wr, design: &'d Design<'d>) -> Self {
        Self {
            dest: Box::new(dest),
            indent: Indent::new("  "),
            design,
        }
    }
    fn kind(&self) -> BackendKind {
        self.design.backend.kind
    }
    fn has_master(&self) -> bool {
        self.design.map.has_master()
    }
    fn literal(&self, value: u64) -> String {
        self.design.backend.reg_literal(value)
    }
    /// Write the complete module, preceded by any backend preamble
    pub fn write_module(&mut self) -> RegResult<()> {
        debug!(
            "writing module `{}` ({} registers, {} backend)",
            self.design.module_name,
            self.design.map.register_count(),
            self.kind()
        );
        self.write_preamble()?;
        self.write_ports()?;
        self.indent += 1;
        self.write_bank()?;
        self.write_signals()?;
        self.write_master()?;
        self.write_register_map()?;
        self.write_assigns()?;
        self.write_read_path()?;
        self.write_write_path()?;
        let design = self.design;
        for rule in design.handshakes.iter() {
            self.write_handshake(rule)?;
        }
        self.write_core_instance()?;
        self.write_arbiter_instance()?;
        self.indent -= 1;
        self.write_line(format_args!("endmodule"))?;
        self.dest.flush()?;
        Ok(())
    }
    /// Backend text preceding the module: the burst field-width defines,
    /// or the bus arbiter when the narrow backend drives a master.
    fn write_preamble(&mut self) -> RegResult<()> {
        match self.kind() {
            BackendKind::Burst => {
                for (name, value) in bus::AXI_DEFINES.iter() {
                    self.write_line(format_args!("`define {:<14} {}", name, value))?;
                }
                self.write_line(format_args!(""))?;
            }
            BackendKind::Narrow if self.has_master() => {
                for line in bus::BUS_ARBITER.iter() {
                    self.write_line(format_args!("{}", line))?;
                }
                self.write_line(format_args!(""))?;
            }
            BackendKind::Narrow => (),
        }
        Ok(())
    }
    fn write_ports(&mut self) -> RegResult<()> {
        let mut ports = bus::slave_ports(self.kind());
        if self.has_master() {
            match self.kind() {
                BackendKind::Narrow => ports.extend_from_slice(bus::AHB_PORTS),
                BackendKind::Burst => ports.extend_from_slice(bus::AXI_PORTS),
            }
        }
        self.write_line(format_args!("module {} (", self.design.module_name))?;
        self.indent += 1;
        let last = ports.len() - 1;
        for (idx, (dir, range, name)) in ports.iter().enumerate() {
            let sep = if idx == last { "" } else { "," };
            self.write_line(format_args!("{:<6} {:<20} {}{}", dir, range, name, sep))?;
        }
        self.indent -= 1;
        self.write_line(format_args!(");"))?;
        self.write_line(format_args!(""))?;
        Ok(())
    }
    /// Register bank and bus-side internal wires
    fn write_bank(&mut self) -> RegResult<()> {
        let width = self.design.backend.reg_width;
        let count = self.design.map.register_count();
        let addr = bus::address_range(self.kind());
        if count > 0 {
            self.write_line(format_args!(
                "reg  [{}:0] register_bank[{}:0];",
                width - 1,
                count - 1
            ))?;
        }
        self.write_line(format_args!("reg  [{}:0] rd_reg;", width - 1))?;
        self.write_line(format_args!(""))?;
        self.write_line(format_args!("wire {} read_address;", addr))?;
        self.write_line(format_args!("wire {} write_address;", addr))?;
        self.write_line(format_args!("wire read_enable = oe;"))?;
        self.write_line(format_args!("wire write_enable = we;"))?;
        self.write_line(format_args!(""))?;
        self.write_line(format_args!("assign read_data = rd_reg;"))?;
        self.write_line(format_args!("assign read_address = read_addr;"))?;
        self.write_line(format_args!("assign write_address = write_addr;"))?;
        Ok(())
    }
    /// Declarations for each non-master signal, plus its tie-off or handshake wires
    fn write_signals(&mut self) -> RegResult<()> {
        let design = self.design;
        if design.spec.registered().next().is_none() {
            return Ok(());
        }
        self.write_line(format_args!(""))?;
        self.write_line(format_args!("// interface signals"))?;
        for signal in design.spec.registered() {
            let range = wire_range(signal.width);
            self.write_line(format_args!("wire {} {};", range, signal.name))?;
            match signal.kind {
                SignalKind::Wire => {
                    self.write_line(format_args!("wire {:7} {}_tz;", "", signal.name))?
                }
                SignalKind::Channel => {
                    if let Some(rule) = design.handshake(&signal.name) {
                        // The wrapper registers one bit, the core drives the other
                        self.write_line(format_args!("reg  {:7} {};", "", rule.state_wire()))?;
                        self.write_line(format_args!("wire {:7} {};", "", rule.peer_wire()))?;
                    }
                }
                SignalKind::Master => (),
            }
        }
        Ok(())
    }
    /// Master configuration wires, and the backend's bus-master wiring
    fn write_master(&mut self) -> RegResult<()> {
        let design = self.design;
        let master = match design.spec.master() {
            Some(m) => m,
            None => return Ok(()),
        };
        self.write_line(format_args!(""))?;
        self.write_line(format_args!("// bus master signals"))?;
        for slot in design.backend.master_slots.iter() {
            if let Some(ref wire) = slot.drives {
                self.write_line(format_args!("wire {} {};", wire_range(slot.width), wire))?;
            }
        }
        match self.kind() {
            BackendKind::Narrow => {
                for line in bus::AHB_MASTER_DECLS.iter() {
                    self.write_line(format_args!("{}", line))?;
                }
                if master.width < 30 {
                    let pad = 30 - master.width;
                    for port in ["input_master_raddr", "output_master_waddr"] {
                        self.write_line(format_args!(
                            "assign {}[29:{}] = {{{}{{1'b0}}}};",
                            port, master.width, pad
                        ))?;
                    }
                }
                self.write_line(format_args!(""))?;
                for line in bus::AHB_MASTER_WIRING.iter() {
                    self.write_line(format_args!("{}", line))?;
                }
            }
            BackendKind::Burst => {
                self.write_line(format_args!("wire [  2:0] m_wstate;"))?;
                self.write_line(format_args!("wire {:7} caught_up;", ""))?;
                self.write_line(format_args!("wire {:7} {}_triosy_lz;", "", master.name))?;
            }
        }
        Ok(())
    }
    /// One `define per register slot
    fn write_register_map(&mut self) -> RegResult<()> {
        let map = self.design.map;
        if map.is_empty() {
            return Ok(());
        }
        self.write_line(format_args!(""))?;
        self.write_line(format_args!("// register map"))?;
        for slot in map.iter() {
            self.write_line(format_args!("`define {:<20} {:>3}", slot.name, slot.offset))?;
        }
        Ok(())
    }
    /// Drive input signals and master configuration wires from their registers
    fn write_assigns(&mut self) -> RegResult<()> {
        let design = self.design;
        let reg_width = design.backend.reg_width;
        let mut lines = Vec::new();
        for signal in design.spec.registered().filter(|s| s.is_input()) {
            let slot = design.map.data_slot(&signal.name).ok_or_else(|| {
                RegError::Str(format!("signal `{}` has no data register", signal.name))
            })?;
            let slice = reg_slice(signal.width, reg_width);
            lines.push((signal.name.as_str(), slot.name.as_str(), slice));
        }
        for (slot, desc) in design.map.master_slots().zip(design.backend.master_slots.iter()) {
            if let Some(ref wire) = desc.drives {
                let slice = reg_slice(desc.width, reg_width);
                lines.push((wire.as_str(), slot.name.as_str(), slice));
            }
        }
        if lines.is_empty() {
            return Ok(());
        }
        self.write_line(format_args!(""))?;
        self.write_line(format_args!("// assignments for inputs"))?;
        for (lhs, reg, slice) in lines.iter() {
            self.write_line(format_args!(
                "assign {:<20} = register_bank[`{}]{};",
                lhs, reg, slice
            ))?;
        }
        Ok(())
    }
    /// Registered read path
    fn write_read_path(&mut self) -> RegResult<()> {
        let zero = self.literal(0);
        self.write_line(format_args!(""))?;
        self.write_line(format_args!(
            "always @(posedge clock or negedge resetn) begin"
        ))?;
        self.indent += 1;
        self.write_line(format_args!("if (resetn == 1'b0) begin"))?;
        self.write_line(format_args!("  rd_reg <= {};", zero))?;
        self.write_line(format_args!("end else if (read_enable) begin"))?;
        if self.design.map.is_empty() {
            self.write_line(format_args!("  rd_reg <= {};", zero))?;
        } else {
            self.write_line(format_args!("  rd_reg <= register_bank[read_address];"))?;
        }
        self.write_line(format_args!("end"))?;
        self.indent -= 1;
        self.write_line(format_args!("end"))?;
        Ok(())
    }
    /// Write path: reset values, bus writes within the bank,
    /// then the registers mirrored from the core every cycle.
    fn write_write_path(&mut self) -> RegResult<()> {
        let map = self.design.map;
        if map.is_empty() {
            return Ok(());
        }
        self.write_line(format_args!(""))?;
        self.write_line(format_args!(
            "always @(posedge clock or negedge resetn) begin"
        ))?;
        self.indent += 1;
        self.write_line(format_args!("if (resetn == 1'b0) begin"))?;
        self.indent += 1;
        for slot in map.iter() {
            let reset = self.literal(slot.reset);
            self.write_line(format_args!("register_bank[`{}] <= {};", slot.name, reset))?;
        }
        self.indent -= 1;
        self.write_line(format_args!("end else begin"))?;
        self.indent += 1;
        self.write_line(format_args!(
            "if (write_enable && write_address < {}) begin",
            map.register_count()
        ))?;
        self.write_line(format_args!("  register_bank[write_address] <= write_data;"))?;
        self.write_line(format_args!("end"))?;
        let spec = self.design.spec;
        for slot in map.iter() {
            let source = match slot.role {
                SlotRole::Data => match spec.iter().find(|s| s.name == slot.signal) {
                    Some(s) if !s.is_input() => s.name.clone(),
                    _ => continue,
                },
                SlotRole::Ready => format!("{}_ready", slot.signal),
                SlotRole::Valid => format!("{}_valid", slot.signal),
                SlotRole::Master => continue,
            };
            self.write_line(format_args!("register_bank[`{}] <= {};", slot.name, source))?;
        }
        self.indent -= 1;
        self.write_line(format_args!("end"))?;
        self.indent -= 1;
        self.write_line(format_args!("end"))?;
        Ok(())
    }
    /// Handshake block for one channel, rendered from its [Handshake] rule
    fn write_handshake(&mut self, rule: &Handshake) -> RegResult<()> {
        let state = rule.state_wire();
        let peer = rule.peer_wire();
        self.write_line(format_args!(""))?;
        self.write_line(format_args!(
            "always @(posedge clock or negedge resetn) begin"
        ))?;
        self.indent += 1;
        self.write_line(format_args!("if (resetn == 1'b0) begin"))?;
        self.write_line(format_args!("  {} <= 1'b0;", state))?;
        self.write_line(format_args!("end else begin"))?;
        self.indent += 1;
        self.write_line(format_args!(
            "if ({} && {} == `{}) begin",
            rule.trigger.enable(),
            rule.trigger.address(),
            rule.register
        ))?;
        self.write_line(format_args!("  {} <= 1'b1;", state))?;
        self.write_line(format_args!("end"))?;
        self.write_line(format_args!("if ({} && {}) begin", state, peer))?;
        self.write_line(format_args!("  {} <= 1'b0;", state))?;
        self.write_line(format_args!("end"))?;
        self.indent -= 1;
        self.write_line(format_args!("end"))?;
        self.indent -= 1;
        self.write_line(format_args!("end"))?;
        Ok(())
    }
    /// Instance of the HLS core, with one set of resource ports per signal
    fn write_core_instance(&mut self) -> RegResult<()> {
        let mut conns: Vec<(String, String)> = vec![
            ("clk".into(), "clock".into()),
            ("arst_n".into(), "resetn".into()),
        ];
        let design = self.design;
        for signal in design.spec.iter() {
            let n = &signal.name;
            match signal.kind {
                SignalKind::Wire => {
                    conns.push((format!("{}_rsc_dat", n), n.clone()));
                    conns.push((format!("{}_rsc_triosy_lz", n), format!("{}_tz", n)));
                }
                SignalKind::Channel => {
                    conns.push((format!("{}_rsc_dat", n), n.clone()));
                    conns.push((format!("{}_rsc_vld", n), format!("{}_valid", n)));
                    conns.push((format!("{}_rsc_rdy", n), format!("{}_ready", n)));
                }
                SignalKind::Master => self.master_connections(signal, &mut conns),
            }
        }
        let name = design.instance_name;
        self.write_line(format_args!(""))?;
        self.write_line(format_args!("{} u_{} (", name, name))?;
        self.write_connections(&conns)?;
        self.write_line(format_args!(");"))?;
        Ok(())
    }
    /// Resource-port connections for master `signal`
    fn master_connections(&self, signal: &Signal, conns: &mut Vec<(String, String)>) {
        let n = &signal.name;
        match self.kind() {
            BackendKind::Narrow => {
                let hi = signal.width - 1;
                let (din, rest) = bus::AHB_CORE_READ_PORTS.split_at(1);
                for (suffix, net) in din.iter() {
                    conns.push((format!("{}_{}", n, suffix), net.to_string()));
                }
                conns.push((
                    format!("{}_in_rsc_s_raddr", n),
                    format!("input_master_raddr[{}:0]", hi),
                ));
                for (suffix, net) in rest.iter() {
                    conns.push((format!("{}_{}", n, suffix), net.to_string()));
                }
                let (dout, rest) = bus::AHB_CORE_WRITE_PORTS.split_at(1);
                for (suffix, net) in dout.iter() {
                    conns.push((format!("{}_{}", n, suffix), net.to_string()));
                }
                conns.push((
                    format!("{}_out_rsc_s_waddr", n),
                    format!("output_master_waddr[{}:0]", hi),
                ));
                for (suffix, net) in rest.iter() {
                    conns.push((format!("{}_{}", n, suffix), net.to_string()));
                }
            }
            BackendKind::Burst => {
                for (suffix, net) in bus::AXI_CORE_CONFIG_PORTS.iter() {
                    conns.push((format!("{}_{}", n, suffix), net.to_string()));
                }
                for (_, _, port) in bus::AXI_PORTS.iter() {
                    conns.push((format!("{}_rsc_{}", n, port), port.to_string()));
                }
                conns.push((format!("{}_rsc_triosy_lz", n), format!("{}_triosy_lz", n)));
            }
        }
    }
    /// Arbiter instance, for narrow-backend masters
    fn write_arbiter_instance(&mut self) -> RegResult<()> {
        if self.kind() != BackendKind::Narrow || !self.has_master() {
            return Ok(());
        }
        let conns: Vec<(String, String)> = bus::BUS_ARBITER_CONNECTIONS
            .iter()
            .map(|(p, n)| (p.to_string(), n.to_string()))
            .collect();
        self.write_line(format_args!(""))?;
        self.write_line(format_args!("bus_arbiter u_bus_arbiter ("))?;
        self.write_connections(&conns)?;
        self.write_line(format_args!(");"))?;
        Ok(())
    }
    /// Named port connections, one per line
    fn write_connections(&mut self, conns: &[(String, String)]) -> RegResult<()> {
        self.indent += 1;
        for (idx, (port, net)) in conns.iter().enumerate() {
            let sep = if idx + 1 == conns.len() { "" } else { "," };
            self.write_line(format_args!(".{} ({}){}", port, net, sep))?;
        }
        self.indent -= 1;
        Ok(())
    }
    /// Helper function to write a line of text, at our current indentation.
    fn write_line(&mut self, args: std::fmt::Arguments) -> std::io::Result<()> {
        write_indented(&mut self.dest, &self.indent, args)
    }
}
