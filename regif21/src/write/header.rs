//!
//! # C Header Writer Module
//!
//! Software view of the register bank: the accelerator base pointer,
//! one `<NAME>_REG` lvalue per register slot, and convenience access macros.
//!

// Standard Lib Imports
use std::io::Write;

// Crates.io Imports
use log::warn;

// Local imports
use super::{render, write_indented, Design, Indent};
use crate::alloc::RegisterSlot;
use crate::data::*;

/// Write the software header for `design` to a [String]
pub fn to_string(design: &Design) -> RegResult<String> {
    render(|buf| HeaderWriter::new(buf, design).write_header())
}

/// Include-guard macro for module `module_name`
pub fn include_guard(module_name: &str) -> String {
    let mut guard: String = module_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    guard.push_str("_REGS_H");
    guard
}

/// # Convenience Macro
///
/// Access idiom generated for one signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessMacro {
    /// `GO`: wait for ready, then write 1
    Go { data: String, ready: String },
    /// `WAIT_FOR_DONE`: wait for valid, then read the data register
    WaitForDone { data: String, valid: String },
    /// `SET_<NAME>(X)`, waiting on `ready` first for channels
    Set {
        name: String,
        data: String,
        ready: Option<String>,
    },
    /// `GET_<NAME>(X)`, waiting on `valid` first for channels
    Get {
        name: String,
        data: String,
        valid: Option<String>,
    },
}
impl AccessMacro {
    /// Select the macro for `signal`, with register names from `data` and `control`
    pub fn for_signal(
        signal: &Signal,
        data: &RegisterSlot,
        control: Option<&RegisterSlot>,
    ) -> Self {
        let data = data.name.clone();
        let control = control.map(|c| c.name.clone());
        match (signal.direction, control) {
            (Direction::Input, Some(ready)) if signal.name.eq_ignore_ascii_case("go") => {
                Self::Go { data, ready }
            }
            (Direction::Output, Some(valid)) if signal.name.eq_ignore_ascii_case("done") => {
                Self::WaitForDone { data, valid }
            }
            (Direction::Input, ready) => Self::Set {
                name: signal.const_name(),
                data,
                ready,
            },
            (Direction::Output, valid) => Self::Get {
                name: signal.const_name(),
                data,
                valid,
            },
        }
    }
    /// Macro name and parameter list, e.g. `SET_RELU(X)`
    pub fn signature(&self) -> String {
        match self {
            Self::Go { .. } => "GO".into(),
            Self::WaitForDone { .. } => "WAIT_FOR_DONE".into(),
            Self::Set { name, .. } => format!("SET_{}(X)", name),
            Self::Get { name, .. } => format!("GET_{}(X)", name),
        }
    }
    /// Macro body. `access_type` is the C type of one register.
    pub fn body(&self, access_type: &str) -> String {
        let spin = |flag: &Option<String>| match flag {
            Some(f) => format!("while (!{}_REG); ", f),
            None => String::new(),
        };
        match self {
            Self::Go { data, ready } => {
                format!("{{ while (!{}_REG); {}_REG = 1; }}", ready, data)
            }
            Self::WaitForDone { data, valid } => format!(
                "{{ while (!{}_REG); volatile {} x = {}_REG; (void) x; }}",
                valid, access_type, data
            ),
            Self::Set { data, ready, .. } => format!("{{ {}{}_REG = X; }}", spin(ready), data),
            Self::Get { data, valid, .. } => format!("{{ {}X = {}_REG; }}", spin(valid), data),
        }
    }
}

/// # Header Writing Helper
pub struct HeaderWriter<'wr, 'd> {
    /// Write Destination
    dest: Box<dyn Write + 'wr>,
    /// Header lines are never indented
    indent: Indent,
    /// Design being written
    design: &'d Design<'d>,
}
impl<'wr, 'd> HeaderWriter<'wr, 'd> {
    pub fn new(dest: impl Write + 'wr, design: &'d Design<'d>) -> Self {
        Self {
            dest: Box::new(dest),
            indent: Indent::new(""),
            design,
        }
    }
    pub fn write_header(&mut self) -> RegResult<()> {
        let design = self.design;
        let guard = include_guard(design.module_name);
        self.write_line(format_args!(
            "/***************************************************************************"
        ))?;
        self.write_line(format_args!(
            " *  accelerator interface header for `{}`",
            design.module_name
        ))?;
        self.write_line(format_args!(
            " ***************************************************************************/"
        ))?;
        self.write_line(format_args!(""))?;
        self.write_line(format_args!("#ifndef {}", guard))?;
        self.write_line(format_args!("#define {}", guard))?;
        self.write_line(format_args!(""))?;
        self.write_line(format_args!(
            "#define ACCEL_ADDR ((volatile {} *) 0x{:08X})",
            design.backend.c_access_type, design.base_address
        ))?;
        self.write_register_map()?;
        self.write_macros()?;
        self.write_line(format_args!(""))?;
        self.write_line(format_args!("#endif /* {} */", guard))?;
        self.dest.flush()?;
        Ok(())
    }
    /// One lvalue macro per register slot, in offset order
    fn write_register_map(&mut self) -> RegResult<()> {
        let map = self.design.map;
        if map.is_empty() {
            return Ok(());
        }
        self.write_line(format_args!(""))?;
        self.write_line(format_args!("// register map"))?;
        self.write_line(format_args!(""))?;
        for slot in map.iter() {
            let name = format!("{}_REG", slot.name);
            self.write_line(format_args!(
                "#define {:<34} (*(ACCEL_ADDR + {}))",
                name, slot.offset
            ))?;
        }
        Ok(())
    }
    fn write_macros(&mut self) -> RegResult<()> {
        let design = self.design;
        let mut macros = Vec::new();
        for signal in design.spec.registered() {
            let data = design.map.data_slot(&signal.name).ok_or_else(|| {
                RegError::Str(format!("signal `{}` has no data register", signal.name))
            })?;
            let control = design.map.control_slot(&signal.name);
            let mac = AccessMacro::for_signal(signal, data, control);
            let special = ["go", "done"]
                .iter()
                .any(|n| signal.name.eq_ignore_ascii_case(n));
            if special && matches!(mac, AccessMacro::Set { .. } | AccessMacro::Get { .. }) {
                warn!(
                    "line {}: `{}` is a {} {}, not generating its {} macro",
                    signal.line,
                    signal.name,
                    signal.direction,
                    signal.kind,
                    if signal.name.eq_ignore_ascii_case("go") {
                        "GO"
                    } else {
                        "WAIT_FOR_DONE"
                    }
                );
            }
            macros.push(mac);
        }
        if macros.is_empty() {
            return Ok(());
        }
        let access_type = &design.backend.c_access_type;
        self.write_line(format_args!(""))?;
        self.write_line(format_args!("// convenience macros"))?;
        self.write_line(format_args!(""))?;
        for mac in macros.iter() {
            self.write_line(format_args!(
                "#define {:<32} {}",
                mac.signature(),
                mac.body(access_type)
            ))?;
        }
        Ok(())
    }
    fn write_line(&mut self, args: std::fmt::Arguments) -> std::io::Result<()> {
        write_indented(&mut self.dest, &self.indent, args)
    }
}
