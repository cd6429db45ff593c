//!
//! # Compilation Pipeline
//!
//! Spec, then register map, then handshake rules, then both artifacts.
//! Artifacts are staged beside their destinations, and only renamed into place
//! once both are fully written.
//!

// Std-Lib
use std::path::{Path, PathBuf};

// Crates.io Imports
use derive_builder::Builder;
use log::info;
use serde::{Deserialize, Serialize};

// Local Imports
use crate::alloc::{allocate, RegisterMap};
use crate::backend::Backend;
use crate::data::*;
use crate::handshake::{synthesize, Handshake};
use crate::read::{is_valid_name, parse_file_for};
use crate::utils::stage;
use crate::write::{header, verilog, Design};

/// Wrapper module name used when none is given
pub const DEFAULT_MODULE_NAME: &str = "cat_accel";

/// # Compile Options
#[derive(Debug, Clone, Builder, Deserialize, Serialize, PartialEq, Eq)]
#[builder(pattern = "owned", setter(into))]
pub struct CompileOptions {
    /// Module name of the HLS core instantiated by the wrapper
    pub instance_name: String,
    /// Wrapper module name, also the stem of the Verilog file
    #[builder(default = "DEFAULT_MODULE_NAME.to_string()")]
    pub module_name: String,
    /// Accelerator base address. Required unless the backend has a default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub base_address: Option<u64>,
    #[builder(default)]
    pub backend: Backend,
}
impl CompileOptions {
    /// Create options for core `instance_name` on `backend`, with the default module name
    pub fn new(instance_name: impl Into<String>, backend: Backend) -> Self {
        Self {
            instance_name: instance_name.into(),
            module_name: DEFAULT_MODULE_NAME.into(),
            base_address: None,
            backend,
        }
    }
    /// Resolve the base address, falling back to the backend default
    pub fn base_address(&self) -> RegResult<u64> {
        match (self.base_address, self.backend.default_base_address) {
            (Some(addr), _) | (None, Some(addr)) => Ok(addr),
            (None, None) => Err(RegError::Str(format!(
                "the {} backend requires a base address",
                self.backend.kind
            ))),
        }
    }
    /// Check that both module names are legal Verilog identifiers
    pub fn validate(&self) -> RegResult<()> {
        for (what, name) in [
            ("instance", &self.instance_name),
            ("module", &self.module_name),
        ] {
            if !is_valid_name(name) {
                return Err(RegError::Str(format!("invalid {} name `{}`", what, name)));
            }
        }
        Ok(())
    }
    /// Path of the Verilog artifact within `out_dir`
    pub fn verilog_path(&self, out_dir: impl AsRef<Path>) -> PathBuf {
        out_dir.as_ref().join(format!("{}.v", self.module_name))
    }
    /// Path of the header artifact within `out_dir`.
    /// Named for the spec file, with its extension replaced by the backend's header suffix.
    pub fn header_path(&self, out_dir: impl AsRef<Path>, spec_path: impl AsRef<Path>) -> PathBuf {
        let fname = spec_path
            .as_ref()
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("accel"));
        out_dir
            .as_ref()
            .join(fname.with_extension(&self.backend.header_suffix))
    }
}

/// # Compiled Artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    /// Register map shared by both artifacts
    pub map: RegisterMap,
    /// Handshake rules, one per channel
    pub handshakes: Vec<Handshake>,
    /// Verilog wrapper text
    pub verilog: String,
    /// C header text
    pub header: String,
}

/// Compile `spec` into both artifacts, in memory
pub fn compile(spec: &InterfaceSpec, opts: &CompileOptions) -> RegResult<Artifacts> {
    opts.validate()?;
    let base_address = opts.base_address()?;
    let map = allocate(spec, &opts.backend)?;
    let handshakes = synthesize(spec, &map)?;
    let design = Design {
        spec,
        map: &map,
        handshakes: &handshakes,
        backend: &opts.backend,
        module_name: &opts.module_name,
        instance_name: &opts.instance_name,
        base_address,
    };
    let verilog = verilog::to_string(&design)?;
    let header = header::to_string(&design)?;
    info!(
        "compiled {} signals into {} registers ({} backend)",
        spec.len(),
        map.register_count(),
        opts.backend.kind
    );
    Ok(Artifacts {
        map,
        handshakes,
        verilog,
        header,
    })
}

/// # Written Artifacts
#[derive(Debug, Clone)]
pub struct Written {
    pub verilog: PathBuf,
    pub header: PathBuf,
    pub artifacts: Artifacts,
}

/// Compile spec-file `spec_path`, writing both artifacts into `out_dir`.
/// On any failure, neither artifact is written.
pub fn compile_file(
    spec_path: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
    opts: &CompileOptions,
) -> RegResult<Written> {
    let spec_path = spec_path.as_ref();
    let spec = parse_file_for(spec_path, &opts.backend)?;
    info!("read {} signals from {:?}", spec.len(), spec_path);
    let artifacts = compile(&spec, opts)?;

    let verilog_path = opts.verilog_path(&out_dir);
    let header_path = opts.header_path(&out_dir, spec_path);
    let staged_v = stage(&verilog_path, artifacts.verilog.as_bytes())?;
    let staged_h = stage(&header_path, artifacts.header.as_bytes())?;
    let verilog = staged_v.commit()?;
    let header = staged_h.commit()?;
    info!("wrote {:?}", verilog);
    info!("wrote {:?}", header);
    Ok(Written {
        verilog,
        header,
        artifacts,
    })
}
