//!
//! # regif2v
//!
//! Signal-Spec to Verilog Register Wrapper & C Header Compiler
//!
//! ```text
//! regif2v <instance_name> <spec_file> [<module_name>]                      # narrow
//! regif2v -b burst <instance_name> <spec_file> <base_address> [<module_name>]
//! ```
//!

use clap::Parser;
use log::info;
use std::error::Error;

use regif21::{compile_file, Backend, BackendKind, CompileOptions, Written};
use regif21utils::{EnumStr, SerializationFormat};

// => The doc-comment on `ProgramOptions` here is displayed by the `clap`-generated help docs =>

/// Signal-Spec to Verilog Register Wrapper & C Header Compiler
#[derive(Parser, Debug)]
#[clap(version)]
struct ProgramOptions {
    /// Module name of the HLS core instantiated by the wrapper
    instance_name: String,
    /// Interface spec file
    spec_file: String,
    /// Burst backend: `<base_address> [<module_name>]`. Narrow backend: `[<module_name>]`.
    #[clap(value_name = "ARGS", max_values = 2)]
    rest: Vec<String>,
    /// Bus backend, `narrow` or `burst`
    #[clap(short, long, default_value = "narrow", value_parser = parse_backend)]
    backend: BackendKind,
    /// Base address, overriding the narrow backend's default
    #[clap(short = 'a', long, value_parser = parse_base_address)]
    base_address: Option<u64>,
    /// Output directory
    #[clap(short, long, default_value = ".")]
    out_dir: String,
    /// Also write the register map, as YAML, JSON or TOML per its extension
    #[clap(long)]
    dump_map: Option<String>,
    /// Verbose output. Repeat for debug output.
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// The main entry point.
/// All logic is offloaded to `_main` for sake of testing.
fn main() {
    let options = ProgramOptions::parse();
    init_logging(options.verbose);
    if let Err(e) = _main(&options) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

/// Log at `warn` by default, `info` with `-v`, and `debug` with `-vv`. `RUST_LOG` takes precedence.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env = env_logger::Env::default().default_filter_or(level);
    let _ = env_logger::Builder::from_env(env).format_timestamp(None).try_init();
}

/// All the real logic, with `ProgramOptions` argument for sake of testing
fn _main(options: &ProgramOptions) -> Result<Written, Box<dyn Error>> {
    let opts = compile_options(options)?;
    // Check the map format before writing anything
    let dump = match options.dump_map {
        Some(ref path) => {
            let fmt = SerializationFormat::from_path(path).ok_or_else(|| {
                format!("cannot infer a format for `{}`, use .yaml, .json or .toml", path)
            })?;
            Some((fmt, path))
        }
        None => None,
    };
    let written = compile_file(&options.spec_file, &options.out_dir, &opts)?;

    if let Some((fmt, path)) = dump {
        fmt.save(&written.artifacts.map, path)?;
        info!("wrote register map {:?}", path);
    }
    Ok(written)
}

/// Sort the trailing positional arguments into [CompileOptions]
fn compile_options(options: &ProgramOptions) -> Result<CompileOptions, Box<dyn Error>> {
    let mut opts = CompileOptions::new(&options.instance_name, Backend::from_kind(options.backend));
    let mut rest = options.rest.iter();
    opts.base_address = match options.backend {
        BackendKind::Burst => match rest.next() {
            Some(addr) => Some(parse_base_address(addr)?),
            None => options.base_address,
        },
        BackendKind::Narrow => options.base_address,
    };
    if let Some(module_name) = rest.next() {
        opts.module_name = module_name.clone();
    }
    if let Some(extra) = rest.next() {
        return Err(format!("unexpected argument `{}`", extra).into());
    }
    Ok(opts)
}

fn parse_backend(s: &str) -> Result<BackendKind, String> {
    BackendKind::from_str_nocase(s)
        .ok_or_else(|| format!("expected one of {}", BackendKind::keywords()))
}

/// Parse an address as C's `strtoul` does with base zero:
/// `0x` prefix for hex, leading `0` for octal, decimal otherwise.
fn parse_base_address(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16)
    } else if s.len() > 1 && s.starts_with('0') {
        u64::from_str_radix(&s[1..], 8)
    } else {
        s.parse::<u64>()
    };
    parsed.map_err(|_| format!("invalid base address `{}`", s))
}
