use std::path::Path;

use super::read::{is_valid_name, normalize_whitespace};
use super::write::header::{include_guard, AccessMacro};
use super::*;
use crate::utils::SerializationFormat::Yaml;

#[test]
fn it_parses() -> RegResult<()> {
    let spec = InterfaceSpec::open(resource("accel.spec"))?;
    check_yaml(&spec, resource("accel.spec.yaml"));
    assert_eq!(spec.master().map(|m| m.name.as_str()), Some("memory"));
    assert_eq!(spec.registered().count(), 5);
    Ok(())
}
#[test]
fn it_skips_comments_and_blanks() -> RegResult<()> {
    let src = "\n   # a comment\n// another\n\t\n go , 1, unsigned, input, channel \n";
    let spec = parse_str(src)?;
    assert_eq!(spec.len(), 1);
    assert_eq!(spec.signals[0].name, "go");
    assert_eq!(spec.signals[0].line, 5);
    Ok(())
}
#[test]
fn it_parses_keywords_nocase() -> RegResult<()> {
    let spec = parse_str("Image_Width, 16, SIGNED, Input, WIRE")?;
    let expected = SignalBuilder::default()
        .name("Image_Width")
        .width(16u32)
        .signedness(Signedness::Signed)
        .direction(Direction::Input)
        .kind(SignalKind::Wire)
        .line(1usize)
        .build()
        .unwrap();
    assert_eq!(spec.signals, vec![expected]);
    // Case is kept in the name, and dropped in its constant
    assert_eq!(spec.signals[0].const_name(), "IMAGE_WIDTH");
    Ok(())
}
#[test]
fn it_normalizes_whitespace() -> RegResult<()> {
    assert_eq!(normalize_whitespace("  a \t b  "), "a b");
    let spec = parse_str("count,\t 8 ,  unsigned ,output,   wire")?;
    assert_eq!(spec.signals[0].width, 8);
    assert_eq!(spec.signals[0].direction, Direction::Output);
    Ok(())
}
#[test]
fn it_checks_names() {
    assert!(is_valid_name("go"));
    assert!(is_valid_name("_x$1"));
    assert!(!is_valid_name("1x"));
    assert!(!is_valid_name("bad name"));
    assert!(!is_valid_name(""));
}

/// Helper function: parse `src`, expecting a [RegError::Syntax]. Returns its line and field.
fn syntax_error(src: &str) -> (usize, SpecField) {
    match parse_str(src) {
        Err(RegError::Syntax { line, field, .. }) => (line, field),
        other => panic!("expected a syntax error, got {:?}", other),
    }
}
#[test]
fn it_rejects_bad_fields() {
    let src = "go, 1, unsigned, input, channel\nbad name, 1, unsigned, input, wire";
    assert_eq!(syntax_error(src), (2, SpecField::Name));
    assert_eq!(syntax_error("1x, 1, unsigned, input, wire"), (1, SpecField::Name));
    assert_eq!(syntax_error("x, 2000, unsigned, input, wire"), (1, SpecField::Width));
    assert_eq!(syntax_error("x, 0, unsigned, input, wire"), (1, SpecField::Width));
    assert_eq!(syntax_error("x, 8b, unsigned, input, wire"), (1, SpecField::Width));
    assert_eq!(syntax_error("x, -1, unsigned, input, wire"), (1, SpecField::Width));
    assert_eq!(syntax_error("x, 1, maybe, input, wire"), (1, SpecField::Signed));
    assert_eq!(syntax_error("x, 1, unsigned, inout, wire"), (1, SpecField::Direction));
    assert_eq!(syntax_error("x, 1, unsigned, input, bus"), (1, SpecField::Kind));
    assert_eq!(syntax_error("x, 1, unsigned, input"), (1, SpecField::FieldCount));
    assert_eq!(
        syntax_error("x, 1, unsigned, input, wire,"),
        (1, SpecField::FieldCount)
    );
}
#[test]
fn it_accepts_widest_signal() -> RegResult<()> {
    let spec = parse_str("x, 1024, unsigned, input, wire")?;
    assert_eq!(spec.signals[0].width, MAX_SIGNAL_WIDTH);
    Ok(())
}
#[test]
fn it_renders_errors() {
    let err = parse_str("x, 0, unsigned, input, wire").unwrap_err();
    assert_eq!(err.line(), Some(1));
    assert_eq!(
        err.to_string(),
        "line 1: invalid width `0`: width must be in [1, 1024]"
    );
    let err = parse_str("x, 1, unsigned, input, bus").unwrap_err();
    assert_eq!(
        err.to_string(),
        "line 1: invalid kind `bus`: expected one of wire | channel | master"
    );
}
#[test]
fn it_rejects_duplicates() {
    let src = "go, 1, unsigned, input, channel\nGO, 1, unsigned, input, wire";
    match parse_str(src) {
        Err(RegError::Validation { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected a validation error, got {:?}", other),
    }
}
#[test]
fn it_rejects_second_master() {
    let src = "a, 20, unsigned, input, master\nb, 20, unsigned, input, master";
    match parse_str(src) {
        Err(RegError::Validation { line, msg }) => {
            assert_eq!(line, 2);
            assert!(msg.contains("line 1"));
        }
        other => panic!("expected a validation error, got {:?}", other),
    }
    // Specs built in code skip the parser, and are caught by the allocator
    let master = |name: &str, line: usize| {
        SignalBuilder::default()
            .name(name)
            .width(20u32)
            .direction(Direction::Input)
            .kind(SignalKind::Master)
            .line(line)
            .build()
            .unwrap()
    };
    let spec = InterfaceSpec::from(vec![master("a", 1), master("b", 2)]);
    let err = allocate(&spec, &Backend::narrow()).unwrap_err();
    assert_eq!(err.line(), Some(2));
}

#[test]
fn it_allocates_narrow() -> RegResult<()> {
    let spec = InterfaceSpec::open(resource("accel.spec"))?;
    let map = allocate(&spec, &Backend::narrow())?;
    check_yaml(&map, resource("accel.narrow.map.yaml"));
    for (idx, slot) in map.iter().enumerate() {
        assert_eq!(slot.offset, idx);
    }
    assert_eq!(map.register_count(), 8);
    Ok(())
}
#[test]
fn it_allocates_burst() -> RegResult<()> {
    let spec = InterfaceSpec::open(resource("accel.spec"))?;
    let map = allocate(&spec, &Backend::burst())?;
    check_yaml(&map, resource("accel.burst.map.yaml"));
    assert_eq!(map.master_slots().count(), Backend::burst().master_cost());
    Ok(())
}
#[test]
fn it_allocates_go_done() -> RegResult<()> {
    let src = "go, 1, unsigned, input, channel\ndone, 1, unsigned, output, channel";
    let map = allocate(&parse_str(src)?, &Backend::narrow())?;
    assert_eq!(map.offset_of("GO"), Some(0));
    assert_eq!(map.offset_of("GO_READY"), Some(1));
    assert_eq!(map.offset_of("DONE"), Some(2));
    assert_eq!(map.offset_of("DONE_VALID"), Some(3));
    assert_eq!(map.control_slot("go").map(|s| s.role), Some(SlotRole::Ready));
    assert_eq!(map.control_slot("done").map(|s| s.role), Some(SlotRole::Valid));
    assert!(!map.has_master());
    Ok(())
}
#[test]
fn master_slots_come_last() -> RegResult<()> {
    let src = "mem, 20, unsigned, input, master\nx, 8, unsigned, input, wire";
    let spec = parse_str(src)?;

    let map = allocate(&spec, &Backend::narrow())?;
    let names: Vec<&str> = map.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["X", "ADDR_OFFSET"]);

    let map = allocate(&spec, &Backend::burst())?;
    let names: Vec<&str> = map.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["X", "ADDR_OFFSET_LOW", "ADDR_OFFSET_HIGH", "BURST_SIZE"]
    );
    Ok(())
}
#[test]
fn it_allocates_deterministically() -> RegResult<()> {
    let spec = InterfaceSpec::open(resource("accel.spec"))?;
    let backend = Backend::burst();
    assert_eq!(allocate(&spec, &backend)?, allocate(&spec, &backend)?);
    Ok(())
}
#[test]
fn it_rejects_collisions() -> RegResult<()> {
    let src = "go_ready, 1, unsigned, input, wire\ngo, 1, unsigned, input, channel";
    match allocate(&parse_str(src)?, &Backend::narrow()) {
        Err(RegError::Validation { line, msg }) => {
            assert_eq!(line, 2);
            assert!(msg.contains("GO_READY"));
        }
        other => panic!("expected a validation error, got {:?}", other),
    }
    let src = "addr_offset, 32, unsigned, input, wire\nm, 20, unsigned, input, master";
    let err = allocate(&parse_str(src)?, &Backend::narrow()).unwrap_err();
    assert_eq!(err.line(), Some(2));
    let src = "m, 20, unsigned, input, master\naddr_offset, 32, unsigned, input, wire";
    let err = allocate(&parse_str(src)?, &Backend::narrow()).unwrap_err();
    assert_eq!(err.line(), Some(2));

    // Generated wires of one signal against another signal's name
    let src = "x, 1, unsigned, input, wire\nx_tz, 1, unsigned, output, channel";
    match allocate(&parse_str(src)?, &Backend::narrow()) {
        Err(RegError::Validation { line, msg }) => {
            assert_eq!(line, 2);
            assert!(msg.contains("x_tz"));
        }
        other => panic!("expected a validation error, got {:?}", other),
    }
    let src = "go_valid, 1, unsigned, input, wire\ngo, 1, unsigned, output, channel";
    let err = allocate(&parse_str(src)?, &Backend::burst()).unwrap_err();
    assert_eq!(err.line(), Some(2));

    // Ports and register-bank internals, on either backend
    for name in ["clock", "resetn", "we", "oe", "read_addr", "rd_reg", "read_enable", "register_bank"] {
        let src = format!("{}, 1, unsigned, input, wire", name);
        for backend in [Backend::narrow(), Backend::burst()] {
            match allocate(&parse_str(&src)?, &backend) {
                Err(RegError::Validation { line, msg }) => {
                    assert_eq!(line, 1);
                    assert!(msg.contains("reserved"), "{}", msg);
                }
                other => panic!("expected `{}` to be reserved, got {:?}", name, other),
            }
        }
    }

    // Master wiring names are only reserved when the spec has a master, and per backend
    let src = "hready, 1, unsigned, input, wire\nm, 20, unsigned, input, master";
    assert_eq!(allocate(&parse_str(src)?, &Backend::narrow()).unwrap_err().line(), Some(2));
    allocate(&parse_str(src)?, &Backend::burst())?;
    allocate(&parse_str("hready, 1, unsigned, input, wire")?, &Backend::narrow())?;
    let src = "m_wstate, 1, unsigned, input, wire\nm, 20, unsigned, input, master";
    assert_eq!(allocate(&parse_str(src)?, &Backend::burst()).unwrap_err().line(), Some(2));
    allocate(&parse_str(src)?, &Backend::narrow())?;
    let src = "memory_triosy_lz, 1, unsigned, input, wire\nmemory, 20, unsigned, input, master";
    assert_eq!(allocate(&parse_str(src)?, &Backend::burst()).unwrap_err().line(), Some(2));
    allocate(&parse_str(src)?, &Backend::narrow())?;
    Ok(())
}
#[test]
fn collisions_fail_compilation() -> RegResult<()> {
    let src = "x, 1, unsigned, input, wire\nx_tz, 1, unsigned, output, channel\nclock, 1, unsigned, input, wire";
    let spec = parse_str(src)?;
    let err = compile(&spec, &CompileOptions::new("cat", Backend::narrow())).unwrap_err();
    assert_eq!(err.line(), Some(2));
    // Parsing for the backend stops at the same line
    let err = parse_str_for(src, &Backend::narrow()).unwrap_err();
    assert_eq!(err.line(), Some(2));
    Ok(())
}
#[test]
fn it_checks_width_while_parsing() -> RegResult<()> {
    // A too-wide signal, followed by a line which does not parse
    let src = "x, 64, unsigned, input, wire\nbad name, 1, unsigned, input, wire";
    // Without a backend, only the syntax error is visible
    assert!(matches!(parse_str(src), Err(RegError::Syntax { line: 2, .. })));
    match parse_str_for(src, &Backend::narrow()) {
        Err(RegError::UnsupportedWidth {
            line, width, max, ..
        }) => assert_eq!((line, width, max), (1, 64, 32)),
        other => panic!("expected an unsupported-width error, got {:?}", other),
    }
    // 64 bits fit the burst backend, leaving the syntax error
    assert!(matches!(
        parse_str_for(src, &Backend::burst()),
        Err(RegError::Syntax { line: 2, .. })
    ));
    // Masters are checked against the master width
    let src = "m, 31, unsigned, input, master\nbad name, 1, unsigned, input, wire";
    let err = parse_str_for(src, &Backend::narrow()).unwrap_err();
    assert!(matches!(err, RegError::UnsupportedWidth { line: 1, max: 30, .. }));

    // And the same through a spec file
    let src_dir = tempfile::tempdir()?;
    let spec_path = src_dir.path().join("mixed.spec");
    std::fs::write(&spec_path, "x, 64, unsigned, input, wire\nbad name, 1, unsigned, input, wire\n")?;
    let out_dir = tempfile::tempdir()?;
    let opts = CompileOptions::new("cat", Backend::narrow());
    let err = compile_file(&spec_path, out_dir.path(), &opts).unwrap_err();
    assert!(matches!(err, RegError::UnsupportedWidth { line: 1, .. }));
    assert_eq!(std::fs::read_dir(out_dir.path())?.count(), 0);

    // Accepted specs parse the same with or without a backend
    let plain = InterfaceSpec::open(resource("accel.spec"))?;
    assert_eq!(parse_file_for(resource("accel.spec"), &Backend::narrow())?, plain);
    assert_eq!(parse_file_for(resource("accel.spec"), &Backend::burst())?, plain);
    Ok(())
}
#[test]
fn it_checks_register_width() -> RegResult<()> {
    let spec = parse_str("x, 33, unsigned, input, wire")?;
    match allocate(&spec, &Backend::narrow()) {
        Err(RegError::UnsupportedWidth {
            line, width, max, ..
        }) => assert_eq!((line, width, max), (1, 33, 32)),
        other => panic!("expected an unsupported width, got {:?}", other),
    }
    // Fits in the burst backend's registers
    allocate(&spec, &Backend::burst())?;
    allocate(&parse_str("x, 64, unsigned, input, wire")?, &Backend::burst())?;
    let err = allocate(&parse_str("x, 65, unsigned, input, wire")?, &Backend::burst());
    assert!(matches!(err, Err(RegError::UnsupportedWidth { max: 64, .. })));
    // Master addresses are limited separately
    let err = allocate(&parse_str("m, 31, unsigned, input, master")?, &Backend::narrow());
    assert!(matches!(err, Err(RegError::UnsupportedWidth { max: 30, .. })));
    Ok(())
}
#[test]
fn it_allocates_empty() -> RegResult<()> {
    let map = allocate(&InterfaceSpec::new(), &Backend::narrow())?;
    assert!(map.is_empty());
    assert!(!map.accepts_write(0));
    Ok(())
}

#[test]
fn it_synthesizes_handshakes() -> RegResult<()> {
    let spec = InterfaceSpec::open(resource("accel.spec"))?;
    let map = allocate(&spec, &Backend::narrow())?;
    let rules = synthesize(&spec, &map)?;
    assert_eq!(
        rules,
        vec![
            Handshake {
                signal: "go".into(),
                state: HandshakeBit::Valid,
                peer: HandshakeBit::Ready,
                trigger: BusAccess::Write,
                register: "GO".into(),
                offset: 0,
            },
            Handshake {
                signal: "done".into(),
                state: HandshakeBit::Ready,
                peer: HandshakeBit::Valid,
                trigger: BusAccess::Read,
                register: "DONE".into(),
                offset: 2,
            },
        ]
    );
    assert_eq!(rules[0].state_wire(), "go_valid");
    assert_eq!(rules[1].peer_wire(), "done_valid");
    Ok(())
}
#[test]
fn handshake_mirror_is_symmetric() {
    let rule = Handshake::input("px", "PX", 4);
    let mirrored = rule.mirror();
    assert_eq!(mirrored.state, HandshakeBit::Ready);
    assert_eq!(mirrored.trigger, BusAccess::Read);
    assert_eq!(mirrored.offset, 4);
    assert_eq!(mirrored.mirror(), rule);
}
#[test]
fn input_handshake_sequence() {
    let rule = Handshake::input("go", "GO", 0);
    let mut hs = HandshakeState::new(&rule);
    assert!(!hs.get());
    assert!(!hs.step(&BusCycle::idle(), false));
    // Reads, and writes elsewhere, leave it alone
    assert!(!hs.step(&BusCycle::read(0), false));
    assert!(!hs.step(&BusCycle::write(1), false));
    // Set by a write, and held
    assert!(hs.step(&BusCycle::write(0), false));
    assert!(hs.step(&BusCycle::idle(), false));
    // Writing again while set is idempotent
    assert!(hs.step(&BusCycle::write(0), false));
    // Consumed
    assert!(!hs.step(&BusCycle::idle(), true));
    // Further ready cycles without a write leave it clear
    assert!(!hs.step(&BusCycle::idle(), true));
    assert!(!hs.step(&BusCycle::idle(), true));
    assert!(hs.step(&BusCycle::write(0), true));
    // Clear wins over a coincident set
    assert!(!hs.step(&BusCycle::write(0), true));
    hs.step(&BusCycle::write(0), false);
    hs.reset();
    assert!(!hs.get());
}
#[test]
fn output_handshake_sequence() {
    let rule = Handshake::input("done", "DONE", 2).mirror();
    let mut hs = HandshakeState::new(&rule);
    assert!(!hs.step(&BusCycle::write(2), false));
    let both = BusCycle {
        read: Some(2),
        write: Some(0),
    };
    assert!(hs.step(&both, false));
    assert!(hs.step(&BusCycle::read(2), false));
    assert!(!hs.step(&BusCycle::idle(), true));
}

/// Helper function: compile `spec` to in-memory artifacts, with core `cat`
fn compile_accel(backend: Backend, base_address: Option<u64>) -> RegResult<Artifacts> {
    let spec = InterfaceSpec::open(resource("accel.spec"))?;
    let mut opts = CompileOptions::new("cat", backend);
    opts.base_address = base_address;
    compile(&spec, &opts)
}
/// Helper function: whitespace-normalized lines of `text`
fn lines(text: &str) -> Vec<String> {
    text.lines().map(normalize_whitespace).collect()
}
/// Helper function: assert `text` includes each of `expected`, as whole lines
fn assert_lines(text: &str, expected: &[&str]) {
    let lines = lines(text);
    for e in expected {
        assert!(
            lines.iter().any(|l| l == e),
            "missing line `{}` in:\n{}",
            e,
            text
        );
    }
}

#[test]
fn it_writes_narrow_verilog() -> RegResult<()> {
    let art = compile_accel(Backend::narrow(), None)?;
    assert_lines(
        &art.verilog,
        &[
            "module bus_arbiter (",
            "module cat_accel (",
            "output [1:0] htrans,",
            "input hready,",
            "input [31:0] hrdata",
            "reg [31:0] register_bank[7:0];",
            "reg go_valid;",
            "wire go_ready;",
            "reg done_ready;",
            "wire done_valid;",
            "wire relu_tz;",
            "wire [ 15:0] bias;",
            "assign input_master_raddr[29:20] = {10{1'b0}};",
            "`define GO 0",
            "`define DONE_VALID 3",
            "`define ADDR_OFFSET 7",
            "assign relu = register_bank[`RELU][0];",
            "assign bias = register_bank[`BIAS][15:0];",
            "assign addr_offset = register_bank[`ADDR_OFFSET];",
            "rd_reg <= register_bank[read_address];",
            "register_bank[`ADDR_OFFSET] <= 32'h40000000;",
            "register_bank[`GO] <= 32'h00000000;",
            "if (write_enable && write_address < 8) begin",
            "register_bank[`COUNT] <= count;",
            "register_bank[`DONE] <= done;",
            "register_bank[`GO_READY] <= go_ready;",
            "register_bank[`DONE_VALID] <= done_valid;",
            "if (write_enable && write_address == `GO) begin",
            "go_valid <= 1'b1;",
            "if (go_valid && go_ready) begin",
            "if (read_enable && read_address == `DONE) begin",
            "if (done_ready && done_valid) begin",
            "cat u_cat (",
            ".go_rsc_vld (go_valid),",
            ".relu_rsc_triosy_lz (relu_tz),",
            ".memory_in_rsc_s_raddr (input_master_raddr[19:0]),",
            ".memory_out_rsc_s_waddr (output_master_waddr[19:0]),",
            "bus_arbiter u_bus_arbiter (",
            ".write_grant (write_addr_active)",
        ],
    );
    // Inputs are driven by the bus, never mirrored back
    assert!(!art.verilog.contains("register_bank[`RELU] <= relu;"));
    assert_eq!(art.verilog.lines().last(), Some("endmodule"));
    Ok(())
}
#[test]
fn it_writes_burst_verilog() -> RegResult<()> {
    let art = compile_accel(Backend::burst(), Some(0x7000_0000))?;
    assert!(art.verilog.starts_with("`define bw_bits"));
    assert_lines(
        &art.verilog,
        &[
            "`define data_bits (8 * (1 << `bw_bits))",
            "input [15-`bw_bits:0] read_addr,",
            "output [`addr_bits-1:0] AWADDR,",
            "output RREADY",
            "reg [63:0] register_bank[9:0];",
            "wire [ 31:0] burst_size;",
            "wire memory_triosy_lz;",
            "`define BURST_SIZE 9",
            "assign addr_offset = register_bank[`ADDR_OFFSET_LOW][31:0];",
            "assign burst_size = register_bank[`BURST_SIZE][31:0];",
            "register_bank[`ADDR_OFFSET_LOW] <= 64'h0000000061000000;",
            "register_bank[`ADDR_OFFSET_HIGH] <= 64'h0000000000000000;",
            "register_bank[`BURST_SIZE] <= 64'h000000000000000F;",
            ".memory_rsc_cfgTimeout (32'd0),",
            ".memory_rsc_cfgrBaseAddress (addr_offset),",
            ".memory_rsc_AWADDR (AWADDR),",
            ".memory_rsc_triosy_lz (memory_triosy_lz)",
        ],
    );
    assert!(!art.verilog.contains("bus_arbiter"));
    // No write-ID or user-signal ports
    assert!(!lines(&art.verilog).iter().any(|l| l.ends_with(" WID,")));
    assert!(!art.verilog.contains("USER"));
    Ok(())
}
#[test]
fn it_writes_narrow_header() -> RegResult<()> {
    let art = compile_accel(Backend::narrow(), None)?;
    assert!(art.header.starts_with("/*****"));
    assert_lines(
        &art.header,
        &[
            "#ifndef CAT_ACCEL_REGS_H",
            "#define CAT_ACCEL_REGS_H",
            "#define ACCEL_ADDR ((volatile unsigned int *) 0xA0000000)",
            "#define GO_REG (*(ACCEL_ADDR + 0))",
            "#define DONE_VALID_REG (*(ACCEL_ADDR + 3))",
            "#define ADDR_OFFSET_REG (*(ACCEL_ADDR + 7))",
            "#define GO { while (!GO_READY_REG); GO_REG = 1; }",
            "#define WAIT_FOR_DONE { while (!DONE_VALID_REG); volatile unsigned int x = DONE_REG; (void) x; }",
            "#define SET_RELU(X) { RELU_REG = X; }",
            "#define SET_BIAS(X) { BIAS_REG = X; }",
            "#define GET_COUNT(X) { X = COUNT_REG; }",
        ],
    );
    assert_eq!(art.header.lines().last(), Some("#endif /* CAT_ACCEL_REGS_H */"));
    // No macro for the master
    assert!(!art.header.contains("MEMORY"));
    Ok(())
}
#[test]
fn it_writes_burst_header() -> RegResult<()> {
    let art = compile_accel(Backend::burst(), Some(0x7000_0000))?;
    assert_lines(
        &art.header,
        &[
            "#define ACCEL_ADDR ((volatile unsigned long long *) 0x70000000)",
            "#define BURST_SIZE_REG (*(ACCEL_ADDR + 9))",
            "#define WAIT_FOR_DONE { while (!DONE_VALID_REG); volatile unsigned long long x = DONE_REG; (void) x; }",
        ],
    );
    Ok(())
}
#[test]
fn artifacts_agree_on_offsets() -> RegResult<()> {
    for (backend, base) in [(Backend::narrow(), None), (Backend::burst(), Some(0x1000))] {
        let art = compile_accel(backend, base)?;
        for slot in art.map.iter() {
            let hw = format!("`define {} {}", slot.name, slot.offset);
            let sw = format!("#define {}_REG (*(ACCEL_ADDR + {}))", slot.name, slot.offset);
            assert_lines(&art.verilog, &[hw.as_str()]);
            assert_lines(&art.header, &[sw.as_str()]);
        }
    }
    Ok(())
}
#[test]
fn it_writes_channel_macros() -> RegResult<()> {
    let src = "pixel, 8, unsigned, input, channel\nresult, 8, unsigned, output, channel";
    let spec = parse_str(src)?;
    let art = compile(&spec, &CompileOptions::new("px", Backend::narrow()))?;
    assert_lines(
        &art.header,
        &[
            "#define SET_PIXEL(X) { while (!PIXEL_READY_REG); PIXEL_REG = X; }",
            "#define GET_RESULT(X) { while (!RESULT_VALID_REG); X = RESULT_REG; }",
        ],
    );
    Ok(())
}
#[test]
fn go_done_need_channels() -> RegResult<()> {
    let spec = parse_str("go, 1, unsigned, input, wire\ndone, 1, unsigned, input, channel")?;
    let map = allocate(&spec, &Backend::narrow())?;
    let go = &spec.signals[0];
    let mac = AccessMacro::for_signal(go, map.data_slot("go").unwrap(), None);
    assert_eq!(mac.signature(), "SET_GO(X)");
    let done = &spec.signals[1];
    let mac = AccessMacro::for_signal(
        done,
        map.data_slot("done").unwrap(),
        map.control_slot("done"),
    );
    assert_eq!(mac.signature(), "SET_DONE(X)");
    assert_eq!(
        mac.body("unsigned int"),
        "{ while (!DONE_READY_REG); DONE_REG = X; }"
    );
    Ok(())
}
#[test]
fn it_compiles_empty() -> RegResult<()> {
    let art = compile(&InterfaceSpec::new(), &CompileOptions::new("cat", Backend::narrow()))?;
    assert!(art.map.is_empty());
    assert!(art.handshakes.is_empty());
    assert!(!art.verilog.contains("register_bank"));
    assert_lines(&art.verilog, &["input we", "rd_reg <= 32'h00000000;"]);
    assert!(!art.header.contains("ACCEL_ADDR +"));
    assert!(!art.header.contains("convenience"));
    Ok(())
}
#[test]
fn it_checks_options() -> RegResult<()> {
    // Burst has no default base address
    let opts = CompileOptions::new("cat", Backend::burst());
    assert!(matches!(opts.base_address(), Err(RegError::Str(_))));
    let opts = CompileOptionsBuilder::default()
        .instance_name("cat")
        .backend(BackendKind::Burst)
        .base_address(0x7000_0000u64)
        .build()
        .unwrap();
    assert_eq!(opts.base_address()?, 0x7000_0000);
    assert_eq!(opts.module_name, DEFAULT_MODULE_NAME);
    // An explicit address overrides the narrow default
    let mut opts = CompileOptions::new("cat", Backend::narrow());
    assert_eq!(opts.base_address()?, 0xA000_0000);
    opts.base_address = Some(0xB000_0000);
    assert_eq!(opts.base_address()?, 0xB000_0000);
    // Names must be identifiers
    let opts = CompileOptions::new("bad name", Backend::narrow());
    assert!(compile(&InterfaceSpec::new(), &opts).is_err());
    assert_eq!(include_guard("my-accel"), "MY_ACCEL_REGS_H");
    Ok(())
}
#[test]
fn it_names_outputs() {
    let opts = CompileOptions::new("cat", Backend::burst());
    assert_eq!(opts.verilog_path("out"), Path::new("out/cat_accel.v"));
    assert_eq!(
        opts.header_path("out", "specs/accel.spec"),
        Path::new("out/accel.sw.h")
    );
    let opts = CompileOptions::new("cat", Backend::narrow());
    assert_eq!(opts.header_path("out", "accel.spec"), Path::new("out/accel.h"));
}

/// Helper function: names declared as ports, wires, regs, or instances in module `module_name` of `verilog`
fn declared_names(verilog: &str, module_name: &str) -> Vec<String> {
    let header = format!("module {} (", module_name);
    let mut names = Vec::new();
    let mut inside = false;
    for line in lines(verilog) {
        if line == header {
            inside = true;
            continue;
        }
        if !inside {
            continue;
        }
        if line == "endmodule" {
            break;
        }
        let decl = line.split('=').next().unwrap_or("").trim();
        let decl = decl.trim_end_matches(|c: char| c == ';' || c == ',' || c == '(').trim();
        let first = decl.split(' ').next().unwrap_or("");
        let name = match first {
            "input" | "output" | "wire" | "reg" => decl.split(' ').last(),
            _ if decl.starts_with(&format!("{} u_", first)) => decl.split(' ').nth(1),
            _ => None,
        };
        if let Some(name) = name {
            names.push(name.split('[').next().unwrap_or("").to_string());
        }
    }
    names
}
#[test]
fn declarations_are_unique() -> RegResult<()> {
    for (backend, base) in [(Backend::narrow(), None), (Backend::burst(), Some(0x7000_0000))] {
        let art = compile_accel(backend, base)?;
        let names = declared_names(&art.verilog, DEFAULT_MODULE_NAME);
        for expected in ["clock", "go_ready", "go_valid", "relu_tz", "rd_reg", "addr_offset", "u_cat"] {
            assert!(names.iter().any(|n| n == expected), "`{}` not declared", expected);
        }
        let mut seen = std::collections::HashSet::new();
        for name in names.iter() {
            assert!(seen.insert(name), "`{}` declared twice", name);
        }
    }
    Ok(())
}
#[test]
fn it_compiles_files() -> RegResult<()> {
    let dir = tempfile::tempdir()?;
    let opts = CompileOptions::new("cat", Backend::narrow());
    let written = compile_file(resource("accel.spec"), dir.path(), &opts)?;
    assert_eq!(written.verilog, dir.path().join("cat_accel.v"));
    assert_eq!(written.header, dir.path().join("accel.h"));
    assert_eq!(std::fs::read_to_string(&written.verilog)?, written.artifacts.verilog);
    assert_eq!(std::fs::read_to_string(&written.header)?, written.artifacts.header);
    // Nothing but the two artifacts is left behind
    assert_eq!(std::fs::read_dir(dir.path())?.count(), 2);
    Ok(())
}
#[test]
fn failures_write_nothing() -> RegResult<()> {
    let src_dir = tempfile::tempdir()?;
    let spec_path = src_dir.path().join("wide.spec");
    std::fs::write(&spec_path, "go, 1, unsigned, input, channel\nx, 33, unsigned, input, wire\n")?;

    let out_dir = tempfile::tempdir()?;
    let opts = CompileOptions::new("cat", Backend::narrow());
    let err = compile_file(&spec_path, out_dir.path(), &opts).unwrap_err();
    assert!(matches!(err, RegError::UnsupportedWidth { line: 2, .. }));
    assert_eq!(std::fs::read_dir(out_dir.path())?.count(), 0);

    // Missing base address. Earlier outputs are left as they were.
    let stale = out_dir.path().join("cat_accel.v");
    std::fs::write(&stale, "stale")?;
    let opts = CompileOptions::new("cat", Backend::burst());
    assert!(compile_file(resource("accel.spec"), out_dir.path(), &opts).is_err());
    assert_eq!(std::fs::read_to_string(&stale)?, "stale");
    assert_eq!(std::fs::read_dir(out_dir.path())?.count(), 1);

    // Missing spec file
    let missing = src_dir.path().join("missing.spec");
    let err = compile_file(&missing, out_dir.path(), &opts).unwrap_err();
    assert!(matches!(err, RegError::Io(_)));
    Ok(())
}

/// Helper function: Assert that `data` equals the content in YAML file `fname`
fn check_yaml<T>(data: &T, fname: impl AsRef<Path>)
where
    T: Eq + std::fmt::Debug + serde::de::DeserializeOwned,
{
    let golden: T = Yaml.open(fname).unwrap();
    assert_eq!(*data, golden);
}
/// Helper function: Grab the full path of resource-file `fname`
fn resource(rname: &str) -> String {
    format!("{}/resources/{}", env!("CARGO_MANIFEST_DIR"), rname)
}
