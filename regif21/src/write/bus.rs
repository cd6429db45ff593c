//!
//! # Fixed Bus-Protocol Text
//!
//! Port lists, defines, and helper modules shared by every generated wrapper of a backend.
//!

use crate::backend::BackendKind;

/// Module port: direction, range, name
pub(crate) type Port = (&'static str, &'static str, &'static str);

/// Register-bank slave ports, common to both backends
pub(crate) fn slave_ports(kind: BackendKind) -> Vec<Port> {
    let (addr, data, strb) = match kind {
        BackendKind::Narrow => ("[15:0]", "[31:0]", "[3:0]"),
        BackendKind::Burst => ("[15-`bw_bits:0]", "[`data_bits-1:0]", "[`strb_bits-1:0]"),
    };
    vec![
        ("input", "", "clock"),
        ("input", "", "resetn"),
        ("input", addr, "read_addr"),
        ("output", data, "read_data"),
        ("input", "", "oe"),
        ("input", addr, "write_addr"),
        ("input", data, "write_data"),
        ("input", strb, "be"),
        ("input", "", "we"),
    ]
}

/// Range of the internal bus-address wires
pub(crate) fn address_range(kind: BackendKind) -> &'static str {
    match kind {
        BackendKind::Narrow => "[15:0]",
        BackendKind::Burst => "[15-`bw_bits:0]",
    }
}

/// Internal register-bank names, declared by every wrapper
pub(crate) const BANK_NAMES: &[&str] = &[
    "register_bank",
    "rd_reg",
    "read_address",
    "write_address",
    "read_enable",
    "write_enable",
];

/// Every fixed name a `kind` wrapper declares without a master: ports and register-bank internals
pub(crate) fn reserved_names(kind: BackendKind) -> Vec<&'static str> {
    let mut names: Vec<&'static str> = slave_ports(kind).iter().map(|p| p.2).collect();
    names.extend_from_slice(BANK_NAMES);
    names
}
/// Fixed names a `kind` wrapper adds for its bus master: ports, wiring internals, and the arbiter instance
pub(crate) fn master_names(kind: BackendKind) -> Vec<&'static str> {
    let (ports, internal) = match kind {
        BackendKind::Narrow => (AHB_PORTS, AHB_MASTER_NAMES),
        BackendKind::Burst => (AXI_PORTS, AXI_MASTER_NAMES),
    };
    let mut names: Vec<&'static str> = ports.iter().map(|p| p.2).collect();
    names.extend_from_slice(internal);
    if kind == BackendKind::Narrow {
        names.push("u_bus_arbiter");
    }
    names
}

/// Single-beat (AHB-style) master ports
pub(crate) const AHB_PORTS: &[Port] = &[
    ("output", "[31:0]", "haddr"),
    ("output", "[1:0]", "htrans"),
    ("output", "[2:0]", "hsize"),
    ("output", "", "hwrite"),
    ("input", "", "hready"),
    ("output", "[3:0]", "hprot"),
    ("output", "[2:0]", "hburst"),
    ("output", "[31:0]", "hwdata"),
    ("output", "", "hlock"),
    ("input", "[1:0]", "hresp"),
    ("input", "[31:0]", "hrdata"),
];

/// Burst (AXI-style) master ports
pub(crate) const AXI_PORTS: &[Port] = &[
    ("output", "[`id_bits-1:0]", "AWID"),
    ("output", "[`addr_bits-1:0]", "AWADDR"),
    ("output", "[`len_bits-1:0]", "AWLEN"),
    ("output", "[`size_bits-1:0]", "AWSIZE"),
    ("output", "[`burst_bits-1:0]", "AWBURST"),
    ("output", "[`lock_bits-1:0]", "AWLOCK"),
    ("output", "[`cache_bits-1:0]", "AWCACHE"),
    ("output", "[`prot_bits-1:0]", "AWPROT"),
    ("output", "[`region_bits-1:0]", "AWREGION"),
    ("output", "[`qos_bits-1:0]", "AWQOS"),
    ("output", "", "AWVALID"),
    ("input", "", "AWREADY"),
    ("output", "[`data_bits-1:0]", "WDATA"),
    ("output", "[`strb_bits-1:0]", "WSTRB"),
    ("output", "", "WLAST"),
    ("output", "", "WVALID"),
    ("input", "", "WREADY"),
    ("input", "[`id_bits-1:0]", "BID"),
    ("input", "[`resp_bits-1:0]", "BRESP"),
    ("input", "", "BVALID"),
    ("output", "", "BREADY"),
    ("output", "[`id_bits-1:0]", "ARID"),
    ("output", "[`addr_bits-1:0]", "ARADDR"),
    ("output", "[`len_bits-1:0]", "ARLEN"),
    ("output", "[`size_bits-1:0]", "ARSIZE"),
    ("output", "[`burst_bits-1:0]", "ARBURST"),
    ("output", "[`lock_bits-1:0]", "ARLOCK"),
    ("output", "[`cache_bits-1:0]", "ARCACHE"),
    ("output", "[`prot_bits-1:0]", "ARPROT"),
    ("output", "[`region_bits-1:0]", "ARREGION"),
    ("output", "[`qos_bits-1:0]", "ARQOS"),
    ("output", "", "ARVALID"),
    ("input", "", "ARREADY"),
    ("input", "[`id_bits-1:0]", "RID"),
    ("input", "[`data_bits-1:0]", "RDATA"),
    ("input", "[`resp_bits-1:0]", "RRESP"),
    ("input", "", "RLAST"),
    ("input", "", "RVALID"),
    ("output", "", "RREADY"),
];

/// Burst-bus field widths, as `(name, value)` defines
pub(crate) const AXI_DEFINES: &[(&str, &str)] = &[
    ("bw_bits", "3"),
    ("m_bits", "4"),
    ("id_bits", "4"),
    ("slave_id_bits", "7"),
    ("addr_bits", "32"),
    ("len_bits", "8"),
    ("data_bits", "(8 * (1 << `bw_bits))"),
    ("strb_bits", "(`data_bits/8)"),
    ("size_bits", "3"),
    ("burst_bits", "2"),
    ("lock_bits", "1"),
    ("cache_bits", "4"),
    ("prot_bits", "3"),
    ("resp_bits", "2"),
    ("ruser_bits", "7"),
    ("wuser_bits", "9"),
    ("snoop_bits", "3"),
    ("region_bits", "4"),
    ("qos_bits", "4"),
];

/// Internal signals of the single-beat master wiring.
/// Address padding, which depends on the master width, is written separately.
pub(crate) const AHB_MASTER_DECLS: &[&str] = &[
    "wire [31:0] input_master_din;",
    "wire [29:0] input_master_raddr;",
    "wire        input_master_rrdy;",
    "wire        input_master_re;",
    "wire        input_master_rstn;",
    "wire        input_master_clk;",
    "wire        input_master_triosy;",
    "wire [31:0] output_master_dout;",
    "wire [29:0] output_master_waddr;",
    "wire        output_master_wrdy;",
    "wire        output_master_we;",
    "wire        output_master_rstn;",
    "wire        output_master_clk;",
    "wire        output_master_triosy;",
    "",
    "reg  [2:0]  hsize_local  = 3'b010;",
    "reg  [3:0]  hprot_local  = 4'b0000;",
    "reg  [2:0]  hburst_local = 3'b000;",
    "",
    "assign hsize  = hsize_local;",
    "assign hprot  = hprot_local;",
    "assign hburst = hburst_local;",
    "assign hlock  = 1'b0;",
];

/// Names declared by [AHB_MASTER_DECLS] and [AHB_MASTER_WIRING]
pub(crate) const AHB_MASTER_NAMES: &[&str] = &[
    "input_master_din",
    "input_master_raddr",
    "input_master_rrdy",
    "input_master_re",
    "input_master_rstn",
    "input_master_clk",
    "input_master_triosy",
    "output_master_dout",
    "output_master_waddr",
    "output_master_wrdy",
    "output_master_we",
    "output_master_rstn",
    "output_master_clk",
    "output_master_triosy",
    "hsize_local",
    "hprot_local",
    "hburst_local",
    "hraddr",
    "hwaddr",
    "read_addr_active",
    "write_addr_active",
    "read_data_active",
    "write_data_active",
    "read_done",
    "write_done",
];

/// Single-beat master address, data, and handshake wiring
pub(crate) const AHB_MASTER_WIRING: &[&str] = &[
    "wire [31:0] hraddr = (input_master_raddr << 2) + addr_offset;",
    "wire [31:0] hwaddr = (output_master_waddr << 2) + addr_offset;",
    "",
    "wire        read_addr_active;",
    "wire        write_addr_active;",
    "reg         read_data_active;",
    "reg         write_data_active;",
    "",
    "wire        read_done = read_data_active & hready;",
    "wire        write_done = write_data_active & hready;",
    "",
    "assign haddr = (read_addr_active)  ? hraddr :",
    "               (write_addr_active) ? hwaddr :",
    "               32'h00000000;",
    "assign hwrite = write_addr_active;",
    "assign htrans = (write_addr_active | read_addr_active) ? 2'b10 : 2'b00;",
    "assign hwdata = output_master_dout;",
    "",
    "assign input_master_din = hrdata;",
    "assign input_master_rrdy = read_data_active & hready;",
    "assign output_master_wrdy = write_data_active & hready;",
    "",
    "always @(posedge clock or negedge resetn) begin",
    "  if (resetn == 1'b0) begin",
    "    read_data_active <= 1'b0;",
    "    write_data_active <= 1'b0;",
    "  end else if (hready) begin",
    "    read_data_active <= read_addr_active;",
    "    write_data_active <= write_addr_active;",
    "  end",
    "end",
];

/// Single-beat master resource ports of the HLS core, `(suffix, net)`.
/// The address ports are sliced to the master width separately.
pub(crate) const AHB_CORE_READ_PORTS: &[(&str, &str)] = &[
    ("in_rsc_s_din", "input_master_din"),
    ("in_rsc_s_rrdy", "input_master_rrdy"),
    ("in_rsc_s_re", "input_master_re"),
    ("in_rsc_rstn", "input_master_rstn"),
    ("in_rsc_clk", "input_master_clk"),
    ("in_rsc_triosy_lz", "input_master_triosy"),
];
pub(crate) const AHB_CORE_WRITE_PORTS: &[(&str, &str)] = &[
    ("out_rsc_s_dout", "output_master_dout"),
    ("out_rsc_s_wrdy", "output_master_wrdy"),
    ("out_rsc_s_we", "output_master_we"),
    ("out_rsc_rstn", "output_master_rstn"),
    ("out_rsc_clk", "output_master_clk"),
    ("out_rsc_triosy_lz", "output_master_triosy"),
];

/// Names declared by the burst master wiring, other than its per-signal `triosy` wire
pub(crate) const AXI_MASTER_NAMES: &[&str] = &["m_wstate", "caught_up"];

/// Burst master configuration ports of the HLS core, `(suffix, net)`
pub(crate) const AXI_CORE_CONFIG_PORTS: &[(&str, &str)] = &[
    ("rsc_m_wstate", "m_wstate"),
    ("rsc_m_wCaughtUp", "caught_up"),
    ("rsc_cfgTimeout", "32'd0"),
    ("rsc_cfgrBurstSize", "burst_size"),
    ("rsc_cfgwBurstSize", "burst_size"),
    ("rsc_cfgrBaseAddress", "addr_offset"),
    ("rsc_cfgwBaseAddress", "addr_offset"),
];

/// Single-beat bus arbiter, granting one of the master's read and write ports at a time
pub(crate) const BUS_ARBITER: &[&str] = &[
    "module bus_arbiter (",
    "  input  clock,",
    "  input  resetn,",
    "  input  read_req,",
    "  input  write_req,",
    "  input  read_done,",
    "  input  write_done,",
    "  output read_grant,",
    "  output write_grant",
    ");",
    "",
    "  parameter IDLE  = 2'h0;",
    "  parameter READ  = 2'h1;",
    "  parameter WRITE = 2'h2;",
    "",
    "  reg [1:0] state;",
    "  reg [1:0] next_state;",
    "",
    "  assign read_grant  = (state == READ);",
    "  assign write_grant = (state == WRITE);",
    "",
    "  always @(posedge clock or negedge resetn) begin",
    "    if (resetn == 1'b0) begin",
    "      state <= IDLE;",
    "    end else begin",
    "      state <= next_state;",
    "    end",
    "  end",
    "",
    "  always @(*) begin",
    "    case (state)",
    "      IDLE:    next_state = read_req  ? READ  :",
    "                            write_req ? WRITE : IDLE;",
    "      READ:    next_state = !read_done ? READ  :",
    "                            write_req  ? WRITE : IDLE;",
    "      WRITE:   next_state = !write_done ? WRITE :",
    "                            read_req    ? READ  : IDLE;",
    "      default: next_state = IDLE;",
    "    endcase",
    "  end",
    "",
    "endmodule",
];

/// Arbiter port connections, `(port, net)`
pub(crate) const BUS_ARBITER_CONNECTIONS: &[(&str, &str)] = &[
    ("clock", "clock"),
    ("resetn", "resetn"),
    ("read_req", "input_master_re"),
    ("write_req", "output_master_we"),
    ("read_done", "read_done"),
    ("write_done", "write_done"),
    ("read_grant", "read_addr_active"),
    ("write_grant", "write_addr_active"),
];
