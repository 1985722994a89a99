//! RV64I semantics (§4.D): one disassemble/execute pair per variant plus the
//! static descriptor table that registers them. All RV64 integer operations
//! work on 64-bit registers; the `*w` variants compute a 32-bit result and
//! sign-extend it back to 64 bits before writing `rd`.

use crate::bits::{self, FUNCT3_MASK, FUNCT6_MASK, FUNCT7_MASK, OPCODE_MASK, RD_MASK, RS1_MASK, RS2_MASK};
use crate::cpu::Cpu;
use crate::descriptor::Descriptor;
use crate::disasm;

const OP_IMM: u32 = 0b001_0011;
const OP: u32 = 0b011_0011;
const LUI: u32 = 0b011_0111;
const LOAD: u32 = 0b000_0011;
const STORE: u32 = 0b010_0011;
const JAL: u32 = 0b110_1111;
const JALR: u32 = 0b110_0111;
const BRANCH: u32 = 0b110_0011;
const SYSTEM: u32 = 0b111_0011;
const OP_IMM_32: u32 = 0b001_1011;
const OP_32: u32 = 0b011_1011;

/// Exact 32-bit encoding of `ebreak` (opcode SYSTEM, rd=0, funct3=0, rs1=0,
/// rs2=1, funct7=0). Shared with [`crate::dispatch`]'s fast-path check,
/// which short-circuits before the registry lookup reaches this descriptor.
pub const EBREAK_MASK: u32 = OPCODE_MASK | RD_MASK | FUNCT3_MASK | RS1_MASK | RS2_MASK | FUNCT7_MASK;
pub const EBREAK_BITS: u32 = bits::opcode_bits(SYSTEM)
    | bits::rd_bits(0)
    | bits::funct3_bits(0)
    | bits::rs1_bits(0)
    | bits::rs2_bits(1)
    | bits::funct7_bits(0);

// ---------- register-immediate ALU ----------

fn disasm_addi(instr: u32) -> String {
    format!(
        "addi {}, {}, {}",
        disasm::reg(bits::rd(instr)),
        disasm::reg(bits::rs1(instr)),
        disasm::imm(bits::imm_i(instr))
    )
}

fn exec_addi(cpu: &mut Cpu, instr: u32) -> bool {
    let rd = bits::rd(instr);
    let rs1 = cpu.reg(bits::rs1(instr));
    let imm = bits::imm_i(instr);
    cpu.set_reg(rd, rs1.wrapping_add(imm as u64));
    false
}

fn disasm_xori(instr: u32) -> String {
    format!(
        "xori {}, {}, {}",
        disasm::reg(bits::rd(instr)),
        disasm::reg(bits::rs1(instr)),
        disasm::imm(bits::imm_i(instr))
    )
}

fn exec_xori(cpu: &mut Cpu, instr: u32) -> bool {
    let rd = bits::rd(instr);
    let rs1 = cpu.reg(bits::rs1(instr));
    let imm = bits::imm_i(instr) as u64;
    cpu.set_reg(rd, rs1 ^ imm);
    false
}

fn disasm_ori(instr: u32) -> String {
    format!(
        "ori {}, {}, {}",
        disasm::reg(bits::rd(instr)),
        disasm::reg(bits::rs1(instr)),
        disasm::imm(bits::imm_i(instr))
    )
}

fn exec_ori(cpu: &mut Cpu, instr: u32) -> bool {
    let rd = bits::rd(instr);
    let rs1 = cpu.reg(bits::rs1(instr));
    let imm = bits::imm_i(instr) as u64;
    cpu.set_reg(rd, rs1 | imm);
    false
}

fn disasm_andi(instr: u32) -> String {
    format!(
        "andi {}, {}, {}",
        disasm::reg(bits::rd(instr)),
        disasm::reg(bits::rs1(instr)),
        disasm::imm(bits::imm_i(instr))
    )
}

fn exec_andi(cpu: &mut Cpu, instr: u32) -> bool {
    let rd = bits::rd(instr);
    let rs1 = cpu.reg(bits::rs1(instr));
    let imm = bits::imm_i(instr) as u64;
    cpu.set_reg(rd, rs1 & imm);
    false
}

// ---------- register-immediate shifts ----------

fn disasm_slli(instr: u32) -> String {
    format!(
        "slli {}, {}, {}",
        disasm::reg(bits::rd(instr)),
        disasm::reg(bits::rs1(instr)),
        disasm::imm(bits::shamt6(instr) as i64)
    )
}

fn exec_slli(cpu: &mut Cpu, instr: u32) -> bool {
    let rd = bits::rd(instr);
    let rs1 = cpu.reg(bits::rs1(instr));
    let shamt = bits::shamt6(instr);
    cpu.set_reg(rd, rs1 << shamt);
    false
}

fn disasm_srli(instr: u32) -> String {
    format!(
        "srli {}, {}, {}",
        disasm::reg(bits::rd(instr)),
        disasm::reg(bits::rs1(instr)),
        disasm::imm(bits::shamt6(instr) as i64)
    )
}

fn exec_srli(cpu: &mut Cpu, instr: u32) -> bool {
    let rd = bits::rd(instr);
    let rs1 = cpu.reg(bits::rs1(instr));
    let shamt = bits::shamt6(instr);
    cpu.set_reg(rd, rs1 >> shamt);
    false
}

fn disasm_srai(instr: u32) -> String {
    format!(
        "srai {}, {}, {}",
        disasm::reg(bits::rd(instr)),
        disasm::reg(bits::rs1(instr)),
        disasm::imm(bits::shamt6(instr) as i64)
    )
}

fn exec_srai(cpu: &mut Cpu, instr: u32) -> bool {
    let rd = bits::rd(instr);
    let rs1 = cpu.reg(bits::rs1(instr)) as i64;
    let shamt = bits::shamt6(instr);
    cpu.set_reg(rd, (rs1 >> shamt) as u64);
    false
}

// ---------- register-register ALU ----------

fn disasm_add(instr: u32) -> String {
    format!(
        "add {}, {}, {}",
        disasm::reg(bits::rd(instr)),
        disasm::reg(bits::rs1(instr)),
        disasm::reg(bits::rs2(instr))
    )
}

fn exec_add(cpu: &mut Cpu, instr: u32) -> bool {
    let rd = bits::rd(instr);
    let a = cpu.reg(bits::rs1(instr));
    let b = cpu.reg(bits::rs2(instr));
    cpu.set_reg(rd, a.wrapping_add(b));
    false
}

fn disasm_sub(instr: u32) -> String {
    format!(
        "sub {}, {}, {}",
        disasm::reg(bits::rd(instr)),
        disasm::reg(bits::rs1(instr)),
        disasm::reg(bits::rs2(instr))
    )
}

fn exec_sub(cpu: &mut Cpu, instr: u32) -> bool {
    let rd = bits::rd(instr);
    let a = cpu.reg(bits::rs1(instr));
    let b = cpu.reg(bits::rs2(instr));
    cpu.set_reg(rd, a.wrapping_sub(b));
    false
}

fn disasm_sll(instr: u32) -> String {
    format!(
        "sll {}, {}, {}",
        disasm::reg(bits::rd(instr)),
        disasm::reg(bits::rs1(instr)),
        disasm::reg(bits::rs2(instr))
    )
}

fn exec_sll(cpu: &mut Cpu, instr: u32) -> bool {
    let rd = bits::rd(instr);
    let a = cpu.reg(bits::rs1(instr));
    let shamt = cpu.reg(bits::rs2(instr)) & 0x3f;
    cpu.set_reg(rd, a << shamt);
    false
}

fn disasm_srl(instr: u32) -> String {
    format!(
        "srl {}, {}, {}",
        disasm::reg(bits::rd(instr)),
        disasm::reg(bits::rs1(instr)),
        disasm::reg(bits::rs2(instr))
    )
}

fn exec_srl(cpu: &mut Cpu, instr: u32) -> bool {
    let rd = bits::rd(instr);
    let a = cpu.reg(bits::rs1(instr));
    let shamt = cpu.reg(bits::rs2(instr)) & 0x3f;
    cpu.set_reg(rd, a >> shamt);
    false
}

fn disasm_sra(instr: u32) -> String {
    format!(
        "sra {}, {}, {}",
        disasm::reg(bits::rd(instr)),
        disasm::reg(bits::rs1(instr)),
        disasm::reg(bits::rs2(instr))
    )
}

fn exec_sra(cpu: &mut Cpu, instr: u32) -> bool {
    let rd = bits::rd(instr);
    let a = cpu.reg(bits::rs1(instr)) as i64;
    let shamt = cpu.reg(bits::rs2(instr)) & 0x3f;
    cpu.set_reg(rd, (a >> shamt) as u64);
    false
}

// ---------- upper immediate ----------

fn disasm_lui(instr: u32) -> String {
    let imm20 = bits::extract(instr, 31, 12) as i64;
    format!("lui {}, {}", disasm::reg(bits::rd(instr)), disasm::imm(imm20))
}

fn exec_lui(cpu: &mut Cpu, instr: u32) -> bool {
    let rd = bits::rd(instr);
    let imm = bits::imm_u(instr);
    cpu.set_reg(rd, imm as u64);
    false
}

// ---------- loads ----------

fn disasm_lw(instr: u32) -> String {
    format!(
        "lw {}, {}",
        disasm::reg(bits::rd(instr)),
        disasm::mem_operand(bits::imm_i(instr), bits::rs1(instr))
    )
}

fn exec_lw(cpu: &mut Cpu, instr: u32) -> bool {
    let rd = bits::rd(instr);
    let base = cpu.reg(bits::rs1(instr));
    let addr = base.wrapping_add(bits::imm_i(instr) as u64);
    let value = cpu.load_32(addr) as i32 as i64 as u64;
    cpu.set_reg(rd, value);
    false
}

fn disasm_ld(instr: u32) -> String {
    format!(
        "ld {}, {}",
        disasm::reg(bits::rd(instr)),
        disasm::mem_operand(bits::imm_i(instr), bits::rs1(instr))
    )
}

fn exec_ld(cpu: &mut Cpu, instr: u32) -> bool {
    let rd = bits::rd(instr);
    let base = cpu.reg(bits::rs1(instr));
    let addr = base.wrapping_add(bits::imm_i(instr) as u64);
    let value = cpu.load_64(addr);
    cpu.set_reg(rd, value);
    false
}

// ---------- stores ----------

fn disasm_sw(instr: u32) -> String {
    format!(
        "sw {}, {}",
        disasm::reg(bits::rs2(instr)),
        disasm::mem_operand(bits::imm_s(instr), bits::rs1(instr))
    )
}

fn exec_sw(cpu: &mut Cpu, instr: u32) -> bool {
    let base = cpu.reg(bits::rs1(instr));
    let addr = base.wrapping_add(bits::imm_s(instr) as u64);
    let value = cpu.reg(bits::rs2(instr)) as u32;
    cpu.store_32(addr, value);
    false
}

fn disasm_sd(instr: u32) -> String {
    format!(
        "sd {}, {}",
        disasm::reg(bits::rs2(instr)),
        disasm::mem_operand(bits::imm_s(instr), bits::rs1(instr))
    )
}

fn exec_sd(cpu: &mut Cpu, instr: u32) -> bool {
    let base = cpu.reg(bits::rs1(instr));
    let addr = base.wrapping_add(bits::imm_s(instr) as u64);
    let value = cpu.reg(bits::rs2(instr));
    cpu.store_64(addr, value);
    false
}

// ---------- control transfer ----------

fn disasm_jal(instr: u32) -> String {
    format!(
        "jal {}, {}",
        disasm::reg(bits::rd(instr)),
        disasm::imm(bits::imm_j(instr))
    )
}

fn exec_jal(cpu: &mut Cpu, instr: u32) -> bool {
    let rd = bits::rd(instr);
    let link = cpu.pc_get().wrapping_add(4);
    let target = cpu.pc_get().wrapping_add(bits::imm_j(instr) as u64);
    cpu.set_reg(rd, link);
    cpu.pc_set(target);
    true
}

fn disasm_jalr(instr: u32) -> String {
    format!(
        "jalr {}, {}",
        disasm::reg(bits::rd(instr)),
        disasm::mem_operand(bits::imm_i(instr), bits::rs1(instr))
    )
}

fn exec_jalr(cpu: &mut Cpu, instr: u32) -> bool {
    let rd = bits::rd(instr);
    let link = cpu.pc_get().wrapping_add(4);
    // Captured before rd is written, so `jalr x1, x1, 0` is well-defined.
    let base = cpu.reg(bits::rs1(instr));
    let target = base.wrapping_add(bits::imm_i(instr) as u64) & !1u64;
    cpu.set_reg(rd, link);
    cpu.pc_set(target);
    true
}

fn branch(cpu: &mut Cpu, instr: u32, taken: bool) -> bool {
    if taken {
        let target = cpu.pc_get().wrapping_add(bits::imm_b(instr) as u64);
        cpu.pc_set(target);
        true
    } else {
        false
    }
}

fn disasm_beq(instr: u32) -> String {
    format!(
        "beq {}, {}, {}",
        disasm::reg(bits::rs1(instr)),
        disasm::reg(bits::rs2(instr)),
        disasm::imm(bits::imm_b(instr))
    )
}

fn exec_beq(cpu: &mut Cpu, instr: u32) -> bool {
    let a = cpu.reg(bits::rs1(instr));
    let b = cpu.reg(bits::rs2(instr));
    branch(cpu, instr, a == b)
}

fn disasm_bne(instr: u32) -> String {
    format!(
        "bne {}, {}, {}",
        disasm::reg(bits::rs1(instr)),
        disasm::reg(bits::rs2(instr)),
        disasm::imm(bits::imm_b(instr))
    )
}

fn exec_bne(cpu: &mut Cpu, instr: u32) -> bool {
    let a = cpu.reg(bits::rs1(instr));
    let b = cpu.reg(bits::rs2(instr));
    branch(cpu, instr, a != b)
}

fn disasm_blt(instr: u32) -> String {
    format!(
        "blt {}, {}, {}",
        disasm::reg(bits::rs1(instr)),
        disasm::reg(bits::rs2(instr)),
        disasm::imm(bits::imm_b(instr))
    )
}

fn exec_blt(cpu: &mut Cpu, instr: u32) -> bool {
    let a = cpu.reg(bits::rs1(instr)) as i64;
    let b = cpu.reg(bits::rs2(instr)) as i64;
    branch(cpu, instr, a < b)
}

fn disasm_bge(instr: u32) -> String {
    format!(
        "bge {}, {}, {}",
        disasm::reg(bits::rs1(instr)),
        disasm::reg(bits::rs2(instr)),
        disasm::imm(bits::imm_b(instr))
    )
}

fn exec_bge(cpu: &mut Cpu, instr: u32) -> bool {
    let a = cpu.reg(bits::rs1(instr)) as i64;
    let b = cpu.reg(bits::rs2(instr)) as i64;
    branch(cpu, instr, a >= b)
}

fn disasm_bltu(instr: u32) -> String {
    format!(
        "bltu {}, {}, {}",
        disasm::reg(bits::rs1(instr)),
        disasm::reg(bits::rs2(instr)),
        disasm::imm(bits::imm_b(instr))
    )
}

fn exec_bltu(cpu: &mut Cpu, instr: u32) -> bool {
    let a = cpu.reg(bits::rs1(instr));
    let b = cpu.reg(bits::rs2(instr));
    branch(cpu, instr, a < b)
}

fn disasm_bgeu(instr: u32) -> String {
    format!(
        "bgeu {}, {}, {}",
        disasm::reg(bits::rs1(instr)),
        disasm::reg(bits::rs2(instr)),
        disasm::imm(bits::imm_b(instr))
    )
}

fn exec_bgeu(cpu: &mut Cpu, instr: u32) -> bool {
    let a = cpu.reg(bits::rs1(instr));
    let b = cpu.reg(bits::rs2(instr));
    branch(cpu, instr, a >= b)
}

// ---------- environment ----------

fn disasm_ebreak(_instr: u32) -> String {
    "ebreak".to_string()
}

/// Reachable only if a host calls `execute` directly without going through
/// `Cpu::step`'s fast path; kept so the registry's own invariant (every
/// matched encoding dispatches to a real descriptor) holds without a special
/// case.
fn exec_ebreak(cpu: &mut Cpu, _instr: u32) -> bool {
    cpu.halt();
    true
}

// ---------- word-width variants ----------

fn disasm_addiw(instr: u32) -> String {
    format!(
        "addiw {}, {}, {}",
        disasm::reg(bits::rd(instr)),
        disasm::reg(bits::rs1(instr)),
        disasm::imm(bits::imm_i(instr))
    )
}

fn exec_addiw(cpu: &mut Cpu, instr: u32) -> bool {
    let rd = bits::rd(instr);
    let rs1 = cpu.reg(bits::rs1(instr)) as i64;
    let imm = bits::imm_i(instr);
    let result32 = rs1.wrapping_add(imm) as i32;
    cpu.set_reg(rd, result32 as i64 as u64);
    false
}

fn disasm_addw(instr: u32) -> String {
    format!(
        "addw {}, {}, {}",
        disasm::reg(bits::rd(instr)),
        disasm::reg(bits::rs1(instr)),
        disasm::reg(bits::rs2(instr))
    )
}

fn exec_addw(cpu: &mut Cpu, instr: u32) -> bool {
    let rd = bits::rd(instr);
    let a = cpu.reg(bits::rs1(instr)) as i64;
    let b = cpu.reg(bits::rs2(instr)) as i64;
    let result32 = a.wrapping_add(b) as i32;
    cpu.set_reg(rd, result32 as i64 as u64);
    false
}

pub static DESCRIPTORS: &[Descriptor] = &[
    Descriptor::new(
        "addi",
        mask_op_f3_const(),
        bits::opcode_bits(OP_IMM) | bits::funct3_bits(0b000),
        disasm_addi,
        exec_addi,
    ),
    Descriptor::new(
        "xori",
        mask_op_f3_const(),
        bits::opcode_bits(OP_IMM) | bits::funct3_bits(0b100),
        disasm_xori,
        exec_xori,
    ),
    Descriptor::new(
        "ori",
        mask_op_f3_const(),
        bits::opcode_bits(OP_IMM) | bits::funct3_bits(0b110),
        disasm_ori,
        exec_ori,
    ),
    Descriptor::new(
        "andi",
        mask_op_f3_const(),
        bits::opcode_bits(OP_IMM) | bits::funct3_bits(0b111),
        disasm_andi,
        exec_andi,
    ),
    Descriptor::new(
        "slli",
        mask_op_f3_f6_const(),
        bits::opcode_bits(OP_IMM) | bits::funct3_bits(0b001) | bits::funct6_bits(0b000000),
        disasm_slli,
        exec_slli,
    ),
    Descriptor::new(
        "srli",
        mask_op_f3_f6_const(),
        bits::opcode_bits(OP_IMM) | bits::funct3_bits(0b101) | bits::funct6_bits(0b000000),
        disasm_srli,
        exec_srli,
    ),
    Descriptor::new(
        "srai",
        mask_op_f3_f6_const(),
        bits::opcode_bits(OP_IMM) | bits::funct3_bits(0b101) | bits::funct6_bits(0b010000),
        disasm_srai,
        exec_srai,
    ),
    Descriptor::new(
        "add",
        mask_op_f3_f7_const(),
        bits::opcode_bits(OP) | bits::funct3_bits(0b000) | bits::funct7_bits(0b0000000),
        disasm_add,
        exec_add,
    ),
    Descriptor::new(
        "sub",
        mask_op_f3_f7_const(),
        bits::opcode_bits(OP) | bits::funct3_bits(0b000) | bits::funct7_bits(0b0100000),
        disasm_sub,
        exec_sub,
    ),
    Descriptor::new(
        "sll",
        mask_op_f3_f7_const(),
        bits::opcode_bits(OP) | bits::funct3_bits(0b001) | bits::funct7_bits(0b0000000),
        disasm_sll,
        exec_sll,
    ),
    Descriptor::new(
        "srl",
        mask_op_f3_f7_const(),
        bits::opcode_bits(OP) | bits::funct3_bits(0b101) | bits::funct7_bits(0b0000000),
        disasm_srl,
        exec_srl,
    ),
    Descriptor::new(
        "sra",
        mask_op_f3_f7_const(),
        bits::opcode_bits(OP) | bits::funct3_bits(0b101) | bits::funct7_bits(0b0100000),
        disasm_sra,
        exec_sra,
    ),
    Descriptor::new(
        "lui",
        OPCODE_MASK,
        bits::opcode_bits(LUI),
        disasm_lui,
        exec_lui,
    ),
    Descriptor::new(
        "lw",
        mask_op_f3_const(),
        bits::opcode_bits(LOAD) | bits::funct3_bits(0b010),
        disasm_lw,
        exec_lw,
    ),
    Descriptor::new(
        "ld",
        mask_op_f3_const(),
        bits::opcode_bits(LOAD) | bits::funct3_bits(0b011),
        disasm_ld,
        exec_ld,
    ),
    Descriptor::new(
        "sw",
        mask_op_f3_const(),
        bits::opcode_bits(STORE) | bits::funct3_bits(0b010),
        disasm_sw,
        exec_sw,
    ),
    Descriptor::new(
        "sd",
        mask_op_f3_const(),
        bits::opcode_bits(STORE) | bits::funct3_bits(0b011),
        disasm_sd,
        exec_sd,
    ),
    Descriptor::new(
        "jal",
        OPCODE_MASK,
        bits::opcode_bits(JAL),
        disasm_jal,
        exec_jal,
    ),
    Descriptor::new(
        "jalr",
        mask_op_f3_const(),
        bits::opcode_bits(JALR) | bits::funct3_bits(0b000),
        disasm_jalr,
        exec_jalr,
    ),
    Descriptor::new(
        "beq",
        mask_op_f3_const(),
        bits::opcode_bits(BRANCH) | bits::funct3_bits(0b000),
        disasm_beq,
        exec_beq,
    ),
    Descriptor::new(
        "bne",
        mask_op_f3_const(),
        bits::opcode_bits(BRANCH) | bits::funct3_bits(0b001),
        disasm_bne,
        exec_bne,
    ),
    Descriptor::new(
        "blt",
        mask_op_f3_const(),
        bits::opcode_bits(BRANCH) | bits::funct3_bits(0b100),
        disasm_blt,
        exec_blt,
    ),
    Descriptor::new(
        "bge",
        mask_op_f3_const(),
        bits::opcode_bits(BRANCH) | bits::funct3_bits(0b101),
        disasm_bge,
        exec_bge,
    ),
    Descriptor::new(
        "bltu",
        mask_op_f3_const(),
        bits::opcode_bits(BRANCH) | bits::funct3_bits(0b110),
        disasm_bltu,
        exec_bltu,
    ),
    Descriptor::new(
        "bgeu",
        mask_op_f3_const(),
        bits::opcode_bits(BRANCH) | bits::funct3_bits(0b111),
        disasm_bgeu,
        exec_bgeu,
    ),
    Descriptor::new("ebreak", EBREAK_MASK, EBREAK_BITS, disasm_ebreak, exec_ebreak),
    Descriptor::new(
        "addiw",
        mask_op_f3_const(),
        bits::opcode_bits(OP_IMM_32) | bits::funct3_bits(0b000),
        disasm_addiw,
        exec_addiw,
    ),
    Descriptor::new(
        "addw",
        mask_op_f3_f7_const(),
        bits::opcode_bits(OP_32) | bits::funct3_bits(0b000) | bits::funct7_bits(0b0000000),
        disasm_addw,
        exec_addw,
    ),
];

const fn mask_op_f3_const() -> u32 {
    OPCODE_MASK | FUNCT3_MASK
}

const fn mask_op_f3_f6_const() -> u32 {
    OPCODE_MASK | FUNCT3_MASK | FUNCT6_MASK
}

const fn mask_op_f3_f7_const() -> u32 {
    OPCODE_MASK | FUNCT3_MASK | FUNCT7_MASK
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(name: &str) -> &'static Descriptor {
        DESCRIPTORS.iter().find(|d| d.name == name).unwrap()
    }

    fn encode_itype(opcode: u32, rd: u32, funct3: u32, rs1: u32, imm: i64) -> u32 {
        let imm_bits = (imm as i32 as u32) & 0xfff;
        (imm_bits << 20) | bits::rs1_bits(rs1) | bits::funct3_bits(funct3) | bits::rd_bits(rd) | bits::opcode_bits(opcode)
    }

    fn encode_rtype(opcode: u32, rd: u32, funct3: u32, rs1: u32, rs2: u32, funct7: u32) -> u32 {
        bits::funct7_bits(funct7)
            | bits::rs2_bits(rs2)
            | bits::rs1_bits(rs1)
            | bits::funct3_bits(funct3)
            | bits::rd_bits(rd)
            | bits::opcode_bits(opcode)
    }

    #[test]
    fn addi_adds_a_sign_extended_immediate() {
        let descriptor = find("addi");
        let instr = encode_itype(OP_IMM, 1, 0b000, 0, -1);
        assert!(descriptor.matches(instr));
        let mut cpu = crate::test_support::new_test_cpu();
        let pc_written = (descriptor.execute)(&mut cpu, instr);
        assert!(!pc_written);
        assert_eq!(cpu.reg(1), 0xffff_ffff_ffff_ffff);
    }

    #[test]
    fn addi_to_x0_is_discarded() {
        let descriptor = find("addi");
        let instr = encode_itype(OP_IMM, 0, 0b000, 0, 42);
        let mut cpu = crate::test_support::new_test_cpu();
        (descriptor.execute)(&mut cpu, instr);
        assert_eq!(cpu.reg(0), 0);
    }

    #[test]
    fn slli_and_srli_use_the_full_six_bit_shamt() {
        let slli = find("slli");
        let mut cpu = crate::test_support::new_test_cpu();
        cpu.set_reg(1, 1);
        let instr = (0b111111u32 << 20) | bits::rs1_bits(1) | bits::funct3_bits(0b001) | bits::rd_bits(2) | bits::opcode_bits(OP_IMM);
        assert!(slli.matches(instr));
        (slli.execute)(&mut cpu, instr);
        assert_eq!(cpu.reg(2), 1u64 << 63);
    }

    #[test]
    fn srai_performs_an_arithmetic_shift() {
        let srai = find("srai");
        let mut cpu = crate::test_support::new_test_cpu();
        cpu.set_reg(1, 0xffff_ffff_ffff_ff00);
        let instr = (0b010000u32 << 26) | (4u32 << 20) | bits::rs1_bits(1) | bits::funct3_bits(0b101) | bits::rd_bits(2) | bits::opcode_bits(OP_IMM);
        assert!(srai.matches(instr));
        (srai.execute)(&mut cpu, instr);
        assert_eq!(cpu.reg(2), 0xffff_ffff_ffff_fff0);
    }

    #[test]
    fn srli_performs_a_logical_shift() {
        let srli = find("srli");
        let mut cpu = crate::test_support::new_test_cpu();
        cpu.set_reg(1, 0xffff_ffff_ffff_ff00);
        let instr = (0u32 << 26) | (4u32 << 20) | bits::rs1_bits(1) | bits::funct3_bits(0b101) | bits::rd_bits(2) | bits::opcode_bits(OP_IMM);
        assert!(srli.matches(instr));
        (srli.execute)(&mut cpu, instr);
        assert_eq!(cpu.reg(2), 0x0fff_ffff_ffff_fff0);
    }

    #[test]
    fn blt_is_signed_and_bltu_is_unsigned() {
        let blt = find("blt");
        let bltu = find("bltu");
        let mut cpu = crate::test_support::new_test_cpu();
        cpu.set_reg(1, u64::MAX); // -1 as signed
        cpu.set_reg(2, 0);
        let instr = encode_rtype_like_branch(1, 2, 8);

        let mut blt_cpu = crate::test_support::new_test_cpu();
        blt_cpu.set_reg(1, u64::MAX);
        blt_cpu.set_reg(2, 0);
        let pc_before = blt_cpu.pc_get();
        (blt.execute)(&mut blt_cpu, instr);
        assert_eq!(blt_cpu.pc_get(), pc_before.wrapping_add(8));

        let pc_before_u = cpu.pc_get();
        (bltu.execute)(&mut cpu, instr);
        assert_eq!(cpu.pc_get(), pc_before_u);
    }

    fn encode_rtype_like_branch(rs1: u32, rs2: u32, offset: i64) -> u32 {
        let b12 = ((offset >> 12) & 1) as u32;
        let b11 = ((offset >> 11) & 1) as u32;
        let b10_5 = ((offset >> 5) & 0x3f) as u32;
        let b4_1 = ((offset >> 1) & 0xf) as u32;
        (b12 << 31) | (b10_5 << 25) | bits::rs2_bits(rs2) | bits::rs1_bits(rs1) | (b4_1 << 8) | (b11 << 7) | bits::opcode_bits(BRANCH)
    }

    #[test]
    fn jalr_captures_the_link_before_overwriting_rs1_equal_rd() {
        let jalr = find("jalr");
        let mut cpu = crate::test_support::new_test_cpu();
        cpu.pc_set(0x2000);
        cpu.set_reg(1, 0x4000);
        let instr = encode_itype(JALR, 1, 0b000, 1, 0);
        (jalr.execute)(&mut cpu, instr);
        assert_eq!(cpu.reg(1), 0x2004);
        assert_eq!(cpu.pc_get(), 0x4000);
    }

    #[test]
    fn addiw_sign_extends_the_32_bit_result() {
        let addiw = find("addiw");
        let mut cpu = crate::test_support::new_test_cpu();
        let instr = encode_itype(OP_IMM_32, 1, 0b000, 0, -1);
        (addiw.execute)(&mut cpu, instr);
        assert_eq!(cpu.reg(1), 0xffff_ffff_ffff_ffff);
    }

    #[test]
    fn addw_truncates_then_sign_extends() {
        let addw = find("addw");
        let mut cpu = crate::test_support::new_test_cpu();
        cpu.set_reg(1, 0x7fff_ffff);
        cpu.set_reg(2, 1);
        let instr = encode_rtype(OP_32, 3, 0b000, 1, 2, 0b0000000);
        (addw.execute)(&mut cpu, instr);
        assert_eq!(cpu.reg(3), 0xffff_ffff_8000_0000);
    }

    #[test]
    fn ebreak_descriptor_halts_without_moving_pc() {
        let ebreak = find("ebreak");
        let mut cpu = crate::test_support::new_test_cpu();
        cpu.run(0); // mark running so halt() has something to clear
        let pc_before = cpu.pc_get();
        let pc_written = (ebreak.execute)(&mut cpu, EBREAK_BITS);
        assert!(pc_written);
        assert_eq!(cpu.pc_get(), pc_before);
        assert!(!cpu.is_running());
    }
}
