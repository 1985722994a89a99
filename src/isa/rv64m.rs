//! RV64M semantics (§4.D): the multiply-subset this kernel implements. Per
//! spec.md §9, `mulh*`, `div*`, `rem*`, and their `*w` forms are Open
//! Questions the spec explicitly forbids guessing at, so this table holds
//! only `mul`.

use crate::bits::{self, FUNCT3_MASK, FUNCT7_MASK, OPCODE_MASK};
use crate::cpu::Cpu;
use crate::descriptor::Descriptor;
use crate::disasm;

const OP: u32 = 0b011_0011;

fn disasm_mul(instr: u32) -> String {
    format!(
        "mul {}, {}, {}",
        disasm::reg(bits::rd(instr)),
        disasm::reg(bits::rs1(instr)),
        disasm::reg(bits::rs2(instr))
    )
}

/// `rd = low64(signed(rs1) * signed(rs2))`. The high half of the 128-bit
/// product is discarded, matching `mulh`/`mulhsu`/`mulhu`'s job description
/// rather than this one's; those remain unimplemented.
fn exec_mul(cpu: &mut Cpu, instr: u32) -> bool {
    let rd = bits::rd(instr);
    let a = cpu.reg(bits::rs1(instr)) as i64;
    let b = cpu.reg(bits::rs2(instr)) as i64;
    cpu.set_reg(rd, a.wrapping_mul(b) as u64);
    false
}

pub static DESCRIPTORS: &[Descriptor] = &[Descriptor::new(
    "mul",
    OPCODE_MASK | FUNCT3_MASK | FUNCT7_MASK,
    bits::opcode_bits(OP) | bits::funct3_bits(0b000) | bits::funct7_bits(0b0000001),
    disasm_mul,
    exec_mul,
)];

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_rtype(rd: u32, rs1: u32, rs2: u32) -> u32 {
        bits::funct7_bits(0b0000001)
            | bits::rs2_bits(rs2)
            | bits::rs1_bits(rs1)
            | bits::funct3_bits(0b000)
            | bits::rd_bits(rd)
            | bits::opcode_bits(OP)
    }

    #[test]
    fn mul_multiplies_as_signed_and_keeps_the_low_half() {
        let descriptor = &DESCRIPTORS[0];
        let mut cpu = crate::test_support::new_test_cpu();
        cpu.set_reg(1, (-6i64) as u64);
        cpu.set_reg(2, 7);
        let instr = encode_rtype(3, 1, 2);
        assert!(descriptor.matches(instr));
        (descriptor.execute)(&mut cpu, instr);
        assert_eq!(cpu.reg(3) as i64, -42);
    }

    #[test]
    fn mul_overlaps_add_in_bit_pattern_only_by_distinct_funct7() {
        // Sanity check that mul's funct7 (0000001) cannot be confused with
        // add's (0000000) under the shared opcode/funct3 pair.
        let mul = &DESCRIPTORS[0];
        let add_like = encode_rtype(3, 1, 2) & !bits::funct7_bits(0b0000001);
        assert!(!mul.matches(add_like));
    }
}
