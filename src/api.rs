//! The stable, versioned host-facing API surface (§6). [`crate::cpu::Cpu`]
//! already exposes every one of these as an inherent method; this module
//! exists to name the literal host-interface contract spec.md §6 describes
//! ("each API call takes or implies an explicit CPU handle", §9's redesign
//! flag against a process-wide singleton) and to publish [`info`], which has
//! no natural home on `Cpu` itself since it is a property of the crate, not
//! of any one instance.

use crate::cpu::{Cpu, Signal};
use crate::stats::Stats;

/// API version this crate implements, per §6's `info()` contract.
pub const API_VERSION: &str = "1.0";

/// Returns the `"key=value"` tag list a host can use to detect feature
/// support without linking against a specific crate version.
pub fn info() -> &'static [&'static str] {
    &[
        "api=1.0",
        "isa=rv64i+rv64m",
        "xlen=64",
    ]
}

/// Decodes one instruction into `"0x%.8x   mnemonic operands"`, or `"?"`
/// in the mnemonic position for an encoding no registered descriptor
/// recognizes.
pub fn disasm(cpu: &Cpu, instr: u32) -> String {
    cpu.disasm(instr)
}

/// Forwards a debugging/informational message to the bound host.
pub fn log_msg(cpu: &mut Cpu, msg: &str) {
    cpu.log_msg(msg);
}

pub fn config_set(cpu: &mut Cpu, flags: crate::config::Config) {
    cpu.config_set(flags);
}

pub fn config_get(cpu: &Cpu) -> crate::config::Config {
    cpu.config_get()
}

pub fn stats_report(cpu: &Cpu) -> Stats {
    cpu.stats_report()
}

pub fn reg_get(cpu: &mut Cpu, index: i64) -> u64 {
    cpu.reg_get(index)
}

pub fn reg_set(cpu: &mut Cpu, index: i64, value: u64) {
    cpu.reg_set(index, value);
}

pub fn pc_get(cpu: &Cpu) -> u64 {
    cpu.pc_get()
}

pub fn pc_set(cpu: &mut Cpu, value: u64) {
    cpu.pc_set(value);
}

pub fn cpu_running(cpu: &Cpu) -> bool {
    cpu.is_running()
}

pub fn cpu_signal(cpu: &Cpu, signal: Signal) {
    cpu.signal(signal);
}

pub fn cpu_run(cpu: &mut Cpu, cycles: u64) -> u64 {
    cpu.run(cycles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_advertises_the_api_version() {
        assert!(info().contains(&"api=1.0"));
    }

    #[test]
    fn unrecognized_encodings_disassemble_to_a_bare_question_mark() {
        let cpu = crate::test_support::new_test_cpu();
        let rendered = disasm(&cpu, 0xffff_ffff);
        assert!(rendered.ends_with("?"));
    }
}
