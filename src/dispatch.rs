//! Fetch/dispatch loop (§4.E): fetch the word at PC, find the matching
//! descriptor, invoke its execute function, advance PC if the instruction
//! did not write it, update statistics, and surface the halt condition.

use std::sync::atomic::Ordering;

use crate::config::Config;
use crate::cpu::Cpu;
use crate::error::FatalError;
use crate::isa::rv64i::{EBREAK_BITS, EBREAK_MASK};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// `step` was called while the CPU was not running.
    NotRunning,
    /// One instruction retired normally.
    Ran,
    /// `ebreak` retired; the CPU is now halted.
    Halted,
    /// The fetched word matched no registered descriptor; the host's
    /// `panic` callback has already been invoked and the CPU is halted.
    Fault,
}

impl Cpu {
    /// Runs exactly one fetch-decode-execute-retire cycle.
    pub fn step(&mut self) -> StepOutcome {
        if !self.is_running() {
            return StepOutcome::NotRunning;
        }

        let pc = self.pc;
        let instr = self.load_32(pc);

        if (instr & EBREAK_MASK) == EBREAK_BITS {
            self.retire();
            self.halt();
            return StepOutcome::Halted;
        }

        let descriptor = match self.registry.lookup(instr) {
            Some(descriptor) => *descriptor,
            None => {
                self.host
                    .panic(&FatalError::UnrecognizedInstruction(instr).message());
                self.halt();
                return StepOutcome::Fault;
            }
        };

        let pc_written = (descriptor.execute)(self, instr);
        if !pc_written {
            self.pc = self.pc.wrapping_add(4);
        }
        self.retire();

        StepOutcome::Ran
    }

    /// Steps until either `cycles` instructions have retired or the CPU
    /// halts. `cycles == 0` means "run until halt". Returns the number of
    /// instructions retired, including the halting `ebreak` if any.
    pub fn run(&mut self, cycles: u64) -> u64 {
        self.running.store(true, Ordering::Relaxed);
        let mut retired = 0u64;
        loop {
            match self.step() {
                StepOutcome::Ran => {
                    retired += 1;
                    if cycles != 0 && retired >= cycles {
                        break;
                    }
                }
                StepOutcome::Halted => {
                    retired += 1;
                    break;
                }
                StepOutcome::Fault | StepOutcome::NotRunning => break,
            }
        }
        retired
    }

    /// Bumps the instruction counter and emits a trace record if configured.
    /// Shared by the normal retire path and the ebreak fast path: per §8's
    /// concrete scenarios, the halting ebreak itself counts toward
    /// `stats.instructions`, even though it never reaches the descriptor's
    /// `execute`.
    fn retire(&mut self) {
        self.stats.instructions += 1;
        self.step_count += 1;
        if self.config.contains(Config::TRACE_LOG) {
            let snapshot = self.registers.snapshot();
            let pc = self.pc;
            let step = self.step_count;
            self.host.log_trace(step, pc, &snapshot);
        }
    }
}
