//! CPU state (§4.B): the register file, program counter, statistics,
//! configuration flags, and the bound host-services vector, plus the
//! instruction registry they dispatch through. The CPU owns everything here
//! exclusively; it never owns memory, which always crosses `host`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::Config;
use crate::descriptor::Descriptor;
use crate::error::FatalError;
use crate::registers::Registers;
use crate::registry::Registry;
use crate::services::HostServices;
use crate::stats::Stats;

/// Signals a host may raise against a running CPU (§5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Halt,
}

/// A cheap, `Send + Sync` handle that can halt a running CPU from a thread
/// other than the one driving `run`/`step`. Obtain one with
/// [`Cpu::run_handle`] before starting a run loop elsewhere; it touches
/// nothing but the relaxed-atomic running flag the concurrency model
/// singles out as the one piece of state safe to share that way.
#[derive(Clone)]
pub struct RunHandle(Arc<AtomicBool>);

impl RunHandle {
    pub fn signal(&self, signal: Signal) {
        match signal {
            Signal::Halt => self.0.store(false, Ordering::Relaxed),
        }
    }

    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

pub struct Cpu {
    pub(crate) registers: Registers,
    pub(crate) pc: u64,
    pub(crate) stats: Stats,
    pub(crate) config: Config,
    pub(crate) host: Box<dyn HostServices>,
    pub(crate) registry: Registry,
    pub(crate) running: Arc<AtomicBool>,
    pub(crate) step_count: u64,
}

impl Cpu {
    /// Binds host services and resets architectural state: registers, pc,
    /// and stats all zero; config is cleared; running is false. Installs the
    /// base RV64I/RV64M instruction set.
    pub fn init(host: Box<dyn HostServices>) -> Self {
        let mut registry = Registry::new();
        crate::isa::install_base_isa(&mut registry);
        Self {
            registers: Registers::new(),
            pc: 0,
            stats: Stats::default(),
            config: Config::NONE,
            host,
            registry,
            running: Arc::new(AtomicBool::new(false)),
            step_count: 0,
        }
    }

    /// Registers additional instruction descriptors after the base ISA.
    /// Earlier-registered variants still take precedence on overlap.
    pub fn extend_isa(&mut self, descriptors: &[Descriptor]) {
        self.registry.append(descriptors);
    }

    pub fn config_set(&mut self, flags: Config) {
        self.config = flags;
    }

    pub fn config_get(&self) -> Config {
        self.config
    }

    pub fn stats_report(&self) -> Stats {
        self.stats
    }

    /// Register-file read with the §3 invariants: an out-of-range index is
    /// fatal, forwarded to the host's `panic`. Reading 0 returns 0.
    pub fn reg_get(&mut self, index: i64) -> u64 {
        match self.registers.checked_get(index) {
            Some(value) => value,
            None => {
                self.host.panic(&FatalError::RegisterOutOfRange(index).message());
                0
            }
        }
    }

    /// Register-file write with the §3 invariants: an out-of-range index is
    /// fatal. Writing 0 is a silent no-op.
    pub fn reg_set(&mut self, index: i64, value: u64) {
        if !self.registers.checked_set(index, value) {
            self.host.panic(&FatalError::RegisterOutOfRange(index).message());
        }
    }

    pub fn pc_get(&self) -> u64 {
        self.pc
    }

    pub fn pc_set(&mut self, value: u64) {
        self.pc = value;
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub fn run_handle(&self) -> RunHandle {
        RunHandle(Arc::clone(&self.running))
    }

    pub fn signal(&self, signal: Signal) {
        self.run_handle().signal(signal);
    }

    pub fn disasm(&self, instr: u32) -> String {
        crate::disasm::format_instruction(&self.registry, instr)
    }

    /// Forwards a debugging/informational message to the bound host,
    /// unrelated to the per-instruction trace log.
    pub fn log_msg(&mut self, msg: &str) {
        self.host.log_msg(msg);
    }

    pub(crate) fn halt(&mut self) {
        self.running.store(false, Ordering::Relaxed);
    }

    pub(crate) fn reg(&self, index: u8) -> u64 {
        self.registers.get(index)
    }

    pub(crate) fn set_reg(&mut self, index: u8, value: u64) {
        self.registers.set(index, value);
    }

    pub(crate) fn load_8(&mut self, addr: u64) -> u8 {
        self.stats.loads += 1;
        self.host.mem_load_8(addr)
    }

    pub(crate) fn load_16(&mut self, addr: u64) -> u16 {
        self.stats.loads += 1;
        self.host.mem_load_16(addr)
    }

    pub(crate) fn load_32(&mut self, addr: u64) -> u32 {
        self.stats.loads += 1;
        self.host.mem_load_32(addr)
    }

    pub(crate) fn load_64(&mut self, addr: u64) -> u64 {
        self.stats.loads += 1;
        self.host.mem_load_64(addr)
    }

    pub(crate) fn store_8(&mut self, addr: u64, value: u8) {
        self.stats.stores += 1;
        self.host.mem_store_8(addr, value);
    }

    pub(crate) fn store_16(&mut self, addr: u64, value: u16) {
        self.stats.stores += 1;
        self.host.mem_store_16(addr, value);
    }

    pub(crate) fn store_32(&mut self, addr: u64, value: u32) {
        self.stats.stores += 1;
        self.host.mem_store_32(addr, value);
    }

    pub(crate) fn store_64(&mut self, addr: u64, value: u64) {
        self.stats.stores += 1;
        self.host.mem_store_64(addr, value);
    }
}
