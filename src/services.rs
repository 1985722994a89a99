//! The host-services vector (§3/§4.B): the boundary between the simulated
//! CPU core and whatever process embeds it. The core never touches memory
//! or performs I/O directly; every access crosses this trait, matching the
//! eight typed load/store callbacks plus the three logging callbacks the
//! specification calls for.

/// Callbacks a host binds at [`crate::cpu::Cpu::init`]. All methods are
/// treated as total and infallible; `panic` is the sole fatal-error exit and
/// is expected not to return, though the dispatch loop copes if it does.
pub trait HostServices {
    fn mem_load_8(&mut self, addr: u64) -> u8;
    fn mem_store_8(&mut self, addr: u64, value: u8);
    fn mem_load_16(&mut self, addr: u64) -> u16;
    fn mem_store_16(&mut self, addr: u64, value: u16);
    fn mem_load_32(&mut self, addr: u64) -> u32;
    fn mem_store_32(&mut self, addr: u64, value: u32);
    fn mem_load_64(&mut self, addr: u64) -> u64;
    fn mem_store_64(&mut self, addr: u64, value: u64);

    /// Invoked once per retired instruction when `Config::TRACE_LOG` is set.
    fn log_trace(&mut self, step: u64, pc: u64, registers: &[u64; 32]);
    /// Debugging/informational message, unrelated to trace-log stepping.
    fn log_msg(&mut self, msg: &str);
    /// Fatal error report. Should not return; if it does, the CPU clears
    /// `running` and exits its dispatch loop regardless.
    fn panic(&mut self, msg: &str);
}
