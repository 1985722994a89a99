//! Demo host: batch-disassembles a raw little-endian instruction image,
//! four bytes per line, using the same `Registry`/`disasm` path the kernel
//! uses internally — no CPU state is touched, only decode + format.

use clap::Parser;
use clap_num::maybe_hex;
use iss_kernel::cpu::Cpu;
use iss_kernel::services::HostServices;

/// Disassemble a raw RV64IM instruction image, one word per 4 bytes.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to a raw binary image (no ELF headers).
    input: String,

    /// Address of the first word, for display purposes only.
    #[arg(short, long, value_parser=maybe_hex::<u64>, default_value = "0x0")]
    base: u64,
}

/// A host with no memory or logging behavior; `iss-disasm` never steps the
/// CPU, so none of these callbacks are ever invoked, but `Cpu::init` still
/// requires a bound `HostServices` per §4.B.
struct NullHost;

impl HostServices for NullHost {
    fn mem_load_8(&mut self, _addr: u64) -> u8 {
        0
    }
    fn mem_store_8(&mut self, _addr: u64, _value: u8) {}
    fn mem_load_16(&mut self, _addr: u64) -> u16 {
        0
    }
    fn mem_store_16(&mut self, _addr: u64, _value: u16) {}
    fn mem_load_32(&mut self, _addr: u64) -> u32 {
        0
    }
    fn mem_store_32(&mut self, _addr: u64, _value: u32) {}
    fn mem_load_64(&mut self, _addr: u64) -> u64 {
        0
    }
    fn mem_store_64(&mut self, _addr: u64, _value: u64) {}
    fn log_trace(&mut self, _step: u64, _pc: u64, _registers: &[u64; 32]) {}
    fn log_msg(&mut self, _msg: &str) {}
    fn panic(&mut self, _msg: &str) {}
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let bytes = std::fs::read(&args.input).expect("could not read input image");
    let cpu = Cpu::init(Box::new(NullHost));

    for (i, chunk) in bytes.chunks(4).enumerate() {
        if chunk.len() < 4 {
            log::warn!("trailing {} byte(s) ignored, not a full word", chunk.len());
            break;
        }
        let word = u32::from_le_bytes(chunk.try_into().unwrap());
        let addr = args.base + (i as u64) * 4;
        println!("{addr:#010x}: {}", cpu.disasm(word));
    }
}
