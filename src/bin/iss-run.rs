//! Demo host: binds [`iss_kernel::services::HostServices`] to a flat sparse
//! memory plus a UART-like MMIO output sink, loads an ELF image's `.text`
//! section at a fixed base address, and drives the kernel's `run`/`step`
//! loop. This binary plays the "host process" spec.md §1 calls out as an
//! external collaborator; it demonstrates the interface without being part
//! of it.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use clap::Parser;
use clap_num::maybe_hex;
use elf::endian::AnyEndian;
use elf::ElfBytes;
use iss_kernel::config::Config;
use iss_kernel::cpu::Cpu;
use iss_kernel::services::HostServices;
use queues::{IsQueue, Queue};
use rustyline::DefaultEditor;

/// Run a RISC-V ELF image through the instruction-dispatch engine.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to the input ELF image.
    input: String,

    /// Address the `.text` section is loaded at (use 0x prefix for hex).
    #[arg(short, long, value_parser=maybe_hex::<u64>, default_value = "0x1000")]
    base: u64,

    /// Memory-mapped address a store sends a character to the UART sink.
    #[arg(long, value_parser=maybe_hex::<u64>, default_value = "0x8000_0000")]
    uart_addr: u64,

    /// Enable the per-step trace-log configuration flag.
    #[arg(short, long)]
    trace: bool,

    /// Single-step interactively, one instruction per Enter press.
    #[arg(short, long)]
    interactive: bool,

    /// Run at most this many instructions (0 means run until halt).
    #[arg(short, long, default_value_t = 0)]
    cycles: u64,
}

/// Flat byte-addressed memory over a sparse map, plus a one-address UART
/// sink. Unmapped reads return zero, matching the "host trusted to
/// implement its address space" contract of spec.md §7.
struct FlatMemory {
    bytes: BTreeMap<u64, u8>,
    uart_addr: u64,
    uart_out: Queue<char>,
}

impl FlatMemory {
    fn new(uart_addr: u64) -> Self {
        Self {
            bytes: BTreeMap::new(),
            uart_addr,
            uart_out: Queue::new(),
        }
    }

    fn load(&self, addr: u64, width: u64) -> u64 {
        let mut value = 0u64;
        for i in 0..width {
            let byte = *self.bytes.get(&(addr + i)).unwrap_or(&0);
            value |= (byte as u64) << (8 * i);
        }
        value
    }

    fn store(&mut self, addr: u64, width: u64, value: u64) {
        if addr == self.uart_addr {
            self.uart_out.add((value & 0xff) as u8 as char).ok();
            return;
        }
        for i in 0..width {
            let byte = ((value >> (8 * i)) & 0xff) as u8;
            self.bytes.insert(addr + i, byte);
        }
    }

    fn flush_uart(&mut self) -> String {
        let mut out = String::new();
        while let Ok(ch) = self.uart_out.remove() {
            out.push(ch);
        }
        out
    }
}

/// The `HostServices` binding. Memory lives behind an `Rc<RefCell<_>>` so
/// `main` can hold onto a second handle after the only-owner `Box<dyn
/// HostServices>` has moved into the `Cpu`, and flush the UART sink between
/// runs the way the teacher's `emulate.rs` drains its UART channel from a
/// second thread.
struct Host {
    memory: Rc<RefCell<FlatMemory>>,
}

impl HostServices for Host {
    fn mem_load_8(&mut self, addr: u64) -> u8 {
        self.memory.borrow().load(addr, 1) as u8
    }
    fn mem_store_8(&mut self, addr: u64, value: u8) {
        self.memory.borrow_mut().store(addr, 1, value as u64)
    }
    fn mem_load_16(&mut self, addr: u64) -> u16 {
        self.memory.borrow().load(addr, 2) as u16
    }
    fn mem_store_16(&mut self, addr: u64, value: u16) {
        self.memory.borrow_mut().store(addr, 2, value as u64)
    }
    fn mem_load_32(&mut self, addr: u64) -> u32 {
        self.memory.borrow().load(addr, 4) as u32
    }
    fn mem_store_32(&mut self, addr: u64, value: u32) {
        self.memory.borrow_mut().store(addr, 4, value as u64)
    }
    fn mem_load_64(&mut self, addr: u64) -> u64 {
        self.memory.borrow().load(addr, 8)
    }
    fn mem_store_64(&mut self, addr: u64, value: u64) {
        self.memory.borrow_mut().store(addr, 8, value)
    }

    fn log_trace(&mut self, step: u64, pc: u64, registers: &[u64; 32]) {
        log::debug!("step {step}: pc={pc:#010x} x1={:#018x} x2={:#018x}", registers[1], registers[2]);
    }

    fn log_msg(&mut self, msg: &str) {
        log::info!("{msg}");
    }

    fn panic(&mut self, msg: &str) {
        log::error!("fatal: {msg}");
    }
}

/// Loads a RISC-V ELF image's `.text` section into `memory` starting at
/// `base`, matching `elf_utils::read_text_instructions`'s use of the `elf`
/// crate in the teacher crate this binary is descended from.
fn load_elf(memory: &mut FlatMemory, path: &str, base: u64) {
    let file_data = std::fs::read(path).expect("could not read ELF image");
    let file = ElfBytes::<AnyEndian>::minimal_parse(file_data.as_slice()).expect("not a valid ELF file");
    let text_shdr = file
        .section_header_by_name(".text")
        .expect("section .text should be parseable")
        .expect("file should have a .text section");
    let (data, compression) = file.section_data(&text_shdr).expect("valid section data in .text");
    if compression.is_some() {
        panic!("unexpected compression in .text section");
    }
    for (i, &byte) in data.iter().enumerate() {
        memory.store(base + i as u64, 1, byte as u64);
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut boot_image = FlatMemory::new(args.uart_addr);
    load_elf(&mut boot_image, &args.input, args.base);
    let memory = Rc::new(RefCell::new(boot_image));

    let mut cpu = Cpu::init(Box::new(Host {
        memory: Rc::clone(&memory),
    }));
    cpu.pc_set(args.base);
    if args.trace {
        cpu.config_set(Config::TRACE_LOG);
    }

    if args.interactive {
        // The host-facing API (§6) exposes only `cpu_run(cycles)`, not a
        // bare single-step; `cpu_run(1)` retires exactly one instruction
        // and leaves `running` set for the next call, which is what lets
        // this loop step one instruction per Enter press.
        let mut editor = DefaultEditor::new().expect("failed to start line editor");
        loop {
            match editor.readline("(step) ") {
                Ok(_) => {
                    cpu.run(1);
                    print!("{}", memory.borrow_mut().flush_uart());
                    println!("pc={:#x} running={}", cpu.pc_get(), cpu.is_running());
                    if !cpu.is_running() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    } else {
        let retired = cpu.run(args.cycles);
        print!("{}", memory.borrow_mut().flush_uart());
        println!("retired {retired} instructions");
    }

    println!("x10 (a0) = {:#x}", cpu.reg_get(10));
}
