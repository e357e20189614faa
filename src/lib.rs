//! ARM7TDMI-class instruction core
//!
//! A cycle-counted interpreter for the ARM7TDMI instruction set: two
//! parallel 32-bit/16-bit encodings (A-mode/T-mode), seven processor modes
//! with register banking, a barrel shifter, a two-slot prefetch pipeline,
//! and a software-interrupt trap with a minimal emulated resident firmware
//! (signed division). No memory map, pixel/audio engine, ROM loading, or
//! host-facing I/O lives here — those are the responsibility of a host
//! providing a [`bus::Bus`] implementation (`SPEC_FULL.md` non-goals).
//!
//! # Architecture
//!
//! - `cpu`: the interpreter itself — register file, shifter, pipeline,
//!   A-mode/T-mode decoders, trap manager, firmware-call emulator
//! - `bus`: the memory/interrupt-register contract a host implements
//! - `error`: the fatal/collaborator error taxonomy `Cpu::step` surfaces
//!
//! # Entry point
//!
//! Construct a [`cpu::Cpu`], hand it a [`bus::Bus`] implementation, and
//! call [`cpu::Cpu::step`] in a loop:
//!
//! ```
//! use arm7tdmi_core::bus::TestBus;
//! use arm7tdmi_core::cpu::{Cpu, CpuOptions};
//!
//! let mut bus = TestBus::new(0x1000);
//! let mut cpu = Cpu::with_options(CpuOptions { skip_bios: true });
//! let cycles = cpu.step(&mut bus).unwrap();
//! assert!(cycles > 0);
//! ```

pub mod bus;
pub mod cpu;
pub mod error;

pub use bus::{Bus, TestBus};
pub use cpu::flags::{Condition, Mode};
pub use cpu::{Cpu, CpuOptions};
pub use error::{BusError, CoreError};
