//! Acceptance-level CPU tests, driven through the public [`Cpu::step`] run
//! loop rather than calling family executors directly (unit coverage for
//! those lives alongside each family in `a_mode.rs`/`t_mode.rs` etc.).
//!
//! Organized into:
//! - `scenarios`: the seven concrete end-to-end walkthroughs from spec.md §8
//! - `modes`: the banked-register/SPSR invariants from spec.md §8 (1-4)
//! - `a_mode` / `t_mode`: additional per-family coverage via `step()`
//! - `shifter`: the exhaustive barrel-shifter table (spec.md §8 invariant 8)
//! - `firmware`: the signed-division call exercised through a real SWI trap
//!
//! # References
//! - `examples/hunterchen7-ti84ce/core/src/cpu/tests/mod.rs` (suite layout)

use super::*;
use crate::bus::TestBus;

mod a_mode;

/// Build a CPU with `bytes` loaded at `pc` and the pipeline primed so the
/// first `step()` decodes them, mirroring how the teacher's integration
/// tests poke bytes ahead of `cpu.step(&mut bus)`.
fn setup(pc: u32, bytes: &[u8]) -> (Cpu, TestBus) {
    let mut bus = TestBus::new(0x10000);
    bus.load(pc, bytes);
    let mut cpu = Cpu::with_options(CpuOptions { skip_bios: false });
    cpu.write_reg(15, pc);
    cpu.reload_pipeline(&mut bus).unwrap();
    (cpu, bus)
}

fn setup_thumb(pc: u32, bytes: &[u8]) -> (Cpu, TestBus) {
    let mut bus = TestBus::new(0x10000);
    bus.load(pc, bytes);
    let mut cpu = Cpu::with_options(CpuOptions { skip_bios: false });
    cpu.set_thumb(true);
    cpu.write_reg(15, pc);
    cpu.reload_pipeline(&mut bus).unwrap();
    (cpu, bus)
}
