//! Mode/trap manager (C6, spec.md §4.6): software-interrupt trap entry,
//! external-interrupt entry, and the undefined-instruction response.
//!
//! # References
//! - `examples/original_source/src/interrupt.c` (`interrupt_pending`,
//!   `handle_interrupt`)
//! - `examples/original_source/src/cpu/arm.c` (SWI entry sequence)

use super::flags::{self, Mode};
use super::Cpu;
use crate::bus::Bus;
use crate::error::CoreError;

/// Fixed entry vectors (spec.md §6).
pub const VECTOR_RESET: u32 = 0x00;
pub const VECTOR_SWI: u32 = 0x08;
pub const VECTOR_UNDEFINED: u32 = 0x04;
pub const VECTOR_IRQ: u32 = 0x18;

impl Cpu {
    /// `interrupt_pending` (spec.md §4.6): master-enable set, CPSR I-bit
    /// clear, and `(IE & IF & 0x3FFF) != 0`.
    pub fn irq_pending(&self, bus: &dyn Bus) -> bool {
        let ime = bus.interrupt_master_enable();
        let irq_disabled = self.cpsr() & flags::IRQ_DISABLE != 0;
        let possible = bus.interrupt_enable() & bus.interrupt_request() & 0x3FFF != 0;
        ime && !irq_disabled && possible
    }

    /// Software-interrupt trap entry (spec.md §4.4, §4.6): bank the
    /// return address and CPSR into SVC's slot, force
    /// {I masked, A-mode, SVC}, vector to 0x08, reload the pipeline. The
    /// prefetch offset (2 in T-mode, 4 in A-mode) is already folded into
    /// `self.pc()` vs. the instruction address relationship maintained by
    /// the pipeline, so the return address is simply `pc() - offset`.
    pub fn enter_swi(&mut self, bus: &mut dyn Bus) -> Result<(), CoreError> {
        let offset = if self.thumb() { 2 } else { 4 };
        let return_pc = self.pc().wrapping_sub(offset);
        self.save_status(Mode::Svc);
        self.write_reg_in(14, return_pc, Mode::Svc);

        self.set_thumb(false);
        self.set_mode(Mode::Svc);
        self.set_cpsr(self.cpsr() | flags::IRQ_DISABLE);
        self.write_reg(15, VECTOR_SWI);
        self.reload_pipeline(bus)
    }

    /// External-interrupt entry (spec.md §4.6): bank the adjusted return
    /// address and CPSR into IRQ's slot, force {I masked, A-mode, IRQ},
    /// vector to 0x18, reload the pipeline. The return address is the
    /// current PC unadjusted in T-mode, PC−4 in A-mode (matching
    /// `interrupt.c`'s `handle_interrupt`).
    pub fn enter_irq(&mut self, bus: &mut dyn Bus) -> Result<(), CoreError> {
        let offset = if self.thumb() { 0 } else { 4 };
        let return_pc = self.pc().wrapping_sub(offset);
        self.save_status(Mode::Irq);
        self.write_reg_in(14, return_pc, Mode::Irq);

        self.set_thumb(false);
        self.set_mode(Mode::Irq);
        self.set_cpsr(self.cpsr() | flags::IRQ_DISABLE);
        self.write_reg(15, VECTOR_IRQ);
        self.reload_pipeline(bus)
    }

    /// Exit a trap via the "MOVS PC, R14_<mode>" idiom: restore CPSR from
    /// the bank's SPSR, restore PC from the bank's R14, reload the
    /// pipeline.
    pub fn return_from_trap(&mut self, mode: Mode, bus: &mut dyn Bus) -> Result<(), CoreError> {
        let return_pc = self.read_reg_in(14, mode);
        self.restore_status(mode);
        self.write_reg(15, return_pc);
        self.reload_pipeline(bus)
    }

    /// Undefined-instruction response (spec.md §4.4 family 5, §4.6, §7):
    /// fatal in this core. The UND bank entry sequence is architecturally
    /// permitted but not required, and this core does not perform it
    /// (spec.md §4.6).
    pub fn undefined_instruction(&self, opcode: u32, addr: u32) -> CoreError {
        CoreError::UndefinedInstruction { opcode, pc: addr }
    }
}
