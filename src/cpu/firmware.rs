//! Firmware-call emulator (C7, spec.md §4.7): emulated resident-firmware
//! entry points invoked by a software-interrupt trap when no real
//! firmware image is loaded.
//!
//! # References
//! - `examples/original_source/src/bios.c` (`gba_syscall`)

use super::flags::Mode;
use super::Cpu;
use crate::bus::Bus;
use crate::error::CoreError;

/// Signed division: `R0 = n / d` (truncated toward zero), `R1 = n mod d`,
/// `R3 = |R0|`.
pub const CALL_DIV: u8 = 0x06;

/// Dispatch an emulated firmware call by its 8-bit call number (already
/// extracted from the originating SWI opcode by the A-mode/T-mode
/// decoder — see `src/cpu/firmware.rs` module docs and `DESIGN.md`) and
/// perform the trap-return sequence ("MOVS PC, R14_svc").
pub fn dispatch_swi(cpu: &mut Cpu, bus: &mut dyn Bus, call_number: u8) -> Result<(), CoreError> {
    match call_number {
        CALL_DIV => div(cpu),
        other => {
            return Err(CoreError::unimplemented(format!(
                "firmware call 0x{:02X}",
                other
            )))
        }
    }
    cpu.return_from_trap(Mode::Svc, bus)
}

/// `spec.md` §8 invariant 12: for all (n, d) with d≠0 and n≠i32::MIN,
/// `R0*d + R1 == n` and `R3 == |R0|`. Uses the wrapping forms so a caller
/// that does pass `n == i32::MIN, d == -1` gets the two's-complement
/// truncating result instead of a panic (spec.md §7 does not list
/// division overflow as a fatal condition).
fn div(cpu: &mut Cpu) {
    let n = cpu.read_reg(0) as i32;
    let d = cpu.read_reg(1) as i32;
    let quotient = n.wrapping_div(d);
    let remainder = n.wrapping_rem(d);
    cpu.write_reg(0, quotient as u32);
    cpu.write_reg(1, remainder as u32);
    cpu.write_reg(3, quotient.unsigned_abs());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::TestBus;

    fn setup_in_swi_trap(r0: i32, r1: i32) -> (Cpu, TestBus) {
        let mut bus = TestBus::new(0x1000);
        let mut cpu = Cpu::new();
        cpu.skip_bios();
        cpu.reload_pipeline(&mut bus).unwrap();
        cpu.enter_swi(&mut bus).unwrap();
        cpu.write_reg(0, r0 as u32);
        cpu.write_reg(1, r1 as u32);
        (cpu, bus)
    }

    #[test]
    fn signed_division_basic() {
        let (mut cpu, mut bus) = setup_in_swi_trap(-100, 7);
        dispatch_swi(&mut cpu, &mut bus, CALL_DIV).unwrap();
        assert_eq!(cpu.read_reg(0) as i32, -14);
        assert_eq!(cpu.read_reg(1) as i32, -2);
        assert_eq!(cpu.read_reg(3), 14);
    }

    #[test]
    fn signed_division_invariant_holds_across_samples() {
        for (n, d) in [(100, 7), (-100, 7), (100, -7), (-100, -7), (7, 100), (0, 5)] {
            let (mut cpu, mut bus) = setup_in_swi_trap(n, d);
            dispatch_swi(&mut cpu, &mut bus, CALL_DIV).unwrap();
            let quot = cpu.read_reg(0) as i32;
            let rem = cpu.read_reg(1) as i32;
            let abs = cpu.read_reg(3) as i32;
            assert_eq!(quot.wrapping_mul(d).wrapping_add(rem), n);
            assert_eq!(abs, quot.wrapping_abs());
        }
    }

    #[test]
    fn unknown_call_number_is_unimplemented_error() {
        let (mut cpu, mut bus) = setup_in_swi_trap(0, 1);
        let err = dispatch_swi(&mut cpu, &mut bus, 0xFF).unwrap_err();
        assert!(matches!(err, CoreError::UnimplementedOperation(_)));
    }
}
