//! Additional A-mode family coverage driven through `Cpu::step`, beyond the
//! family-level unit tests in `a_mode.rs` itself.

use super::setup;

#[test]
fn multiply_accumulate_adds_destination() {
    // MLA R0, R1, R2, R3 (R0 = R1*R2 + R3)
    let (mut cpu, mut bus) = setup(0, &0xE020_3291u32.to_le_bytes());
    cpu.write_reg(1, 6);
    cpu.write_reg(2, 7);
    cpu.write_reg(3, 1);
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.read_reg(0), 43);
}

#[test]
fn umull_produces_64_bit_product_across_two_registers() {
    // UMULL R0, R1, R2, R3 (R1:R0 = R2 * R3, unsigned)
    let (mut cpu, mut bus) = setup(0, &0xE081_0392u32.to_le_bytes());
    cpu.write_reg(2, 0xFFFF_FFFF);
    cpu.write_reg(3, 2);
    cpu.step(&mut bus).unwrap();
    let result = ((cpu.read_reg(1) as u64) << 32) | cpu.read_reg(0) as u64;
    assert_eq!(result, 0xFFFF_FFFFu64 * 2);
}

#[test]
fn single_data_swap_exchanges_register_and_memory() {
    // SWP R0, R1, [R2]
    let (mut cpu, mut bus) = setup(0, &0xE102_0091u32.to_le_bytes());
    bus.write_word(0x40, 0x1111_1111).unwrap();
    cpu.write_reg(1, 0x2222_2222);
    cpu.write_reg(2, 0x40);
    let cycles = cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.read_reg(0), 0x1111_1111);
    assert_eq!(bus.read_word(0x40).unwrap(), 0x2222_2222);
    assert_eq!(cycles, 4);
}

#[test]
fn mrs_reads_cpsr_and_msr_writes_flags_only_in_user_mode() {
    use crate::cpu::flags::Mode;
    // MRS R0, CPSR
    let (mut cpu, mut bus) = setup(0, &0xE10F_0000u32.to_le_bytes());
    cpu.set_mode(Mode::User);
    cpu.set_flags(true, false, false, false);
    cpu.step(&mut bus).unwrap();
    assert!(cpu.read_reg(0) & (1 << 31) != 0);

    // MSR CPSR_flg, R1: attempt to also flip the mode field from user mode.
    let (mut cpu, mut bus) = setup(0, &0xE128_F001u32.to_le_bytes());
    cpu.set_mode(Mode::User);
    cpu.write_reg(1, 0x8000_0000 | Mode::SVC);
    cpu.step(&mut bus).unwrap();
    assert!(cpu.flag_n(), "flags byte should still be written");
    assert_eq!(cpu.mode(), Mode::User, "mode field is protected outside privileged modes");
}

#[test]
fn ldm_empty_list_still_advances_base_by_0x40() {
    // LDMIA R0!, {} encoded with an empty register list.
    let (mut cpu, mut bus) = setup(0, &0xE8B0_0000u32.to_le_bytes());
    cpu.write_reg(0, 0x1000);
    bus.write_word(0x1000, 0x0800_0050).unwrap();
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.read_reg(0), 0x1000 + 0x40);
    assert_eq!(cpu.pc(), 0x0800_0050 + 8);
}

#[test]
fn stm_storing_base_as_first_register_uses_original_value() {
    // STMIA R0!, {R0, R1}
    let (mut cpu, mut bus) = setup(0, &0xE8A0_0003u32.to_le_bytes());
    cpu.write_reg(0, 0x2000);
    cpu.write_reg(1, 0xDEAD_BEEF);
    cpu.step(&mut bus).unwrap();
    assert_eq!(bus.read_word(0x2000).unwrap(), 0x2000, "base stores its pre-transfer value when listed first");
    assert_eq!(bus.read_word(0x2004).unwrap(), 0xDEAD_BEEF);
    assert_eq!(cpu.read_reg(0), 0x2008);
}

#[test]
fn unaligned_word_load_rotates_addressed_byte_into_low_byte() {
    // LDR R0, [R1]
    let (mut cpu, mut bus) = setup(0, &0xE591_0000u32.to_le_bytes());
    bus.write_word(0x100, 0x1122_3344).unwrap();
    cpu.write_reg(1, 0x101);
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.read_reg(0), 0x4411_2233);
}

#[test]
fn ldrsh_on_odd_address_sign_extends_only_the_byte() {
    // LDRSH R0, [R1]
    let (mut cpu, mut bus) = setup(0, &0xE1D1_00F0u32.to_le_bytes());
    bus.write_byte(0x101, 0x80).unwrap();
    cpu.write_reg(1, 0x101);
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.read_reg(0) as i32, -128);
}
