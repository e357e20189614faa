//! T-mode decode/execute (C5, spec.md §4.5): the 16-bit Thumb-style
//! encoding. Semantics parallel the A-mode families; this module leans on
//! [`super::a_mode`]'s flag-arithmetic helpers rather than duplicating
//! them.
//!
//! # References
//! - `examples/original_source/src/cpu/thumb.c` (present only as an
//!   unreached stub in `original_source` — this decoder is built from
//!   spec.md §4.5's dispatch table and the A-mode analogues it calls out)

use super::a_mode::{add_with_flags, sub_with_flags};
use super::firmware;
use super::flags::Condition;
use super::shifter::{self, ShiftOp};
use super::Cpu;
use crate::bus::Bus;
use crate::error::CoreError;

/// Decode and execute one T-mode instruction, returning its cycle cost.
pub fn execute(cpu: &mut Cpu, bus: &mut dyn Bus, opcode: u16, instr_addr: u32) -> Result<u32, CoreError> {
    let op = opcode as u32;

    if op & 0xFF00 == 0xDF00 {
        swi(cpu, bus, op)
    } else if op & 0xF800 == 0xE000 {
        branch_unconditional(cpu, bus, op)
    } else if op & 0xF000 == 0xD000 {
        branch_conditional(cpu, bus, op)
    } else if op & 0xF000 == 0xC000 {
        multiple_load_store(cpu, bus, op)
    } else if op & 0xF000 == 0xF000 {
        long_branch_link(cpu, bus, op, instr_addr)
    } else if op & 0xFF00 == 0xB000 {
        add_offset_to_sp(cpu, bus, op)
    } else if op & 0xF600 == 0xB400 {
        push_pop(cpu, bus, op)
    } else if op & 0xF000 == 0x8000 {
        load_store_halfword(cpu, bus, op)
    } else if op & 0xF000 == 0x9000 {
        sp_relative_transfer(cpu, bus, op)
    } else if op & 0xF000 == 0xA000 {
        load_address(cpu, bus, op)
    } else if op & 0xE000 == 0x6000 {
        load_store_immediate_offset(cpu, bus, op)
    } else if op & 0xF200 == 0x5000 {
        load_store_register_offset(cpu, bus, op)
    } else if op & 0xF200 == 0x5200 {
        load_store_sign_extended(cpu, bus, op)
    } else if op & 0xF800 == 0x4800 {
        pc_relative_load(cpu, bus, op)
    } else if op & 0xFC00 == 0x4400 {
        hi_register_op_or_bx(cpu, bus, op)
    } else if op & 0xFC00 == 0x4000 {
        alu_operation(cpu, bus, op)
    } else if op & 0xE000 == 0x2000 {
        immediate_op(cpu, bus, op)
    } else if op & 0xF800 == 0x1800 {
        add_subtract(cpu, bus, op)
    } else if op & 0xE000 == 0x0000 {
        move_shifted_register(cpu, bus, op)
    } else {
        Err(cpu.undefined_instruction(op, instr_addr))
    }
}

fn sign_extend(bits: u32, width: u32) -> i32 {
    let shift = 32 - width;
    ((bits << shift) as i32) >> shift
}

fn swi(cpu: &mut Cpu, bus: &mut dyn Bus, opcode: u32) -> Result<u32, CoreError> {
    let call_number = (opcode & 0xFF) as u8;
    cpu.enter_swi(bus)?;
    firmware::dispatch_swi(cpu, bus, call_number)?;
    Ok(4)
}

fn branch_unconditional(cpu: &mut Cpu, bus: &mut dyn Bus, opcode: u32) -> Result<u32, CoreError> {
    let offset = sign_extend(opcode & 0x7FF, 11) << 1;
    let target = cpu.pc().wrapping_add(offset as u32);
    cpu.write_reg(15, target);
    cpu.reload_pipeline(bus)?;
    Ok(3)
}

fn branch_conditional(cpu: &mut Cpu, bus: &mut dyn Bus, opcode: u32) -> Result<u32, CoreError> {
    let cond = Condition::from_bits((opcode >> 8) & 0xF);
    if !cond.eval(cpu.cpsr()) {
        cpu.prefetch(bus)?;
        return Ok(1);
    }
    let offset = sign_extend(opcode & 0xFF, 8) << 1;
    let target = cpu.pc().wrapping_add(offset as u32);
    cpu.write_reg(15, target);
    cpu.reload_pipeline(bus)?;
    Ok(3)
}

fn multiple_load_store(cpu: &mut Cpu, bus: &mut dyn Bus, opcode: u32) -> Result<u32, CoreError> {
    let load = opcode & (1 << 11) != 0;
    let rb = ((opcode >> 8) & 0x7) as u8;
    let reglist = (opcode & 0xFF) as u8;
    let regs: Vec<u8> = (0..8u8).filter(|i| reglist & (1 << i) != 0).collect();
    let n = super::primitives::register_list_count(reglist as u16);
    let base = cpu.read_reg(rb);
    let mut addr = base;
    for &r in &regs {
        if load {
            let value = bus.read_word(addr & !0x3)?;
            cpu.write_reg(r, value);
        } else {
            bus.write_word(addr & !0x3, cpu.read_reg(r))?;
        }
        addr = addr.wrapping_add(4);
    }
    if !(load && reglist & (1 << rb) != 0) {
        cpu.write_reg(rb, base.wrapping_add(4 * n));
    }
    cpu.prefetch(bus)?;
    Ok(if load { n + 2 } else { n + 1 })
}

fn long_branch_link(cpu: &mut Cpu, bus: &mut dyn Bus, opcode: u32, instr_addr: u32) -> Result<u32, CoreError> {
    let high_half = opcode & (1 << 11) == 0;
    let offset11 = opcode & 0x7FF;
    if high_half {
        let offset = sign_extend(offset11, 11) << 12;
        let target_base = cpu.pc().wrapping_add(offset as u32);
        cpu.write_reg(14, target_base);
        cpu.prefetch(bus)?;
        Ok(1)
    } else {
        let base = cpu.read_reg(14);
        let target = base.wrapping_add(offset11 << 1);
        let next_instr = cpu.pc().wrapping_sub(2);
        cpu.write_reg(14, next_instr | 1);
        let _ = instr_addr;
        cpu.write_reg(15, target);
        cpu.reload_pipeline(bus)?;
        Ok(3)
    }
}

fn add_offset_to_sp(cpu: &mut Cpu, bus: &mut dyn Bus, opcode: u32) -> Result<u32, CoreError> {
    let negative = opcode & (1 << 7) != 0;
    let imm7 = (opcode & 0x7F) << 2;
    let sp = cpu.read_reg(13);
    let value = if negative { sp.wrapping_sub(imm7) } else { sp.wrapping_add(imm7) };
    cpu.write_reg(13, value);
    cpu.prefetch(bus)?;
    Ok(1)
}

fn push_pop(cpu: &mut Cpu, bus: &mut dyn Bus, opcode: u32) -> Result<u32, CoreError> {
    let pop = opcode & (1 << 11) != 0;
    let extra = opcode & (1 << 8) != 0;
    let reglist = (opcode & 0xFF) as u8;
    let mut regs: Vec<u8> = (0..8u8).filter(|i| reglist & (1 << i) != 0).collect();
    if extra {
        regs.push(if pop { 15 } else { 14 });
    }
    let n = regs.len() as u32;
    let size = 4 * n;
    let sp = cpu.read_reg(13);

    if pop {
        let mut addr = sp;
        let mut loaded_pc = None;
        for &r in &regs {
            let value = bus.read_word(addr & !0x3)?;
            if r == 15 {
                loaded_pc = Some(value);
            } else {
                cpu.write_reg(r, value);
            }
            addr = addr.wrapping_add(4);
        }
        cpu.write_reg(13, sp.wrapping_add(size));
        if let Some(value) = loaded_pc {
            cpu.write_reg(15, value & !0x1);
            cpu.reload_pipeline(bus)?;
            Ok(n + 3)
        } else {
            cpu.prefetch(bus)?;
            Ok(n + 2)
        }
    } else {
        let start = sp.wrapping_sub(size);
        let mut addr = start;
        for &r in &regs {
            bus.write_word(addr & !0x3, cpu.read_reg(r))?;
            addr = addr.wrapping_add(4);
        }
        cpu.write_reg(13, start);
        cpu.prefetch(bus)?;
        Ok(n + 1)
    }
}

fn load_store_halfword(cpu: &mut Cpu, bus: &mut dyn Bus, opcode: u32) -> Result<u32, CoreError> {
    let load = opcode & (1 << 11) != 0;
    let offset = ((opcode >> 6) & 0x1F) << 1;
    let rb = ((opcode >> 3) & 0x7) as u8;
    let rd = (opcode & 0x7) as u8;
    let addr = cpu.read_reg(rb).wrapping_add(offset);
    if load {
        let value = bus.read_halfword(addr)? as u32;
        cpu.write_reg(rd, value);
        cpu.prefetch(bus)?;
        Ok(3)
    } else {
        bus.write_halfword(addr, cpu.read_reg(rd) as u16)?;
        cpu.prefetch(bus)?;
        Ok(2)
    }
}

fn sp_relative_transfer(cpu: &mut Cpu, bus: &mut dyn Bus, opcode: u32) -> Result<u32, CoreError> {
    let load = opcode & (1 << 11) != 0;
    let rd = ((opcode >> 8) & 0x7) as u8;
    let offset = (opcode & 0xFF) << 2;
    let addr = cpu.read_reg(13).wrapping_add(offset);
    if load {
        let value = bus.read_word(addr & !0x3)?;
        cpu.write_reg(rd, value);
        cpu.prefetch(bus)?;
        Ok(3)
    } else {
        bus.write_word(addr & !0x3, cpu.read_reg(rd))?;
        cpu.prefetch(bus)?;
        Ok(2)
    }
}

fn load_address(cpu: &mut Cpu, bus: &mut dyn Bus, opcode: u32) -> Result<u32, CoreError> {
    let from_sp = opcode & (1 << 11) != 0;
    let rd = ((opcode >> 8) & 0x7) as u8;
    let offset = (opcode & 0xFF) << 2;
    let base = if from_sp { cpu.read_reg(13) } else { cpu.pc() & !0x3 };
    cpu.write_reg(rd, base.wrapping_add(offset));
    cpu.prefetch(bus)?;
    Ok(1)
}

fn load_store_immediate_offset(cpu: &mut Cpu, bus: &mut dyn Bus, opcode: u32) -> Result<u32, CoreError> {
    let byte = opcode & (1 << 12) != 0;
    let load = opcode & (1 << 11) != 0;
    let offset5 = (opcode >> 6) & 0x1F;
    let rb = ((opcode >> 3) & 0x7) as u8;
    let rd = (opcode & 0x7) as u8;
    let offset = if byte { offset5 } else { offset5 << 2 };
    let addr = cpu.read_reg(rb).wrapping_add(offset);

    if load {
        let value = if byte { bus.read_byte(addr)? as u32 } else { bus.read_word(addr & !0x3)? };
        cpu.write_reg(rd, value);
        cpu.prefetch(bus)?;
        Ok(3)
    } else {
        let value = cpu.read_reg(rd);
        if byte {
            bus.write_byte(addr, value as u8)?;
        } else {
            bus.write_word(addr & !0x3, value)?;
        }
        cpu.prefetch(bus)?;
        Ok(2)
    }
}

fn load_store_register_offset(cpu: &mut Cpu, bus: &mut dyn Bus, opcode: u32) -> Result<u32, CoreError> {
    let load = opcode & (1 << 11) != 0;
    let byte = opcode & (1 << 10) != 0;
    let ro = ((opcode >> 6) & 0x7) as u8;
    let rb = ((opcode >> 3) & 0x7) as u8;
    let rd = (opcode & 0x7) as u8;
    let addr = cpu.read_reg(rb).wrapping_add(cpu.read_reg(ro));

    if load {
        let value = if byte { bus.read_byte(addr)? as u32 } else { bus.read_word(addr & !0x3)? };
        cpu.write_reg(rd, value);
        cpu.prefetch(bus)?;
        Ok(3)
    } else {
        let value = cpu.read_reg(rd);
        if byte {
            bus.write_byte(addr, value as u8)?;
        } else {
            bus.write_word(addr & !0x3, value)?;
        }
        cpu.prefetch(bus)?;
        Ok(2)
    }
}

fn load_store_sign_extended(cpu: &mut Cpu, bus: &mut dyn Bus, opcode: u32) -> Result<u32, CoreError> {
    let kind = (opcode >> 10) & 0x3;
    let ro = ((opcode >> 6) & 0x7) as u8;
    let rb = ((opcode >> 3) & 0x7) as u8;
    let rd = (opcode & 0x7) as u8;
    let addr = cpu.read_reg(rb).wrapping_add(cpu.read_reg(ro));

    match kind {
        0 => {
            bus.write_halfword(addr, cpu.read_reg(rd) as u16)?;
            cpu.prefetch(bus)?;
            Ok(2)
        }
        1 => {
            let value = (bus.read_byte(addr)? as i8) as i32 as u32;
            cpu.write_reg(rd, value);
            cpu.prefetch(bus)?;
            Ok(3)
        }
        2 => {
            let value = bus.read_halfword(addr)? as u32;
            cpu.write_reg(rd, value);
            cpu.prefetch(bus)?;
            Ok(3)
        }
        _ => {
            let value = (bus.read_halfword(addr)? as i16) as i32 as u32;
            cpu.write_reg(rd, value);
            cpu.prefetch(bus)?;
            Ok(3)
        }
    }
}

fn pc_relative_load(cpu: &mut Cpu, bus: &mut dyn Bus, opcode: u32) -> Result<u32, CoreError> {
    let rd = ((opcode >> 8) & 0x7) as u8;
    let offset = (opcode & 0xFF) << 2;
    let base = cpu.pc() & !0x3;
    let value = bus.read_word(base.wrapping_add(offset))?;
    cpu.write_reg(rd, value);
    cpu.prefetch(bus)?;
    Ok(3)
}

fn hi_register_op_or_bx(cpu: &mut Cpu, bus: &mut dyn Bus, opcode: u32) -> Result<u32, CoreError> {
    let op = (opcode >> 8) & 0x3;
    let h1 = opcode & (1 << 7) != 0;
    let h2 = opcode & (1 << 6) != 0;
    let rd = ((opcode & 0x7) | if h1 { 0x8 } else { 0 }) as u8;
    let rs = (((opcode >> 3) & 0x7) | if h2 { 0x8 } else { 0 }) as u8;

    match op {
        0 => {
            let result = cpu.read_reg(rd).wrapping_add(cpu.read_reg(rs));
            cpu.write_reg(rd, result);
            if rd == 15 {
                cpu.reload_pipeline(bus)?;
                Ok(3)
            } else {
                cpu.prefetch(bus)?;
                Ok(1)
            }
        }
        1 => {
            let (value, carry, overflow) = sub_with_flags(cpu.read_reg(rd), cpu.read_reg(rs));
            cpu.set_flags(value & 0x8000_0000 != 0, value == 0, carry, overflow);
            cpu.prefetch(bus)?;
            Ok(1)
        }
        2 => {
            let value = cpu.read_reg(rs);
            cpu.write_reg(rd, value);
            if rd == 15 {
                cpu.reload_pipeline(bus)?;
                Ok(3)
            } else {
                cpu.prefetch(bus)?;
                Ok(1)
            }
        }
        _ => {
            let target = cpu.read_reg(rs);
            let thumb = target & 1 != 0;
            cpu.set_thumb(thumb);
            let aligned = if thumb { target & !0x1 } else { target & !0x3 };
            cpu.write_reg(15, aligned);
            cpu.reload_pipeline(bus)?;
            Ok(3)
        }
    }
}

fn alu_operation(cpu: &mut Cpu, bus: &mut dyn Bus, opcode: u32) -> Result<u32, CoreError> {
    let op = (opcode >> 6) & 0xF;
    let rs = ((opcode >> 3) & 0x7) as u8;
    let rd = (opcode & 0x7) as u8;
    let rd_val = cpu.read_reg(rd);
    let rs_val = cpu.read_reg(rs);
    let carry_in = cpu.flag_c();
    let v_unchanged = cpu.flag_v();

    match op {
        0x0 => {
            let result = rd_val & rs_val;
            cpu.write_reg(rd, result);
            cpu.set_nz_from(result);
            cpu.prefetch(bus)?;
            Ok(1)
        }
        0x1 => {
            let result = rd_val ^ rs_val;
            cpu.write_reg(rd, result);
            cpu.set_nz_from(result);
            cpu.prefetch(bus)?;
            Ok(1)
        }
        0x2 => {
            let shifted = shifter::shift_by_register(ShiftOp::Lsl, rd_val, rs_val & 0xFF, carry_in);
            cpu.write_reg(rd, shifted.value);
            cpu.set_flags(shifted.value & 0x8000_0000 != 0, shifted.value == 0, shifted.carry, v_unchanged);
            cpu.prefetch(bus)?;
            Ok(2)
        }
        0x3 => {
            let shifted = shifter::shift_by_register(ShiftOp::Lsr, rd_val, rs_val & 0xFF, carry_in);
            cpu.write_reg(rd, shifted.value);
            cpu.set_flags(shifted.value & 0x8000_0000 != 0, shifted.value == 0, shifted.carry, v_unchanged);
            cpu.prefetch(bus)?;
            Ok(2)
        }
        0x4 => {
            let shifted = shifter::shift_by_register(ShiftOp::Asr, rd_val, rs_val & 0xFF, carry_in);
            cpu.write_reg(rd, shifted.value);
            cpu.set_flags(shifted.value & 0x8000_0000 != 0, shifted.value == 0, shifted.carry, v_unchanged);
            cpu.prefetch(bus)?;
            Ok(2)
        }
        0x5 => {
            let (value, carry, overflow) = super::a_mode::adc_with_flags(rd_val, rs_val, carry_in);
            cpu.write_reg(rd, value);
            cpu.set_flags(value & 0x8000_0000 != 0, value == 0, carry, overflow);
            cpu.prefetch(bus)?;
            Ok(1)
        }
        0x6 => {
            let (value, carry, overflow) = super::a_mode::sbc_with_flags(rd_val, rs_val, carry_in);
            cpu.write_reg(rd, value);
            cpu.set_flags(value & 0x8000_0000 != 0, value == 0, carry, overflow);
            cpu.prefetch(bus)?;
            Ok(1)
        }
        0x7 => {
            let shifted = shifter::shift_by_register(ShiftOp::Ror, rd_val, rs_val & 0xFF, carry_in);
            cpu.write_reg(rd, shifted.value);
            cpu.set_flags(shifted.value & 0x8000_0000 != 0, shifted.value == 0, shifted.carry, v_unchanged);
            cpu.prefetch(bus)?;
            Ok(2)
        }
        0x8 => {
            let result = rd_val & rs_val;
            cpu.set_nz_from(result);
            cpu.prefetch(bus)?;
            Ok(1)
        }
        0x9 => {
            // NEG: Rd = 0 - Rs
            let (value, carry, overflow) = sub_with_flags(0, rs_val);
            cpu.write_reg(rd, value);
            cpu.set_flags(value & 0x8000_0000 != 0, value == 0, carry, overflow);
            cpu.prefetch(bus)?;
            Ok(1)
        }
        0xA => {
            let (value, carry, overflow) = sub_with_flags(rd_val, rs_val);
            cpu.set_flags(value & 0x8000_0000 != 0, value == 0, carry, overflow);
            cpu.prefetch(bus)?;
            Ok(1)
        }
        0xB => {
            let (value, carry, overflow) = add_with_flags(rd_val, rs_val);
            cpu.set_flags(value & 0x8000_0000 != 0, value == 0, carry, overflow);
            cpu.prefetch(bus)?;
            Ok(1)
        }
        0xC => {
            let result = rd_val | rs_val;
            cpu.write_reg(rd, result);
            cpu.set_nz_from(result);
            cpu.prefetch(bus)?;
            Ok(1)
        }
        0xD => {
            let result = rd_val.wrapping_mul(rs_val);
            cpu.write_reg(rd, result);
            cpu.set_nz_from(result);
            let array_cycles = super::primitives::multiply_array_cycles(rs_val);
            cpu.prefetch(bus)?;
            Ok(1 + array_cycles)
        }
        0xE => {
            let result = rd_val & !rs_val;
            cpu.write_reg(rd, result);
            cpu.set_nz_from(result);
            cpu.prefetch(bus)?;
            Ok(1)
        }
        _ => {
            let result = !rs_val;
            cpu.write_reg(rd, result);
            cpu.set_nz_from(result);
            cpu.prefetch(bus)?;
            Ok(1)
        }
    }
}

fn immediate_op(cpu: &mut Cpu, bus: &mut dyn Bus, opcode: u32) -> Result<u32, CoreError> {
    let op = (opcode >> 11) & 0x3;
    let rd = ((opcode >> 8) & 0x7) as u8;
    let imm8 = opcode & 0xFF;
    let rd_val = cpu.read_reg(rd);

    match op {
        0 => {
            cpu.write_reg(rd, imm8);
            cpu.set_nz_from(imm8);
        }
        1 => {
            let (value, carry, overflow) = sub_with_flags(rd_val, imm8);
            cpu.set_flags(value & 0x8000_0000 != 0, value == 0, carry, overflow);
        }
        2 => {
            let (value, carry, overflow) = add_with_flags(rd_val, imm8);
            cpu.write_reg(rd, value);
            cpu.set_flags(value & 0x8000_0000 != 0, value == 0, carry, overflow);
        }
        _ => {
            let (value, carry, overflow) = sub_with_flags(rd_val, imm8);
            cpu.write_reg(rd, value);
            cpu.set_flags(value & 0x8000_0000 != 0, value == 0, carry, overflow);
        }
    }
    cpu.prefetch(bus)?;
    Ok(1)
}

fn add_subtract(cpu: &mut Cpu, bus: &mut dyn Bus, opcode: u32) -> Result<u32, CoreError> {
    let immediate = opcode & (1 << 10) != 0;
    let subtract = opcode & (1 << 9) != 0;
    let field = (opcode >> 6) & 0x7;
    let rs = ((opcode >> 3) & 0x7) as u8;
    let rd = (opcode & 0x7) as u8;
    let operand2 = if immediate { field } else { cpu.read_reg(field as u8) };
    let rs_val = cpu.read_reg(rs);

    let (value, carry, overflow) = if subtract {
        sub_with_flags(rs_val, operand2)
    } else {
        add_with_flags(rs_val, operand2)
    };
    cpu.write_reg(rd, value);
    cpu.set_flags(value & 0x8000_0000 != 0, value == 0, carry, overflow);
    cpu.prefetch(bus)?;
    Ok(1)
}

fn move_shifted_register(cpu: &mut Cpu, bus: &mut dyn Bus, opcode: u32) -> Result<u32, CoreError> {
    let op = (opcode >> 11) & 0x3;
    let offset5 = (opcode >> 6) & 0x1F;
    let rs = ((opcode >> 3) & 0x7) as u8;
    let rd = (opcode & 0x7) as u8;
    let shift_op = match op {
        0 => ShiftOp::Lsl,
        1 => ShiftOp::Lsr,
        _ => ShiftOp::Asr,
    };
    let value = cpu.read_reg(rs);
    let carry_in = cpu.flag_c();
    let v_unchanged = cpu.flag_v();
    let result = shifter::shift_immediate(shift_op, value, offset5, carry_in);
    cpu.write_reg(rd, result.value);
    cpu.set_flags(result.value & 0x8000_0000 != 0, result.value == 0, result.carry, v_unchanged);
    cpu.prefetch(bus)?;
    Ok(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::TestBus;
    use crate::cpu::CpuOptions;

    fn cpu_at(pc: u32, bus: &mut TestBus) -> Cpu {
        let mut cpu = Cpu::with_options(CpuOptions { skip_bios: false });
        cpu.set_thumb(true);
        cpu.write_reg(15, pc);
        cpu.reload_pipeline(bus).unwrap();
        cpu
    }

    #[test]
    fn move_shifted_register_lsl() {
        // LSL R0, R1, #2
        let opcode = 0x0088u16;
        let mut bus = TestBus::new(0x1000);
        let mut cpu = cpu_at(0, &mut bus);
        cpu.write_reg(1, 0x1);
        let instr_addr = cpu.instr_addr();
        let cycles = execute(&mut cpu, &mut bus, opcode, instr_addr).unwrap();
        assert_eq!(cpu.read_reg(0), 0x4);
        assert_eq!(cycles, 1);
    }

    #[test]
    fn immediate_mov_sets_zero_flag() {
        // MOV R0, #0
        let opcode = 0x2000u16;
        let mut bus = TestBus::new(0x1000);
        let mut cpu = cpu_at(0, &mut bus);
        let instr_addr = cpu.instr_addr();
        execute(&mut cpu, &mut bus, opcode, instr_addr).unwrap();
        assert_eq!(cpu.read_reg(0), 0);
        assert!(cpu.flag_z());
    }

    #[test]
    fn conditional_branch_not_taken_costs_one_cycle() {
        // BEQ with Z clear
        let opcode = 0xD000u16;
        let mut bus = TestBus::new(0x1000);
        let mut cpu = cpu_at(0, &mut bus);
        cpu.set_flags(false, false, false, false);
        let instr_addr = cpu.instr_addr();
        let pc_before = cpu.pc();
        let cycles = execute(&mut cpu, &mut bus, opcode, instr_addr).unwrap();
        assert_eq!(cycles, 1);
        assert_eq!(cpu.pc(), pc_before + 2);
    }

    #[test]
    fn bx_switches_to_arm_mode() {
        // BX R0 (hi-register op/bx family, op=3, H2=0, Rs=0)
        let opcode = 0x4700u16;
        let mut bus = TestBus::new(0x1000);
        let mut cpu = cpu_at(0, &mut bus);
        cpu.write_reg(0, 0x0800_0100);
        let instr_addr = cpu.instr_addr();
        execute(&mut cpu, &mut bus, opcode, instr_addr).unwrap();
        assert!(!cpu.thumb());
        assert_eq!(cpu.pc(), 0x0800_0100 + 8);
    }

    #[test]
    fn push_pop_round_trip_through_stack() {
        // PUSH {R0} then POP {R0} via direct handler calls.
        let mut bus = TestBus::new(0x1000);
        let mut cpu = cpu_at(0, &mut bus);
        cpu.write_reg(13, 0x200);
        cpu.write_reg(0, 0xAABBCCDD);
        // PUSH {R0}: opcode 1011 0100 0000 0001
        let push_opcode = 0xB401u32;
        push_pop(&mut cpu, &mut bus, push_opcode).unwrap();
        assert_eq!(cpu.read_reg(13), 0x200 - 4);
        cpu.write_reg(0, 0);
        // POP {R0}: opcode 1011 1100 0000 0001
        let pop_opcode = 0xBC01u32;
        push_pop(&mut cpu, &mut bus, pop_opcode).unwrap();
        assert_eq!(cpu.read_reg(0), 0xAABBCCDD);
        assert_eq!(cpu.read_reg(13), 0x200);
    }
}
