use serde::{Deserialize, Serialize};

use crate::opcodes::{AluOp, Unit};

/// One assembled Hovalaag instruction.
///
/// Selectors hold the values from [`crate::opcodes::selector`], with A
/// collapsed to `A_FROM_IN1` for either input port and O to `O_OUT1` for either
/// output port; `io` then carries the port index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedInstruction {
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub w: u8,
    pub o: u8,
    pub f: u8,
    pub j: u8,
    pub alu: u8,
    pub io: u8,
    pub two_constants: bool,
    /// Signed 12-bit value; literal in bits 11..6 and branch target in bits
    /// 5..0 when `two_constants` is set.
    pub value: i16,
}

/// Word layout, most significant field first:
///
/// ```text
/// 31..28 ALU   27..26 A   25..24 B   23..22 C   21 D   20..19 W
/// 18..17 F     16..15 J   14 O       13 IO      12 X   11..0 value
/// ```
///
/// `X` is set for a single constant. The hardware numbers the D-source and
/// ALU-source selectors of A, B and W the other way round from the assembler,
/// so selectors 1 and 2 of those units swap on the way in and out.
pub mod layout {
    pub const ALU_SHIFT: u32 = 28;
    pub const A_SHIFT: u32 = 26;
    pub const B_SHIFT: u32 = 24;
    pub const C_SHIFT: u32 = 22;
    pub const D_SHIFT: u32 = 21;
    pub const W_SHIFT: u32 = 19;
    pub const F_SHIFT: u32 = 17;
    pub const J_SHIFT: u32 = 15;
    pub const O_SHIFT: u32 = 14;
    pub const IO_SHIFT: u32 = 13;
    pub const X_SHIFT: u32 = 12;
    pub const VALUE_MASK: u32 = 0xfff;
}

use layout::*;

fn swap_1_2(sel: u8) -> u8 {
    match sel {
        1 => 2,
        2 => 1,
        n => n,
    }
}

/// Sign-extends the low 12 bits of `value`.
pub fn value_field(value: i32) -> i16 {
    (((value & 0xfff) as i16) << 4) >> 4
}

impl PackedInstruction {
    pub fn selector(&self, unit: Unit) -> u8 {
        match unit {
            Unit::A => self.a,
            Unit::B => self.b,
            Unit::C => self.c,
            Unit::D => self.d,
            Unit::W => self.w,
            Unit::O => self.o,
            Unit::F => self.f,
            Unit::J => self.j,
        }
    }

    pub fn alu_op(&self) -> Option<AluOp> {
        AluOp::from_index(self.alu)
    }

    /// The literal constant: the high half of a split value, else the whole
    /// value.
    pub fn literal(&self) -> i16 {
        if self.two_constants { self.value >> 6 } else { self.value }
    }

    /// The branch target: the low half of a split value, else the whole value.
    pub fn branch_target(&self) -> u8 {
        if self.two_constants { (self.value & 0x3f) as u8 } else { self.value as u8 }
    }

    pub fn encode(&self) -> u32 {
        let f2 = |v: u8| (v & 0x3) as u32;
        let f1 = |v: u8| (v & 0x1) as u32;
        ((self.alu & 0xf) as u32) << ALU_SHIFT
            | f2(swap_1_2(self.a)) << A_SHIFT
            | f2(swap_1_2(self.b)) << B_SHIFT
            | f2(self.c) << C_SHIFT
            | f1(self.d) << D_SHIFT
            | f2(swap_1_2(self.w)) << W_SHIFT
            | f2(self.f) << F_SHIFT
            | f2(self.j) << J_SHIFT
            | f1(self.o) << O_SHIFT
            | f1(self.io) << IO_SHIFT
            | (!self.two_constants as u32) << X_SHIFT
            | (self.value as u32) & VALUE_MASK
    }

    pub fn decode(word: u32) -> Self {
        let f2 = |shift: u32| ((word >> shift) & 0x3) as u8;
        let f1 = |shift: u32| ((word >> shift) & 0x1) as u8;
        Self {
            alu: ((word >> ALU_SHIFT) & 0xf) as u8,
            a: swap_1_2(f2(A_SHIFT)),
            b: swap_1_2(f2(B_SHIFT)),
            c: f2(C_SHIFT),
            d: f1(D_SHIFT),
            w: swap_1_2(f2(W_SHIFT)),
            f: f2(F_SHIFT),
            j: f2(J_SHIFT),
            o: f1(O_SHIFT),
            io: f1(IO_SHIFT),
            two_constants: f1(X_SHIFT) == 0,
            value: value_field((word & VALUE_MASK) as i32),
        }
    }
}
