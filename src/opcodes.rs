use serde::{Deserialize, Serialize};

/// Functional units of the Hovalaag, in classification order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    A,
    B,
    C,
    D,
    W,
    O,
    F,
    J,
}

impl Unit {
    pub const ALL: [Unit; 8] = [
        Unit::A,
        Unit::B,
        Unit::C,
        Unit::D,
        Unit::W,
        Unit::O,
        Unit::F,
        Unit::J,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn variants(self) -> &'static [OpcodeVariant] {
        match self {
            Unit::A => A_UNIT,
            Unit::B => B_UNIT,
            Unit::C => C_UNIT,
            Unit::D => D_UNIT,
            Unit::W => W_UNIT,
            Unit::O => O_UNIT,
            Unit::F => F_UNIT,
            Unit::J => J_UNIT,
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    None,
    Literal,
    Alu,
    Label,
}

/// One recognized spelling of a unit assignment.
///
/// Parameterless variants match the token exactly; the others match it as a
/// prefix and read their operand from the remainder.
#[derive(Debug, Clone, Copy)]
pub struct OpcodeVariant {
    pub selector: u8,
    pub text: &'static str,
    pub param: Param,
}

/// Unit selector values. Zero always means the unit is idle.
pub mod selector {
    pub const NOP: u8 = 0;

    pub const A_FROM_D: u8 = 1;
    pub const A_FROM_ALU: u8 = 2;
    pub const A_FROM_IN1: u8 = 3;
    pub const A_FROM_IN2: u8 = 4;

    pub const B_FROM_A: u8 = 1;
    pub const B_FROM_ALU: u8 = 2;
    pub const B_FROM_CONST: u8 = 3;

    pub const C_FROM_ALU: u8 = 1;
    pub const C_DEC: u8 = 2;
    pub const C_DECNZ: u8 = 3;

    pub const D_FROM_A: u8 = 1;

    pub const W_FROM_A: u8 = 1;
    pub const W_FROM_ALU: u8 = 2;
    pub const W_FROM_CONST: u8 = 3;

    pub const O_OUT1: u8 = 1;
    pub const O_OUT2: u8 = 2;

    pub const F_ZERO: u8 = 1;
    pub const F_NEG: u8 = 2;
    pub const F_POS: u8 = 3;

    pub const J_JUMP: u8 = 1;
    pub const J_JUMP_TRUE: u8 = 2;
    pub const J_JUMP_FALSE: u8 = 3;
}

use selector::*;

const fn op(selector: u8, text: &'static str, param: Param) -> OpcodeVariant {
    OpcodeVariant { selector, text, param }
}

pub const A_UNIT: &[OpcodeVariant] = &[
    op(A_FROM_D, "A=D", Param::None),
    op(A_FROM_ALU, "A=", Param::Alu),
    op(A_FROM_IN1, "A=IN1", Param::None),
    op(A_FROM_IN2, "A=IN2", Param::None),
];

pub const B_UNIT: &[OpcodeVariant] = &[
    op(B_FROM_A, "B=A", Param::None),
    op(B_FROM_ALU, "B=", Param::Alu),
    op(B_FROM_CONST, "B=", Param::Literal),
];

pub const C_UNIT: &[OpcodeVariant] = &[
    op(C_FROM_ALU, "C=", Param::Alu),
    op(C_DEC, "DEC", Param::None),
    op(C_DECNZ, "DECNZ ", Param::Label),
];

pub const D_UNIT: &[OpcodeVariant] = &[op(D_FROM_A, "D=A", Param::None)];

pub const W_UNIT: &[OpcodeVariant] = &[
    op(W_FROM_A, "W=A", Param::None),
    op(W_FROM_ALU, "W=", Param::Alu),
    op(W_FROM_CONST, "W=", Param::Literal),
];

pub const O_UNIT: &[OpcodeVariant] = &[
    op(O_OUT1, "OUT1=W", Param::None),
    op(O_OUT2, "OUT2=W", Param::None),
];

// The bare tests lean on an ALU operation established by another unit.
pub const F_UNIT: &[OpcodeVariant] = &[
    op(F_ZERO, "F=ZERO()", Param::None),
    op(F_NEG, "F=NEG()", Param::None),
    op(F_POS, "F=POS()", Param::None),
    op(F_ZERO, "F=ZERO(", Param::Alu),
    op(F_NEG, "F=NEG(", Param::Alu),
    op(F_POS, "F=POS(", Param::Alu),
];

pub const J_UNIT: &[OpcodeVariant] = &[
    op(J_JUMP, "JMP ", Param::Label),
    op(J_JUMP_TRUE, "JMPT ", Param::Label),
    op(J_JUMP_FALSE, "JMPF ", Param::Label),
];

/// The thirteen ALU operations, numbered by their hardware selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum AluOp {
    Zero = 0,
    NegA,
    B,
    C,
    AShr,
    Add,
    Sub,
    AddCarry,
    SubBorrow,
    Or,
    And,
    Xor,
    NotA,
}

pub const NUM_ALU: usize = 13;

const ALU_SPELLINGS: [&str; NUM_ALU] = [
    "0", "-A", "B", "C", "A>>1", "A+B", "B-A", "A+B+F", "B-A-F", "A|B", "A&B", "A^B", "~A",
];

impl AluOp {
    pub const ALL: [AluOp; NUM_ALU] = [
        AluOp::Zero,
        AluOp::NegA,
        AluOp::B,
        AluOp::C,
        AluOp::AShr,
        AluOp::Add,
        AluOp::Sub,
        AluOp::AddCarry,
        AluOp::SubBorrow,
        AluOp::Or,
        AluOp::And,
        AluOp::Xor,
        AluOp::NotA,
    ];

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<AluOp> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn spelling(self) -> &'static str {
        ALU_SPELLINGS[self as usize]
    }

    /// Matches an operand written directly after `B=`, `C=`, `W=` or `A=`.
    pub fn parse(text: &str) -> Option<AluOp> {
        Self::ALL.into_iter().find(|op| op.spelling() == text)
    }

    /// Matches the operand of an F-unit test, `F=ZERO(<op>)` and friends,
    /// where the closing parenthesis is part of the operand.
    pub fn parse_test(text: &str) -> Option<AluOp> {
        text.strip_suffix(')').and_then(Self::parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alu_indices_follow_table_order() {
        assert_eq!(AluOp::parse("B-A"), Some(AluOp::Sub));
        assert_eq!(AluOp::Sub.index(), 6);
        assert_eq!(AluOp::from_index(12), Some(AluOp::NotA));
        assert_eq!(AluOp::from_index(13), None);
        for (i, op) in AluOp::ALL.iter().enumerate() {
            assert_eq!(op.index() as usize, i);
        }
    }

    #[test]
    fn test_forms_need_closing_paren() {
        assert_eq!(AluOp::parse_test("A+B)"), Some(AluOp::Add));
        assert_eq!(AluOp::parse_test("A+B"), None);
        assert_eq!(AluOp::parse_test(")"), None);
    }

    #[test]
    fn selectors_fit_their_fields() {
        // A and O are collapsed to 2 and 1 bits after port normalization.
        for unit in Unit::ALL {
            for v in unit.variants() {
                assert_ne!(v.selector, NOP, "{unit} {}", v.text);
                assert!(v.selector <= 4);
            }
        }
    }
}
