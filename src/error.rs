use crate::opcodes::Unit;

/// A fatal assembly error. Every error except [`ErrorKind::EmptyProgram`]
/// carries the 1-based source line it was raised on.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("ASM error{}: {kind}", at_line(.line))]
pub struct AsmError {
    pub line: Option<usize>,
    pub kind: ErrorKind,
}

fn at_line(line: &Option<usize>) -> String {
    match line {
        Some(n) => format!(", line {n}"),
        None => String::new(),
    }
}

impl AsmError {
    pub fn at(line: usize, kind: ErrorKind) -> Self {
        Self { line: Some(line), kind }
    }

    pub fn program(kind: ErrorKind) -> Self {
        Self { line: None, kind }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("label '{0}' defined more than once")]
    DuplicateLabel(String),
    #[error("labels must be terminated by ':'")]
    MalformedLabel,
    #[error("unknown label '{label}' in {unit} unit")]
    UndefinedLabel { label: String, unit: Unit },
    #[error("tried to use {0} unit more than once")]
    UnitUsedTwice(Unit),
    #[error("unrecognized {what} in '{token}'")]
    UnrecognizedOperand { token: String, what: Unrecognized },
    #[error("constant {} would be truncated to {}", show(.value, .hex), show(.truncated, .hex))]
    ConstantRangeError { value: i64, truncated: i64, hex: bool },
    #[error("extra characters after constant {0}")]
    TrailingCharacters(i64),
    #[error("cannot branch to two different addresses in the same instruction")]
    ConflictingBranchTargets,
    #[error("attempted to use IN and OUT in same instruction with different port numbers")]
    PortMismatch,
    #[error("F was assigned with implicit ALU, but no ALU operation was specified elsewhere")]
    MissingAluForImplicitTest,
    #[error("couldn't find a consistent assignment of ALU and/or constants")]
    UnsatisfiableConstraints,
    #[error("program can be at most {0} instructions long")]
    ProgramTooLarge(usize),
    #[error("program was empty")]
    EmptyProgram,
}

fn show(v: &i64, hex: &bool) -> String {
    if *hex {
        if *v < 0 { format!("-${:X}", v.unsigned_abs()) } else { format!("${v:X}") }
    } else {
        v.to_string()
    }
}

/// Which operand forms a unit tried and failed to recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unrecognized {
    Opcode,
    Alu(Unit),
    Literal(Unit),
    AluOrLiteral(Unit),
}

impl std::fmt::Display for Unrecognized {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unrecognized::Opcode => write!(f, "opcode"),
            Unrecognized::Alu(u) => write!(f, "ALU operation in {u} unit"),
            Unrecognized::Literal(u) => write!(f, "integer constant in {u} unit"),
            Unrecognized::AluOrLiteral(u) => {
                write!(f, "ALU operation or integer constant in {u} unit")
            }
        }
    }
}

/// Errors raised while loading a binary image back into a [`crate::Program`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("image length {0} is not a multiple of 4")]
    Misaligned(usize),
    #[error("image is empty")]
    Empty,
    #[error("image holds {0} instructions, at most 255 fit")]
    TooLarge(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_line_numbers() {
        let e = AsmError::at(7, ErrorKind::UnitUsedTwice(Unit::B));
        assert_eq!(e.to_string(), "ASM error, line 7: tried to use B unit more than once");
        let e = AsmError::program(ErrorKind::EmptyProgram);
        assert_eq!(e.to_string(), "ASM error: program was empty");
    }

    #[test]
    fn hex_constants_render_in_hex() {
        let e = ErrorKind::ConstantRangeError { value: 0x1234, truncated: 0x234, hex: true };
        assert_eq!(e.to_string(), "constant $1234 would be truncated to $234");
    }
}
