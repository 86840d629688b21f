use bitflags::bitflags;

use crate::error::{ErrorKind, Unrecognized};
use crate::labels::LabelTable;
use crate::opcodes::{AluOp, Param, Unit};

bitflags! {
    /// Operand forms a unit attempted without recognizing the operand.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Tried: u8 {
        const ALU = 1 << 0;
        const LITERAL = 1 << 1;
    }
}

/// The variant a token resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub unit: Unit,
    pub selector: u8,
    /// F-unit test without its own ALU operand
    pub implicit_alu: bool,
}

/// Why a token could not be classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// The operand conflicts with what earlier tokens of the line established.
    /// Another evaluation order may still succeed.
    Inconsistent,
    /// No evaluation order can fix this.
    Hard(ErrorKind),
}

/// Line-wide resources shared between the tokens of one instruction.
///
/// Each call either records the value (returning `true`) or reports that it
/// contradicts a value recorded earlier (`false`).
pub trait Bindings {
    fn bind_alu(&mut self, op: AluOp) -> bool;
    fn bind_literal(&mut self, value: i32) -> bool;
    fn bind_label(&mut self, address: u8) -> Result<bool, ErrorKind>;
    /// Whether an earlier token of the line already drives `unit`.
    fn taken(&self, unit: Unit) -> bool;
}

/// Matches `token` against the opcode tables, unit by unit in catalog order.
pub fn classify<B: Bindings>(
    token: &str,
    labels: &LabelTable,
    bindings: &mut B,
) -> Result<Match, Failure> {
    for unit in Unit::ALL {
        let mut tried = Tried::empty();
        let mut alu_conflict = false;

        for variant in unit.variants() {
            let matched = Match { unit, selector: variant.selector, implicit_alu: false };

            if variant.param == Param::None {
                if token == variant.text {
                    if bindings.taken(unit) {
                        return Err(Failure::Hard(ErrorKind::UnitUsedTwice(unit)));
                    }
                    return Ok(Match { implicit_alu: unit == Unit::F, ..matched });
                }
                continue;
            }

            let Some(operand) = token.strip_prefix(variant.text) else { continue };
            // before the operand is bound, so a conflicting operand can't mask it
            if bindings.taken(unit) {
                return Err(Failure::Hard(ErrorKind::UnitUsedTwice(unit)));
            }
            let operand = operand.trim_start();

            match variant.param {
                Param::None => {}
                Param::Alu => {
                    let op = if unit == Unit::F {
                        AluOp::parse_test(operand)
                    } else {
                        AluOp::parse(operand)
                    };
                    match op {
                        None => tried |= Tried::ALU,
                        Some(op) if bindings.bind_alu(op) => return Ok(matched),
                        // remembered; a later variant may still take the token
                        Some(_) => alu_conflict = true,
                    }
                }
                Param::Literal => match parse_literal(operand).map_err(Failure::Hard)? {
                    None => tried |= Tried::LITERAL,
                    Some(value) if bindings.bind_literal(value) => return Ok(matched),
                    Some(_) => return Err(Failure::Inconsistent),
                },
                Param::Label => {
                    let Some(address) = labels.get(operand) else {
                        return Err(Failure::Hard(ErrorKind::UndefinedLabel {
                            label: operand.to_string(),
                            unit,
                        }));
                    };
                    return match bindings.bind_label(address) {
                        Ok(true) => Ok(matched),
                        Ok(false) => Err(Failure::Inconsistent),
                        Err(kind) => Err(Failure::Hard(kind)),
                    };
                }
            }
        }

        if alu_conflict {
            return Err(Failure::Inconsistent);
        }
        let what = if tried == Tried::ALU | Tried::LITERAL {
            Unrecognized::AluOrLiteral(unit)
        } else if tried == Tried::ALU {
            Unrecognized::Alu(unit)
        } else if tried == Tried::LITERAL {
            Unrecognized::Literal(unit)
        } else {
            continue;
        };
        return Err(Failure::Hard(ErrorKind::UnrecognizedOperand { token: token.to_string(), what }));
    }

    Err(Failure::Hard(ErrorKind::UnrecognizedOperand {
        token: token.to_string(),
        what: Unrecognized::Opcode,
    }))
}

fn sign_extend_12(v: i64) -> i64 {
    (v << 52) >> 52
}

/// Parses `-?(digits|$hexdigits)`.
///
/// `Ok(None)` means the text is not shaped like a literal at all. Decimal and
/// negative hex values must fit a signed 12-bit field, positive hex values an
/// unsigned one.
pub fn parse_literal(text: &str) -> Result<Option<i32>, ErrorKind> {
    let (negative, t) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (hex, t) = match t.strip_prefix('$') {
        Some(rest) => (true, rest),
        None => (false, t),
    };
    let radix = if hex { 16 } else { 10 };
    let end = t.find(|c: char| !c.is_digit(radix)).unwrap_or(t.len());
    if end == 0 {
        return Ok(None);
    }
    let (digits, rest) = t.split_at(end);

    // saturate like strtol; anything that large fails the range check anyway
    let magnitude = i64::from_str_radix(digits, radix).unwrap_or(i64::MAX);
    let value = if negative { -magnitude } else { magnitude };

    let truncated = if hex && !negative { value & 0xfff } else { sign_extend_12(value) };
    if truncated != value {
        let truncated = if hex { truncated & 0xfff } else { truncated };
        return Err(ErrorKind::ConstantRangeError { value, truncated, hex });
    }

    let rest = rest.trim_start();
    if !rest.is_empty() && !rest.starts_with(';') {
        return Err(ErrorKind::TrailingCharacters(value));
    }
    Ok(Some(value as i32))
}
