use tracing::trace;

use crate::classify::{classify, Bindings, Failure};
use crate::error::{AsmError, ErrorKind};
use crate::instruction::{value_field, PackedInstruction};
use crate::labels::LabelTable;
use crate::opcodes::selector::*;
use crate::opcodes::{AluOp, Unit};

/// What one evaluation order of a line's tokens settled on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    /// Selector per unit, indexed by [`Unit::index`]
    pub units: [u8; 8],
    pub alu: Option<AluOp>,
    pub literal: Option<i32>,
    pub target: Option<u8>,
    /// Set by an F test that reads the ALU without naming an operation.
    pub needs_alu: bool,
}

/// A literal and a branch target can share the value field only as two
/// 6-bit halves.
fn fits_split(target: u8, literal: i32) -> bool {
    target < 64 && (-32..=31).contains(&literal)
}

impl Bindings for Assignment {
    fn bind_alu(&mut self, op: AluOp) -> bool {
        if self.alu.is_some_and(|alu| alu != op) {
            return false;
        }
        self.alu = Some(op);
        true
    }

    fn bind_literal(&mut self, value: i32) -> bool {
        if self.literal.is_some_and(|lit| lit != value) {
            return false;
        }
        if let Some(target) = self.target {
            if target as i32 != value && !fits_split(target, value) {
                return false;
            }
        }
        self.literal = Some(value);
        true
    }

    fn bind_label(&mut self, address: u8) -> Result<bool, ErrorKind> {
        if self.target.is_some_and(|t| t != address) {
            return Err(ErrorKind::ConflictingBranchTargets);
        }
        if let Some(lit) = self.literal {
            if lit != address as i32 && !fits_split(address, lit) {
                return Ok(false);
            }
        }
        self.target = Some(address);
        Ok(true)
    }

    fn taken(&self, unit: Unit) -> bool {
        self.units[unit.index()] != NOP
    }
}

/// Classifies every token once, starting at `start` and wrapping around.
pub fn trial<S: AsRef<str>>(
    tokens: &[S],
    start: usize,
    labels: &LabelTable,
) -> Result<Assignment, Failure> {
    let mut assignment = Assignment::default();
    let n = tokens.len();
    for offset in 0..n {
        let token = tokens[(start + offset) % n].as_ref();
        let m = classify(token, labels, &mut assignment)?;
        let slot = &mut assignment.units[m.unit.index()];
        if *slot != NOP {
            return Err(Failure::Hard(ErrorKind::UnitUsedTwice(m.unit)));
        }
        *slot = m.selector;
        assignment.needs_alu |= m.implicit_alu;
    }
    Ok(assignment)
}

/// Finds an evaluation order under which the ALU and the constants agree and
/// packs the line.
///
/// Which token establishes a shared value decides how later ones are read
/// (`B=0` is an ALU operation unless the ALU is already taken), so every
/// rotation is tried before giving up. Hard errors end the search at once.
pub fn solve<S: AsRef<str>>(
    tokens: &[S],
    labels: &LabelTable,
    line: usize,
) -> Result<PackedInstruction, AsmError> {
    for start in 0..tokens.len() {
        match trial(tokens, start, labels) {
            Ok(assignment) => return pack(&assignment).map_err(|kind| AsmError::at(line, kind)),
            Err(Failure::Inconsistent) => trace!("line {line}: rotation {start} inconsistent"),
            Err(Failure::Hard(kind)) => return Err(AsmError::at(line, kind)),
        }
    }
    Err(AsmError::at(line, ErrorKind::UnsatisfiableConstraints))
}

/// Checks the line-wide rules and lays the assignment out as an instruction.
pub fn pack(assignment: &Assignment) -> Result<PackedInstruction, ErrorKind> {
    if assignment.needs_alu && assignment.alu.is_none() {
        return Err(ErrorKind::MissingAluForImplicitTest);
    }

    let unit = |u: Unit| assignment.units[u.index()];
    let in_port = match unit(Unit::A) {
        A_FROM_IN1 => Some(0),
        A_FROM_IN2 => Some(1),
        _ => None,
    };
    let out_port = match unit(Unit::O) {
        O_OUT1 => Some(0),
        O_OUT2 => Some(1),
        _ => None,
    };
    if let (Some(i), Some(o)) = (in_port, out_port) {
        if i != o {
            return Err(ErrorKind::PortMismatch);
        }
    }

    let (value, two_constants) = match (assignment.target, assignment.literal) {
        (Some(target), Some(lit)) if target as i32 != lit => {
            debug_assert!(fits_split(target, lit));
            ((lit << 6) | target as i32, true)
        }
        (Some(target), _) => (target as i32, false),
        (None, Some(lit)) => (lit, false),
        (None, None) => (0, false),
    };

    Ok(PackedInstruction {
        a: unit(Unit::A).min(A_FROM_IN1),
        b: unit(Unit::B),
        c: unit(Unit::C),
        d: unit(Unit::D),
        w: unit(Unit::W),
        o: unit(Unit::O).min(O_OUT1),
        f: unit(Unit::F),
        j: unit(Unit::J),
        alu: assignment.alu.map_or(0, AluOp::index),
        io: in_port.or(out_port).unwrap_or(0),
        two_constants,
        value: value_field(value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::preprocess;
    use crate::tokens::tokenize;

    fn labels() -> LabelTable {
        let mut src = String::from("low: DEC\n");
        src.push_str(&"  DEC\n".repeat(69));
        src.push_str("high: DEC\n");
        crate::labels::scan(&preprocess(&src)).unwrap().0
    }

    fn solve_str(body: &str) -> Result<PackedInstruction, ErrorKind> {
        solve(&tokenize(body), &labels(), 1).map_err(|e| e.kind)
    }

    #[test]
    fn first_rotation_wins_when_consistent() {
        let toks = tokenize("A=D,B=A,C=B-A");
        let a = trial(&toks, 0, &labels()).unwrap();
        assert_eq!(a.units[Unit::C.index()], C_FROM_ALU);
        assert_eq!(a.alu, Some(AluOp::Sub));
    }

    #[test]
    fn later_rotation_reads_zero_as_literal() {
        let toks = tokenize("B=0,W=A+B");
        assert_eq!(trial(&toks, 0, &labels()), Err(Failure::Inconsistent));
        let a = trial(&toks, 1, &labels()).unwrap();
        assert_eq!(a.units[Unit::B.index()], B_FROM_CONST);
        assert_eq!(a.literal, Some(0));

        let ins = solve_str("B=0,W=A+B").unwrap();
        assert_eq!((ins.b, ins.w, ins.alu, ins.value), (B_FROM_CONST, W_FROM_ALU, 5, 0));
    }

    #[test]
    fn literal_and_target_share_the_field() {
        let ins = solve_str("W=-5,JMPT LOW").unwrap();
        assert!(ins.two_constants);
        assert_eq!(ins.literal(), -5);
        assert_eq!(ins.branch_target(), 0);

        let ins = solve_str("W=0,JMP LOW").unwrap();
        assert!(!ins.two_constants);
        assert_eq!(ins.value, 0);
    }

    #[test]
    fn split_out_of_range_is_unsatisfiable() {
        assert_eq!(solve_str("W=32,JMP LOW"), Err(ErrorKind::UnsatisfiableConstraints));
        assert_eq!(solve_str("JMP HIGH,W=1"), Err(ErrorKind::UnsatisfiableConstraints));
    }

    #[test]
    fn hard_errors_stop_the_search() {
        assert_eq!(solve_str("B=A,B=A+B"), Err(ErrorKind::UnitUsedTwice(Unit::B)));
        assert_eq!(solve_str("B=A+B,B=B-A"), Err(ErrorKind::UnitUsedTwice(Unit::B)));
        assert_eq!(solve_str("JMP LOW,DECNZ HIGH"), Err(ErrorKind::ConflictingBranchTargets));
    }

    #[test]
    fn implicit_test_needs_an_alu() {
        assert_eq!(solve_str("F=ZERO(),W=A"), Err(ErrorKind::MissingAluForImplicitTest));
        let ins = solve_str("F=ZERO(),W=A+B").unwrap();
        assert_eq!((ins.f, ins.alu), (F_ZERO, AluOp::Add.index()));
    }

    #[test]
    fn ports_collapse_into_io_flag() {
        let ins = solve_str("A=IN2,OUT2=W").unwrap();
        assert_eq!((ins.a, ins.o, ins.io), (A_FROM_IN1, O_OUT1, 1));
        let ins = solve_str("A=IN1").unwrap();
        assert_eq!((ins.a, ins.io), (A_FROM_IN1, 0));
        assert_eq!(solve_str("A=IN1,OUT2=W"), Err(ErrorKind::PortMismatch));
    }

    #[test]
    fn empty_line_has_no_rotation() {
        assert_eq!(solve_str(","), Err(ErrorKind::UnsatisfiableConstraints));
    }
}
