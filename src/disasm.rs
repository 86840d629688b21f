use crate::instruction::PackedInstruction;
use crate::opcodes::selector::*;
use crate::opcodes::AluOp;

// Listing mnemonics; `M` is the ALU output, `K` the literal, `L` the branch target.
const A_OP: [&str; 3] = ["", "A=D", "A=M"];
const B_OP: [&str; 4] = ["", "B=A", "B=M", "B=K"];
const C_OP: [&str; 4] = ["", "C=M", "DEC", "DECNZ"];
const D_OP: [&str; 2] = ["", "D=A"];
const W_OP: [&str; 4] = ["", "W=A", "W=M", "W=K"];
const F_OP: [&str; 4] = ["", "F=Z(M)", "F=N(M)", "F=P(M)"];
const J_OP: [&str; 4] = ["", "JMP", "JMPT", "JMPF"];

fn pick(table: &[&str], sel: u8) -> Option<String> {
    table.get(sel as usize).filter(|t| !t.is_empty()).map(|t| t.to_string())
}

pub fn reads_alu(ins: &PackedInstruction) -> bool {
    ins.a == A_FROM_ALU
        || ins.b == B_FROM_ALU
        || ins.c == C_FROM_ALU
        || ins.w == W_FROM_ALU
        || ins.f != NOP
}

pub fn reads_literal(ins: &PackedInstruction) -> bool {
    ins.b == B_FROM_CONST || ins.w == W_FROM_CONST
}

/// Where the instruction may transfer control, if anywhere.
pub fn jump_target(ins: &PackedInstruction) -> Option<u8> {
    (ins.j != NOP || ins.c == C_DECNZ).then(|| ins.branch_target())
}

pub fn fmt_instruction(ins: &PackedInstruction) -> String {
    fmt_with_labels(ins, |_| None)
}

/// Renders `ins` in listing form, naming branch targets through `label`.
pub fn fmt_with_labels(ins: &PackedInstruction, label: impl Fn(u8) -> Option<String>) -> String {
    let port = ins.io + 1;
    let mut parts: Vec<String> = Vec::new();
    if ins.a == A_FROM_IN1 {
        parts.push(format!("A=IN{port}"));
    } else {
        parts.extend(pick(&A_OP, ins.a));
    }
    parts.extend(pick(&B_OP, ins.b));
    parts.extend(pick(&C_OP, ins.c));
    parts.extend(pick(&D_OP, ins.d));
    parts.extend(pick(&W_OP, ins.w));
    if ins.o != NOP {
        parts.push(format!("OUT{port}=W"));
    }
    parts.extend(pick(&F_OP, ins.f));
    parts.extend(pick(&J_OP, ins.j));

    if reads_alu(ins) {
        match AluOp::from_index(ins.alu) {
            Some(op) => parts.push(format!("M:{}", op.spelling())),
            None => parts.push(format!("M:?{}", ins.alu)),
        }
    }
    if reads_literal(ins) {
        parts.push(format!("K={}", ins.literal()));
    }
    if let Some(target) = jump_target(ins) {
        match label(target) {
            Some(name) => parts.push(format!("L={name}")),
            None => parts.push(format!("L={target}")),
        }
    }

    if parts.is_empty() {
        "NOP".to_string()
    } else {
        parts.join(", ")
    }
}
