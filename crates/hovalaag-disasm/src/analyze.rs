use std::collections::BTreeSet;
use serde::Serialize;

use hovalaag_asm::disasm::jump_target;
use hovalaag_asm::opcodes::selector::J_JUMP;
use hovalaag_asm::Program;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EdgeKind { Fallthrough, Branch, CondBranch }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Edge { pub from: u8, pub to: u8, pub kind: EdgeKind }

/// Control-flow edges of a whole image.
///
/// `JMP` has no fallthrough; `JMPT`, `JMPF` and `DECNZ` branch conditionally.
/// Fallthrough off the end of the image is not recorded.
pub fn edges(program: &Program) -> Vec<Edge> {
    let len = program.len();
    let mut out = Vec::new();
    for (pc, ins) in program.instructions().iter().enumerate() {
        let from = pc as u8;
        let uncond = ins.j == J_JUMP;
        if let Some(to) = jump_target(ins) {
            let kind = if uncond { EdgeKind::Branch } else { EdgeKind::CondBranch };
            out.push(Edge { from, to, kind });
        }
        if !uncond && pc + 1 < len {
            out.push(Edge { from, to: from + 1, kind: EdgeKind::Fallthrough });
        }
    }
    out
}

/// Addresses some branch lands on.
pub fn branch_targets(edges: &[Edge]) -> BTreeSet<u8> {
    edges.iter().filter(|e| e.kind != EdgeKind::Fallthrough).map(|e| e.to).collect()
}
