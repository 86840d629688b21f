use tracing::{debug, instrument};

use crate::disasm::fmt_with_labels;
use crate::error::AsmError;
use crate::labels::{scan, LabelTable};
use crate::program::Program;
use crate::solver::solve;
use crate::source::preprocess;
use crate::tokens::tokenize;

/// Everything one assembly run produced. Nothing outlives it.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub labels: LabelTable,
    pub program: Program,
}

impl Assembly {
    /// `PC  label  word  mnemonics`, one row per instruction.
    pub fn listing(&self) -> String {
        let name = |pc: u8| self.labels.name_at(pc).map(str::to_string);
        self.program
            .instructions()
            .iter()
            .enumerate()
            .map(|(pc, ins)| {
                let label = name(pc as u8).map(|n| format!("{n}:")).unwrap_or_default();
                format!("{pc:3}  {label:<8} {:08x}  {}\n", ins.encode(), fmt_with_labels(ins, name))
            })
            .collect()
    }
}

/// Assembles a complete source text.
#[instrument(skip_all)]
pub fn assemble(source: &str) -> Result<Assembly, AsmError> {
    let lines = preprocess(source);
    let (labels, statements) = scan(&lines)?;
    debug!("{} labels, {} instructions", labels.len(), statements.len());

    let mut program = Program::new();
    for stmt in &statements {
        let tokens = tokenize(&stmt.body);
        let ins = solve(&tokens, &labels, stmt.line)?;
        debug!("{:3}: {:08x} {}", stmt.pc, ins.encode(), stmt.body);
        program.push(ins, stmt.line)?;
    }

    Ok(Assembly { labels, program: program.finish()? })
}
