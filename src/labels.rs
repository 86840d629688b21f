use std::collections::HashMap;

use tracing::debug;

use crate::error::{AsmError, ErrorKind};
use crate::program::MAX_INSTRUCTIONS;
use crate::source::SourceLine;

/// Label name to program counter, built by the first pass.
#[derive(Debug, Clone, Default)]
pub struct LabelTable {
    by_name: HashMap<String, u8>,
    order: Vec<(String, u8)>,
}

impl LabelTable {
    pub fn get(&self, name: &str) -> Option<u8> {
        self.by_name.get(name).copied()
    }

    /// First label defined at `pc`, for listings.
    pub fn name_at(&self, pc: u8) -> Option<&str> {
        self.order.iter().find(|(_, at)| *at == pc).map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u8)> {
        self.order.iter().map(|(name, pc)| (name.as_str(), *pc))
    }

    fn define(&mut self, name: &str, pc: u8) -> Result<(), ErrorKind> {
        if self.by_name.contains_key(name) {
            return Err(ErrorKind::DuplicateLabel(name.to_string()));
        }
        debug!("label {name} = {pc}");
        self.by_name.insert(name.to_string(), pc);
        self.order.push((name.to_string(), pc));
        Ok(())
    }
}

/// An instruction body waiting for the second pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub line: usize,
    pub pc: u8,
    pub body: String,
}

/// First pass: assigns addresses to labels and collects instruction bodies.
///
/// A line starting in column 0 defines a label and may carry an instruction
/// after the `:`; every non-empty body takes one address.
pub fn scan(lines: &[SourceLine]) -> Result<(LabelTable, Vec<Statement>), AsmError> {
    let mut table = LabelTable::default();
    let mut statements: Vec<Statement> = Vec::new();

    for line in lines {
        let mut body = line.text.as_str();
        if body.starts_with(|c: char| !c.is_whitespace()) {
            let Some((name, rest)) = body.split_once(':') else {
                return Err(AsmError::at(line.number, ErrorKind::MalformedLabel));
            };
            table
                .define(name.trim_end(), statements.len() as u8)
                .map_err(|kind| AsmError::at(line.number, kind))?;
            body = rest;
        }

        let body = body.trim();
        if body.is_empty() {
            continue;
        }
        if statements.len() >= MAX_INSTRUCTIONS {
            return Err(AsmError::at(line.number, ErrorKind::ProgramTooLarge(MAX_INSTRUCTIONS)));
        }
        statements.push(Statement {
            line: line.number,
            pc: statements.len() as u8,
            body: body.to_string(),
        });
    }

    Ok((table, statements))
}
