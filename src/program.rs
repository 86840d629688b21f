use serde::Serialize;

use crate::error::{AsmError, ErrorKind, ImageError};
use crate::instruction::PackedInstruction;

/// The program counter is 8 bits wide and address 255 is reserved.
pub const MAX_INSTRUCTIONS: usize = 255;

pub const WORD_BYTES: usize = 4;

/// Instructions accumulated in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Program {
    instructions: Vec<PackedInstruction>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an instruction assembled from source line `line`.
    pub fn push(&mut self, ins: PackedInstruction, line: usize) -> Result<(), AsmError> {
        if self.instructions.len() >= MAX_INSTRUCTIONS {
            return Err(AsmError::at(line, ErrorKind::ProgramTooLarge(MAX_INSTRUCTIONS)));
        }
        self.instructions.push(ins);
        Ok(())
    }

    /// Seals the program; an empty one is an error.
    pub fn finish(self) -> Result<Program, AsmError> {
        if self.instructions.is_empty() {
            return Err(AsmError::program(ErrorKind::EmptyProgram));
        }
        Ok(self)
    }

    pub fn instructions(&self) -> &[PackedInstruction] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn words(&self) -> impl Iterator<Item = u32> + '_ {
        self.instructions.iter().map(PackedInstruction::encode)
    }

    /// The binary image: one little-endian word per instruction.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.words().flat_map(u32::to_le_bytes).collect()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Program, ImageError> {
        if bytes.len() % WORD_BYTES != 0 {
            return Err(ImageError::Misaligned(bytes.len()));
        }
        let count = bytes.len() / WORD_BYTES;
        if count == 0 {
            return Err(ImageError::Empty);
        }
        if count > MAX_INSTRUCTIONS {
            return Err(ImageError::TooLarge(count));
        }
        let instructions = bytes
            .chunks_exact(WORD_BYTES)
            .map(|c| PackedInstruction::decode(u32::from_le_bytes([c[0], c[1], c[2], c[3]])))
            .collect();
        Ok(Program { instructions })
    }

    /// One `case` arm per instruction, for pasting into a Verilog ROM.
    pub fn to_verilog(&self) -> String {
        self.words()
            .enumerate()
            .map(|(pc, word)| format!("8'h{pc:02x}:   data = 32'b{word:032b};\n"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nop() -> PackedInstruction {
        PackedInstruction::default()
    }

    #[test]
    fn limit_is_enforced_on_push() {
        let mut p = Program::new();
        for line in 1..=MAX_INSTRUCTIONS {
            p.push(nop(), line).unwrap();
        }
        let err = p.push(nop(), 300).unwrap_err();
        assert_eq!(err, AsmError::at(300, ErrorKind::ProgramTooLarge(MAX_INSTRUCTIONS)));
        assert_eq!(p.finish().unwrap().len(), MAX_INSTRUCTIONS);
    }

    #[test]
    fn empty_program() {
        assert_eq!(Program::new().finish(), Err(AsmError::program(ErrorKind::EmptyProgram)));
    }

    #[test]
    fn bytes_are_little_endian() {
        let mut p = Program::new();
        p.push(nop(), 1).unwrap();
        // only X (single constant) is set in an idle instruction
        assert_eq!(p.to_bytes(), vec![0x00, 0x10, 0x00, 0x00]);
        assert_eq!(Program::from_bytes(&p.to_bytes()).unwrap(), p);
    }

    #[test]
    fn verilog_rows() {
        let mut p = Program::new();
        p.push(nop(), 1).unwrap();
        p.push(nop(), 2).unwrap();
        let v = p.to_verilog();
        let rows: Vec<&str> = v.lines().collect();
        assert_eq!(rows[1], "8'h01:   data = 32'b00000000000000000001000000000000;");
    }

    #[test]
    fn bad_images() {
        assert!(matches!(Program::from_bytes(&[0; 6]), Err(ImageError::Misaligned(6))));
        assert!(matches!(Program::from_bytes(&[]), Err(ImageError::Empty)));
        assert!(matches!(Program::from_bytes(&[0; 1024]), Err(ImageError::TooLarge(256))));
    }
}
