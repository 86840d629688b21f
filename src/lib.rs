pub mod assembler;
pub mod classify;
pub mod disasm;
pub mod error;
pub mod instruction;
pub mod labels;
pub mod opcodes;
pub mod program;
pub mod solver;
pub mod source;
pub mod tokens;

pub use assembler::{assemble, Assembly};
pub use error::{AsmError, ErrorKind, ImageError};
pub use instruction::PackedInstruction;
pub use opcodes::{AluOp, Unit};
pub use program::{Program, MAX_INSTRUCTIONS};
