pub mod disasm;
pub mod error;
pub mod functions;
pub mod instr;
pub mod op;
pub mod program;
pub mod symbols;

pub use disasm::render;
pub use error::CodegenError;
pub use functions::{FUNCTION_JUMP_BASE, Function, FunctionTable, MAX_FUNCTIONS};
pub use instr::{Instruction, UNSET};
pub use op::Opcode;
pub use program::{InstructionStore, MAX_INSTRUCTIONS};
pub use symbols::{BASE_ARGS, BASE_SCRATCH, Symbol, SymbolEnvironment, Type};
