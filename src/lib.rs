//! Code-generation backend for the kiln compiler.
//!
//! The front end walks the syntax tree and drives two stores: a
//! [`SymbolEnvironment`] that hands every declared variable and function a
//! stable address in the VM's flat data space, and an [`InstructionStore`]
//! that accumulates the emitted program and backpatches forward jumps once
//! their destinations are known. The finished program is consumed by the VM
//! through iteration from address 0 to `len() - 1`.
//!
//! ```
//! use kiln::codegen::{Instruction, InstructionStore, Opcode, SymbolEnvironment, Type, UNSET};
//!
//! let mut env = SymbolEnvironment::new();
//! let mut program = InstructionStore::new();
//!
//! let x = env.declare("x", Type::Int)?;
//! program.append(Instruction::new(Opcode::SetConst, x, 0, UNSET))?;
//!
//! // `if (x) print x;` - the branch is emitted before its target exists
//! let branch = program.append(Instruction::new(Opcode::JumpIfFalse, x, UNSET, UNSET))?;
//! program.append(Instruction::new(Opcode::Print, x, UNSET, UNSET))?;
//! let join = program.len() as i32;
//! program.patch_jump(branch, join, Opcode::JumpIfFalse)?;
//! # Ok::<(), kiln::codegen::CodegenError>(())
//! ```
//!
//! Known limitation: each function carries a single pair of return-linkage
//! slots, not a stack of frames, so recursive calls are unsupported.

pub mod codegen;

pub use codegen::{
    CodegenError, Instruction, InstructionStore, Opcode, Symbol, SymbolEnvironment, Type,
};
