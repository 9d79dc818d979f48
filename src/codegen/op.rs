use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// OPCODE - target instruction set
// =============================================================================

/// The 19 opcodes of the target VM's flat-address instruction set.
///
/// Execution semantics belong to the VM; the backend only emits, patches and
/// renders these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Opcode {
    // arithmetic
    Add,
    Sub,
    Mul,
    Div,

    // data movement
    /// Copy the value at one address to another.
    Copy,
    /// Store an immediate constant at an address.
    SetConst,

    // control flow
    /// Unconditional jump. Target address in operand 0.
    Jump,
    /// Jump to the address *stored at* the address in operand 0; used with
    /// the per-function entry slots above the data address space.
    JumpAddr,
    /// Branch taken when the value at operand 0 is false. Target address in
    /// operand 1.
    JumpIfFalse,

    // relational
    Less,
    Greater,
    Equal,
    NotEqual,
    LessEq,
    GreaterEq,

    // boolean
    And,
    Or,

    // output
    Print,

    /// Program entry marker.
    Entry,
}

impl Opcode {
    /// Assembler mnemonic, matching the names the VM toolchain uses.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Copy => "COP",
            Opcode::SetConst => "AFC",
            Opcode::Jump => "JMP",
            Opcode::JumpAddr => "JMX",
            Opcode::JumpIfFalse => "JMF",
            Opcode::Less => "INF",
            Opcode::Greater => "SUP",
            Opcode::Equal => "EQUAL",
            Opcode::NotEqual => "NEQUAL",
            Opcode::LessEq => "EQINF",
            Opcode::GreaterEq => "EQSUP",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Print => "PRI",
            Opcode::Entry => "ENTRY",
        }
    }

    /// Operand slot a jump of this opcode keeps its target address in.
    /// `None` for every opcode that is not a patchable jump.
    pub fn jump_target_slot(self) -> Option<usize> {
        match self {
            Opcode::Jump => Some(0),
            Opcode::JumpIfFalse => Some(1),
            _ => None,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
