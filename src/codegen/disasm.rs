use std::fmt::{self, Write as _};

use crate::codegen::instr::{Instruction, UNSET};
use crate::codegen::program::InstructionStore;

// =============================================================================
// Rendering - human-readable program listings for diagnostics
// =============================================================================

impl fmt::Display for Instruction {
    /// Mnemonic followed by the set operands. Printing stops at the first
    /// [`UNSET`] operand, so an unpatched jump shows up as a bare mnemonic.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.op)?;
        for &operand in &self.operands {
            if operand == UNSET {
                break;
            }
            write!(f, "  {}", operand)?;
        }
        Ok(())
    }
}

/// Renders the occupied prefix of the program, one instruction per line,
/// prefixed with its address.
pub fn render(store: &InstructionStore) -> String {
    let mut out = String::new();
    for (addr, instr) in store.iter().enumerate() {
        let _ = writeln!(out, "{:04}  {}", addr, instr);
    }
    out
}
