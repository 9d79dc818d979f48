use thiserror::Error;

use crate::codegen::op::Opcode;

/// Errors surfaced by the code-generation backend.
///
/// Only [`Overflow`](CodegenError::Overflow) is fatal for a compilation
/// unit. Everything else is returned to the front end, which reports it and
/// may go on compiling other units; nothing here terminates the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodegenError {
    /// A fixed-capacity table or address range is full. The source program
    /// cannot be compiled within the VM's limits.
    #[error("{what} capacity exceeded ({limit} entries)")]
    Overflow { what: &'static str, limit: usize },

    /// Variable or function lookup failed; surfaced to the user as an
    /// "undeclared identifier" semantic error.
    #[error("undeclared identifier '{name}'")]
    NotFound { name: String },

    /// Scope teardown popped more symbols than were declared. Indicates a
    /// front-end bug, not a problem with the source program.
    #[error("symbol table underflow: pop on an empty table")]
    EmptyPop,

    /// A jump patch was requested on an instruction that is not a jump of
    /// the expected kind. No mutation is performed.
    #[error("cannot patch {found} at address {at}: not a patchable jump")]
    InvalidOpcode { at: usize, found: Opcode },

    /// Instruction address outside the occupied prefix of the program.
    #[error("instruction address {index} out of range (program length {len})")]
    OutOfRange { index: usize, len: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_the_identifier() {
        let err = CodegenError::NotFound {
            name: "counter".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("undeclared"));
        assert!(msg.contains("counter"));
    }

    #[test]
    fn test_overflow_names_the_limit() {
        let err = CodegenError::Overflow {
            what: "function table",
            limit: 64,
        };
        let msg = err.to_string();
        assert!(msg.contains("function table"));
        assert!(msg.contains("64"));
    }

    #[test]
    fn test_invalid_opcode_names_the_mnemonic() {
        let err = CodegenError::InvalidOpcode {
            at: 7,
            found: Opcode::Add,
        };
        let msg = err.to_string();
        assert!(msg.contains("ADD"));
        assert!(msg.contains('7'));
    }

    #[test]
    fn test_error_implements_std_error() {
        let err = CodegenError::EmptyPop;
        let _: &dyn std::error::Error = &err;
    }
}
