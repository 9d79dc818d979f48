use serde::{Deserialize, Serialize};

use crate::codegen::op::Opcode;

/// Operand value meaning "absent": an unset slot, a failed lookup rendered
/// to the VM, or a jump target that has not been backpatched yet.
pub const UNSET: i32 = -1;

/// One target instruction: an opcode and up to three integer operands
/// (literals, data addresses or jump targets).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub op: Opcode,
    pub operands: [i32; 3],
}

impl Instruction {
    pub fn new(op: Opcode, a: i32, b: i32, c: i32) -> Self {
        Self {
            op,
            operands: [a, b, c],
        }
    }

    /// A jump emitted before its destination is known. Every operand stays
    /// [`UNSET`] until a later patch supplies the real target.
    pub fn open_jump(op: Opcode) -> Self {
        Self::new(op, UNSET, UNSET, UNSET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_jump_has_no_target() {
        let instr = Instruction::open_jump(Opcode::Jump);
        assert_eq!(instr.op, Opcode::Jump);
        assert_eq!(instr.operands, [UNSET, UNSET, UNSET]);
    }
}
