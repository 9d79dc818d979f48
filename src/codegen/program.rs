use serde::{Deserialize, Serialize};

use crate::codegen::error::CodegenError;
use crate::codegen::instr::Instruction;
use crate::codegen::op::Opcode;

/// Usable instruction slots. The VM reserves one slot past this as a
/// capacity boundary, so a program never grows beyond 1024 instructions.
pub const MAX_INSTRUCTIONS: usize = 1024;

// =============================================================================
// INSTRUCTION STORE - the growing program
// =============================================================================

/// The ordered program of emitted instructions.
///
/// Append-only: an instruction's address never changes once emitted, and the
/// only permitted mutation is backpatching a jump target through
/// [`patch_jump`](InstructionStore::patch_jump). Occupancy is tracked by the
/// vector length, which keeps append O(1) while assigning exactly the
/// addresses a first-free-slot scan would.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstructionStore {
    instrs: Vec<Instruction>,
}

impl InstructionStore {
    pub fn new() -> Self {
        Self { instrs: Vec::new() }
    }

    /// Appends `instr` and returns its address. Addresses are assigned
    /// densely in emission order: the n-th successful append returns n.
    ///
    /// `Overflow` once the store holds [`MAX_INSTRUCTIONS`] entries; the
    /// store is left unchanged and the compilation unit cannot proceed.
    pub fn append(&mut self, instr: Instruction) -> Result<usize, CodegenError> {
        if self.instrs.len() >= MAX_INSTRUCTIONS {
            return Err(CodegenError::Overflow {
                what: "instruction store",
                limit: MAX_INSTRUCTIONS,
            });
        }
        self.instrs.push(instr);
        Ok(self.instrs.len() - 1)
    }

    /// The instruction at address `at`, or `None` past the occupied prefix.
    /// Callers treat `None` as "no instruction there", never as an error.
    pub fn get(&self, at: usize) -> Option<&Instruction> {
        self.instrs.get(at)
    }

    /// Writes the real target of a jump emitted with a placeholder.
    ///
    /// `kind` selects the operand slot: [`Opcode::Jump`] keeps its target in
    /// slot 0, [`Opcode::JumpIfFalse`] in slot 1. The instruction at `at`
    /// must actually be of that kind; on any mismatch nothing is written.
    pub fn patch_jump(&mut self, at: usize, target: i32, kind: Opcode) -> Result<(), CodegenError> {
        let slot = kind
            .jump_target_slot()
            .ok_or(CodegenError::InvalidOpcode { at, found: kind })?;
        let len = self.instrs.len();
        let instr = self
            .instrs
            .get_mut(at)
            .ok_or(CodegenError::OutOfRange { index: at, len })?;
        if instr.op != kind {
            return Err(CodegenError::InvalidOpcode {
                at,
                found: instr.op,
            });
        }
        instr.operands[slot] = target;
        Ok(())
    }

    /// Logical program length; also the address the next append will return,
    /// which the front end reads before emitting backward loop jumps.
    pub fn len(&self) -> usize {
        self.instrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }

    /// Iteration over the occupied prefix in address order. This is the
    /// surface the VM consumes once compilation finishes.
    pub fn iter(&self) -> impl Iterator<Item = &Instruction> {
        self.instrs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::instr::UNSET;
    use pretty_assertions::assert_eq;

    fn add(a: i32, b: i32, c: i32) -> Instruction {
        Instruction::new(Opcode::Add, a, b, c)
    }

    #[test]
    fn test_append_addresses_are_dense() {
        let mut store = InstructionStore::new();
        for expected in 0..8 {
            let addr = store.append(add(0, 1, 2)).unwrap();
            assert_eq!(addr, expected);
        }
        assert_eq!(store.len(), 8);
    }

    #[test]
    fn test_append_overflow_leaves_store_unchanged() {
        let mut store = InstructionStore::new();
        for _ in 0..MAX_INSTRUCTIONS {
            store.append(add(0, 1, 2)).unwrap();
        }

        let err = store.append(add(3, 4, 5)).unwrap_err();
        assert!(matches!(err, CodegenError::Overflow { .. }));
        assert_eq!(store.len(), MAX_INSTRUCTIONS);
        assert_eq!(store.get(MAX_INSTRUCTIONS - 1), Some(&add(0, 1, 2)));
    }

    #[test]
    fn test_get_out_of_range_is_absent() {
        let mut store = InstructionStore::new();
        store.append(add(0, 1, 2)).unwrap();

        assert!(store.get(1).is_none());
        assert!(store.get(MAX_INSTRUCTIONS + 10).is_none());
    }

    #[test]
    fn test_patch_unconditional_jump_writes_slot_0() {
        let mut store = InstructionStore::new();
        let at = store.append(Instruction::open_jump(Opcode::Jump)).unwrap();

        store.patch_jump(at, 17, Opcode::Jump).unwrap();

        let instr = store.get(at).unwrap();
        assert_eq!(instr.op, Opcode::Jump);
        assert_eq!(instr.operands, [17, UNSET, UNSET]);
    }

    #[test]
    fn test_patch_false_branch_writes_slot_1() {
        let mut store = InstructionStore::new();
        // condition address 3 already known, target not yet
        let at = store
            .append(Instruction::new(Opcode::JumpIfFalse, 3, UNSET, UNSET))
            .unwrap();

        store.patch_jump(at, 9, Opcode::JumpIfFalse).unwrap();

        let instr = store.get(at).unwrap();
        assert_eq!(instr.op, Opcode::JumpIfFalse);
        assert_eq!(instr.operands, [3, 9, UNSET]);
    }

    #[test]
    fn test_patch_non_jump_instruction_rejected() {
        let mut store = InstructionStore::new();
        let at = store.append(add(10, 1, 2)).unwrap();

        let err = store.patch_jump(at, 5, Opcode::Jump).unwrap_err();
        assert_eq!(
            err,
            CodegenError::InvalidOpcode {
                at,
                found: Opcode::Add
            }
        );
        assert_eq!(store.get(at), Some(&add(10, 1, 2)));
    }

    #[test]
    fn test_patch_with_non_jump_kind_rejected() {
        let mut store = InstructionStore::new();
        let at = store.append(Instruction::open_jump(Opcode::Jump)).unwrap();

        let err = store.patch_jump(at, 5, Opcode::Copy).unwrap_err();
        assert_eq!(
            err,
            CodegenError::InvalidOpcode {
                at,
                found: Opcode::Copy
            }
        );
        assert_eq!(store.get(at), Some(&Instruction::open_jump(Opcode::Jump)));
    }

    #[test]
    fn test_patch_kind_mismatch_rejected() {
        let mut store = InstructionStore::new();
        let at = store
            .append(Instruction::open_jump(Opcode::JumpIfFalse))
            .unwrap();

        // right family, wrong kind: would write the wrong slot
        let err = store.patch_jump(at, 5, Opcode::Jump).unwrap_err();
        assert_eq!(
            err,
            CodegenError::InvalidOpcode {
                at,
                found: Opcode::JumpIfFalse
            }
        );
    }

    #[test]
    fn test_patch_past_end_is_out_of_range() {
        let mut store = InstructionStore::new();
        store.append(add(0, 1, 2)).unwrap();

        let err = store.patch_jump(4, 5, Opcode::Jump).unwrap_err();
        assert_eq!(err, CodegenError::OutOfRange { index: 4, len: 1 });
    }

    #[test]
    fn test_backpatch_scenario_add_then_open_false_branch() {
        let mut store = InstructionStore::new();
        store.append(add(10, 1, 2)).unwrap();
        store
            .append(Instruction::open_jump(Opcode::JumpIfFalse))
            .unwrap();

        store.patch_jump(1, 5, Opcode::JumpIfFalse).unwrap();

        assert_eq!(store.get(1).unwrap().operands[1], 5);
        assert_eq!(store.get(0).unwrap().operands, [10, 1, 2]);
    }

    #[test]
    fn test_len_tracks_appends() {
        let mut store = InstructionStore::new();
        assert!(store.is_empty());

        store.append(add(0, 1, 2)).unwrap();
        store.append(Instruction::open_jump(Opcode::Jump)).unwrap();
        store.patch_jump(1, 0, Opcode::Jump).unwrap();

        // patching never changes occupancy
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_iter_walks_addresses_in_order() {
        let mut store = InstructionStore::new();
        store.append(add(0, 1, 2)).unwrap();
        store.append(add(3, 4, 5)).unwrap();

        let ops: Vec<i32> = store.iter().map(|i| i.operands[0]).collect();
        assert_eq!(ops, vec![0, 3]);
    }
}
