use crate::codegen::error::CodegenError;

/// Declared-function capacity.
pub const MAX_FUNCTIONS: usize = 64;

/// Base of the per-function entry-jump table in the VM's address space.
/// Slot `1024 + identity` belongs to the function with that identity.
pub const FUNCTION_JUMP_BASE: i32 = 1024;

// =============================================================================
// FUNCTION TABLE - declared functions and call linkage
// =============================================================================

/// One declared function.
///
/// The two linkage slots are one-shot mailboxes between a call site and the
/// function's epilogue: the caller `set`s, the epilogue `take`s, and taking
/// clears the slot. There is a single slot per function, not a stack of
/// them, so a second `set` before a `take` silently overwrites the first.
/// Recursion is unsupported by design.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    /// Address of the function's first instruction in the program.
    pub entry: i32,
    /// 0-based declaration ordinal; also ties locals to their owner.
    pub identity: usize,
    return_to: Option<i32>,
    return_var: Option<i32>,
}

/// Append-only table of declared functions, identity = declaration index.
#[derive(Debug, Clone, Default)]
pub struct FunctionTable {
    funcs: Vec<Function>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self { funcs: Vec::new() }
    }

    /// Declares a function whose body starts at instruction `entry` and
    /// returns its identity. `Overflow` at [`MAX_FUNCTIONS`].
    pub fn declare(&mut self, name: impl Into<String>, entry: i32) -> Result<usize, CodegenError> {
        if self.funcs.len() >= MAX_FUNCTIONS {
            return Err(CodegenError::Overflow {
                what: "function table",
                limit: MAX_FUNCTIONS,
            });
        }
        let identity = self.funcs.len();
        self.funcs.push(Function {
            name: name.into(),
            entry,
            identity,
            return_to: None,
            return_var: None,
        });
        Ok(identity)
    }

    /// Entry address of a declared function's first instruction.
    pub fn address_of(&self, name: &str) -> Result<i32, CodegenError> {
        Ok(self.find(name)?.entry)
    }

    /// Declaration ordinal of a declared function.
    pub fn identity_of(&self, name: &str) -> Result<usize, CodegenError> {
        Ok(self.find(name)?.identity)
    }

    /// The entry-jump-table slot reserved for a function identity.
    pub fn entry_slot(identity: usize) -> i32 {
        FUNCTION_JUMP_BASE + identity as i32
    }

    /// Stores the instruction address the function's `return` must jump to.
    /// Overwrites any address already pending.
    pub fn set_return_address(&mut self, name: &str, addr: i32) -> Result<(), CodegenError> {
        self.find_mut(name)?.return_to = Some(addr);
        Ok(())
    }

    /// Takes the pending return address, clearing the slot. `Ok(None)` when
    /// nothing was set or the hand-off was already consumed.
    pub fn take_return_address(&mut self, name: &str) -> Result<Option<i32>, CodegenError> {
        Ok(self.find_mut(name)?.return_to.take())
    }

    /// Stores the data address holding the function's return value.
    /// Same one-shot contract as [`set_return_address`](Self::set_return_address).
    pub fn set_return_var_address(&mut self, name: &str, addr: i32) -> Result<(), CodegenError> {
        self.find_mut(name)?.return_var = Some(addr);
        Ok(())
    }

    /// Takes the pending return-variable address, clearing the slot.
    pub fn take_return_var_address(&mut self, name: &str) -> Result<Option<i32>, CodegenError> {
        Ok(self.find_mut(name)?.return_var.take())
    }

    pub fn len(&self) -> usize {
        self.funcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funcs.is_empty()
    }

    pub fn get(&self, identity: usize) -> Option<&Function> {
        self.funcs.get(identity)
    }

    fn find(&self, name: &str) -> Result<&Function, CodegenError> {
        self.funcs
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| CodegenError::NotFound {
                name: name.to_string(),
            })
    }

    fn find_mut(&mut self, name: &str) -> Result<&mut Function, CodegenError> {
        self.funcs
            .iter_mut()
            .find(|f| f.name == name)
            .ok_or_else(|| CodegenError::NotFound {
                name: name.to_string(),
            })
    }
}
