use crate::codegen::error::CodegenError;
use crate::codegen::functions::{FUNCTION_JUMP_BASE, FunctionTable};

// =============================================================================
// Flat data address space layout (VM contract, bit-exact)
// =============================================================================
// variables  [0, 925)
// scratch    [925, 1009)
// arguments  [1009, 1024)
// entry-jump table from 1024 up

/// First scratch address; also the upper bound of variable addresses.
pub const BASE_SCRATCH: i32 = 925;
/// First call-argument slot; also the upper bound of scratch addresses.
pub const BASE_ARGS: i32 = 1009;

/// The only value type the language has today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Int,
}

/// A declared variable. Its address is its position in the symbol stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub ty: Type,
    /// Lexical nesting level at declaration time, 0 = outermost.
    pub depth: u32,
    /// Ordinal of the function this symbol was declared into, 0 = global/main.
    pub function: usize,
}

// =============================================================================
// SYMBOL ENVIRONMENT - scoped variables, functions, ambient counters
// =============================================================================

/// The symbol side of the backend: a stack-discipline variable table, the
/// sibling [`FunctionTable`], and the ambient counters of the compilation
/// pass (lexical depth, current function identity, functions declared).
///
/// One environment per compilation; independent compilations never share
/// state. Symbols are only ever removed as a contiguous suffix of the stack,
/// so an address handed out while a symbol is live never moves.
#[derive(Debug, Clone)]
pub struct SymbolEnvironment {
    symbols: Vec<Symbol>,
    functions: FunctionTable,
    depth: u32,
    current_function: usize,
    functions_declared: usize,
    next_scratch: i32,
    next_arg: i32,
    unread_arg: i32,
}

impl SymbolEnvironment {
    pub fn new() -> Self {
        Self {
            symbols: Vec::new(),
            functions: FunctionTable::new(),
            depth: 0,
            current_function: 0,
            functions_declared: 0,
            next_scratch: BASE_SCRATCH,
            next_arg: BASE_ARGS,
            unread_arg: BASE_ARGS,
        }
    }

    // =========================================================================
    // Variables
    // =========================================================================

    /// Declares a variable at the top of the stack, tagged with the current
    /// depth and current function identity, and returns its address.
    ///
    /// `Overflow` once the variable address space `[0, 925)` is exhausted.
    pub fn declare(&mut self, name: impl Into<String>, ty: Type) -> Result<i32, CodegenError> {
        if self.symbols.len() >= BASE_SCRATCH as usize {
            return Err(CodegenError::Overflow {
                what: "symbol table",
                limit: BASE_SCRATCH as usize,
            });
        }
        let addr = self.symbols.len() as i32;
        self.symbols.push(Symbol {
            name: name.into(),
            ty,
            depth: self.depth,
            function: self.current_function,
        });
        Ok(addr)
    }

    /// Address of the most recently declared symbol with this name. The
    /// top-down scan is what makes shadowing work: an inner declaration
    /// hides an outer one until its scope is torn down.
    pub fn resolve(&self, name: &str) -> Result<i32, CodegenError> {
        self.symbols
            .iter()
            .rposition(|s| s.name == name)
            .map(|pos| pos as i32)
            .ok_or_else(|| CodegenError::NotFound {
                name: name.to_string(),
            })
    }

    /// Removes exactly the topmost symbol. `EmptyPop` on an empty table.
    pub fn pop_one(&mut self) -> Result<(), CodegenError> {
        self.symbols.pop().map(|_| ()).ok_or(CodegenError::EmptyPop)
    }

    /// Removes every top-of-stack symbol declared at the current depth,
    /// stopping at the first shallower one. Returns the count removed.
    /// Symbols of enclosing scopes, globals included, are untouched.
    pub fn pop_scope(&mut self) -> usize {
        let mut removed = 0;
        while self
            .symbols
            .last()
            .is_some_and(|s| s.depth == self.depth)
        {
            self.symbols.pop();
            removed += 1;
        }
        removed
    }

    /// Enters a nested block; symbols declared until the matching
    /// [`exit_scope`](Self::exit_scope) are tagged with the deeper level.
    pub fn enter_scope(&mut self) {
        self.depth += 1;
    }

    pub fn exit_scope(&mut self) {
        debug_assert!(self.depth > 0, "exit_scope at outermost depth");
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Index of the topmost symbol, `None` when the table is empty.
    pub fn top_index(&self) -> Option<usize> {
        self.symbols.len().checked_sub(1)
    }

    /// The symbol at a given address.
    pub fn get(&self, addr: usize) -> Option<&Symbol> {
        self.symbols.get(addr)
    }

    // =========================================================================
    // Scratch and argument allocators
    // =========================================================================

    /// Next free scratch address in `[925, 1009)`, for intermediate values
    /// of expression evaluation.
    pub fn alloc_scratch(&mut self) -> Result<i32, CodegenError> {
        if self.next_scratch >= BASE_ARGS {
            return Err(CodegenError::Overflow {
                what: "scratch addresses",
                limit: (BASE_ARGS - BASE_SCRATCH) as usize,
            });
        }
        let addr = self.next_scratch;
        self.next_scratch += 1;
        Ok(addr)
    }

    /// Releases every scratch address; called at statement boundaries once
    /// intermediate values are dead.
    pub fn release_scratch(&mut self) {
        self.next_scratch = BASE_SCRATCH;
    }

    /// Next outgoing-argument slot in `[1009, 1024)`. The caller copies each
    /// call argument into the slot this returns, in parameter order.
    pub fn push_arg(&mut self) -> Result<i32, CodegenError> {
        if self.next_arg >= FUNCTION_JUMP_BASE {
            return Err(CodegenError::Overflow {
                what: "argument slots",
                limit: (FUNCTION_JUMP_BASE - BASE_ARGS) as usize,
            });
        }
        let addr = self.next_arg;
        self.next_arg += 1;
        Ok(addr)
    }

    /// Next unread argument slot, in the order the caller pushed them;
    /// `None` once the callee has consumed them all.
    pub fn take_arg(&mut self) -> Option<i32> {
        if self.unread_arg >= self.next_arg {
            return None;
        }
        let addr = self.unread_arg;
        self.unread_arg += 1;
        Some(addr)
    }

    /// Resets both argument cursors once a call completes.
    pub fn clear_args(&mut self) {
        self.next_arg = BASE_ARGS;
        self.unread_arg = BASE_ARGS;
    }

    // =========================================================================
    // Functions and call linkage
    // =========================================================================

    /// Declares a function starting at instruction `entry`; its identity is
    /// its 0-based declaration ordinal.
    pub fn declare_function(
        &mut self,
        name: impl Into<String>,
        entry: i32,
    ) -> Result<usize, CodegenError> {
        self.functions.declare(name, entry)
    }

    pub fn resolve_function_address(&self, name: &str) -> Result<i32, CodegenError> {
        self.functions.address_of(name)
    }

    pub fn resolve_function_identity(&self, name: &str) -> Result<usize, CodegenError> {
        self.functions.identity_of(name)
    }

    /// Makes `name` the current function: locals declared and calls resolved
    /// from here on belong to it. `NotFound` if it was never declared.
    pub fn enter_function_scope(&mut self, name: &str) -> Result<(), CodegenError> {
        self.current_function = self.functions.identity_of(name)?;
        Ok(())
    }

    /// Identity of the function currently in scope, 0 = global/main.
    pub fn current_function(&self) -> usize {
        self.current_function
    }

    pub fn set_return_address(&mut self, name: &str, addr: i32) -> Result<(), CodegenError> {
        self.functions.set_return_address(name, addr)
    }

    pub fn take_return_address(&mut self, name: &str) -> Result<Option<i32>, CodegenError> {
        self.functions.take_return_address(name)
    }

    pub fn set_return_var_address(&mut self, name: &str, addr: i32) -> Result<(), CodegenError> {
        self.functions.set_return_var_address(name, addr)
    }

    pub fn take_return_var_address(&mut self, name: &str) -> Result<Option<i32>, CodegenError> {
        self.functions.take_return_var_address(name)
    }

    /// Bumps the declaration-time counter. Distinct from the call-time
    /// current identity: this one counts how many functions the front end
    /// has declared so far.
    pub fn mark_function_declared(&mut self) {
        self.functions_declared += 1;
    }

    /// Resets the declaration counter before compiling the entry point, so
    /// the entry point is always function identity 0 at depth 0.
    pub fn reset_function_declarations(&mut self) {
        self.functions_declared = 0;
    }

    pub fn functions_declared(&self) -> usize {
        self.functions_declared
    }

    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }
}

impl Default for SymbolEnvironment {
    fn default() -> Self {
        Self::new()
    }
}
