//! The IR emitter.
//!
//! Owns the instruction list, the parallel global-definition list and the
//! three name generators: temporaries (`t0, t1, …`, reset at function-body
//! boundaries), labels (`%L0, %L1, …`, never reset, globally unique within
//! the compilation) and unique variable names (`source%N`, never reset, so
//! shadowed variables cannot alias in the flat IR namespace).
//!
//! The emitter is plain state threaded through the parser; there is no
//! process-wide instruction list.

use rustc_hash::FxHashSet;

use crate::instr::{Instruction, Opcode};
use crate::list::{InstructionList, NodeId};
use crate::operand::Operand;

/// Emitter over an instruction list.
#[derive(Default)]
pub struct Emitter {
    list: InstructionList,
    global_defs: Vec<Operand>,
    seen_globals: FxHashSet<String>,
    temp_counter: u32,
    label_counter: u32,
    var_counter: u32,
}

impl Emitter {
    /// Creates an emitter with an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// The underlying list.
    pub fn list(&self) -> &InstructionList {
        &self.list
    }

    /// Mutable access to the underlying list, for cursor motion and the
    /// hoisting pass.
    pub fn list_mut(&mut self) -> &mut InstructionList {
        &mut self.list
    }

    /// Global variables collected for the program preamble.
    pub fn global_defs(&self) -> &[Operand] {
        &self.global_defs
    }

    /// Appends an instruction: after the active cursor when one is set,
    /// otherwise at the tail.
    pub fn emit(&mut self, instr: Instruction) -> NodeId {
        self.list.insert_after_active(instr)
    }

    /// Emits an instruction with no operands.
    pub fn op(&mut self, op: Opcode) -> NodeId {
        self.emit(Instruction::nullary(op))
    }

    /// Emits an instruction with a result operand only.
    pub fn op1(&mut self, op: Opcode, result: Operand) -> NodeId {
        self.emit(Instruction {
            op,
            result: Some(result),
            arg1: None,
            arg2: None,
        })
    }

    /// Emits an instruction with a result and one argument.
    pub fn op2(&mut self, op: Opcode, result: Operand, arg1: Operand) -> NodeId {
        self.emit(Instruction {
            op,
            result: Some(result),
            arg1: Some(arg1),
            arg2: None,
        })
    }

    /// Emits a full three-operand instruction.
    pub fn op3(&mut self, op: Opcode, result: Operand, arg1: Operand, arg2: Operand) -> NodeId {
        self.emit(Instruction {
            op,
            result: Some(result),
            arg1: Some(arg1),
            arg2: Some(arg2),
        })
    }

    /// Emits a comment line.
    pub fn comment(&mut self, text: impl Into<String>) {
        self.op1(Opcode::Comment, Operand::Comment(text.into()));
    }

    /// Emits a blank separator line.
    pub fn blank(&mut self) {
        self.op(Opcode::Nop);
    }

    /// Allocates a fresh temporary name.
    pub fn new_temp(&mut self) -> String {
        let name = format!("t{}", self.temp_counter);
        self.temp_counter += 1;
        name
    }

    /// Resets the temporary counter; called at function-body boundaries.
    pub fn reset_temps(&mut self) {
        self.temp_counter = 0;
    }

    /// Allocates a fresh label. Labels are unique for the whole
    /// compilation; the counter never resets.
    pub fn new_label(&mut self) -> String {
        let name = format!("%L{}", self.label_counter);
        self.label_counter += 1;
        name
    }

    /// The most recently allocated label, without allocating.
    pub fn current_label(&self) -> Option<String> {
        if self.label_counter == 0 {
            None
        } else {
            Some(format!("%L{}", self.label_counter - 1))
        }
    }

    /// Derives a compilation-unique IR name for a source variable.
    pub fn unique_name(&mut self, source_name: &str) -> String {
        let name = format!("{}%{}", source_name, self.var_counter);
        self.var_counter += 1;
        name
    }

    /// Registers a `__`-prefixed global for the printed preamble. Each
    /// global is defined exactly once no matter how many sites mention it.
    pub fn define_global(&mut self, name: &str) {
        if self.seen_globals.insert(name.to_string()) {
            self.global_defs.push(Operand::global(name));
        }
    }
}
