//! ifjc-ir - The IFJcode25 instruction model, emitter and patterns.
//!
//! The IR is a linear instruction sequence held in a cursor-based
//! doubly-linked list. The parser appends through an [`Emitter`], the
//! pattern library expands every polymorphic construct into its runtime
//! type-dispatch template, and the printer serializes the finished list to
//! the textual IFJcode25 dialect.

pub mod emitter;
pub mod instr;
pub mod list;
pub mod operand;
pub mod patterns;
pub mod printer;

pub use emitter::Emitter;
pub use instr::{Instruction, Opcode};
pub use list::{InstructionList, NodeId};
pub use operand::Operand;
