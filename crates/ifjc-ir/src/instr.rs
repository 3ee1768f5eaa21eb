//! Instruction records and opcodes.

use std::fmt;

use crate::operand::Operand;

/// Every opcode of the IFJcode25 dialect, including the `S`-suffixed
/// variants that read their operands from the data stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Opcode {
    Label,
    Jump,
    JumpIfEq,
    JumpIfNeq,
    JumpIfEqS,
    JumpIfNeqS,

    DefVar,
    Move,

    CreateFrame,
    PushFrame,
    PopFrame,

    Add,
    Sub,
    Mul,
    Div,
    IDiv,

    And,
    Or,
    Not,

    Lt,
    Gt,
    Eq,

    Concat,
    StrLen,
    GetChar,
    SetChar,

    PushS,
    PopS,

    AddS,
    SubS,
    MulS,
    DivS,
    IDivS,

    AndS,
    OrS,
    NotS,

    LtS,
    GtS,
    EqS,

    Call,
    Return,

    Int2Float,
    Float2Int,
    Float2Str,
    Int2Char,
    Stri2Int,
    Int2Str,

    Int2FloatS,
    Float2IntS,
    Int2CharS,
    Stri2IntS,
    Float2StrS,
    Int2StrS,

    Type,
    IsInt,
    TypeS,
    IsIntS,

    Read,
    Write,

    Exit,
    /// Renders as `# text`.
    Comment,
    /// Renders as a blank line, used for visual separation.
    Nop,
}

impl Opcode {
    /// The textual mnemonic of this opcode.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Label => "LABEL",
            Opcode::Jump => "JUMP",
            Opcode::JumpIfEq => "JUMPIFEQ",
            Opcode::JumpIfNeq => "JUMPIFNEQ",
            Opcode::JumpIfEqS => "JUMPIFEQS",
            Opcode::JumpIfNeqS => "JUMPIFNEQS",
            Opcode::DefVar => "DEFVAR",
            Opcode::Move => "MOVE",
            Opcode::CreateFrame => "CREATEFRAME",
            Opcode::PushFrame => "PUSHFRAME",
            Opcode::PopFrame => "POPFRAME",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::IDiv => "IDIV",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Not => "NOT",
            Opcode::Lt => "LT",
            Opcode::Gt => "GT",
            Opcode::Eq => "EQ",
            Opcode::Concat => "CONCAT",
            Opcode::StrLen => "STRLEN",
            Opcode::GetChar => "GETCHAR",
            Opcode::SetChar => "SETCHAR",
            Opcode::PushS => "PUSHS",
            Opcode::PopS => "POPS",
            Opcode::AddS => "ADDS",
            Opcode::SubS => "SUBS",
            Opcode::MulS => "MULS",
            Opcode::DivS => "DIVS",
            Opcode::IDivS => "IDIVS",
            Opcode::AndS => "ANDS",
            Opcode::OrS => "ORS",
            Opcode::NotS => "NOTS",
            Opcode::LtS => "LTS",
            Opcode::GtS => "GTS",
            Opcode::EqS => "EQS",
            Opcode::Call => "CALL",
            Opcode::Return => "RETURN",
            Opcode::Int2Float => "INT2FLOAT",
            Opcode::Float2Int => "FLOAT2INT",
            Opcode::Float2Str => "FLOAT2STR",
            Opcode::Int2Char => "INT2CHAR",
            Opcode::Stri2Int => "STRI2INT",
            Opcode::Int2Str => "INT2STR",
            Opcode::Int2FloatS => "INT2FLOATS",
            Opcode::Float2IntS => "FLOAT2INTS",
            Opcode::Int2CharS => "INT2CHARS",
            Opcode::Stri2IntS => "STRI2INTS",
            Opcode::Float2StrS => "FLOAT2STRS",
            Opcode::Int2StrS => "INT2STRS",
            Opcode::Type => "TYPE",
            Opcode::IsInt => "ISINT",
            Opcode::TypeS => "TYPES",
            Opcode::IsIntS => "ISINTS",
            Opcode::Read => "READ",
            Opcode::Write => "WRITE",
            Opcode::Exit => "EXIT",
            Opcode::Comment => "#",
            Opcode::Nop => "NO_OP",
        }
    }
}

/// A four-field instruction record. Most operands are optional.
#[derive(Clone, Debug, PartialEq)]
pub struct Instruction {
    pub op: Opcode,
    pub result: Option<Operand>,
    pub arg1: Option<Operand>,
    pub arg2: Option<Operand>,
}

impl Instruction {
    /// An instruction with no operands.
    pub fn nullary(op: Opcode) -> Self {
        Self {
            op,
            result: None,
            arg1: None,
            arg2: None,
        }
    }
}

impl fmt::Display for Instruction {
    /// Renders `OPCODE result arg1 arg2`, dropping absent operands.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.op.mnemonic())?;
        for operand in [&self.result, &self.arg1, &self.arg2].into_iter().flatten() {
            write!(f, " {}", operand)?;
        }
        Ok(())
    }
}
