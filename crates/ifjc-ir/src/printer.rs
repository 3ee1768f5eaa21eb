//! Serialization of the IR list to textual IFJcode25.
//!
//! Output order: the `.IFJcode25` header, a `DEFVAR` + nil-initializing
//! `MOVE` pair for every global collected during parsing, then the main
//! list in cursor order. `NO_OP` instructions render as blank lines and
//! comments render with the `#` sigil.

use std::io::{self, Write};

use crate::emitter::Emitter;
use crate::instr::Opcode;
use crate::operand::Operand;

/// Writes the complete program to `out`.
pub fn print<W: Write>(emitter: &Emitter, out: &mut W) -> io::Result<()> {
    writeln!(out, ".IFJcode25")?;

    for global in emitter.global_defs() {
        writeln!(out, "DEFVAR {}", global)?;
        writeln!(out, "MOVE {} nil@nil", global)?;
    }

    for instr in emitter.list().iter() {
        match instr.op {
            Opcode::Nop => writeln!(out)?,
            Opcode::Comment => {
                let text = match &instr.result {
                    Some(Operand::Comment(text)) => text.as_str(),
                    _ => "",
                };
                writeln!(out, "# {}", text)?;
            },
            _ => writeln!(out, "{}", instr)?,
        }
    }

    Ok(())
}

/// Renders the complete program into a string.
pub fn print_to_string(emitter: &Emitter) -> String {
    let mut buffer = Vec::new();
    // writing into a Vec cannot fail
    let _ = print(emitter, &mut buffer);
    String::from_utf8_lossy(&buffer).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operand::Operand;

    #[test]
    fn test_header_and_global_defs() {
        let mut emitter = Emitter::new();
        emitter.define_global("__counter");
        emitter.op2(
            Opcode::Move,
            Operand::global("__counter"),
            Operand::ConstInt(1),
        );

        let text = print_to_string(&emitter);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], ".IFJcode25");
        assert_eq!(lines[1], "DEFVAR GF@__counter");
        assert_eq!(lines[2], "MOVE GF@__counter nil@nil");
        assert_eq!(lines[3], "MOVE GF@__counter int@1");
    }

    #[test]
    fn test_nop_renders_blank_line() {
        let mut emitter = Emitter::new();
        emitter.op(Opcode::CreateFrame);
        emitter.blank();
        emitter.op(Opcode::PushFrame);

        let text = print_to_string(&emitter);
        assert_eq!(text, ".IFJcode25\nCREATEFRAME\n\nPUSHFRAME\n");
    }

    #[test]
    fn test_comment_renders_with_sigil() {
        let mut emitter = Emitter::new();
        emitter.comment("While loop start");
        let text = print_to_string(&emitter);
        assert!(text.contains("# While loop start\n"));
    }
}
