//! ifjc-drv - Compiler driver.
//!
//! The driver is deliberately thin: it parses the command line, reads the
//! source file, runs the pipeline (scanner, parser, IR, printer) and
//! maps the outcome to the process exit code.
//!
//! Exit codes:
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0    | success, IR on stdout |
//! | 1    | lexical error |
//! | 2    | syntax error |
//! | 3    | undefined function (or non-function used as function) |
//! | 4    | function/getter/setter/variable redefinition |
//! | 5    | wrong argument count |
//! | 6    | compile-time type incompatibility |
//! | 10   | other semantic error |
//! | 99   | internal error, including unusable arguments or input |
//!
//! Codes 25 and 26 never terminate the compiler; they are emitted *into*
//! the IR as runtime `EXIT` operands.

use std::path::PathBuf;

use anyhow::{bail, Context};
use ifjc_par::Parser;
use ifjc_util::Result;

/// Exit code for failures outside the compilation itself.
const INTERNAL_EXIT: i32 = 99;

/// Driver configuration.
pub struct Config {
    /// Path to the IFJ25 source file.
    pub input: PathBuf,
}

impl Config {
    /// Parses the command line: exactly one positional argument, the
    /// source path.
    pub fn from_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        let input = match (args.next(), args.next()) {
            (Some(path), None) => PathBuf::from(path),
            _ => bail!("usage: ifjc <source-file>"),
        };
        Ok(Self { input })
    }
}

/// Compiles IFJ25 source text to IFJcode25 text.
pub fn compile_source(source: &str) -> Result<String> {
    let parser = Parser::new(source)?;
    let emitter = parser.parse_program()?;
    Ok(ifjc_ir::printer::print_to_string(&emitter))
}

/// Full driver entry point; returns the process exit code.
pub fn run() -> i32 {
    let config = match Config::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("error: {error:#}");
            return INTERNAL_EXIT;
        },
    };

    let source = match std::fs::read_to_string(&config.input)
        .with_context(|| format!("cannot read '{}'", config.input.display()))
    {
        Ok(source) => source,
        Err(error) => {
            eprintln!("error: {error:#}");
            return INTERNAL_EXIT;
        },
    };

    match compile_source(&source) {
        Ok(ir) => {
            print!("{ir}");
            0
        },
        Err(error) => {
            eprintln!("{error}");
            error.exit_code()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_requires_exactly_one_argument() {
        assert!(Config::from_args(std::iter::empty()).is_err());
        assert!(Config::from_args(["a.ifj".to_string()].into_iter()).is_ok());
        assert!(
            Config::from_args(["a.ifj".to_string(), "b.ifj".to_string()].into_iter()).is_err()
        );
    }

    #[test]
    fn test_compile_source_produces_ir() {
        let source = "import \"ifj25\" for Ifj\nclass Program {\nstatic main() {\n}\n}";
        let ir = compile_source(source).expect("program compiles");
        assert!(ir.starts_with(".IFJcode25\n"));
    }

    #[test]
    fn test_compile_source_reports_exit_code() {
        let source = "import \"ifj25\" for Ifj\nclass Program {\nstatic foo() {\n}\n}";
        let error = compile_source(source).expect_err("main is missing");
        assert_eq!(error.exit_code(), 3);
    }
}
