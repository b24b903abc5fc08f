//! cirius-drv - Pipeline driver.
//!
//! Orchestrates the compilation pipeline:
//!
//! ```text
//! source --> lexer --> parser --> analyzer --+--> interpreter
//!                                            |
//!                                            +--> IR --> optimizer --> C emitter
//! ```
//!
//! The analyzer always runs before either back end. Every stage error is
//! folded into [`CiriusError`], whose display form carries the category
//! prefix the CLI reports.

use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use cirius_int::Interpreter;
use cirius_par::ast::Program;

pub use cirius_int::RuntimeError;
pub use cirius_lex::LexError;
pub use cirius_par::ParseError;
pub use cirius_sem::SemanticError;

/// Any error the toolchain can surface, prefixed by category.
///
/// All four pipeline categories are fatal to the invocation: the first
/// error aborts, and the CLI maps it to a non-zero exit status.
#[derive(Debug, Error)]
pub enum CiriusError {
    #[error("[Lexical Error] {0}")]
    Lex(#[from] LexError),

    #[error("[Parse Error] {0}")]
    Parse(#[from] ParseError),

    #[error("[Semantic Error] {0}")]
    Semantic(#[from] SemanticError),

    #[error("[Runtime Error] {0}")]
    Runtime(#[from] RuntimeError),

    #[error("[IO Error] {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, CiriusError>;

/// Lex, parse, and analyze. Both back ends start from here.
pub fn front_end(source: &str) -> Result<Program> {
    let tokens = cirius_lex::tokenize(source)?;
    debug!("lexed {} tokens", tokens.len());

    let program = cirius_par::parse(tokens)?;
    debug!("parsed {} function(s)", program.functions.len());

    cirius_sem::analyze(&program)?;
    debug!("semantic analysis passed");

    Ok(program)
}

/// Compile source text to C source text.
pub fn compile_source(source: &str) -> Result<String> {
    let program = front_end(source)?;

    let instrs = cirius_ir::lower(&program);
    debug!("lowered to {} instruction(s)", instrs.len());

    let instrs = cirius_ir::optimize(instrs);
    debug!("optimized down to {} instruction(s)", instrs.len());

    Ok(cirius_gen::emit(&instrs))
}

/// Interpret source text against the given I/O handles.
pub fn run_source<'a>(
    source: &str,
    reader: Box<dyn BufRead + 'a>,
    writer: Box<dyn Write + 'a>,
) -> Result<()> {
    let program = front_end(source)?;
    let mut interpreter = Interpreter::new(reader, writer);
    interpreter.run(&program)?;
    Ok(())
}

/// Compile `input` to C, writing to `output` or to the default output
/// path. Returns the path written.
pub fn compile_file(input: &Path, output: Option<&Path>) -> Result<PathBuf> {
    let source = read_to_string(input)?;
    let c_source = compile_source(&source)?;

    let out_path = match output {
        Some(path) => path.to_path_buf(),
        None => default_output_path(input),
    };
    fs::write(&out_path, c_source).map_err(|source| CiriusError::Io {
        path: out_path.clone(),
        source,
    })?;
    debug!("wrote {}", out_path.display());
    Ok(out_path)
}

/// Interpret `input` with the process's stdin and stdout.
pub fn run_file(input: &Path) -> Result<()> {
    let source = read_to_string(input)?;
    let program = front_end(&source)?;
    let mut interpreter = Interpreter::from_stdio();
    interpreter.run(&program)?;
    Ok(())
}

/// The input path with its extension replaced by `.c`.
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("c")
}

fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| CiriusError::Io {
        path: path.to_path_buf(),
        source,
    })
}
