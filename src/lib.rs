//! Primer: a small scripting language for teaching programming.
//!
//! A program is a sequence of commands:
//!
//! ```text
//! set $name = "World"
//! say Hello, $name
//!
//! function greet(who) {
//!     say Hi, $who
//! }
//! call greet(Ada)
//!
//! repeat 2 {
//!     add(1, 2, 3)
//! }
//!
//! if $name == "World" { say hi } else { say bye }
//! ```
//!
//! [`parse`] turns source text into a [`Program`], and an [`Evaluator`] runs
//! it, sending every output line to an [`Output`] sink. [`run`] does both.

pub mod ast;
mod cursor;
pub mod error;
pub mod evaluator;
pub mod math;
pub mod parser;
pub mod resolve;
pub mod scope;
pub mod value;

use std::sync::Once;

pub use ast::{FunctionDef, MathOperator, Operand, Program, Statement, StatementKind};
pub use error::{Error, ErrorKind, Result};
pub use evaluator::{Evaluator, Output, Stdout};
pub use parser::parse;
pub use scope::Scope;
pub use value::Value;

/// Parse and execute `source`, streaming output lines into `output`.
///
/// Lines emitted before a runtime error are kept in the sink.
pub fn run<O: Output>(source: &str, output: O) -> Result<()> {
    let program = parse(source)?;
    Evaluator::new(output).run(&program)
}

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset. Safe to call multiple times.
/// `RUST_LOG=primer=debug` shows parsing and function calls,
/// `RUST_LOG=primer=trace` every executed statement.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}
