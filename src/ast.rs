use std::fmt;
use std::rc::Rc;

use crate::value::Value;

/// The arithmetic commands: `add(…)`, `subtract(…)`, …
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
}

impl MathOperator {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "add" => Self::Add,
            "subtract" => Self::Subtract,
            "multiply" => Self::Multiply,
            "divide" => Self::Divide,
            "modulo" => Self::Modulo,
            "power" => Self::Power,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
            Self::Modulo => "modulo",
            Self::Power => "power",
        }
    }
}

impl fmt::Display for MathOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Right-hand side of a `set` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// An integer or string written directly in the source.
    Literal(Value),
    /// `$name`, looked up when the statement runs.
    Reference(String),
}

/// A user-defined function: `function name(a, b) { … }`.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub parameters: Vec<String>,
    /// Always a [`StatementKind::Block`].
    pub body: Box<Statement>,
}

/// One parsed statement together with the byte offset where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub offset: usize,
    pub kind: StatementKind,
}

impl Statement {
    pub fn new(offset: usize, kind: StatementKind) -> Self {
        Self { offset, kind }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    /// `say …`; the message keeps its `$name` markers until evaluation.
    Print { message: String },
    MathOp {
        operator: MathOperator,
        operands: Vec<i64>,
    },
    /// Brace-delimited body. Runs in its own child scope.
    Block(Vec<Statement>),
    Repeat {
        count: i64,
        body: Box<Statement>,
    },
    /// Shared with [`Program::functions`], which is what actually makes the
    /// function callable.
    FunctionDef(Rc<FunctionDef>),
    /// Arguments are kept as raw text and resolved in the caller's scope at
    /// call time.
    FunctionCall { name: String, arguments: Vec<String> },
    /// Binds an already-resolved value in the current scope. Never produced
    /// by the parser; calls use it to bind parameters.
    VarDecl { name: String, value: Value },
    If {
        condition: String,
        then_branch: Box<Statement>,
        else_branch: Option<Box<Statement>>,
    },
    SetVar { name: String, value: Operand },
}

/// A parsed source file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
    /// Every function definition in textual order, nested ones included.
    pub functions: Vec<Rc<FunctionDef>>,
}
