use std::rc::Rc;

use tracing::{debug, instrument, trace};

use crate::ast::{Operand, Program, Statement, StatementKind};
use crate::error::{Error, Result};
use crate::math;
use crate::resolve::{evaluate_condition, interpolate, resolve_value};
use crate::scope::Scope;
use crate::value::Value;

// ---------------------------------------------------------------------------
// Output sinks
// ---------------------------------------------------------------------------

/// Receives every line a program prints, in order: one per `say` and one per
/// math result.
pub trait Output {
    fn emit(&mut self, line: String);
}

/// Collects lines in memory.
impl Output for Vec<String> {
    fn emit(&mut self, line: String) {
        self.push(line);
    }
}

impl<O: Output + ?Sized> Output for &mut O {
    fn emit(&mut self, line: String) {
        (**self).emit(line);
    }
}

/// Prints each line to stdout as soon as it is produced.
#[derive(Debug, Default, Clone, Copy)]
pub struct Stdout;

impl Output for Stdout {
    fn emit(&mut self, line: String) {
        println!("{}", line);
    }
}

// ---------------------------------------------------------------------------
// Evaluator
// ---------------------------------------------------------------------------

/// Tree-walking executor for parsed programs.
pub struct Evaluator<O> {
    output: O,
}

impl<O: Output> Evaluator<O> {
    pub fn new(output: O) -> Self {
        Self { output }
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn into_output(self) -> O {
        self.output
    }

    /// Run a whole program in a fresh root scope.
    pub fn run(&mut self, program: &Program) -> Result<()> {
        let mut root = Scope::root();
        hoist(program, &mut root);
        self.execute(&program.statements, &mut root)
    }

    /// Execute statements in order, stopping at the first error.
    pub fn execute(&mut self, stmts: &[Statement], scope: &mut Scope<'_>) -> Result<()> {
        for stmt in stmts {
            self.execute_one(stmt, scope)?;
        }
        Ok(())
    }

    pub fn execute_one(&mut self, stmt: &Statement, scope: &mut Scope<'_>) -> Result<()> {
        trace!(offset = stmt.offset, depth = scope.depth(), "execute");

        match &stmt.kind {
            StatementKind::Print { message } => {
                let line = interpolate(message, scope);
                self.output.emit(line);
            }
            StatementKind::MathOp { operator, operands } => {
                let result = math::apply(*operator, operands, stmt.offset)?;
                self.output.emit(format!("{}: {}", operator, result));
            }
            StatementKind::Block(body) => {
                let mut child = scope.child();
                self.execute(body, &mut child)?;
            }
            StatementKind::Repeat { count, body } => {
                for _ in 0..*count {
                    self.execute_one(body, scope)?;
                }
            }
            // Registered by `hoist` before the program started.
            StatementKind::FunctionDef(_) => {}
            StatementKind::FunctionCall { name, arguments } => {
                self.call_function(name, arguments, stmt.offset, scope)?;
            }
            StatementKind::VarDecl { name, value } => {
                scope.define(name.clone(), value.clone());
            }
            StatementKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if evaluate_condition(condition, scope) {
                    self.execute_one(then_branch, scope)?;
                } else if let Some(else_branch) = else_branch {
                    self.execute_one(else_branch, scope)?;
                }
            }
            StatementKind::SetVar { name, value } => {
                let value = match value {
                    Operand::Literal(value) => value.clone(),
                    Operand::Reference(reference) => scope
                        .lookup(reference)
                        .cloned()
                        .unwrap_or_else(|| Value::Text(format!("${}", reference))),
                };
                scope.define(name.clone(), value);
            }
        }

        Ok(())
    }

    /// Invoke a user function in a fresh child of the calling scope.
    ///
    /// Arguments are resolved in the caller's scope, then bound to the
    /// parameters through `VarDecl` statements in the new frame.
    #[instrument(level = "debug", skip(self, arguments, scope))]
    fn call_function(
        &mut self,
        name: &str,
        arguments: &[String],
        offset: usize,
        scope: &Scope<'_>,
    ) -> Result<()> {
        let def = scope
            .lookup_function(name)
            .cloned()
            .ok_or_else(|| Error::UndefinedFunction {
                name: name.to_string(),
                offset,
            })?;

        if def.parameters.len() != arguments.len() {
            return Err(Error::ArityMismatch {
                name: name.to_string(),
                expected: def.parameters.len().to_string(),
                found: arguments.len(),
                offset,
            });
        }

        let mut frame = scope.child();
        for (parameter, argument) in def.parameters.iter().zip(arguments) {
            let binding = Statement::new(
                offset,
                StatementKind::VarDecl {
                    name: parameter.clone(),
                    value: resolve_value(argument, scope),
                },
            );
            self.execute_one(&binding, &mut frame)?;
        }

        match &def.body.kind {
            StatementKind::Block(body) => self.execute(body, &mut frame),
            _ => self.execute_one(&def.body, &mut frame),
        }
    }
}

/// Make every declared function callable from anywhere in the program.
/// Definitions later in the source replace earlier ones of the same name.
fn hoist(program: &Program, root: &mut Scope<'_>) {
    for def in &program.functions {
        debug!(name = %def.name, parameters = def.parameters.len(), "hoisting function");
        root.define_function(Rc::clone(def));
    }
}
