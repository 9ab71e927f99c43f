use std::rc::Rc;

use tracing::debug;

use crate::ast::{FunctionDef, MathOperator, Operand, Program, Statement, StatementKind};
use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::value::Value;

/// Parse a full source string into a [`Program`].
pub fn parse(source: &str) -> Result<Program> {
    let mut p = Parser {
        functions: Vec::new(),
    };
    let statements = p.parse_region(Cursor::new(source))?;
    debug!(
        statements = statements.len(),
        functions = p.functions.len(),
        "parsed program"
    );
    Ok(Program {
        statements,
        functions: p.functions,
    })
}

// ---------------------------------------------------------------------------
// Internal parser state
// ---------------------------------------------------------------------------

struct Parser {
    /// Function side-table, in order of the `function` keyword in the source.
    functions: Vec<Rc<FunctionDef>>,
}

impl Parser {
    // -----------------------------------------------------------------------
    // Regions and blocks
    // -----------------------------------------------------------------------

    /// Parse every statement in the cursor's region.
    fn parse_region(&mut self, mut cursor: Cursor<'_>) -> Result<Vec<Statement>> {
        let mut stmts = Vec::new();
        loop {
            cursor.skip_trivia();
            if cursor.is_eof() {
                break;
            }
            stmts.push(self.parse_statement(&mut cursor)?);
        }
        Ok(stmts)
    }

    /// Parse a `{ … }` body into a `Block` statement located at its `{`.
    fn parse_block(&mut self, cursor: &mut Cursor<'_>) -> Result<Statement> {
        let body = cursor.block()?;
        let offset = body.pos() - 1;
        Ok(Statement::new(offset, StatementKind::Block(self.parse_region(body)?)))
    }

    // -----------------------------------------------------------------------
    // Statement dispatch
    // -----------------------------------------------------------------------

    fn parse_statement(&mut self, cursor: &mut Cursor<'_>) -> Result<Statement> {
        let start = cursor.pos();
        if cursor.peek() == Some('}') {
            return Err(cursor.error_at(start, "unmatched `}`"));
        }

        let keyword = cursor.keyword();
        let kind = match keyword {
            "" if cursor.peek() == Some('{') => return self.parse_block(cursor),
            "" => return Err(cursor.error_at(start, "expected a command")),
            "say" => parse_say(cursor),
            "function" => self.parse_function(cursor, start)?,
            "call" => parse_call(cursor, start)?,
            "repeat" => self.parse_repeat(cursor)?,
            "if" => self.parse_if(cursor, start)?,
            "set" => parse_set(cursor, start)?,
            other => match MathOperator::from_keyword(other) {
                Some(operator) if cursor.peek() == Some('(') => parse_math(cursor, operator)?,
                _ => return Err(Error::unknown_command(cursor.source(), start, other)),
            },
        };

        Ok(Statement::new(start, kind))
    }

    // -----------------------------------------------------------------------
    // Compound statements
    // -----------------------------------------------------------------------

    /// `function name(a, b) { … }` or `function name a b { … }`.
    fn parse_function(&mut self, cursor: &mut Cursor<'_>, start: usize) -> Result<StatementKind> {
        cursor.skip_inline_whitespace();
        let name = cursor.keyword();
        if name.is_empty() {
            return Err(cursor.error_at(start, "expected a function name after `function`"));
        }
        cursor.skip_inline_whitespace();

        let parameters: Vec<String> = if cursor.peek() == Some('(') {
            cursor.paren_list()?.into_iter().map(parameter_name).collect()
        } else {
            cursor
                .read_while(|c| c != '{')
                .split_whitespace()
                .map(parameter_name)
                .collect()
        };

        // Reserve the slot before parsing the body so nested definitions
        // land after this one.
        let slot = self.functions.len();
        let body = self.parse_block(cursor)?;
        let def = Rc::new(FunctionDef {
            name: name.to_string(),
            parameters,
            body: Box::new(body),
        });
        self.functions.insert(slot, Rc::clone(&def));

        Ok(StatementKind::FunctionDef(def))
    }

    /// `repeat <count> { … }`.
    fn parse_repeat(&mut self, cursor: &mut Cursor<'_>) -> Result<StatementKind> {
        cursor.skip_inline_whitespace();
        let count_offset = cursor.pos();
        let token = cursor.read_while(|c| !c.is_whitespace() && c != '{');
        let count = token.parse::<i64>().map_err(|_| {
            cursor.error_at(
                count_offset,
                format!("repeat count must be an integer, found `{}`", token),
            )
        })?;
        let body = self.parse_block(cursor)?;
        Ok(StatementKind::Repeat {
            count,
            body: Box::new(body),
        })
    }

    /// `if <condition> { … } [else { … } | else if …]`.
    fn parse_if(&mut self, cursor: &mut Cursor<'_>, start: usize) -> Result<StatementKind> {
        cursor.skip_inline_whitespace();
        let condition = cursor.read_while(|c| c != '{').trim();
        if cursor.peek() != Some('{') {
            return Err(cursor.error_at(start, "expected `{` after if condition"));
        }
        if condition.is_empty() {
            return Err(cursor.error_at(start, "missing if condition"));
        }
        let condition = condition.to_string();
        let then_branch = self.parse_block(cursor)?;

        let else_branch = if cursor.peek_head() == "else" {
            cursor.skip_trivia();
            cursor.keyword();
            if cursor.peek_head() == "if" {
                cursor.skip_trivia();
                let nested = cursor.pos();
                cursor.keyword();
                let kind = self.parse_if(cursor, nested)?;
                Some(Box::new(Statement::new(nested, kind)))
            } else {
                Some(Box::new(self.parse_block(cursor)?))
            }
        } else {
            None
        };

        Ok(StatementKind::If {
            condition,
            then_branch: Box::new(then_branch),
            else_branch,
        })
    }
}

// ---------------------------------------------------------------------------
// Simple statements
// ---------------------------------------------------------------------------

/// `say <message>`; the message runs to the end of the line.
fn parse_say(cursor: &mut Cursor<'_>) -> StatementKind {
    cursor.skip_inline_whitespace();
    StatementKind::Print {
        message: cursor.rest_of_line().trim_end().to_string(),
    }
}

/// `call name(a, b)` or `call name a b`.
fn parse_call(cursor: &mut Cursor<'_>, start: usize) -> Result<StatementKind> {
    cursor.skip_inline_whitespace();
    let name = cursor.keyword();
    if name.is_empty() {
        return Err(cursor.error_at(start, "expected a function name after `call`"));
    }
    cursor.skip_inline_whitespace();

    let arguments = if cursor.peek() == Some('(') {
        cursor.paren_list()?
    } else {
        cursor.rest_of_line().split_whitespace().collect()
    };

    Ok(StatementKind::FunctionCall {
        name: name.to_string(),
        arguments: arguments.into_iter().map(str::to_string).collect(),
    })
}

/// `set [$]name = value`.
fn parse_set(cursor: &mut Cursor<'_>, start: usize) -> Result<StatementKind> {
    cursor.skip_inline_whitespace();
    let line = cursor.rest_of_line();
    let (name, value) = line
        .split_once('=')
        .ok_or_else(|| cursor.error_at(start, "expected `=` in set statement"))?;

    let name = name.trim();
    let name = name.strip_prefix('$').unwrap_or(name);
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(cursor.error_at(start, "expected a single variable name before `=`"));
    }

    Ok(StatementKind::SetVar {
        name: name.to_string(),
        value: parse_operand(value.trim()),
    })
}

/// `<op>(n1, n2, …)`; the cursor is on the `(`.
fn parse_math(cursor: &mut Cursor<'_>, operator: MathOperator) -> Result<StatementKind> {
    let list_offset = cursor.pos();
    let items = cursor.paren_list()?;
    if items.is_empty() {
        return Err(cursor.error_at(list_offset, format!("{} needs at least one number", operator)));
    }

    let operands = items
        .into_iter()
        .map(|item| {
            item.parse::<i64>().map_err(|_| {
                cursor.error_at(list_offset, format!("`{}` is not a valid integer", item))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(StatementKind::MathOp { operator, operands })
}

// ---------------------------------------------------------------------------
// Token-level helpers
// ---------------------------------------------------------------------------

/// Integer, then quoted string, then `$name` reference, else raw text.
fn parse_operand(text: &str) -> Operand {
    match text.strip_prefix('$') {
        Some(name) if !name.is_empty() => Operand::Reference(name.to_string()),
        _ => Operand::Literal(Value::from_literal(text)),
    }
}

fn parameter_name(token: &str) -> String {
    token.strip_prefix('$').unwrap_or(token).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<StatementKind> {
        parse(source)
            .unwrap()
            .statements
            .into_iter()
            .map(|s| s.kind)
            .collect()
    }

    fn block(stmts: &Statement) -> &[Statement] {
        match &stmts.kind {
            StatementKind::Block(body) => body,
            other => panic!("expected a block, got {:?}", other),
        }
    }

    #[test]
    fn say_keeps_markers_and_stops_at_newline() {
        assert_eq!(
            kinds("say Hello, $name!\nsay bye"),
            vec![
                StatementKind::Print {
                    message: "Hello, $name!".into()
                },
                StatementKind::Print {
                    message: "bye".into()
                },
            ]
        );
    }

    #[test]
    fn math_statements() {
        assert_eq!(
            kinds("add(1, 2, 3) power(2,3,2)"),
            vec![
                StatementKind::MathOp {
                    operator: MathOperator::Add,
                    operands: vec![1, 2, 3]
                },
                StatementKind::MathOp {
                    operator: MathOperator::Power,
                    operands: vec![2, 3, 2]
                },
            ]
        );
    }

    #[test]
    fn math_requires_integers() {
        let err = parse("add()").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_eq!(err.offset(), Some(3));

        let err = parse("multiply(2, x)").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }

    #[test]
    fn empty_list_items_are_syntax_errors() {
        let err = parse("add(1,,2)").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_eq!(err.offset(), Some(6));

        assert_eq!(parse("add(1, 2,)").unwrap_err().kind(), ErrorKind::Syntax);
        assert_eq!(parse("call f(1,,2)").unwrap_err().kind(), ErrorKind::Syntax);
        assert_eq!(parse("function f(a,) { say hi }").unwrap_err().kind(), ErrorKind::Syntax);
    }

    #[test]
    fn empty_parens_mean_no_parameters_or_arguments() {
        let program = parse("function f() { say hi }\ncall f()").unwrap();
        assert!(program.functions[0].parameters.is_empty());
        assert_eq!(
            program.statements[1].kind,
            StatementKind::FunctionCall {
                name: "f".into(),
                arguments: vec![]
            }
        );
    }

    #[test]
    fn math_keyword_without_paren_is_unknown() {
        let err = parse("add 1 2").unwrap_err();
        assert_eq!(
            err,
            Error::UnknownCommand {
                keyword: "add".into(),
                offset: 0,
                snippet: "add 1 2".into()
            }
        );
    }

    #[test]
    fn unknown_command_names_keyword() {
        let err = parse("say ok\n  shout loud").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownCommand);
        assert_eq!(err.offset(), Some(9));
        assert!(err.to_string().contains("'shout'"));
    }

    #[test]
    fn set_values() {
        assert_eq!(
            kinds("set $x = 5\nset y = \"hi there\"\nset z = $x\nset w = plain words"),
            vec![
                StatementKind::SetVar {
                    name: "x".into(),
                    value: Operand::Literal(Value::Int(5))
                },
                StatementKind::SetVar {
                    name: "y".into(),
                    value: Operand::Literal(Value::from("hi there"))
                },
                StatementKind::SetVar {
                    name: "z".into(),
                    value: Operand::Reference("x".into())
                },
                StatementKind::SetVar {
                    name: "w".into(),
                    value: Operand::Literal(Value::from("plain words"))
                },
            ]
        );
    }

    #[test]
    fn set_without_equals_fails() {
        assert_eq!(parse("set x 5").unwrap_err().kind(), ErrorKind::Syntax);
    }

    #[test]
    fn repeat_parses_count_and_body() {
        let program = parse("repeat 3 {\n  say hi\n}").unwrap();
        match &program.statements[0].kind {
            StatementKind::Repeat { count, body } => {
                assert_eq!(*count, 3);
                assert_eq!(body.offset, 9);
                assert_eq!(block(body).len(), 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn repeat_rejects_non_integer_count() {
        let err = parse("repeat many { say hi }").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_eq!(err.offset(), Some(7));
    }

    #[test]
    fn function_with_parens_and_one_line_body() {
        let program = parse("function f(a,b){ say $a-$b } call f(1,2) call f(1,2)").unwrap();
        assert_eq!(program.statements.len(), 3);
        assert_eq!(program.functions.len(), 1);

        let def = &program.functions[0];
        assert_eq!(def.name, "f");
        assert_eq!(def.parameters, vec!["a", "b"]);
        assert_eq!(
            block(&def.body)[0].kind,
            StatementKind::Print {
                message: "$a-$b".into()
            }
        );
        assert_eq!(
            program.statements[1].kind,
            StatementKind::FunctionCall {
                name: "f".into(),
                arguments: vec!["1".into(), "2".into()]
            }
        );
    }

    #[test]
    fn whitespace_forms_of_function_and_call() {
        let program = parse("function greet who greeting {\n say $greeting $who\n}\ncall greet Ada \"Hi\"").unwrap();
        assert_eq!(program.functions[0].parameters, vec!["who", "greeting"]);
        assert_eq!(
            program.statements[1].kind,
            StatementKind::FunctionCall {
                name: "greet".into(),
                arguments: vec!["Ada".into(), "\"Hi\"".into()]
            }
        );
    }

    #[test]
    fn nested_functions_are_recorded_in_textual_order() {
        let program = parse("function outer() { function inner() { say in } }").unwrap();
        let names: Vec<_> = program.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["outer", "inner"]);
    }

    #[test]
    fn if_else_detection() {
        let program = parse("if $x > 3 { say Big }\n\n else { say Small }").unwrap();
        match &program.statements[0].kind {
            StatementKind::If {
                condition,
                else_branch,
                ..
            } => {
                assert_eq!(condition, "$x > 3");
                assert!(else_branch.is_some());
            }
            other => panic!("unexpected {:?}", other),
        }

        let err = parse("if 1 { say a } elsewhere").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownCommand);
    }

    #[test]
    fn else_if_chains_nest() {
        let program = parse("if $x == 1 { say one } else if $x == 2 { say two } else { say many }").unwrap();
        let StatementKind::If { else_branch, .. } = &program.statements[0].kind else {
            panic!("expected if");
        };
        let nested = else_branch.as_ref().unwrap();
        assert_eq!(nested.offset, 28);
        match &nested.kind {
            StatementKind::If {
                condition,
                else_branch,
                ..
            } => {
                assert_eq!(condition, "$x == 2");
                assert!(else_branch.is_some());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn nested_blocks_parse_recursively() {
        let src = "repeat 2 { if 1 { repeat 1 { say deep } } }";
        let program = parse(src).unwrap();
        assert_eq!(program.statements.len(), 1);
    }

    #[test]
    fn unbalanced_braces_are_syntax_errors() {
        let err = parse("repeat 2 {\n  say hi\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_eq!(err.offset(), Some(9));

        let err = parse("say hi\n}").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_eq!(err.offset(), Some(7));
    }

    #[test]
    fn comments_and_bare_blocks() {
        let program = parse("# intro\n{ set x = 1 }\n# done").unwrap();
        assert_eq!(program.statements.len(), 1);
        assert_eq!(program.statements[0].offset, 8);
        assert_eq!(block(&program.statements[0]).len(), 1);
    }

    #[test]
    fn empty_source_is_empty_program() {
        assert_eq!(parse("  \n\t\n").unwrap(), Program::default());
    }
}
