//! Resolution of the textual operands that statements carry: call
//! arguments, `if` conditions and `$name` markers inside `say` messages.

use std::cmp::Ordering;

use crate::scope::Scope;
use crate::value::{strip_quotes, Value};

/// Comparison operators, two-character forms first so `<=` is never split
/// into `<` and `=`.
const OPERATORS: [&str; 6] = ["==", "!=", "<=", ">=", "<", ">"];

/// Resolve one operand.
///
/// Lookup order: a bound variable (with or without the `$` sigil), then an
/// integer literal, then a quoted string, then the raw text.
pub fn resolve_value(text: &str, scope: &Scope<'_>) -> Value {
    let text = text.trim();
    let name = text.strip_prefix('$').unwrap_or(text);
    if let Some(value) = scope.lookup(name) {
        return value.clone();
    }
    match name.parse::<i64>() {
        Ok(n) => Value::Int(n),
        Err(_) => Value::Text(strip_quotes(text).to_string()),
    }
}

// ---------------------------------------------------------------------------
// Condition evaluation
// ---------------------------------------------------------------------------

/// Evaluate an `if` condition.
///
/// `<lhs> <op> <rhs>` compares the two resolved operands; `==` and `!=` use
/// value equality (an integer never equals text), the ordering operators
/// compare numerically. Without an operator the whole text is resolved and
/// tested for truthiness.
pub fn evaluate_condition(text: &str, scope: &Scope<'_>) -> bool {
    let Some((index, op)) = find_operator(text) else {
        return resolve_value(text, scope).is_truthy();
    };

    let lhs = resolve_value(&text[..index], scope);
    let rhs = resolve_value(&text[index + op.len()..], scope);

    match op {
        "==" => lhs == rhs,
        "!=" => lhs != rhs,
        _ => {
            // NaN compares as None, which fails every ordering below.
            let ordering = lhs.as_f64().partial_cmp(&rhs.as_f64());
            match op {
                "<" => ordering == Some(Ordering::Less),
                ">" => ordering == Some(Ordering::Greater),
                "<=" => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
                ">=" => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
                _ => false,
            }
        }
    }
}

/// The earliest operator in `text` and its byte index.
fn find_operator(text: &str) -> Option<(usize, &'static str)> {
    (0..text.len())
        .filter(|&i| text.is_char_boundary(i))
        .find_map(|i| {
            OPERATORS
                .iter()
                .find(|op| text[i..].starts_with(*op))
                .map(|op| (i, *op))
        })
}

// ---------------------------------------------------------------------------
// String interpolation
// ---------------------------------------------------------------------------

/// Replace every `$identifier` with the string form of its value. References
/// that are not bound are copied through unchanged.
pub fn interpolate(message: &str, scope: &Scope<'_>) -> String {
    let mut result = String::with_capacity(message.len());
    let mut rest = message;

    while let Some(sigil) = rest.find('$') {
        result.push_str(&rest[..sigil]);
        let after = &rest[sigil + 1..];
        let len = after
            .find(|c: char| !is_identifier_char(c))
            .unwrap_or(after.len());
        let name = &after[..len];

        match scope.lookup(name).filter(|_| !name.is_empty()) {
            Some(value) => result.push_str(&value.to_string()),
            None => {
                result.push('$');
                result.push_str(name);
            }
        }
        rest = &after[len..];
    }

    result.push_str(rest);
    result
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
