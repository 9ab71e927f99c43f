use std::fmt;

/// A runtime value. Every variable holds either an integer or a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Text(String),
}

impl Value {
    /// Parse a literal token: an integer if it is one, otherwise the text with
    /// one pair of surrounding quotes removed.
    pub fn from_literal(text: &str) -> Self {
        match text.parse::<i64>() {
            Ok(n) => Value::Int(n),
            Err(_) => Value::Text(strip_quotes(text).to_string()),
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(n) => *n != 0,
            Value::Text(s) => !s.is_empty() && !s.eq_ignore_ascii_case("false"),
        }
    }

    /// Numeric view used by ordering comparisons. Text that is not a number
    /// becomes NaN, so every ordering against it is false.
    pub fn as_f64(&self) -> f64 {
        match self {
            Value::Int(n) => *n as f64,
            Value::Text(s) => s.trim().parse().unwrap_or(f64::NAN),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

/// Remove one pair of matching `"` or `'` quotes, if present.
pub(crate) fn strip_quotes(text: &str) -> &str {
    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return &text[1..text.len() - 1];
        }
    }
    text
}
