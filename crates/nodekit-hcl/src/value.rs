//! Attribute values for HCL documents.

use std::fmt;

/// An attribute value: literal, list, or a bare reference to another
/// resource (`aws_instance.node[*].id`).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Bool(bool),
    List(Vec<Value>),
    /// Rendered unquoted, parts joined with `.`.
    Traversal(Vec<String>),
}

impl Value {
    pub fn string(value: impl Into<String>) -> Self {
        Value::String(value.into())
    }

    pub fn int(value: i64) -> Self {
        Value::Int(value)
    }

    pub fn bool(value: bool) -> Self {
        Value::Bool(value)
    }

    pub fn string_list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Value::List(values.into_iter().map(|v| Value::String(v.into())).collect())
    }

    /// Reference to another block's attribute, e.g.
    /// `Value::traversal(["tls_private_key", "pk", "public_key_openssh"])`.
    pub fn traversal<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Value::Traversal(parts.into_iter().map(Into::into).collect())
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "\"")?;
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            // `${` and `%{` start template sequences inside quoted strings;
            // doubling the sigil keeps them literal.
            '$' | '%' if chars.peek() == Some(&'{') => write!(f, "{c}{c}")?,
            c => write!(f, "{c}")?,
        }
    }
    write!(f, "\"")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write_quoted(f, s),
            Value::Int(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Traversal(parts) => write!(f, "{}", parts.join(".")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_literals() {
        assert_eq!(Value::string("us-east-1").to_string(), "\"us-east-1\"");
        assert_eq!(Value::int(9650).to_string(), "9650");
        assert_eq!(Value::bool(true).to_string(), "true");
    }

    #[test]
    fn renders_string_list() {
        let v = Value::string_list(["0.0.0.0/0"]);
        assert_eq!(v.to_string(), "[\"0.0.0.0/0\"]");
    }

    #[test]
    fn renders_traversal_unquoted() {
        let v = Value::traversal(["aws_instance", "node[*]", "id"]);
        assert_eq!(v.to_string(), "aws_instance.node[*].id");
    }

    #[test]
    fn escapes_quotes_in_strings() {
        assert_eq!(Value::string("a\"b").to_string(), "\"a\\\"b\"");
    }

    #[test]
    fn keeps_template_sequences_literal() {
        assert_eq!(Value::string("a${b}").to_string(), "\"a$${b}\"");
        assert_eq!(Value::string("a%{b}").to_string(), "\"a%%{b}\"");
        // a bare sigil without a brace needs no escaping
        assert_eq!(Value::string("us$d").to_string(), "\"us$d\"");
    }
}
