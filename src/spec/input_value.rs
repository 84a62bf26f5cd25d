use apollo_compiler::ast;

use crate::error::LocalStateError;
use crate::json_ext::Object;
use crate::json_ext::Value;

/// A GraphQL input value as written in the operation document.
///
/// Kept in converted form so argument lists can be resolved against the
/// current variables during local execution and re-printed verbatim into the
/// residual operation sent to the transport. Numbers stay as source text
/// until resolution so printing never reformats them.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum InputValue {
    Null,
    Boolean(bool),
    Int(String),
    Float(String),
    String(String),
    Enum(String),
    Variable(String),
    List(Vec<InputValue>),
    Object(Vec<(String, InputValue)>),
}

impl InputValue {
    /// Convert a parsed value, range checking numeric literals so that
    /// resolution can never silently degrade one to null.
    pub(crate) fn from_ast(value: &ast::Value) -> Result<Self, LocalStateError> {
        match value {
            ast::Value::Null => Ok(Self::Null),
            ast::Value::Boolean(b) => Ok(Self::Boolean(*b)),
            ast::Value::Int(i) => {
                let raw = i.to_string();
                raw.parse::<i64>()
                    .map_err(|_| LocalStateError::InvalidDocument {
                        reason: format!("integer literal '{raw}' is out of range"),
                    })?;
                Ok(Self::Int(raw))
            }
            ast::Value::Float(f) => {
                let raw = f.to_string();
                if !raw.parse::<f64>().map(f64::is_finite).unwrap_or(false) {
                    return Err(LocalStateError::InvalidDocument {
                        reason: format!("float literal '{raw}' is out of range"),
                    });
                }
                Ok(Self::Float(raw))
            }
            ast::Value::String(s) => Ok(Self::String(s.clone())),
            ast::Value::Enum(name) => Ok(Self::Enum(name.as_str().to_owned())),
            ast::Value::Variable(name) => Ok(Self::Variable(name.as_str().to_owned())),
            ast::Value::List(values) => Ok(Self::List(
                values
                    .iter()
                    .map(|value| Self::from_ast(value))
                    .collect::<Result<Vec<_>, LocalStateError>>()?,
            )),
            ast::Value::Object(fields) => Ok(Self::Object(
                fields
                    .iter()
                    .map(|(name, value)| {
                        Ok((name.as_str().to_owned(), Self::from_ast(value)?))
                    })
                    .collect::<Result<Vec<_>, LocalStateError>>()?,
            )),
        }
    }

    /// Resolve this value against the current variables.
    ///
    /// A variable with no value resolves to null, matching the coercion of
    /// absent nullable inputs.
    pub(crate) fn resolve(&self, variables: &Object) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Boolean(b) => Value::Bool(*b),
            // numeric literals were range checked in from_ast, the null
            // fallbacks cannot trigger
            Self::Int(raw) => raw
                .parse::<i64>()
                .ok()
                .map(serde_json::Number::from)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::Float(raw) => raw
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::String(s) => Value::String(s.as_str().into()),
            Self::Enum(name) => Value::String(name.as_str().into()),
            Self::Variable(name) => variables
                .get(name.as_str())
                .cloned()
                .unwrap_or(Value::Null),
            Self::List(values) => {
                Value::Array(values.iter().map(|value| value.resolve(variables)).collect())
            }
            Self::Object(fields) => {
                let mut object = Object::with_capacity(fields.len());
                for (name, value) in fields {
                    object.insert(name.as_str(), value.resolve(variables));
                }
                Value::Object(object)
            }
        }
    }

    /// Print this value back in GraphQL syntax.
    pub(crate) fn write(&self, buf: &mut String) {
        match self {
            Self::Null => buf.push_str("null"),
            Self::Boolean(b) => buf.push_str(if *b { "true" } else { "false" }),
            Self::Int(raw) | Self::Float(raw) => buf.push_str(raw),
            Self::String(s) => write_string_literal(s, buf),
            Self::Enum(name) => buf.push_str(name),
            Self::Variable(name) => {
                buf.push('$');
                buf.push_str(name);
            }
            Self::List(values) => {
                buf.push('[');
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        buf.push_str(", ");
                    }
                    value.write(buf);
                }
                buf.push(']');
            }
            Self::Object(fields) => {
                buf.push('{');
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        buf.push_str(", ");
                    }
                    buf.push_str(name);
                    buf.push_str(": ");
                    value.write(buf);
                }
                buf.push('}');
            }
        }
    }
}

fn write_string_literal(value: &str, buf: &mut String) {
    buf.push('"');
    for c in value.chars() {
        match c {
            '"' => buf.push_str("\\\""),
            '\\' => buf.push_str("\\\\"),
            '\n' => buf.push_str("\\n"),
            '\r' => buf.push_str("\\r"),
            '\t' => buf.push_str("\\t"),
            c => buf.push(c),
        }
    }
    buf.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json_bytes::json;
    use test_log::test;

    fn parse_value(source: &str) -> InputValue {
        let document = ast::Document::parse(format!("{{ field(arg: {source}) }}"), "test.graphql")
            .expect("valid document");
        let operation = document
            .definitions
            .iter()
            .find_map(|definition| match definition {
                ast::Definition::OperationDefinition(operation) => Some(operation),
                _ => None,
            })
            .expect("one operation");
        let field = match &operation.selection_set[0] {
            ast::Selection::Field(field) => field,
            _ => panic!("expected a field"),
        };
        InputValue::from_ast(&field.arguments[0].value).expect("valid value")
    }

    #[test]
    fn resolves_literals() {
        let variables = Object::new();
        assert_eq!(parse_value("42").resolve(&variables), json!(42));
        assert_eq!(parse_value("4.5").resolve(&variables), json!(4.5));
        assert_eq!(parse_value("\"hi\"").resolve(&variables), json!("hi"));
        assert_eq!(parse_value("true").resolve(&variables), json!(true));
        assert_eq!(parse_value("null").resolve(&variables), Value::Null);
        assert_eq!(parse_value("ASC").resolve(&variables), json!("ASC"));
        assert_eq!(
            parse_value("[1, 2]").resolve(&variables),
            json!([1, 2])
        );
        assert_eq!(
            parse_value("{ a: 1, b: \"x\" }").resolve(&variables),
            json!({ "a": 1, "b": "x" })
        );
    }

    #[test]
    fn resolves_variables_against_current_values() {
        let variables = json!({ "id": 7 }).as_object().unwrap().clone();
        assert_eq!(parse_value("$id").resolve(&variables), json!(7));
        // absent variables coerce to null
        assert_eq!(parse_value("$missing").resolve(&variables), Value::Null);
    }

    #[test]
    fn out_of_range_numeric_literals_are_rejected() {
        use crate::spec::Operation;

        let result = Operation::parse("{ f(n: 99999999999999999999) }", None);
        assert!(matches!(
            result,
            Err(LocalStateError::InvalidDocument { .. })
        ));

        let result = Operation::parse("{ f(n: 1e999) }", None);
        assert!(matches!(
            result,
            Err(LocalStateError::InvalidDocument { .. })
        ));
    }

    #[test]
    fn prints_back_in_graphql_syntax() {
        let value = parse_value("{ ids: [$a, 2], label: \"a \\\"b\\\"\" }");
        let mut buf = String::new();
        value.write(&mut buf);
        assert_eq!(buf, "{ids: [$a, 2], label: \"a \\\"b\\\"\"}");
    }
}
