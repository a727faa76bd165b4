//! Shared helpers for building JQL and CQL strings.

/// Wrap a literal in double quotes, escaping backslashes and embedded quotes.
///
/// JQL and CQL both accept backslash escapes inside quoted strings, so an
/// embedded `"` can never terminate the literal early.
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// `field <op> "value"`
pub fn condition(field: &str, op: &str, value: &str) -> String {
    format!("{field} {op} {}", quote(value))
}

/// Join conditions with `AND`.
pub fn and(conditions: &[String]) -> String {
    conditions.join(" AND ")
}

/// A single condition stays bare; several are OR'd inside parentheses.
pub fn any_of(conditions: Vec<String>) -> Option<String> {
    match conditions.len() {
        0 => None,
        1 => conditions.into_iter().next(),
        _ => Some(format!("({})", conditions.join(" OR "))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_plain_value() {
        assert_eq!(quote("In Progress"), "\"In Progress\"");
    }

    #[test]
    fn test_quote_escapes_embedded_quotes() {
        assert_eq!(quote(r#"say "hi""#), r#""say \"hi\"""#);
    }

    #[test]
    fn test_quote_escapes_backslashes() {
        assert_eq!(quote(r"C:\temp"), r#""C:\\temp""#);
    }

    #[test]
    fn test_any_of() {
        assert_eq!(any_of(vec![]), None);
        assert_eq!(
            any_of(vec!["summary ~ \"a\"".to_string()]),
            Some("summary ~ \"a\"".to_string())
        );
        assert_eq!(
            any_of(vec!["summary ~ \"a\"".to_string(), "summary ~ \"b\"".to_string()]),
            Some("(summary ~ \"a\" OR summary ~ \"b\")".to_string())
        );
    }
}
