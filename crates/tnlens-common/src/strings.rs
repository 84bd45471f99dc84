//! String utility functions shared across tnlens crates.

/// Escape a value for CSV output with the given field separator.
///
/// Quotes the value when it contains the separator, a double quote, or a
/// line break, doubling any embedded quotes. Values that need no quoting
/// are passed through untouched.
pub fn csv_escape(value: &str, separator: char) -> String {
    let needs_quoting = value.contains(separator)
        || value.contains('"')
        || value.contains('\n')
        || value.contains('\r');

    if !needs_quoting {
        return value.to_string();
    }

    let mut result = String::with_capacity(value.len() + 2);
    result.push('"');
    for c in value.chars() {
        if c == '"' {
            result.push('"');
        }
        result.push(c);
    }
    result.push('"');
    result
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_space = false;

    for c in s.trim().chars() {
        if c.is_whitespace() {
            if !in_space {
                result.push(' ');
            }
            in_space = true;
        } else {
            result.push(c);
            in_space = false;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_escape_plain_value_unchanged() {
        assert_eq!(csv_escape("hello", ','), "hello");
        assert_eq!(csv_escape("", ','), "");
    }

    #[test]
    fn test_csv_escape_quotes_separator() {
        assert_eq!(csv_escape("a,b", ','), "\"a,b\"");
        assert_eq!(csv_escape("a;b", ';'), "\"a;b\"");
    }

    #[test]
    fn test_csv_escape_separator_mismatch_not_quoted() {
        assert_eq!(csv_escape("a,b", ';'), "a,b");
    }

    #[test]
    fn test_csv_escape_doubles_embedded_quotes() {
        assert_eq!(csv_escape("say \"hi\"", ','), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_csv_escape_quotes_newlines() {
        assert_eq!(csv_escape("a\nb", ','), "\"a\nb\"");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a   b \t c  "), "a b c");
        assert_eq!(collapse_whitespace(""), "");
        assert_eq!(collapse_whitespace("x"), "x");
    }
}
