//! Query sanitization for lexical search (spec.md §4.7)
//!
//! A blunt defense against full-text syntax injection: strips anything that
//! isn't alphanumeric, underscore, hyphen, dot, or whitespace, then
//! collapses whitespace runs. This intentionally removes operator
//! characters a BM25 query syntax might otherwise interpret.

pub fn sanitize_query(query: &str) -> String {
    let replaced: String = query
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_operator_characters() {
        assert_eq!(sanitize_query("foo AND (bar OR baz)"), "foo AND bar OR baz");
    }

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(sanitize_query("foo    bar"), "foo bar");
    }

    #[test]
    fn keeps_underscores_hyphens_and_dots() {
        assert_eq!(sanitize_query("my_func-name.go"), "my_func-name.go");
    }

    #[test]
    fn trims_leading_and_trailing_space() {
        assert_eq!(sanitize_query("  hello  "), "hello");
    }

    #[test]
    fn removes_quotes_and_special_syntax() {
        assert_eq!(sanitize_query(r#""quoted" + term*"#), "quoted term");
    }
}
