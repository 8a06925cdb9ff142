//! Positional arguments of an engine definition.
//!
//! Only the outermost parenthesised list is read. Nested expressions such as
//! `cityHash64(user_id)` are kept as opaque text and anything after the
//! closing parenthesis (`PARTITION BY ...`, `SETTINGS ...`) is ignored.

use super::engine_lexer::{tokenize, Token};

/// Ordered engine constructor arguments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineArguments {
    values: Vec<String>,
    blank_call: bool,
}

impl EngineArguments {
    /// Extracts the arguments of the first call in `engine_full`.
    ///
    /// ```text
    /// ""                              -> []
    /// "Log"                           -> []
    /// "X()"                           -> [""]
    /// "X('a',)"                       -> ["a", ""]
    /// "X('a', 2, '', f(x))"           -> ["a", "2", "", "f(x)"]
    /// ```
    pub fn parse(engine_full: &str) -> Self {
        let mut values: Vec<String> = Vec::new();
        let mut depth = 0usize;
        let mut saw_token = false;

        for token in tokenize(engine_full) {
            match (&token, depth) {
                (Token::LeftParen, 0) => {
                    depth = 1;
                    values.push(String::new());
                    continue;
                }
                // Only the parenthesised list is of interest
                (_, 0) => continue,
                (Token::RightParen, 1) => break,
                (Token::Comma, 1) => {
                    saw_token = true;
                    values.push(String::new());
                    continue;
                }
                (Token::LeftParen, _) => depth += 1,
                (Token::RightParen, _) => depth -= 1,
                _ => {}
            }

            saw_token = true;
            if let Some(current) = values.last_mut() {
                current.push_str(token.text());
            }
        }

        let blank_call = !saw_token && values.len() == 1;
        EngineArguments { values, blank_call }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.values
    }

    /// `true` for `X()`: parentheses present, nothing inside them
    pub fn is_blank_call(&self) -> bool {
        self.blank_call
    }

    pub fn into_vec(self) -> Vec<String> {
        self.values
    }
}

/// Shorthand for [`EngineArguments::parse`] returning the plain values
pub fn extract(engine_full: &str) -> Vec<String> {
    EngineArguments::parse(engine_full).into_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_extract_without_parentheses() {
        assert!(extract("").is_empty());
        assert!(extract("Log").is_empty());
        assert!(extract("MergeTree PARTITION BY date").is_empty());
    }

    #[test]
    fn test_blank_call() {
        let args = EngineArguments::parse("X()");
        assert_eq!(args.as_slice(), &["".to_string()]);
        assert!(args.is_blank_call());

        let args = EngineArguments::parse("X('')");
        assert_eq!(args.as_slice(), &["".to_string()]);
        assert!(!args.is_blank_call());
    }

    #[test]
    fn test_dangling_comma() {
        assert_eq!(extract("SomeEngine('a',)"), vec!["a", ""]);
    }

    #[test]
    fn test_nested_call_is_opaque() {
        assert_eq!(
            extract("SomeEngine('a', 2, '', f(x))"),
            vec!["a", "2", "", "f(x)"]
        );
        assert_eq!(
            extract("Distributed(c, db, t, cityHash64(a, b))"),
            vec!["c", "db", "t", "cityHash64(a,b)"]
        );
    }

    #[test]
    fn test_trailing_clauses_are_ignored() {
        let args = extract(
            "ReplicatedReplacingMergeTree('/clickhouse/tables/{shard}/t', '{replica}', ver) \
             PARTITION BY toYYYYMM(date) ORDER BY (id, date) SETTINGS index_granularity = 8192",
        );
        assert_eq!(
            args,
            vec!["/clickhouse/tables/{shard}/t", "{replica}", "ver"]
        );
    }

    #[test]
    fn test_tokens_are_concatenated() {
        assert_eq!(extract("Join(ANY, LEFT, id)"), vec!["ANY", "LEFT", "id"]);
        assert_eq!(extract("X(a AS b, -1)"), vec!["aASb", "-1"]);
        assert_eq!(
            extract("Distributed(c, db, t, intHash64(user_id) % 4)"),
            vec!["c", "db", "t", "intHash64(user_id)%4"]
        );
    }

    #[test]
    fn test_escaped_literals() {
        assert_eq!(
            extract(r"Merge(logs, '^events\\_[0-9]+$')"),
            vec!["logs", r"^events\_[0-9]+$"]
        );
        assert_eq!(extract("X('it''s', 'a,b')"), vec!["it's", "a,b"]);
    }

    #[test]
    fn test_unclosed_list_keeps_what_was_read() {
        assert_eq!(extract("X('a', b"), vec!["a", "b"]);
    }

    fn argument() -> impl Strategy<Value = (String, String)> {
        prop_oneof![
            "[a-z_][a-z0-9_]{0,8}".prop_map(|s| (s.clone(), s)),
            "[0-9]{1,5}".prop_map(|s| (s.clone(), s)),
            "[a-zA-Z0-9/{}._ -]{0,12}".prop_map(|s| (format!("'{s}'"), s)),
            ("[a-z][a-z0-9]{0,6}", "[a-z][a-z0-9]{0,6}")
                .prop_map(|(f, x)| (format!("{f}({x})"), format!("{f}({x})"))),
        ]
    }

    proptest! {
        #[test]
        fn test_round_trip(args in prop::collection::vec(argument(), 1..8)) {
            let source: Vec<String> = args.iter().map(|(source, _)| source.clone()).collect();
            let expected: Vec<String> = args.into_iter().map(|(_, value)| value).collect();
            let engine_full = format!("Engine({}) ORDER BY id", source.join(", "));

            let extracted = extract(&engine_full);
            prop_assert_eq!(&extracted, &expected);
            prop_assert_eq!(
                format!("({})", extracted.join(",")),
                format!("({})", expected.join(","))
            );
        }
    }
}
