//! # Engine Definition Lexer
//!
//! Splits the `engine_full` column of `system.tables` into tokens, e.g.
//! `ReplicatedReplacingMergeTree('/zk/node', 'replica', ver) PARTITION BY date`.
//!
//! The lexer never fails: whitespace outside of literals is dropped and any
//! character no other rule recognizes is emitted as [`Token::Other`]. String
//! literals are decoded by [`unescape_literal`], which only understands quote
//! and backslash escapes.

use logos::Logos;
use std::iter::Peekable;
use std::str::Chars;

/// A token of an engine definition string
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    /// Engine, function or column name. Backtick-quoted names are kept verbatim.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    #[regex(r"`([^`\\]|\\.)*`", |lex| lex.slice().to_string())]
    Identifier(String),

    #[token("(")]
    LeftParen,

    #[token(")")]
    RightParen,

    #[token(",")]
    Comma,

    /// A 'quoted' or "quoted" literal, already unescaped
    #[regex(r#"'([^'\\]|\\.|'')*'"#, decode_literal)]
    #[regex(r#""([^"\\]|\\.|"")*""#, decode_literal)]
    StringLiteral(String),

    /// Numeric literal in its source form (`42`, `0.5`, `0x1F`)
    #[regex(r"[0-9][0-9a-zA-Z_]*(\.[0-9a-zA-Z_]*)?", |lex| lex.slice().to_string())]
    Number(String),

    /// Operators and anything else, one character at a time
    #[regex(r".", |lex| lex.slice().to_string(), priority = 0)]
    Other(String),
}

impl Token {
    /// The text this token contributes to an engine argument.
    ///
    /// String literals contribute their decoded value, everything else its
    /// source text.
    pub fn text(&self) -> &str {
        match self {
            Token::Identifier(s) | Token::StringLiteral(s) | Token::Number(s) | Token::Other(s) => {
                s
            }
            Token::LeftParen => "(",
            Token::RightParen => ")",
            Token::Comma => ",",
        }
    }
}

fn decode_literal(lex: &mut logos::Lexer<Token>) -> String {
    unescape_literal(lex.slice())
}

/// Lazy token stream over an engine definition
pub struct EngineTokens<'a> {
    lexer: logos::Lexer<'a, Token>,
}

impl Iterator for EngineTokens<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.lexer.next()?;
        Some(token.unwrap_or_else(|_| Token::Other(self.lexer.slice().to_string())))
    }
}

/// Tokenizes an engine definition string. Every call starts from the
/// beginning of the input.
pub fn tokenize(input: &str) -> EngineTokens<'_> {
    EngineTokens {
        lexer: Token::lexer(input),
    }
}

/// Decodes a quoted literal as the server prints it.
///
/// The first character is taken as the quote character. Recognized escapes
/// are `\\`, `\'`, `\"`, `\n`, `\r`, `\t`, `\0`, `\b`, `\f`, `\a`, `\v`,
/// ASCII `\xHH` and a doubled quote character. Any other escape keeps its
/// backslash, so regular expressions like `^logs\.` survive unchanged.
pub fn unescape_literal(raw: &str) -> String {
    let mut chars = raw.chars();
    let Some(quote) = chars.next() else {
        return String::new();
    };
    let content = chars.as_str();
    let content = content.strip_suffix(quote).unwrap_or(content);

    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('\\') => result.push('\\'),
                Some('\'') => result.push('\''),
                Some('"') => result.push('"'),
                Some('n') => result.push('\n'),
                Some('r') => result.push('\r'),
                Some('t') => result.push('\t'),
                Some('0') => result.push('\0'),
                Some('b') => result.push('\u{8}'),
                Some('f') => result.push('\u{c}'),
                Some('a') => result.push('\u{7}'),
                Some('v') => result.push('\u{b}'),
                Some('x') => push_hex_escape(&mut result, &mut chars),
                Some(other) => {
                    result.push('\\');
                    result.push(other);
                }
                None => result.push('\\'),
            }
        } else if c == quote && chars.peek() == Some(&quote) {
            chars.next();
            result.push(quote);
        } else {
            result.push(c);
        }
    }
    result
}

// `\xHH` is only decoded for ASCII, other bytes are left as written
fn push_hex_escape(result: &mut String, chars: &mut Peekable<Chars<'_>>) {
    let digits: String = chars.clone().take(2).collect();
    match u8::from_str_radix(&digits, 16) {
        Ok(byte) if digits.len() == 2 && byte.is_ascii() => {
            chars.nth(1);
            result.push(char::from(byte));
        }
        _ => result.push_str("\\x"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenizer() {
        let tokens: Vec<Token> =
            tokenize("ReplicatedReplacingMergeTree('/zk/node','replica', ver) PARTITION BY date")
                .collect();

        assert_eq!(
            tokens,
            vec![
                Token::Identifier("ReplicatedReplacingMergeTree".to_string()),
                Token::LeftParen,
                Token::StringLiteral("/zk/node".to_string()),
                Token::Comma,
                Token::StringLiteral("replica".to_string()),
                Token::Comma,
                Token::Identifier("ver".to_string()),
                Token::RightParen,
                Token::Identifier("PARTITION".to_string()),
                Token::Identifier("BY".to_string()),
                Token::Identifier("date".to_string()),
            ]
        );
    }

    #[test]
    fn test_tokenizer_is_restartable() {
        let input = "Distributed(cluster, db, tbl, rand())";
        let first: Vec<Token> = tokenize(input).collect();
        let second: Vec<Token> = tokenize(input).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 12);
    }

    #[test]
    fn test_numbers_and_operators() {
        let tokens: Vec<Token> = tokenize("Buffer(db, t, 16, 0.5, -1) % 10").collect();
        assert!(tokens.contains(&Token::Number("16".to_string())));
        assert!(tokens.contains(&Token::Number("0.5".to_string())));
        assert!(tokens.contains(&Token::Other("-".to_string())));
        assert!(tokens.contains(&Token::Other("%".to_string())));
    }

    #[test]
    fn test_backtick_identifier_is_kept_verbatim() {
        let tokens: Vec<Token> = tokenize("Distributed(c, db, t, `user id`)").collect();
        assert_eq!(tokens[8], Token::Identifier("`user id`".to_string()));
    }

    #[test]
    fn test_unterminated_literal_does_not_fail() {
        let tokens: Vec<Token> = tokenize("Engine('oops").collect();
        assert_eq!(tokens[0], Token::Identifier("Engine".to_string()));
        assert_eq!(tokens[1], Token::LeftParen);
        assert!(tokens
            .iter()
            .all(|t| !matches!(t, Token::StringLiteral(_))));
        let rest: String = tokens[2..].iter().map(Token::text).collect();
        assert_eq!(rest, "'oops");
    }

    #[test]
    fn test_unescape_literal() {
        assert_eq!(unescape_literal("'plain'"), "plain");
        assert_eq!(unescape_literal("''"), "");
        assert_eq!(unescape_literal(r"'it\'s'"), "it's");
        assert_eq!(unescape_literal("'it''s'"), "it's");
        assert_eq!(unescape_literal(r#""say \"hi\"""#), "say \"hi\"");
        assert_eq!(unescape_literal(r"'a\nb\tc'"), "a\nb\tc");
        assert_eq!(unescape_literal(r"'back\\slash'"), "back\\slash");
        assert_eq!(unescape_literal(r"'\x41\x42'"), "AB");
    }

    #[test]
    fn test_unrecognized_escape_sequences() {
        // Regular expressions must come through untouched
        let test_cases = vec![
            (r"'^logs\.'", r"^logs\."),
            (r"'\d+'", r"\d+"),
            (r"'\s*'", r"\s*"),
            (r"'\w{2,5}'", r"\w{2,5}"),
            (r"'\xZZ'", r"\xZZ"),
            (r"'\xFF'", r"\xFF"),
        ];

        for (input, expected) in test_cases {
            assert_eq!(unescape_literal(input), expected, "Failed for input: {input}");
        }
    }

    #[test]
    fn test_literal_is_never_evaluated() {
        let tokens: Vec<Token> = tokenize("Engine('__import__(\"os\")')").collect();
        assert_eq!(
            tokens[2],
            Token::StringLiteral("__import__(\"os\")".to_string())
        );
    }
}
