use crate::error::{LexError, Span};
use argspec_core::is_plain_arg_name;
use std::fmt;

/// One lexical element of a command spec.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// All-caps positional name, e.g. `SRC`.
    Arg(String),
    /// Short option reference with its dash, e.g. `-f`.
    ShortOpt(String),
    /// Long option reference with its dashes, e.g. `--force`.
    LongOpt(String),
    /// The `[OPTIONS]` placeholder.
    Options,
    /// The `--` end-of-options sentinel.
    OptionsEnd,
    LeftBracket,
    RightBracket,
    LeftParen,
    RightParen,
    Pipe,
    /// The `...` repetition marker.
    Ellipsis,
}

impl Token {
    pub fn display_name(&self) -> String {
        match self {
            Token::Arg(name) => format!("argument {}", name),
            Token::ShortOpt(name) => format!("option {}", name),
            Token::LongOpt(name) => format!("option {}", name),
            Token::Options => "'[OPTIONS]'".to_string(),
            Token::OptionsEnd => "'--'".to_string(),
            Token::LeftBracket => "'['".to_string(),
            Token::RightBracket => "']'".to_string(),
            Token::LeftParen => "'('".to_string(),
            Token::RightParen => "')'".to_string(),
            Token::Pipe => "'|'".to_string(),
            Token::Ellipsis => "'...'".to_string(),
        }
    }

    /// Whether this token references an option by name or position.
    pub fn is_option_ref(&self) -> bool {
        matches!(
            self,
            Token::ShortOpt(_) | Token::LongOpt(_) | Token::Options
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Arg(name) => write!(f, "{}", name),
            Token::ShortOpt(name) => write!(f, "{}", name),
            Token::LongOpt(name) => write!(f, "{}", name),
            Token::Options => write!(f, "[OPTIONS]"),
            Token::OptionsEnd => write!(f, "--"),
            Token::LeftBracket => write!(f, "["),
            Token::RightBracket => write!(f, "]"),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::Pipe => write!(f, "|"),
            Token::Ellipsis => write!(f, "..."),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

impl SpannedToken {
    pub fn new(token: Token, span: Span) -> Self {
        Self { token, span }
    }
}

// Characters that terminate a word besides whitespace. A dot ends a word so
// that `SRC...` lexes as `SRC` followed by `...`.
fn is_word_end(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '[' | ']' | '(' | ')' | '|' | '.')
}

fn scan_word(spec: &str, start: usize) -> &str {
    let rest = &spec[start..];
    let end = rest.find(is_word_end).unwrap_or(rest.len());
    &rest[..end]
}

fn valid_long_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Tokenizes a command spec into a flat token stream.
///
/// Tokens never span whitespace; `[OPTIONS]`, `--` and `...` are recognized
/// as single tokens. Fails with a [`LexError`] carrying the offending
/// substring and its offset.
pub fn tokenize(spec: &str) -> Result<Vec<SpannedToken>, LexError> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < spec.len() {
        let rest = &spec[pos..];
        let ch = match rest.chars().next() {
            Some(c) => c,
            None => break,
        };

        if ch.is_whitespace() {
            pos += ch.len_utf8();
            continue;
        }

        if rest.starts_with("[OPTIONS]") {
            let span = Span::new(pos, pos + "[OPTIONS]".len());
            tokens.push(SpannedToken::new(Token::Options, span));
            pos = span.end;
            continue;
        }

        match ch {
            '[' | ']' | '(' | ')' | '|' => {
                let token = match ch {
                    '[' => Token::LeftBracket,
                    ']' => Token::RightBracket,
                    '(' => Token::LeftParen,
                    ')' => Token::RightParen,
                    _ => Token::Pipe,
                };
                let span = Span::new(pos, pos + 1);
                tokens.push(SpannedToken::new(token, span));
                pos = span.end;
            }

            '.' => {
                let dots = rest.chars().take_while(|&c| c == '.').count();
                let span = Span::new(pos, pos + dots);
                if dots != 3 {
                    return Err(LexError::InvalidRepetition {
                        text: ".".repeat(dots),
                        span,
                    });
                }
                tokens.push(SpannedToken::new(Token::Ellipsis, span));
                pos = span.end;
            }

            '-' => {
                let word = scan_word(spec, pos);
                let span = Span::new(pos, pos + word.len());

                let token = if word == "--" {
                    Token::OptionsEnd
                } else if let Some(name) = word.strip_prefix("--") {
                    if !valid_long_name(name) {
                        return Err(LexError::InvalidOption {
                            text: word.to_string(),
                            span,
                        });
                    }
                    Token::LongOpt(word.to_string())
                } else {
                    let name = &word[1..];
                    let mut chars = name.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) if c.is_ascii_alphanumeric() => {
                            Token::ShortOpt(word.to_string())
                        }
                        _ => {
                            return Err(LexError::InvalidOption {
                                text: word.to_string(),
                                span,
                            });
                        }
                    }
                };

                tokens.push(SpannedToken::new(token, span));
                pos = span.end;
            }

            _ => {
                if !ch.is_ascii_alphanumeric() && ch != '_' {
                    let span = Span::new(pos, pos + ch.len_utf8());
                    return Err(LexError::UnexpectedChar { ch, span });
                }
                let word = scan_word(spec, pos);
                let span = Span::new(pos, pos + word.len());
                if !is_plain_arg_name(word) {
                    return Err(LexError::InvalidArgName {
                        text: word.to_string(),
                        span,
                    });
                }
                tokens.push(SpannedToken::new(Token::Arg(word.to_string()), span));
                pos = span.end;
            }
        }
    }

    Ok(tokens)
}

/// Validates a positional-argument name registered programmatically: the
/// name must lex to exactly one positional token.
pub fn is_valid_argument_name(name: &str) -> bool {
    match tokenize(name) {
        Ok(tokens) => tokens.len() == 1 && matches!(tokens[0].token, Token::Arg(_)),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(spec: &str) -> Vec<Token> {
        tokenize(spec).unwrap().into_iter().map(|t| t.token).collect()
    }

    #[test]
    fn test_tokenize_positional_names() {
        assert_eq!(
            kinds("SRC DST_2"),
            vec![
                Token::Arg("SRC".to_string()),
                Token::Arg("DST_2".to_string())
            ]
        );
    }

    #[test]
    fn test_tokenize_options() {
        assert_eq!(
            kinds("-f --force"),
            vec![
                Token::ShortOpt("-f".to_string()),
                Token::LongOpt("--force".to_string())
            ]
        );
    }

    #[test]
    fn test_tokenize_grouping() {
        assert_eq!(
            kinds("[ ] ( ) |"),
            vec![
                Token::LeftBracket,
                Token::RightBracket,
                Token::LeftParen,
                Token::RightParen,
                Token::Pipe
            ]
        );
    }

    #[test]
    fn test_tokenize_options_placeholder() {
        assert_eq!(kinds("[OPTIONS]"), vec![Token::Options]);
        // Not the placeholder: an ordinary optional positional.
        assert_eq!(
            kinds("[OPTION]"),
            vec![
                Token::LeftBracket,
                Token::Arg("OPTION".to_string()),
                Token::RightBracket
            ]
        );
    }

    #[test]
    fn test_tokenize_repetition_binds_to_word() {
        assert_eq!(
            kinds("SRC..."),
            vec![Token::Arg("SRC".to_string()), Token::Ellipsis]
        );
    }

    #[test]
    fn test_tokenize_options_end() {
        assert_eq!(
            kinds("-- SRC"),
            vec![Token::OptionsEnd, Token::Arg("SRC".to_string())]
        );
    }

    #[test]
    fn test_tokenize_optional_group() {
        assert_eq!(
            kinds("[-a | -b]"),
            vec![
                Token::LeftBracket,
                Token::ShortOpt("-a".to_string()),
                Token::Pipe,
                Token::ShortOpt("-b".to_string()),
                Token::RightBracket
            ]
        );
    }

    #[test]
    fn test_error_bare_dash() {
        let err = tokenize("- SRC").unwrap_err();
        assert!(matches!(err, LexError::InvalidOption { .. }));
        assert_eq!(err.span().start, 0);
    }

    #[test]
    fn test_error_multi_char_short_option() {
        assert!(matches!(
            tokenize("-abc").unwrap_err(),
            LexError::InvalidOption { .. }
        ));
    }

    #[test]
    fn test_error_two_dots() {
        let err = tokenize("SRC..").unwrap_err();
        assert!(matches!(err, LexError::InvalidRepetition { .. }));
        assert_eq!(err.text(), "..");
    }

    #[test]
    fn test_error_lowercase_word() {
        let err = tokenize("src").unwrap_err();
        assert!(matches!(err, LexError::InvalidArgName { .. }));
        assert_eq!(err.text(), "src");
    }

    #[test]
    fn test_error_offset_reported() {
        let err = tokenize("SRC badname").unwrap_err();
        assert_eq!(err.span(), Span::new(4, 11));
    }

    #[test]
    fn test_is_valid_argument_name() {
        assert!(is_valid_argument_name("FOO"));
        assert!(is_valid_argument_name("FOO_BAR2"));
        assert!(!is_valid_argument_name("foo"));
        assert!(!is_valid_argument_name("F O"));
        assert!(!is_valid_argument_name(""));
        assert!(!is_valid_argument_name("-f"));
    }
}
