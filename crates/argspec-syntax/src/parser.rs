use crate::error::{ParseError, Span};
use crate::grammar::GrammarNode;
use crate::lexer::{SpannedToken, Token};
use argspec_core::{DeclId, DescriptorSet};

/// Recursive-descent parser over the spec token stream.
///
/// Resolves every option and argument reference against the supplied
/// [`DescriptorSet`] while building the tree, so an undeclared name fails
/// here rather than at match time. Use the free function [`parse()`].
pub struct Parser<'a> {
    tokens: Vec<SpannedToken>,
    pos: usize,
    decls: &'a DescriptorSet,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<SpannedToken>, decls: &'a DescriptorSet) -> Self {
        Self {
            tokens,
            pos: 0,
            decls,
        }
    }

    #[inline]
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|st| &st.token)
    }

    #[inline]
    fn peek_span(&self) -> Option<Span> {
        self.tokens.get(self.pos).map(|st| st.span)
    }

    #[inline]
    fn advance(&mut self) -> Option<SpannedToken> {
        if self.pos < self.tokens.len() {
            let token = self.tokens[self.pos].clone();
            self.pos += 1;
            Some(token)
        } else {
            None
        }
    }

    /// Best span for an error at the current position: the token under the
    /// cursor, or the last token when the stream is exhausted.
    fn here(&self) -> Span {
        self.peek_span()
            .or_else(|| self.tokens.last().map(|st| st.span))
            .unwrap_or(Span::new(0, 0))
    }

    fn expect_close(&mut self, expected: Token) -> Result<Span, ParseError> {
        match self.advance() {
            Some(st) if st.token == expected => Ok(st.span),
            Some(st) => Err(ParseError::UnexpectedToken {
                expected: expected.display_name(),
                found: st.token.display_name(),
                span: st.span,
            }),
            None => Err(ParseError::UnexpectedEof {
                expected: expected.display_name(),
            }),
        }
    }

    fn parse_sequence(&mut self) -> Result<Vec<GrammarNode>, ParseError> {
        let mut terms = Vec::new();
        // Once a repeated positional is seen, a later different positional
        // in the same sequence could never receive a token.
        let mut repeated_pos: Option<DeclId> = None;

        while matches!(
            self.peek(),
            Some(
                Token::Arg(_)
                    | Token::ShortOpt(_)
                    | Token::LongOpt(_)
                    | Token::Options
                    | Token::OptionsEnd
                    | Token::LeftBracket
                    | Token::LeftParen
            )
        ) {
            let term = self.parse_term()?;

            if let GrammarNode::Positional { decl, span } = &term
                && let Some(prev) = repeated_pos
                && prev != *decl
            {
                return Err(ParseError::UnreachablePositional {
                    name: self.decls.descriptor(*decl).name.clone(),
                    span: *span,
                });
            }

            if let GrammarNode::Repeated(inner) = &term
                && let GrammarNode::Positional { decl, .. } = inner.as_ref()
            {
                repeated_pos = Some(*decl);
            }

            terms.push(term);
        }

        Ok(terms)
    }

    fn parse_term(&mut self) -> Result<GrammarNode, ParseError> {
        let atom = self.parse_atom()?;
        if matches!(self.peek(), Some(Token::Ellipsis)) {
            self.advance();
            return Ok(GrammarNode::Repeated(Box::new(atom)));
        }
        Ok(atom)
    }

    fn parse_atom(&mut self) -> Result<GrammarNode, ParseError> {
        let st = match self.advance() {
            Some(st) => st,
            None => {
                return Err(ParseError::UnexpectedEof {
                    expected: "a term".to_string(),
                });
            }
        };

        match st.token {
            Token::Arg(name) => match self.decls.lookup_positional(&name) {
                Some(decl) => Ok(GrammarNode::Positional {
                    decl,
                    span: st.span,
                }),
                None => Err(ParseError::UnknownArgument {
                    name,
                    span: st.span,
                }),
            },

            Token::ShortOpt(name) | Token::LongOpt(name) => {
                match self.decls.lookup_option(&name) {
                    Some(decl) => Ok(GrammarNode::OptionRef {
                        decl,
                        span: st.span,
                    }),
                    None => Err(ParseError::UnknownOption {
                        name,
                        span: st.span,
                    }),
                }
            }

            Token::Options => Ok(GrammarNode::OptionsGroup(
                self.decls.option_ids().to_vec(),
            )),

            Token::OptionsEnd => Ok(GrammarNode::OptionsEnd),

            Token::LeftBracket => {
                let inner = self.parse_choice()?;
                self.expect_close(Token::RightBracket)?;
                Ok(GrammarNode::Optional(Box::new(inner)))
            }

            Token::LeftParen => {
                let inner = self.parse_choice()?;
                self.expect_close(Token::RightParen)?;
                Ok(inner)
            }

            other => Err(ParseError::UnexpectedToken {
                expected: "a term".to_string(),
                found: other.display_name(),
                span: st.span,
            }),
        }
    }

    fn parse_choice(&mut self) -> Result<GrammarNode, ParseError> {
        let mut branches = Vec::new();

        loop {
            let terms = self.parse_sequence()?;
            if terms.is_empty() {
                return Err(ParseError::EmptyAlternative { span: self.here() });
            }
            branches.push(seq_node(terms));

            if matches!(self.peek(), Some(Token::Pipe)) {
                self.advance();
                continue;
            }
            break;
        }

        if branches.len() == 1 {
            Ok(branches.remove(0))
        } else {
            Ok(GrammarNode::Choice(branches))
        }
    }
}

fn seq_node(mut terms: Vec<GrammarNode>) -> GrammarNode {
    if terms.len() == 1 {
        terms.remove(0)
    } else {
        GrammarNode::Sequence(terms)
    }
}

/// Parses a token stream into the spec grammar tree, resolving every
/// reference against `decls`. The root is always a `Sequence`.
pub fn parse(tokens: Vec<SpannedToken>, decls: &DescriptorSet) -> Result<GrammarNode, ParseError> {
    let mut parser = Parser::new(tokens, decls);
    let terms = parser.parse_sequence()?;

    match parser.advance() {
        None => Ok(GrammarNode::Sequence(terms)),
        Some(st) => match st.token {
            Token::RightBracket | Token::RightParen => Err(ParseError::UnbalancedGroup {
                found: st.token.display_name(),
                span: st.span,
            }),
            other => Err(ParseError::UnexpectedToken {
                expected: "end of spec".to_string(),
                found: other.display_name(),
                span: st.span,
            }),
        },
    }
}
