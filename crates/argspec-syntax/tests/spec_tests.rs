use argspec_core::{Arg, DescriptorSet, Opt};
use argspec_syntax::{
    GrammarNode, LexError, ParseError, Token, parse, render_spec_error, tokenize,
};

fn decls() -> DescriptorSet {
    let mut decls = DescriptorSet::new();
    decls.bool_opt(Opt::new("f force", "overwrite"), false);
    decls.string_opt(Opt::new("o output", "output path"), String::new());
    decls.strings_arg(Arg::new("SRC", "sources"), Vec::new());
    decls.string_arg(Arg::new("DST", "destination"), String::new());
    decls
}

fn parse_spec(spec: &str) -> Result<GrammarNode, ParseError> {
    parse(tokenize(spec).unwrap(), &decls())
}

#[test]
fn test_full_spec_tokenizes_and_parses() {
    let tree = parse_spec("[OPTIONS] --force [SRC...] DST").unwrap();
    match tree {
        GrammarNode::Sequence(terms) => {
            assert_eq!(terms.len(), 4);
            assert!(matches!(terms[0], GrammarNode::OptionsGroup(_)));
            assert!(matches!(terms[1], GrammarNode::OptionRef { .. }));
            assert!(matches!(terms[2], GrammarNode::Optional(_)));
            assert!(matches!(terms[3], GrammarNode::Positional { .. }));
        }
        _ => panic!("expected sequence root"),
    }
}

#[test]
fn test_nested_groups() {
    let tree = parse_spec("[(-f | -o DST)] SRC...").unwrap();
    match tree {
        GrammarNode::Sequence(terms) => {
            match &terms[0] {
                GrammarNode::Optional(inner) => {
                    assert!(matches!(inner.as_ref(), GrammarNode::Choice(_)));
                }
                other => panic!("expected optional, got {other:?}"),
            }
            assert!(matches!(terms[1], GrammarNode::Repeated(_)));
        }
        _ => panic!("expected sequence root"),
    }
}

#[test]
fn test_lex_error_positions_survive_to_rendering() {
    let spec = "SRC -@";
    let err = tokenize(spec).unwrap_err();
    let span = err.span();
    assert_eq!(&spec[span.start..span.end], "-@");

    let rendered = render_spec_error(spec, &err.to_string(), Some(span));
    let caret_line = rendered.lines().last().unwrap();
    assert!(caret_line.contains("^^"));
}

#[test]
fn test_double_dot_repetition_rejected() {
    let err = tokenize("SRC..").unwrap_err();
    assert!(matches!(err, LexError::InvalidRepetition { .. }));
}

#[test]
fn test_options_placeholder_is_one_token() {
    let tokens = tokenize("[OPTIONS]").unwrap();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].token, Token::Options);
}

#[test]
fn test_unknown_reference_reports_name_and_span() {
    let spec = "SRC --verbose";
    let err = parse(tokenize(spec).unwrap(), &decls()).unwrap_err();
    match err {
        ParseError::UnknownOption { name, span } => {
            assert_eq!(name, "--verbose");
            assert_eq!(&spec[span.start..span.end], "--verbose");
        }
        other => panic!("expected unknown option, got {other:?}"),
    }
}
