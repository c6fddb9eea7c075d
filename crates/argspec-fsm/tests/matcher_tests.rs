use argspec_core::{Arg, DescriptorSet, Opt};
use argspec_fsm::{CompileError, MatchError, compile};

#[test]
fn test_options_interleave_with_positionals() {
    let mut decls = DescriptorSet::new();
    let force = decls.bool_opt(Opt::new("f force", "overwrite"), false);
    let src = decls.string_arg(Arg::new("SRC", ""), "");
    let dst = decls.string_arg(Arg::new("DST", ""), "");
    let mut fsm = compile("[OPTIONS] SRC [OPTIONS] DST", decls).unwrap();

    fsm.match_args(&["a.txt", "--force", "b.txt"]).unwrap();
    assert_eq!(fsm.get(src), "a.txt");
    assert_eq!(fsm.get(dst), "b.txt");
    assert!(fsm.get(force));
}

#[test]
fn test_option_repetition_last_wins_for_scalars() {
    let mut decls = DescriptorSet::new();
    let level = decls.int_opt(Opt::new("n", ""), 0);
    let mut fsm = compile("[OPTIONS]", decls).unwrap();

    fsm.match_args(&["-n", "1", "-n", "5"]).unwrap();
    assert_eq!(fsm.get(level), 5);
}

#[test]
fn test_sequence_option_collects_every_occurrence() {
    let mut decls = DescriptorSet::new();
    let excludes = decls.strings_opt(Opt::new("e exclude", ""), Vec::new());
    let mut fsm = compile("[OPTIONS]", decls).unwrap();

    fsm.match_args(&["-e", "target", "--exclude", ".git"]).unwrap();
    assert_eq!(
        fsm.get(excludes),
        vec!["target".to_string(), ".git".to_string()]
    );
}

#[test]
fn test_alternation_of_option_and_positional() {
    let mut decls = DescriptorSet::new();
    let all = decls.bool_opt(Opt::new("a all", ""), false);
    let name = decls.string_arg(Arg::new("NAME", ""), "");
    let mut fsm = compile("(--all | NAME)", decls).unwrap();

    fsm.match_args(&["--all"]).unwrap();
    assert!(fsm.get(all));
    assert!(!fsm.set_by_user(name));

    fsm.match_args(&["widget"]).unwrap();
    assert_eq!(fsm.get(name), "widget");
}

#[test]
fn test_alternation_rejects_both_branches() {
    let mut decls = DescriptorSet::new();
    decls.bool_opt(Opt::new("a", ""), false);
    decls.bool_opt(Opt::new("b", ""), false);
    let mut fsm = compile("[-a | -b]", decls).unwrap();

    let err = fsm.match_args(&["-a", "-b"]).unwrap_err();
    assert_eq!(
        err,
        MatchError::IllegalInput {
            token: "-b".to_string(),
            position: 1
        }
    );
}

#[test]
fn test_optional_group_taken_whole_or_not_at_all() {
    let mut decls = DescriptorSet::new();
    let src = decls.string_arg(Arg::new("SRC", ""), "");
    let dst = decls.string_arg(Arg::new("DST", ""), "");
    let mut fsm = compile("[SRC DST]", decls).unwrap();

    fsm.match_args::<&str>(&[]).unwrap();
    assert!(!fsm.set_by_user(src));

    let err = fsm.match_args(&["only"]).unwrap_err();
    assert_eq!(
        err,
        MatchError::MissingRequired {
            name: "DST".to_string()
        }
    );

    fsm.match_args(&["from", "to"]).unwrap();
    assert_eq!(fsm.get(src), "from");
    assert_eq!(fsm.get(dst), "to");
}

#[test]
fn test_duration_option_value() {
    let mut decls = DescriptorSet::new();
    let timeout = decls.duration_opt(
        Opt::new("t timeout", ""),
        std::time::Duration::from_secs(30),
    );
    let mut fsm = compile("[OPTIONS]", decls).unwrap();

    fsm.match_args(&["--timeout", "1m30s"]).unwrap();
    assert_eq!(fsm.get(timeout), std::time::Duration::from_secs(90));

    let err = fsm.match_args(&["--timeout", "fast"]).unwrap_err();
    assert!(matches!(err, MatchError::InvalidValue { .. }));
    // Failed runs leave the previous value alone.
    assert_eq!(fsm.get(timeout), std::time::Duration::from_secs(90));
}

#[test]
fn test_option_value_may_look_like_an_option() {
    let mut decls = DescriptorSet::new();
    let fmt = decls.string_opt(Opt::new("f", ""), "");
    let mut fsm = compile("[OPTIONS]", decls).unwrap();

    fsm.match_args(&["-f", "--weird"]).unwrap();
    assert_eq!(fsm.get(fmt), "--weird");
}

#[test]
fn test_unreachable_positional_fails_compile() {
    let mut decls = DescriptorSet::new();
    decls.strings_arg(Arg::new("SRC", ""), Vec::new());
    decls.string_arg(Arg::new("DST", ""), "");
    let err = compile("SRC... DST", decls).unwrap_err();
    assert!(matches!(err, CompileError::Parse(_)));

    // Shielding the repetition in a group keeps the later positional
    // reachable.
    let mut decls = DescriptorSet::new();
    decls.strings_arg(Arg::new("SRC", ""), Vec::new());
    decls.string_arg(Arg::new("DST", ""), "");
    assert!(compile("[SRC...] DST", decls).is_ok());
}

#[test]
fn test_compile_error_renders_with_caret() {
    let decls = DescriptorSet::new();
    let spec = "FILE";
    let err = compile(spec, decls).unwrap_err();
    let rendered = err.render(spec);
    assert!(rendered.contains("FILE"));
    assert!(rendered.contains('^'));
}

#[test]
fn test_match_is_repeatable() {
    let mut decls = DescriptorSet::new();
    let force = decls.bool_opt(Opt::new("f", ""), false);
    let srcs = decls.strings_arg(Arg::new("SRC", ""), Vec::new());
    let mut fsm = compile("[OPTIONS] SRC...", decls).unwrap();

    for _ in 0..3 {
        fsm.match_args(&["-f", "x", "y"]).unwrap();
        assert!(fsm.get(force));
        assert_eq!(fsm.get(srcs), vec!["x".to_string(), "y".to_string()]);
    }
}
