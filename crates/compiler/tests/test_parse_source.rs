//! End-to-end tests through the public front-end API

use marnc::ast::{Definition, Literal, LiteralNode, MatchBlock};
use marnc::diagnostics::Construct;
use marnc::{Diagnostics, ErrorKind, FrontendConfig, Item, Term, parse, parse_source, tokenize};

fn parse_str(source: &str) -> (marnc::Ast, Diagnostics) {
    let mut errors = Diagnostics::new();
    let ast = parse_source(source.chars(), &mut errors);
    (ast, errors)
}

fn body_text(terms: &[Term]) -> Vec<String> {
    terms.iter().map(|t| t.to_string()).collect()
}

const FIB: &str = "\
: fib ( n -- f(n) )
  0 1 rot match:
    case: Succ dip: over + swap ; ;
    case: Zero drop ; ;
";

#[test]
fn test_fib_scenario() {
    let (ast, errors) = parse_str(FIB);
    assert!(errors.is_empty(), "unexpected diagnostics: {:?}", errors);

    let fib = ast.word("fib").expect("fib should be defined");
    let effect = fib.effect.as_ref().expect("fib has a stack effect");
    assert_eq!(effect.inputs.len(), 1);
    assert_eq!(effect.inputs[0].name, "n");
    assert_eq!(body_text(&effect.outputs), ["f(n)"]);

    assert!(matches!(
        fib.body[0],
        Term::Literal(LiteralNode {
            value: Literal::Integer(0),
            ..
        })
    ));
    assert!(matches!(
        fib.body[1],
        Term::Literal(LiteralNode {
            value: Literal::Integer(1),
            ..
        })
    ));
    assert_eq!(fib.body[2].word_name(), Some("rot"));

    let Term::Match(MatchBlock { arms, .. }) = &fib.body[3] else {
        panic!("Expected match block, got {:?}", fib.body[3]);
    };
    assert_eq!(arms.len(), 2);

    assert_eq!(arms[0].constructor.name, "Succ");
    assert!(arms[0].bindings.is_empty());
    assert_eq!(arms[0].body.len(), 1);
    let Term::Dip(dip) = &arms[0].body[0] else {
        panic!("Expected dip block, got {:?}", arms[0].body[0]);
    };
    assert_eq!(body_text(&dip.body), ["over", "+", "swap"]);

    assert_eq!(arms[1].constructor.name, "Zero");
    assert!(arms[1].bindings.is_empty());
    assert_eq!(body_text(&arms[1].body), ["drop"]);

    assert_eq!(ast.sequential(), [Item::Word("fib".to_string())]);
    assert_eq!(fib.body.len(), 4);
}

#[test]
fn test_fib_renders_back_to_source() {
    let (ast, _) = parse_str(FIB);
    let rendered = ast.to_string();
    assert_eq!(
        rendered,
        ": fib ( n -- f(n) ) 0 1 rot match: case: Succ dip: over + swap ; ; case: Zero drop ; ;\n"
    );

    // The rendering parses to the same tree shape
    let (again, errors) = parse_str(&rendered);
    assert!(errors.is_empty());
    assert_eq!(
        body_text(&again.word("fib").unwrap().body),
        body_text(&ast.word("fib").unwrap().body)
    );
}

#[test]
fn test_missing_semicolon_keeps_partial_definition() {
    let source = ": bad ( -- ) 1 +";
    let (ast, errors) = parse_str(source);

    assert_eq!(errors.len(), 1);
    let error = &errors.as_slice()[0];
    assert_eq!(
        error.kind,
        ErrorKind::Unterminated(Construct::Definition("bad".to_string()))
    );
    assert!(error.message().contains("unterminated definition"));
    // Reported at end of stream
    assert_eq!(error.position.offset, source.len());

    let bad = ast.word("bad").expect("partial definitions are kept");
    assert_eq!(body_text(&bad.body), ["1", "+"]);
    assert_eq!(ast.sequential().len(), 1);
}

#[test]
fn test_duplicate_word_keeps_first() {
    let (ast, errors) = parse_str(": f ; : f ;");

    assert_eq!(errors.len(), 1);
    let ErrorKind::Duplicate { name, original } = &errors.as_slice()[0].kind else {
        panic!("Expected duplicate error, got {:?}", errors.as_slice()[0]);
    };
    assert_eq!(name, "f");
    assert_eq!(original.offset, 2);
    assert_eq!(errors.as_slice()[0].position.offset, 8);

    let f = ast.word("f").unwrap();
    assert_eq!(f.position.offset, 0);
    assert_eq!(f.name.position.offset, 2);
    assert_eq!(ast.sequential().len(), 1);
}

#[test]
fn test_errors_accumulate_across_definitions() {
    let source = "\
: good1 1 ;
: broken1 ( a b ) drop ;
: good2 2 ;
: broken2 match: ;
: good3 3 ;
type: Broken3 : A | | B ;
: good4 4 ;
";
    let (ast, errors) = parse_str(source);
    assert!(errors.len() >= 3);
    let lines: Vec<usize> = errors.iter().map(|d| d.position.line).collect();
    assert_eq!(lines, [1, 3, 5]);
    for name in ["good1", "good2", "good3", "good4"] {
        assert!(ast.word(name).is_some(), "{} should survive", name);
    }
}

#[test]
fn test_lexical_and_syntax_errors_share_the_sink() {
    let (ast, errors) = parse_str(": f 1.2.3 ;\n: g ) ;\n: h \"open\n ;");
    let kinds: Vec<&ErrorKind> = errors.iter().map(|d| &d.kind).collect();
    assert_eq!(kinds.len(), 4);
    assert_eq!(kinds[0], &ErrorKind::MalformedNumber("1.2.3".to_string()));
    assert!(matches!(kinds[1], ErrorKind::UnexpectedToken { .. }));
    // The open string runs to end of input, taking the `;` with it
    assert_eq!(kinds[2], &ErrorKind::UnterminatedString);
    assert_eq!(
        kinds[3],
        &ErrorKind::Unterminated(Construct::Definition("h".to_string()))
    );

    // The malformed number degrades to a word call
    assert_eq!(body_text(&ast.word("f").unwrap().body), ["1.2.3"]);
    assert!(ast.word("g").is_some());
    assert_eq!(body_text(&ast.word("h").unwrap().body), ["\"open\\n ;\""]);
}

#[test]
fn test_string_literal_spans_lines() {
    let (ast, errors) = parse_str(": greet \"hello\nworld\" print ;");
    assert!(errors.is_empty(), "unexpected diagnostics: {:?}", errors);
    let body = &ast.word("greet").unwrap().body;
    assert_eq!(body.len(), 2);
    assert!(matches!(
        &body[0],
        Term::Literal(LiteralNode {
            value: Literal::Str(text),
            ..
        }) if text == "hello\nworld"
    ));
    assert_eq!(body[1].word_name(), Some("print"));
}

#[test]
fn test_rendered_literals_lex_back_to_the_same_values() {
    let source = ": consts 100000000000000000000.000 0.000000250 +4 [ 1/2 [ ] ] 3pack ;";
    let (ast, errors) = parse_str(source);
    assert!(errors.is_empty(), "unexpected diagnostics: {:?}", errors);
    let rendered = ast.to_string();
    assert_eq!(
        rendered,
        ": consts 100000000000000000000.0 0.00000025 +4 [ 1/2 [ ] ] 3pack ;\n"
    );

    let (again, errors) = parse_str(&rendered);
    assert!(errors.is_empty(), "unexpected diagnostics: {:?}", errors);
    assert_eq!(again.to_string(), rendered);
    let body = &again.word("consts").unwrap().body;
    assert!(matches!(
        body[0],
        Term::Literal(LiteralNode {
            value: Literal::Float(x),
            ..
        }) if x == 1e20
    ));
    assert!(matches!(
        body[1],
        Term::Literal(LiteralNode {
            value: Literal::Float(x),
            ..
        }) if x == 2.5e-7
    ));
}

#[test]
fn test_pattern_arity_in_source_order() {
    let source = ": walk match: case: Node ( left value right ) value ; case: Leaf 0 ; ;";
    let (ast, errors) = parse_str(source);
    assert!(errors.is_empty());
    let Term::Match(block) = &ast.word("walk").unwrap().body[0] else {
        panic!("Expected match block");
    };
    let bound: Vec<&str> = block.arms[0]
        .bindings
        .iter()
        .map(|b| b.name.as_str())
        .collect();
    assert_eq!(bound, ["left", "value", "right"]);
    assert_eq!(block.arms[0].arity(), 3);
    assert_eq!(block.arms[1].arity(), 0);
}

#[test]
fn test_program_with_types_aliases_and_comments() {
    let source = "\
\\ Peano numbers
type: Nat : Nat Succ | Zero ;
alias: Count : Nat ;

\\ double a number
: double ( n -- m )
  match:
    case: Succ ( k ) k double Succ Succ ;
    case: Zero Zero ;
  ;
";
    let (ast, errors) = parse_str(source);
    assert!(errors.is_empty(), "unexpected diagnostics: {:?}", errors);

    let order: Vec<&'static str> = ast
        .items()
        .map(|item| match item {
            Definition::Word(_) => "word",
            Definition::Type(_) => "type",
            Definition::Alias(_) => "alias",
            Definition::Comment(_) => "comment",
        })
        .collect();
    assert_eq!(order, ["comment", "type", "alias", "comment", "word"]);

    assert_eq!(ast.constructor("Succ").unwrap().type_name, "Nat");
    assert!(ast.type_like("Count").is_some());
    assert!(ast.callable("Zero").is_some());
    assert!(ast.callable("double").is_some());
    // Names are never bound by the parser
    assert!(ast.callable("k").is_none());
}

#[test]
fn test_staged_parse_matches_composed_parse() {
    let mut staged_errors = Diagnostics::new();
    let tokens: Vec<_> = tokenize(FIB.chars(), &mut staged_errors).collect();
    let staged = parse(tokens, &mut staged_errors);

    let (composed, errors) = parse_str(FIB);
    assert_eq!(staged, composed);
    assert!(errors.is_empty() && staged_errors.is_empty());
}

#[test]
fn test_config_from_toml_applies_to_parse() {
    let config = FrontendConfig::from_toml("max_nesting_depth = 1\nkeep_body_comments = false")
        .expect("valid config");
    let mut errors = Diagnostics::new();
    let ast = marnc::parse_source_with_config(
        ": f dip: \\ inner\n dip: x ; ; ;".chars(),
        &mut errors,
        config,
    );
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.as_slice()[0].kind, ErrorKind::NestingTooDeep(1));
    let Term::Dip(dip) = &ast.word("f").unwrap().body[0] else {
        panic!("Expected dip block");
    };
    assert!(dip.body.is_empty());
}

#[test]
fn test_json_serialization() {
    let (ast, errors) = parse_str(": f 1/2 ;\n: g ( a ) ;");
    let json = serde_json::to_value(&ast).unwrap();
    assert_eq!(json["words"]["f"]["name"]["name"], "f");
    assert_eq!(
        json["words"]["f"]["body"][0]["Literal"]["value"]["Rational"]["denominator"],
        2
    );
    let diagnostics = serde_json::to_value(&errors).unwrap();
    assert_eq!(diagnostics[0]["severity"], "error");
    assert_eq!(diagnostics[0]["kind"], "MissingEffectSeparator");
}

#[test]
fn test_independent_parses_on_threads() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                let source = format!(": w{} {} ; : w{} ;", i, i, i);
                let (ast, errors) = parse_str(&source);
                (ast.words().len(), errors.len())
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), (1, 1));
    }
}
