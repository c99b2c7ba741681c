//! Parser integration tests.
//!
//! Exercises the public builder surface: mode flags, interceptor chains,
//! operator registration and error reporting.

use plait_ast::*;
use plait_core::text::{Position, Range};
use plait_diagnostics::{messages, ErrorReport, ParserError};
use plait_nodebuilder::NodeBuilder;
use plait_parser::{infix_precedence, parse, ContextType, ParserBuilder, Precedence};
use plait_scanner::tokenize;
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

/// Helper: parse and return the number of top-level statements.
fn statement_count(builder: &ParserBuilder, source: &str) -> usize {
    let (program, errors) = builder.build(source).parse_program();
    assert!(errors.is_empty(), "source: {:?}, errors: {:?}", source, errors);
    program.statements.len()
}

fn first_expression(program: &Program) -> &Expression {
    match &program.statements[0] {
        Statement::Expression(stmt) => &stmt.expression,
        other => panic!("expected expression statement, got {:?}", other),
    }
}

fn binary(left: Expression, operator: Operator, right: Expression) -> Expression {
    let span = left.span().cover(right.span());
    Expression::Binary(BinaryExpression {
        left: Box::new(left),
        operator,
        right: Box::new(right),
        span,
    })
}

// ============================================================================
// ASI and smart semicolons
// ============================================================================

#[test]
fn test_newline_separated_declarations() {
    let (program, errors) = parse("let x = 5\nlet y = 10");
    assert!(errors.is_empty());
    assert_eq!(program.statements.len(), 2);
}

#[test]
fn test_same_line_declarations_report_at_second_let() {
    let (_, errors) = parse("let x = 1 let y = 2");
    assert!(!errors.is_empty());
    assert_eq!(errors[0].start(), Position::new(0, 10));
    assert!(errors[0].has_code(&messages::MISSING_TERMINATOR_GOT_0));
}

#[test]
fn test_smart_semicolon_splits_iife() {
    let source = "console.log('a')\n(function(){})()";
    assert_eq!(statement_count(&ParserBuilder::new().smart_semicolon(true), source), 2);
    assert_eq!(statement_count(&ParserBuilder::new(), source), 1);
}

#[test]
fn test_smart_semicolon_splits_array_literal() {
    let source = "a = b\n[1].forEach(f)";
    assert_eq!(statement_count(&ParserBuilder::new().smart_semicolon(true), source), 2);
    let (program, errors) = ParserBuilder::new().build(source).parse_program();
    assert!(errors.is_empty());
    assert_eq!(program.statements.len(), 1);
}

#[test]
fn test_trailing_operator_continues_on_next_line() {
    let source = "let total = price *\n    count\nlet next = 1";
    assert_eq!(statement_count(&ParserBuilder::new(), source), 2);
}

// ============================================================================
// Precedence
// ============================================================================

const BINARY_OPERATORS: &[&str] = &[
    "||", "??", "&&", "==", "!=", "===", "!==", "<", ">", "<=", ">=", "instanceof", "+", "-",
    "*", "/", "%",
];

fn kind_of(operator: &str) -> TokenKind {
    tokenize(operator)[0].kind
}

/// Check `a op1 b op2 c` against the precedence table.
fn assert_grouping(
    builder: &ParserBuilder,
    op1: &str,
    op2: &str,
    precedence: impl Fn(&str) -> Precedence,
) {
    let source = format!("a {} b {} c", op1, op2);
    let (program, errors) = builder.build(&source).parse_program();
    assert!(errors.is_empty(), "{}: {:?}", source, errors);
    let Expression::Binary(top) = first_expression(&program) else {
        panic!("{}: expected binary expression", source);
    };
    if precedence(op2) > precedence(op1) {
        assert_eq!(top.operator.text, op1, "{}", source);
        assert!(matches!(top.right.as_ref(), Expression::Binary(b) if b.operator.text == op2));
    } else {
        assert_eq!(top.operator.text, op2, "{}", source);
        assert!(matches!(top.left.as_ref(), Expression::Binary(b) if b.operator.text == op1));
    }
}

#[test]
fn test_builtin_operator_grouping() {
    let builder = ParserBuilder::new();
    let precedence = |op: &str| infix_precedence(kind_of(op)).unwrap();
    for op1 in BINARY_OPERATORS {
        for op2 in BINARY_OPERATORS {
            assert_grouping(&builder, op1, op2, precedence);
        }
    }
}

#[test]
fn test_registered_operator_grouping() {
    let mut builder = ParserBuilder::new();
    builder
        .register_infix(TokenKind::CARET, Precedence::PRODUCT + 1, binary)
        .unwrap();
    let precedence = |op: &str| {
        let kind = kind_of(op);
        if kind == TokenKind::CARET {
            Precedence::PRODUCT + 1
        } else {
            infix_precedence(kind).unwrap()
        }
    };
    for other in ["+", "*", "&&", "^"] {
        assert_grouping(&builder, "^", other, precedence);
        assert_grouping(&builder, other, "^", precedence);
    }
}

// ============================================================================
// Interceptors
// ============================================================================

#[test]
fn test_statement_interceptors_fire_in_installation_order() {
    let log: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));
    let mut builder = ParserBuilder::new();
    let mark = builder.register_token_kind("MARK").unwrap();
    builder.token_interceptor(move |scanner, next| {
        let token = next(scanner);
        if token.is(TokenKind::IDENT) && token.literal == "mark" {
            token.with_kind(mark)
        } else {
            token
        }
    });

    for id in ["P1", "P2", "P3"] {
        let log = Rc::clone(&log);
        let last = id == "P3";
        builder.statement_interceptor(move |parser, next| {
            if parser.cur_is(mark) {
                log.borrow_mut().push(id);
                if last {
                    parser.next_token();
                }
            }
            next(parser)
        });
    }

    let (program, errors) = builder.build("mark a;\nmark b(1)\nc").parse_program();
    assert!(errors.is_empty(), "{:?}", errors);
    assert_eq!(program.statements.len(), 3);
    assert_eq!(*log.borrow(), vec!["P1", "P2", "P3", "P1", "P2", "P3"]);
}

#[test]
fn test_expression_interceptor_can_replace_literals() {
    let mut builder = ParserBuilder::new();
    builder.expression_interceptor(|parser, precedence, next| {
        if parser.cur_is(TokenKind::IDENT) && parser.cur_token().literal == "PI" {
            let node = NodeBuilder::at(parser.cur_token().range()).path(&["Math", "PI"]);
            return parser.parse_expression_tail(node, precedence);
        }
        next(parser, precedence)
    });
    let (program, errors) = builder.build("2 * PI * r").parse_program();
    assert!(errors.is_empty());
    let Expression::Binary(outer) = first_expression(&program) else {
        panic!("expected binary");
    };
    let Expression::Binary(inner) = outer.left.as_ref() else {
        panic!("expected binary");
    };
    assert!(matches!(inner.right.as_ref(), Expression::Member(m) if m.property.name == "PI"));
}

#[test]
fn test_dynamic_prefix_operator() {
    let mut builder = ParserBuilder::new();
    let at = builder.register_token_kind("AT").unwrap();
    builder.token_interceptor(move |scanner, next| {
        let token = next(scanner);
        if token.is(TokenKind::ILLEGAL) && token.literal == "@" {
            token.with_kind(at)
        } else {
            token
        }
    });
    builder
        .register_prefix(at, |operator, operand| {
            let b = NodeBuilder::at(operator.span);
            b.call(b.ident_expr("decorate"), vec![operand])
        })
        .unwrap();

    let (program, errors) = builder.build("@x + 1").parse_program();
    assert!(errors.is_empty(), "{:?}", errors);
    let Expression::Binary(sum) = first_expression(&program) else {
        panic!("expected the prefix node to be folded into a sum");
    };
    assert!(matches!(sum.left.as_ref(), Expression::Call(_)));
    assert_eq!(builder.describe(at), "AT");
}

#[test]
fn test_builders_do_not_share_state() {
    let mut first = ParserBuilder::new();
    first
        .register_infix(TokenKind::CARET, Precedence::SUM, binary)
        .unwrap();
    let second = ParserBuilder::new();
    assert!(first.build("a ^ b").parse_program().1.is_empty());
    assert!(!second.build("a ^ b").parse_program().1.is_empty());

    let mut clone = first.clone();
    assert!(clone.register_infix(TokenKind::CARET, Precedence::SUM, binary).is_err());
    assert!(clone.register_infix(TokenKind::PIPE, Precedence::SUM, binary).is_ok());
    assert!(!first.build("a | b").parse_program().1.is_empty());
}

#[test]
fn test_context_is_visible_to_interceptors() {
    let seen: Rc<RefCell<Vec<(ContextType, bool)>>> = Rc::new(RefCell::new(Vec::new()));
    let mut builder = ParserBuilder::new();
    let log = Rc::clone(&seen);
    builder.statement_interceptor(move |parser, next| {
        if parser.cur_is(TokenKind::RETURN) || parser.cur_is(TokenKind::BREAK) {
            log.borrow_mut().push((parser.context(), parser.in_function()));
        }
        next(parser)
    });
    let source = "function f() { return 1 }\nwhile (x) { if (y) { break } }";
    let (_, errors) = builder.build(source).parse_program();
    assert!(errors.is_empty());
    assert_eq!(
        *seen.borrow(),
        vec![(ContextType::Function, true), (ContextType::Block, false)]
    );
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_errors_accumulate_in_source_order() {
    let (program, errors) = parse("let = 1\nfoo(;\nlet ok = 2\nif x {}");
    let lines: Vec<u32> = errors.iter().map(|e| e.start().line).collect();
    assert_eq!(lines, vec![0, 1, 3]);
    assert!(program
        .statements
        .iter()
        .any(|s| matches!(s, Statement::Variable(v) if v.declarators[0].name.name == "ok")));
}

#[test]
fn test_tolerant_mode_keeps_a_usable_tree() {
    let source = "let a = 1 let b = 2 a b";
    let (strict_program, strict_errors) = parse(source);
    let (program, errors) = ParserBuilder::new().tolerant(true).build(source).parse_program();
    assert!(errors.is_empty());
    assert!(!strict_errors.is_empty());
    assert_eq!(program.statements.len(), 4);
    assert_eq!(strict_program.statements.len(), 4);
}

#[test]
fn test_error_report_round_trips_through_json() {
    let source = "let = 5\nx = @";
    let (_, errors) = parse(source);
    let report = ErrorReport::new(source, errors);
    let json = report.to_json().unwrap();
    let restored = ErrorReport::from_json(&json).unwrap();
    assert_eq!(restored, report);
    assert_eq!(restored.line_of(&restored.errors[1]), Some("x = @"));
    assert_eq!(
        restored.errors[0],
        ParserError::new(
            &messages::EXPECTED_0_GOT_1,
            Range::new(Position::new(0, 4), Position::new(0, 5)),
            &["IDENT", "="]
        )
    );
}
