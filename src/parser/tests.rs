//! Unit tests for the parser module.
//!
//! This module contains tests for parsing the language constructs including:
//! - Let and return statements
//! - Expression statements and operator precedence
//! - Conditionals, function literals and calls
//! - Arrays, index expressions and hashes
//! - Error recovery

use crate::{
    ast::{
        ast::{Expr, Program, Stmt},
        statements::LetStmt,
    },
    errors::errors::ErrorImpl,
    lexer::{
        lexer::{tokenize, Lexer},
        tokens::TokenKind,
    },
};

use super::{
    expr::parse_binary_expr,
    lookups::BindingPower,
    parser::{parse, Parser, MAX_NESTING_DEPTH},
};

fn parse_source(source: &str) -> (Program, Vec<String>) {
    let mut parser = Parser::new(Lexer::new(source.to_string(), Some("test.mk".to_string())));
    let program = parser.parse_program();

    (program, parser.error_messages())
}

fn parse_clean(source: &str) -> Program {
    let (program, errors) = parse_source(source);
    assert!(errors.is_empty(), "unexpected parser errors for {:?}: {:?}", source, errors);

    program
}

fn single_expression(program: &Program) -> &Expr {
    assert_eq!(program.len(), 1, "expected one statement, got {:?}", program.body);

    match &program.body[0] {
        Stmt::Expression(stmt) => &stmt.expression,
        other => panic!("expected expression statement, got {:?}", other),
    }
}

fn let_statements(program: &Program) -> Vec<&LetStmt> {
    program
        .iter()
        .filter_map(|stmt| match stmt {
            Stmt::Let(stmt) => Some(stmt),
            _ => None,
        })
        .collect()
}

#[test]
fn test_parse_empty_program() {
    let (program, errors) = parse_source("");

    assert!(program.is_empty());
    assert!(errors.is_empty());
    assert_eq!(program.token_literal(), "");
}

#[test]
fn test_parse_let_statement() {
    let program = parse_clean("let x = 5;");

    assert_eq!(program.len(), 1);
    let Stmt::Let(stmt) = &program.body[0] else {
        panic!("expected let statement, got {:?}", program.body[0]);
    };

    assert_eq!(stmt.token.kind, TokenKind::Let);
    assert_eq!(stmt.name.value, "x");
    assert_eq!(stmt.name.token.value, "x");
    assert!(matches!(&stmt.value, Expr::Integer(int) if int.value == 5));
    assert_eq!(program.to_string(), "let x = 5;");
}

#[test]
fn test_parse_let_statements() {
    let program = parse_clean("let x = 5; let y = true; let foobar = y;");
    let lets = let_statements(&program);

    let names: Vec<&str> = lets.iter().map(|stmt| stmt.name.value.as_str()).collect();
    assert_eq!(names, vec!["x", "y", "foobar"]);

    let values: Vec<String> = lets.iter().map(|stmt| stmt.value.to_string()).collect();
    assert_eq!(values, vec!["5", "true", "y"]);
}

#[test]
fn test_let_value_uses_full_expression() {
    let program = parse_clean("let y = a + b * c;");

    assert_eq!(program.to_string(), "let y = (a + (b * c));");
}

#[test]
fn test_let_without_semicolon() {
    let program = parse_clean("let x = 1 let y = 2");

    assert_eq!(let_statements(&program).len(), 2);
}

#[test]
fn test_let_missing_assignment() {
    let (program, errors) = parse_source("let x 5;");

    assert!(let_statements(&program).is_empty());
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains('='));
    assert_eq!(errors[0], "expected next token to be =, got INT instead");
}

#[test]
fn test_let_missing_identifier() {
    let (program, errors) = parse_source("let 5;");

    assert!(let_statements(&program).is_empty());
    assert_eq!(errors, vec!["expected next token to be IDENT, got INT instead"]);
}

#[test]
fn test_let_with_broken_value() {
    let (program, errors) = parse_source("let x = ;");

    assert!(program.is_empty());
    assert_eq!(errors, vec!["no prefix parse function for ; found"]);
}

#[test]
fn test_multiple_malformed_lets() {
    let (program, errors) = parse_source("let x 5; let y 10; let 838383;");

    assert!(let_statements(&program).is_empty());
    assert_eq!(
        errors,
        vec![
            "expected next token to be =, got INT instead",
            "expected next token to be =, got INT instead",
            "expected next token to be IDENT, got INT instead",
        ]
    );
}

#[test]
fn test_parse_return_statement() {
    let program = parse_clean("return 10;");

    assert_eq!(program.len(), 1);
    let Stmt::Return(stmt) = &program.body[0] else {
        panic!("expected return statement, got {:?}", program.body[0]);
    };

    assert_eq!(stmt.token.value, "return");
    assert_eq!(stmt.value.as_ref().map(ToString::to_string), Some("10".to_string()));
}

#[test]
fn test_parse_bare_return() {
    for source in ["return;", "return"] {
        let program = parse_clean(source);

        assert_eq!(program.len(), 1);
        let Stmt::Return(stmt) = &program.body[0] else {
            panic!("expected return statement, got {:?}", program.body[0]);
        };
        assert!(stmt.value.is_none());
        assert_eq!(program.to_string(), "return;");
    }
}

#[test]
fn test_parse_return_expression() {
    let program = parse_clean("return add(1, 2) * 3; return x");

    assert_eq!(program.to_string(), "return (add(1, 2) * 3);return x;");
}

#[test]
fn test_expression_statement_terminator_is_optional() {
    for source in ["foobar", "foobar;"] {
        let program = parse_clean(source);

        match single_expression(&program) {
            Expr::Identifier(ident) => {
                assert_eq!(ident.value, "foobar");
                assert_eq!(ident.token.value, "foobar");
            }
            other => panic!("expected identifier, got {:?}", other),
        }
    }
}

#[test]
fn test_parse_integer_literal() {
    let program = parse_clean("5;");

    match single_expression(&program) {
        Expr::Integer(int) => {
            assert_eq!(int.value, 5);
            assert_eq!(int.token.value, "5");
        }
        other => panic!("expected integer, got {:?}", other),
    }
}

#[test]
fn test_integer_overflow_is_reported() {
    let (program, errors) = parse_source("92233720368547758070;");

    assert!(program.is_empty());
    assert_eq!(errors, vec!["could not parse \"92233720368547758070\" as integer"]);
}

#[test]
fn test_parse_boolean_literals() {
    let program = parse_clean("true; false;");
    let values: Vec<bool> = program
        .iter()
        .map(|stmt| match stmt {
            Stmt::Expression(stmt) => match &stmt.expression {
                Expr::Boolean(boolean) => boolean.value,
                other => panic!("expected boolean, got {:?}", other),
            },
            other => panic!("expected expression statement, got {:?}", other),
        })
        .collect();

    assert_eq!(values, vec![true, false]);
}

#[test]
fn test_parse_string_literal() {
    let program = parse_clean(r#""hello world";"#);

    match single_expression(&program) {
        Expr::String(string) => assert_eq!(string.value, "hello world"),
        other => panic!("expected string, got {:?}", other),
    }
}

#[test]
fn test_parse_prefix_expressions() {
    let cases = [("!5;", "!", "5"), ("-15;", "-", "15"), ("!true;", "!", "true")];

    for (source, operator, right) in cases {
        let program = parse_clean(source);

        match single_expression(&program) {
            Expr::Prefix(prefix) => {
                assert_eq!(prefix.operator, operator);
                assert_eq!(prefix.right.to_string(), right);
            }
            other => panic!("expected prefix expression, got {:?}", other),
        }
    }
}

#[test]
fn test_parse_infix_expressions() {
    let operators = ["+", "-", "*", "/", ">", "<", "==", "!="];

    for operator in operators {
        let source = format!("5 {} 6;", operator);
        let program = parse_clean(&source);

        match single_expression(&program) {
            Expr::Infix(infix) => {
                assert_eq!(infix.operator, operator);
                assert_eq!(infix.token.value, operator);
                assert!(matches!(infix.left.as_ref(), Expr::Integer(int) if int.value == 5));
                assert!(matches!(infix.right.as_ref(), Expr::Integer(int) if int.value == 6));
            }
            other => panic!("expected infix expression, got {:?}", other),
        }
    }
}

#[test]
fn test_operator_precedence() {
    let cases = [
        ("-a * b", "((-a) * b)"),
        ("!-a", "(!(-a))"),
        ("a + b + c", "((a + b) + c)"),
        ("a + b - c", "((a + b) - c)"),
        ("a * b * c", "((a * b) * c)"),
        ("a * b / c", "((a * b) / c)"),
        ("a + b / c", "(a + (b / c))"),
        ("a + b * c", "(a + (b * c))"),
        ("a + b * c + d / e - f", "(((a + (b * c)) + (d / e)) - f)"),
        ("3 + 4; -5 * 5", "(3 + 4)((-5) * 5)"),
        ("5 > 4 == 3 < 4", "((5 > 4) == (3 < 4))"),
        ("5 < 4 != 3 > 4", "((5 < 4) != (3 > 4))"),
        ("3 + 4 * 5 == 3 * 1 + 4 * 5", "((3 + (4 * 5)) == ((3 * 1) + (4 * 5)))"),
        ("3 > 5 == false", "((3 > 5) == false)"),
        ("3 < 5 == true", "((3 < 5) == true)"),
        ("1 + (2 + 3) + 4", "((1 + (2 + 3)) + 4)"),
        ("(5 + 5) * 2", "((5 + 5) * 2)"),
        ("2 / (5 + 5)", "(2 / (5 + 5))"),
        ("-(5 + 5)", "(-(5 + 5))"),
        ("!(true == true)", "(!(true == true))"),
        ("a + add(b * c) + d", "((a + add((b * c))) + d)"),
        (
            "add(a, b, 1, 2 * 3, 4 + 5, add(6, 7 * 8))",
            "add(a, b, 1, (2 * 3), (4 + 5), add(6, (7 * 8)))",
        ),
        ("add(a + b + c * d / f + g)", "add((((a + b) + ((c * d) / f)) + g))"),
        ("a * [1, 2, 3, 4][b * c] * d", "((a * ([1, 2, 3, 4][(b * c)])) * d)"),
        (
            "add(a * b[2], b[1], 2 * [1, 2][1])",
            "add((a * (b[2])), (b[1]), (2 * ([1, 2][1])))",
        ),
    ];

    for (source, expected) in cases {
        let program = parse_clean(source);
        assert_eq!(program.to_string(), expected, "source: {}", source);
    }
}

#[test]
fn test_parse_if_expression() {
    let program = parse_clean("if (x < y) { x }");

    match single_expression(&program) {
        Expr::If(if_expr) => {
            assert_eq!(if_expr.condition.to_string(), "(x < y)");
            assert_eq!(if_expr.consequence.body.len(), 1);
            assert_eq!(if_expr.consequence.to_string(), "x");
            assert!(if_expr.alternative.is_none());
        }
        other => panic!("expected if expression, got {:?}", other),
    }
    assert_eq!(program.to_string(), "if(x < y) x");
}

#[test]
fn test_parse_if_else_expression() {
    let program = parse_clean("if (x < y) { x } else { y }");

    match single_expression(&program) {
        Expr::If(if_expr) => {
            let alternative = if_expr.alternative.as_ref().expect("missing else block");
            assert_eq!(alternative.body.len(), 1);
            assert_eq!(alternative.to_string(), "y");
        }
        other => panic!("expected if expression, got {:?}", other),
    }
    assert_eq!(program.to_string(), "if(x < y) xelse y");
}

#[test]
fn test_if_condition_without_parens() {
    let program = parse_clean("if x > 0 { return x; }");

    assert_eq!(program.to_string(), "if(x > 0) return x;");
}

#[test]
fn test_if_missing_block() {
    let (program, errors) = parse_source("if (x) x");

    assert!(program.iter().all(|stmt| !matches!(stmt, Stmt::Expression(s) if matches!(s.expression, Expr::If(_)))));
    assert_eq!(errors[0], "expected next token to be {, got IDENT instead");
}

#[test]
fn test_parse_function_literal() {
    let program = parse_clean("fn(x, y) { x + y; }");

    match single_expression(&program) {
        Expr::Function(function) => {
            let parameters: Vec<&str> = function.parameters.iter().map(|p| p.value.as_str()).collect();
            assert_eq!(parameters, vec!["x", "y"]);
            assert_eq!(function.body.body.len(), 1);
            assert_eq!(function.body.to_string(), "(x + y)");
        }
        other => panic!("expected function literal, got {:?}", other),
    }
    assert_eq!(program.to_string(), "fn(x, y) (x + y)");
}

#[test]
fn test_parse_function_parameters() {
    let cases: [(&str, Vec<&str>); 3] = [
        ("fn() {};", vec![]),
        ("fn(x) {};", vec!["x"]),
        ("fn(x, y, z) {};", vec!["x", "y", "z"]),
    ];

    for (source, expected) in cases {
        let program = parse_clean(source);

        match single_expression(&program) {
            Expr::Function(function) => {
                let parameters: Vec<&str> = function.parameters.iter().map(|p| p.value.as_str()).collect();
                assert_eq!(parameters, expected);
            }
            other => panic!("expected function literal, got {:?}", other),
        }
    }
}

#[test]
fn test_function_parameter_must_be_identifier() {
    let (program, errors) = parse_source("fn(1) {}");

    assert!(program.iter().all(|stmt| !matches!(stmt, Stmt::Expression(s) if matches!(s.expression, Expr::Function(_)))));
    assert_eq!(errors[0], "expected next token to be IDENT, got INT instead");
}

#[test]
fn test_unterminated_block() {
    let (program, errors) = parse_source("fn(x) { x");

    assert!(program.is_empty());
    assert_eq!(errors, vec!["expected next token to be }, got EOF instead"]);
}

#[test]
fn test_error_in_function_body_keeps_later_statements() {
    let (program, errors) = parse_source("let f = fn(x) { x + }; let y = 2; let z = 3;");

    assert_eq!(errors, vec!["no prefix parse function for } found"]);

    let lets = let_statements(&program);
    let names: Vec<&str> = lets.iter().map(|stmt| stmt.name.value.as_str()).collect();
    assert_eq!(names, vec!["f", "y", "z"]);

    match &lets[0].value {
        Expr::Function(function) => assert!(function.body.body.is_empty()),
        other => panic!("expected function literal, got {:?}", other),
    }
}

#[test]
fn test_error_in_if_body_keeps_later_statements() {
    let (program, errors) = parse_source("if (x) { 1 + } else { 2 } let y = 2;");

    assert_eq!(errors, vec!["no prefix parse function for } found"]);
    assert_eq!(program.len(), 2);
    assert_eq!(program.body[1].to_string(), "let y = 2;");
}

#[test]
fn test_failed_hash_value_at_top_level() {
    let (program, errors) = parse_source(r#"let h = {"a": }; let ok = 1;"#);

    assert_eq!(errors, vec!["no prefix parse function for } found"]);
    assert_eq!(program.to_string(), "let ok = 1;");
}

#[test]
fn test_nesting_at_limit_parses() {
    let depth = MAX_NESTING_DEPTH - 1;
    let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));

    let program = parse_clean(&source);
    assert_eq!(program.to_string(), "1");
}

#[test]
fn test_deeply_nested_parens_are_an_error() {
    let source = format!("{}1{}; let after = 1;", "(".repeat(10_000), ")".repeat(10_000));
    let mut parser = Parser::new(Lexer::new(source, None));
    let program = parser.parse_program();

    let first = &parser.errors()[0];
    assert_eq!(
        first.get_kind(),
        &ErrorImpl::NestingTooDeep {
            limit: MAX_NESTING_DEPTH
        }
    );
    assert_eq!(first.to_string(), "expression nested more than 256 levels deep");
    assert_eq!(program.body.last().map(ToString::to_string), Some("let after = 1;".to_string()));
}

#[test]
fn test_deeply_nested_prefix_is_an_error() {
    let source = format!("{}1; let after = 1;", "-".repeat(200_000));
    let mut parser = Parser::new(Lexer::new(source, None));
    let program = parser.parse_program();

    assert!(!parser.errors().is_empty());
    assert!(parser
        .errors()
        .iter()
        .all(|error| matches!(error.get_kind(), ErrorImpl::NestingTooDeep { .. })));
    assert_eq!(program.body.last().map(ToString::to_string), Some("let after = 1;".to_string()));
}

#[test]
fn test_parse_call_expression() {
    let program = parse_clean("add(1, 2 * 3, 4 + 5);");

    match single_expression(&program) {
        Expr::Call(call) => {
            assert_eq!(call.callee.to_string(), "add");
            assert_eq!(call.token.kind, TokenKind::OpenParen);

            let arguments: Vec<String> = call.arguments.iter().map(ToString::to_string).collect();
            assert_eq!(arguments, vec!["1", "(2 * 3)", "(4 + 5)"]);
        }
        other => panic!("expected call expression, got {:?}", other),
    }
}

#[test]
fn test_call_on_function_literal() {
    let program = parse_clean("fn(x) { x; }(5)");

    match single_expression(&program) {
        Expr::Call(call) => {
            assert!(matches!(call.callee.as_ref(), Expr::Function(_)));
            assert_eq!(call.arguments.len(), 1);
        }
        other => panic!("expected call expression, got {:?}", other),
    }
}

#[test]
fn test_parse_array_literal() {
    let program = parse_clean("[1, 2 * 2, 3 + 3]");

    match single_expression(&program) {
        Expr::Array(array) => {
            let elements: Vec<String> = array.elements.iter().map(ToString::to_string).collect();
            assert_eq!(elements, vec!["1", "(2 * 2)", "(3 + 3)"]);
        }
        other => panic!("expected array literal, got {:?}", other),
    }

    let program = parse_clean("[]");
    assert!(matches!(single_expression(&program), Expr::Array(array) if array.elements.is_empty()));
}

#[test]
fn test_parse_index_expression() {
    let program = parse_clean("myArray[1 + 1]");

    match single_expression(&program) {
        Expr::Index(index) => {
            assert_eq!(index.left.to_string(), "myArray");
            assert_eq!(index.index.to_string(), "(1 + 1)");
        }
        other => panic!("expected index expression, got {:?}", other),
    }
}

#[test]
fn test_parse_hash_literal() {
    let program = parse_clean(r#"{"one": 1, "two": 2, "three": 3}"#);

    match single_expression(&program) {
        Expr::Hash(hash) => {
            let pairs: Vec<(String, String)> = hash
                .pairs
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect();
            assert_eq!(
                pairs,
                vec![
                    ("one".to_string(), "1".to_string()),
                    ("two".to_string(), "2".to_string()),
                    ("three".to_string(), "3".to_string()),
                ]
            );
        }
        other => panic!("expected hash literal, got {:?}", other),
    }
    assert_eq!(program.to_string(), "{one: 1, two: 2, three: 3}");
}

#[test]
fn test_parse_hash_literal_edge_cases() {
    let program = parse_clean("{}");
    assert!(matches!(single_expression(&program), Expr::Hash(hash) if hash.pairs.is_empty()));

    let program = parse_clean(r#"{"one": 0 + 1, true: 10 - 8}"#);
    assert_eq!(program.to_string(), "{one: (0 + 1), true: (10 - 8)}");
}

#[test]
fn test_hash_missing_colon() {
    let (program, errors) = parse_source(r#"{"one" 1}"#);

    assert!(program.iter().all(|stmt| !matches!(stmt, Stmt::Expression(s) if matches!(s.expression, Expr::Hash(_)))));
    assert_eq!(errors[0], "expected next token to be :, got INT instead");
}

#[test]
fn test_missing_closing_paren() {
    let (program, errors) = parse_source("(1 + 2");

    assert!(program.is_empty());
    assert_eq!(errors, vec!["expected next token to be ), got EOF instead"]);
}

#[test]
fn test_stray_token_recovery() {
    let (program, errors) = parse_source(") let x = 5;");

    assert_eq!(errors, vec!["no prefix parse function for ) found"]);
    assert_eq!(let_statements(&program).len(), 1);
    assert_eq!(program.to_string(), "let x = 5;");
}

#[test]
fn test_illegal_token_is_reported() {
    let (program, errors) = parse_source("let a = 1; @; let b = 2;");

    assert_eq!(errors, vec!["no prefix parse function for ILLEGAL found"]);
    assert_eq!(let_statements(&program).len(), 2);
}

#[test]
fn test_trailing_token_without_infix_ends_expression() {
    let program = parse_clean("a b");

    assert_eq!(program.len(), 2);
    assert_eq!(program.to_string(), "ab");
}

#[test]
fn test_registered_led_extends_grammar() {
    let (_, errors) = parse_source("x = y");
    assert_eq!(errors, vec!["no prefix parse function for = found"]);

    let mut parser = Parser::new(Lexer::new("x = y = 1".to_string(), None));
    parser.led(TokenKind::Assignment, BindingPower::Equals, parse_binary_expr);
    let program = parser.parse_program();

    assert!(parser.errors().is_empty());
    assert_eq!(program.to_string(), "((x = y) = 1)");
}

#[test]
fn test_parse_from_tokens() {
    let tokens = tokenize("let x = 1 + 2;".to_string(), Some("test.mk".to_string())).unwrap();
    let (parser, program) = parse(tokens);

    assert!(parser.errors().is_empty());
    assert_eq!(program.to_string(), "let x = (1 + 2);");
}

#[test]
fn test_error_positions_point_at_offending_token() {
    let mut parser = Parser::new(Lexer::new("let x 5;".to_string(), Some("test.mk".to_string())));
    parser.parse_program();

    let error = &parser.errors()[0];
    assert_eq!(error.get_position().0, 6);
    assert_eq!(error.get_position().1.as_str(), "test.mk");
}
