//! Reader tests
//!
//! Tests the path source → tokens → values, and incomplete vs malformed input.

use pretty_assertions::assert_eq;
use ratlisp::arith::Number;
use ratlisp::interp::{Value, render};
use ratlisp::lexer::{TokenKind, lex};
use ratlisp::parser::{MAX_READ_DEPTH, Reader, read_all};
use ratlisp::LispError;

/// Helper to read exactly one expression and render it back
fn read_rendered(source: &str) -> String {
    let exprs = read_all(source).unwrap_or_else(|e| panic!("read failed: {e}"));
    assert_eq!(exprs.len(), 1, "expected one expression in {source:?}");
    render(&exprs[0])
}

// ==================== Lexer ====================

#[test]
fn test_lex_ends_with_eof() {
    let tokens = lex("");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Eof);
}

#[test]
fn test_lex_symbol_characters() {
    let tokens = lex("&rest /= <= 1+ *foo*");
    let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["&rest", "/=", "<=", "1+", "*foo*", ""]);
}

// ==================== Atoms ====================

#[test]
fn test_numbers() {
    let exprs = read_all("7 -7 7/2 0.5 7.0 0x10 2147483648").unwrap();
    let numbers: Vec<_> = exprs
        .iter()
        .map(|e| e.as_number().cloned().expect("a number"))
        .collect();
    assert_eq!(numbers[0], Number::Int(7));
    assert_eq!(numbers[1], Number::Int(-7));
    assert_eq!(numbers[2].to_string(), "7/2");
    assert_eq!(numbers[3].to_string(), "1/2");
    assert_eq!(numbers[4], Number::Int(7));
    assert_eq!(numbers[5], Number::Int(16));
    assert!(matches!(numbers[6], Number::Rational(_)));
}

#[test]
fn test_symbols_that_look_numeric() {
    for text in ["1+", "-", "+", "1/0", "..."] {
        let exprs = read_all(text).unwrap();
        assert!(exprs[0].as_symbol().is_some(), "{text:?} should be a symbol");
    }
}

#[test]
fn test_nil_reads_as_empty_list() {
    assert_eq!(read_rendered("nil"), "()");
    assert_eq!(read_rendered("(a nil)"), "(a ())");
}

#[test]
fn test_string_literal() {
    let exprs = read_all(r#""hello\nworld""#).unwrap();
    match &exprs[0] {
        Value::Str(s) => assert_eq!(&**s, "hello\nworld"),
        other => panic!("expected a string, got {other}"),
    }
}

// ==================== Lists ====================

#[test]
fn test_nested_lists() {
    assert_eq!(read_rendered("(a (b (c)) ())"), "(a (b (c)) ())");
}

#[test]
fn test_quote_expands() {
    let exprs = read_all("'x").unwrap();
    assert_eq!(render(&exprs[0]), "'x");
    let list = exprs[0].as_list().unwrap();
    let head = list.unwrap().car();
    assert_eq!(render(&head), "quote");
}

#[test]
fn test_comments_and_whitespace() {
    let exprs = read_all("; leading\n(a ; inside\n b)\n\t; trailing").unwrap();
    assert_eq!(exprs.len(), 1);
    assert_eq!(render(&exprs[0]), "(a b)");
}

#[test]
fn test_reader_is_incremental() {
    let mut reader = Reader::new("<test>", "(a) (b");
    assert!(reader.read().unwrap().is_some());
    assert!(reader.read().unwrap_err().is_incomplete());
}

// ==================== Errors ====================

#[test]
fn test_incomplete() {
    for source in ["(+ 1", "((a)", "'", "(quote", "\"abc"] {
        let err = read_all(source).unwrap_err();
        assert!(err.is_incomplete(), "{source:?} gave {err:?}");
    }
}

#[test]
fn test_malformed() {
    let err = read_all(")").unwrap_err();
    match err {
        LispError::Malformed { message, span, .. } => {
            assert_eq!(message, "unexpected `)`");
            assert_eq!(span.offset(), 0);
        }
        other => panic!("expected Malformed, got {other:?}"),
    }
}

#[test]
fn test_malformed_after_valid() {
    let mut reader = Reader::new("<test>", "(a) )");
    assert!(reader.read().unwrap().is_some());
    assert!(matches!(reader.read(), Err(LispError::Malformed { .. })));
}

#[test]
fn test_nesting_limit() {
    let deep = format!("{}{}", "(".repeat(200_000), ")".repeat(200_000));
    match read_all(&deep).unwrap_err() {
        LispError::Malformed { message, span, .. } => {
            assert_eq!(message, format!("nesting deeper than {MAX_READ_DEPTH} levels"));
            assert_eq!(span.offset(), MAX_READ_DEPTH);
        }
        other => panic!("expected Malformed, got {other:?}"),
    }

    let quotes = format!("{}x", "'".repeat(200_000));
    assert!(matches!(read_all(&quotes), Err(LispError::Malformed { .. })));
}

#[test]
fn test_nesting_at_limit_reads() {
    let source = format!("{}{}", "(".repeat(MAX_READ_DEPTH), ")".repeat(MAX_READ_DEPTH));
    assert_eq!(read_all(&source).unwrap().len(), 1);
}
