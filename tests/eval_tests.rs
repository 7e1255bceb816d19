//! Evaluator integration tests
//!
//! Tests the full pipeline: source → reader → evaluator → printer

use pretty_assertions::assert_eq;
use ratlisp::arith::{ArithError, Number};
use ratlisp::interp::printer::MAX_PRINT_NESTING;
use ratlisp::interp::{Interpreter, MAX_EVAL_DEPTH, Value, render};
use ratlisp::LispError;
use std::thread;

/// Helper to evaluate with the prelude loaded
fn eval(source: &str) -> Result<Value, LispError> {
    Interpreter::new()?.eval_str(source)
}

/// Helper to check the rendered result
fn assert_renders(source: &str, expected: &str) {
    match eval(source) {
        Ok(value) => assert_eq!(render(&value), expected, "source: {source}"),
        Err(e) => panic!("Evaluation of {source:?} failed: {e}"),
    }
}

/// Helper to check the error message
fn assert_fails(source: &str, message: &str) {
    match eval(source) {
        Ok(value) => panic!("Expected {source:?} to fail, got {value}"),
        Err(e) => assert_eq!(e.to_string(), message, "source: {source}"),
    }
}

fn number(source: &str) -> Number {
    eval(source)
        .unwrap()
        .as_number()
        .cloned()
        .expect("a number")
}

// ==================== Arithmetic ====================

#[test]
fn test_add_ints() {
    assert_eq!(number("(+ 7 2)"), Number::Int(9));
}

#[test]
fn test_divide_exact_and_float() {
    assert_renders("(/ 7 2)", "7/2");
    assert_eq!(number("(/ (float 7) 2)"), Number::Float(3.5));
    assert_renders("(/ 7.0 2)", "7/2");
    assert_renders("(/ 1 2 2)", "1/4");
}

#[test]
fn test_variadic_arithmetic() {
    assert_renders("(+)", "0");
    assert_renders("(*)", "1");
    assert_renders("(- 5)", "-5");
    assert_renders("(- 10 1 2)", "7");
    assert_renders("(* 1/2 4)", "2");
}

#[test]
fn test_factorial_promotes() {
    let source = "(defun fact (n) (if (= n 0) 1 (* n (fact (- n 1)))))";
    assert_eq!(number(&format!("{source} (fact 12)")), Number::Int(479_001_600));
    let thirteen = number(&format!("{source} (fact 13)"));
    assert!(matches!(thirteen, Number::Rational(_)));
    assert_eq!(thirteen.to_string(), "6227020800");
    assert_renders(
        &format!("{source} (fact 29)"),
        "8841761993739701954543616000000",
    );
}

#[test]
fn test_comparisons() {
    assert_renders("(< 1 2)", "t");
    assert_renders("(>= 1/2 0.5)", "t");
    assert_renders("(/= 1 1)", "()");
    assert_renders("(= (float 1) 1)", "t");
}

#[test]
fn test_truncate_and_float() {
    assert_renders("(truncate -7/2)", "-3");
    assert_renders("(truncate -7 2)", "-3");
    assert_renders("(truncate (float 5/2))", "2");
    assert_renders("(float 3)", "3.0");
}

#[test]
fn test_arithmetic_errors() {
    assert!(matches!(
        eval("(/ 1 0)"),
        Err(LispError::Arithmetic(ArithError::DivisionByZero))
    ));
    assert_fails("(+ 1 'a)", "number expected: a");
    assert_fails("(/ 1)", "/: arity 2+; given 1");
}

// ==================== Special Forms ====================

#[test]
fn test_quote() {
    assert_renders("'(a b)", "(a b)");
    assert_renders("(quote x)", "x");
    assert_fails("(quote)", "quote: expected 1 argument; given ()");
}

#[test]
fn test_if() {
    assert_renders("(if nil 1 2 3)", "3");
    assert_renders("(if t 1 2 3)", "1");
    assert_renders("(if nil 1)", "()");
    assert_fails("(if t)", "if: expected 2+ arguments; given (t)");
}

#[test]
fn test_progn() {
    assert_renders("(progn)", "()");
    assert_renders("(progn 1 2 3)", "3");
}

#[test]
fn test_and() {
    assert_renders("(and)", "t");
    assert_renders("(and 1 nil 2)", "()");
    assert_renders("(and 1 2)", "2");
}

#[test]
fn test_let_and_setq() {
    assert_renders("(let ((x 1)) (setq x 2) x)", "2");
    assert_renders("(let (x) x)", "()");
    assert_renders("(setq x 5) (let ((x 1) (y x)) y)", "5");
}

#[test]
fn test_setq_global_from_local_fails() {
    let err = eval("(let ((x 1)) (setq y 1))").unwrap_err();
    assert!(matches!(err, LispError::IllegalGlobalCreation { .. }));
    assert_eq!(err.to_string(), "global symbol created locally: y");
}

#[test]
fn test_setq_creates_global_at_top_level() {
    assert_renders("(setq fresh 1) (+ fresh 1)", "2");
}

#[test]
fn test_malformed_forms() {
    assert_fails("(let x 1)", "let: expected binding list; given x");
    assert_fails("(setq 1 2)", "symbol expected: 1");
    assert_fails("(lambda)", "lambda: expected 1+ arguments; given ()");
    assert_fails("(lambda (&rest) 1)", "&rest: expected exactly one parameter; given ()");
}

// ==================== Functions ====================

#[test]
fn test_lambda_application() {
    assert_renders("((lambda (x y) (+ x y)) 1 2)", "3");
    assert_renders("((lambda () 7))", "7");
}

#[test]
fn test_rest_parameter() {
    assert_renders("((lambda (a &rest r) r) 1 2 3)", "(2 3)");
    assert_renders("((lambda (&rest r) r))", "()");
}

#[test]
fn test_closure_arity_errors() {
    assert_fails("((lambda (x y) x) 1)", "missing argument for: y");
    assert_fails("((lambda (x) x) 1 2 3)", "unused rest: (2 3)");
}

#[test]
fn test_defun_returns_name() {
    assert_renders("(defun f () 1)", "f");
    assert_renders("(defun f () 1) (f)", "1");
}

#[test]
fn test_closures_capture_environment() {
    assert_renders(
        "(defun make-adder (n) (lambda (x) (+ x n))) ((make-adder 5) 10)",
        "15",
    );
    assert_renders(
        "(setq counter (let ((c 0)) (lambda () (setq c (+ c 1))))) (counter) (counter)",
        "2",
    );
}

#[test]
fn test_arguments_evaluate_in_caller_env() {
    assert_renders("(setq n 1) (defun f (n) n) (let ((m 42)) (f m))", "42");
}

#[test]
fn test_apply() {
    assert_renders("(apply + '(1 2 3))", "6");
    assert_renders("(apply list '(a (b c)))", "(a (b c))");
    assert_renders("(apply (lambda (x) x) '((a b)))", "(a b)");
    assert_fails("(apply + 1)", "list expected: 1");
}

#[test]
fn test_application_errors() {
    assert_fails("(1 2)", "not function: 1");
    assert_fails("(undefined-fn 1)", "unbound symbol: undefined-fn");
    assert_fails("(car 1 2)", "car: arity 1; given 2");
}

// ==================== Builtins ====================

#[test]
fn test_list_primitives() {
    assert_renders("(car '(1 2))", "1");
    assert_renders("(cdr '(1 2))", "(2)");
    assert_renders("(car nil)", "()");
    assert_renders("(cons 1 '(2))", "(1 2)");
    assert_renders("(listp nil)", "t");
    assert_renders("(listp 'a)", "()");
    assert_fails("(cons 1 2)", "list expected: 2");
}

#[test]
fn test_eq() {
    assert_renders("(eq 'a 'a)", "t");
    assert_renders("(eq '(1) '(1))", "()");
    assert_renders("(let ((x '(1))) (eq x x))", "t");
    assert_renders("(eq 1 1)", "t");
    assert_renders("(eq nil nil)", "t");
}

#[test]
fn test_mutation() {
    assert_renders("(setq x (list 1 2)) (rplaca x 'a) x", "(a 2)");
    assert_renders("(setq x (list 1 2)) (rplacd x '(b c)) x", "(1 b c)");
    assert_renders("(rplaca (list 1) 'new)", "new");
}

#[test]
fn test_gensym() {
    assert_renders("(eq (gensym) (gensym))", "()");
}

#[test]
fn test_print_returns_value() {
    assert_renders("(print '(1 2))", "(1 2)");
}

// ==================== Prelude ====================

#[test]
fn test_prelude() {
    assert_renders("(null nil)", "t");
    assert_renders("(not 1)", "()");
    assert_renders("(length '(a b c))", "3");
    assert_renders("(append '(1 2) '(3) '(4 5))", "(1 2 3 4 5)");
    assert_renders("(append)", "()");
}

#[test]
fn test_bare_interpreter_lacks_prelude() {
    let interp = Interpreter::bare();
    assert!(matches!(
        interp.eval_str("(length nil)"),
        Err(LispError::UnboundSymbol { .. })
    ));
}

// ==================== Trampoline ====================

#[test]
fn test_deep_tail_call_completes() {
    assert_renders(
        "(defun count-down (n) (if (= n 0) 'done (count-down (- n 1)))) (count-down 100000)",
        "done",
    );
}

#[test]
fn test_deep_tail_call_through_progn_and_let() {
    assert_renders(
        "(defun spin (n acc)
           (progn
             (let ((m (- n 1)))
               (if (= n 0) acc (spin m (+ acc 1))))))
         (spin 100000 0)",
        "100000",
    );
}

#[test]
fn test_deep_non_tail_recursion_hits_limit() {
    // Runs on the default test thread stack
    match eval("(defun down (n) (if (= n 0) 0 (+ 1 (down (- n 1))))) (down 100000)") {
        Err(LispError::RecursionLimit { limit }) => assert_eq!(limit, MAX_EVAL_DEPTH),
        other => panic!("expected RecursionLimit, got {other:?}"),
    }
}

#[test]
fn test_recursion_limit_on_small_thread() {
    let result = thread::Builder::new()
        .stack_size(512 * 1024)
        .spawn(|| {
            ratlisp::interpret("(defun down (n) (if (= n 0) 0 (+ 1 (down (- n 1))))) (down 100000)")
                .map(|v| render(&v))
        })
        .unwrap()
        .join()
        .unwrap();
    assert!(matches!(result, Err(LispError::RecursionLimit { .. })), "{result:?}");
}

#[test]
fn test_non_tail_recursion_below_limit_succeeds() {
    assert_renders(
        "(defun down (n) (if (= n 0) 0 (+ 1 (down (- n 1))))) (down 5000)",
        "5000",
    );
}

#[test]
fn test_deeply_nested_data_from_tail_loop() {
    let value = eval(
        "(defun nest (n acc) (if (= n 0) acc (nest (- n 1) (list acc)))) (nest 100000 nil)",
    )
    .unwrap();
    let expected = format!(
        "{}...{}",
        "(".repeat(MAX_PRINT_NESTING),
        ")".repeat(MAX_PRINT_NESTING)
    );
    assert_eq!(render(&value), expected);
}
