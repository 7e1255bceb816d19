//! Environment tests
//!
//! Frame chains, assignment rules and sharing one global frame across threads.

use pretty_assertions::assert_eq;
use ratlisp::interp::{Env, Interpreter, Symbol, Value, global_env, render};
use ratlisp::LispError;
use std::sync::Arc;
use std::thread;

fn sym(name: &str) -> Symbol {
    Symbol::intern(name)
}

fn rendered(env: &Env, name: &str) -> String {
    render(&env.lookup(sym(name)).unwrap())
}

// ==================== Frames ====================

#[test]
fn test_extend_does_not_touch_parent() {
    let global = Env::new_global();
    global.define(sym("a"), Value::from(1));
    let inner = global.extend([(sym("a"), Value::from(2)), (sym("b"), Value::from(3))]);

    assert_eq!(rendered(&inner, "a"), "2");
    assert_eq!(rendered(&inner, "b"), "3");
    assert_eq!(rendered(&global, "a"), "1");
    assert!(global.lookup(sym("b")).is_err());
    assert!(inner.parent().unwrap().ptr_eq(&global));
}

#[test]
fn test_assign_updates_innermost_binding() {
    let global = Env::new_global();
    global.define(sym("v"), Value::from(1));
    let middle = global.extend([(sym("v"), Value::from(2))]);
    let inner = middle.extend([]);

    inner.assign(sym("v"), Value::from(9)).unwrap();
    assert_eq!(rendered(&middle, "v"), "9");
    assert_eq!(rendered(&global, "v"), "1");
}

#[test]
fn test_assign_reaches_existing_global_from_inner_frame() {
    let global = Env::new_global();
    global.define(sym("g"), Value::from(1));
    let inner = global.extend([]);
    inner.assign(sym("g"), Value::from(2)).unwrap();
    assert_eq!(rendered(&global, "g"), "2");
}

#[test]
fn test_assign_cannot_create_from_inner_frame() {
    let global = Env::new_global();
    let inner = global.extend([]);
    let err = inner.assign(sym("brand-new"), Value::Nil).unwrap_err();
    assert_eq!(err.to_string(), "global symbol created locally: brand-new");
    assert!(matches!(
        global.lookup(sym("brand-new")),
        Err(LispError::UnboundSymbol { .. })
    ));
}

#[test]
fn test_global_names_in_definition_order() {
    let global = Env::new_global();
    for name in ["first", "second", "third"] {
        global.define(sym(name), Value::Nil);
    }
    let names: Vec<String> = global.global_names().iter().map(|s| s.name()).collect();
    assert_eq!(names, vec!["first", "second", "third"]);
}

#[test]
fn test_global_env_binds_t_to_itself() {
    let env = global_env();
    assert!(env.is_global());
    assert!(env.lookup(Symbol::T).unwrap().is_eq(&Value::Symbol(Symbol::T)));
}

// ==================== Sharing ====================

#[test]
fn test_threads_share_global_frame() {
    let interp = Arc::new(Interpreter::new().unwrap());
    interp.eval_str("(setq shared '(a b c))").unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let interp = Arc::clone(&interp);
            thread::spawn(move || {
                let name = format!("slot-{i}");
                for n in 0..100 {
                    interp.eval_str(&format!("(setq {name} {n})")).unwrap();
                    let len = interp.eval_str("(length shared)").unwrap();
                    assert_eq!(render(&len), "3");
                }
                render(&interp.eval_str(&name).unwrap())
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), "99");
    }
    for i in 0..8 {
        assert_eq!(rendered(interp.global_env(), &format!("slot-{i}")), "99");
    }
}

#[test]
fn test_concurrent_updates_to_one_binding() {
    let interp = Arc::new(Interpreter::bare());
    interp.eval_str("(setq cell (list 0))").unwrap();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let interp = Arc::clone(&interp);
            thread::spawn(move || {
                for _ in 0..50 {
                    interp.eval_str(&format!("(rplaca cell {i})")).unwrap();
                    let head = interp.eval_str("(car cell)").unwrap();
                    assert!(head.as_number().is_some());
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    let head = render(&interp.eval_str("(car cell)").unwrap());
    assert!(["0", "1", "2", "3"].contains(&head.as_str()), "{head}");
}
