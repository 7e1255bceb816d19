//! Lexical environments
//!
//! A chain of frames, innermost first. Each frame has its own lock, and a
//! walk releases one frame before taking the next.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use tracing::debug;

use crate::diagnostics::{LispError, Result};

use super::symbol::Symbol;
use super::value::Value;

pub type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

/// Handle to a frame; clones share the frame
#[derive(Clone)]
pub struct Env(Arc<Frame>);

struct Frame {
    table: Mutex<FxIndexMap<Symbol, Value>>,
    next: Option<Env>,
}

impl Env {
    /// A fresh global frame with no bindings
    pub fn new_global() -> Env {
        Env(Arc::new(Frame {
            table: Mutex::new(FxIndexMap::default()),
            next: None,
        }))
    }

    fn table(&self) -> MutexGuard<'_, FxIndexMap<Symbol, Value>> {
        self.0.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_global(&self) -> bool {
        self.0.next.is_none()
    }

    pub fn parent(&self) -> Option<&Env> {
        self.0.next.as_ref()
    }

    /// Find the innermost binding of `symbol`
    pub fn lookup(&self, symbol: Symbol) -> Result<Value> {
        let mut env = Some(self);
        while let Some(frame) = env {
            if let Some(value) = frame.table().get(&symbol) {
                return Ok(value.clone());
            }
            env = frame.parent();
        }
        Err(LispError::UnboundSymbol {
            name: symbol.name(),
        })
    }

    /// Overwrite the innermost binding of `symbol`
    ///
    /// With no binding anywhere, a new one is created only if this is the
    /// global frame.
    pub fn assign(&self, symbol: Symbol, value: Value) -> Result<()> {
        let mut env = Some(self);
        while let Some(frame) = env {
            if let Some(slot) = frame.table().get_mut(&symbol) {
                *slot = value;
                return Ok(());
            }
            env = frame.parent();
        }

        if self.is_global() {
            debug!(symbol = %symbol, "creating global binding");
            self.table().insert(symbol, value);
            Ok(())
        } else {
            Err(LispError::IllegalGlobalCreation {
                name: symbol.name(),
            })
        }
    }

    /// Push a new frame holding `bindings` on top of this one
    pub fn extend(&self, bindings: impl IntoIterator<Item = (Symbol, Value)>) -> Env {
        Env(Arc::new(Frame {
            table: Mutex::new(bindings.into_iter().collect()),
            next: Some(self.clone()),
        }))
    }

    /// Bind directly in this frame, shadowing any outer binding
    pub fn define(&self, symbol: Symbol, value: Value) {
        self.table().insert(symbol, value);
    }

    /// Names bound in this frame, in definition order
    pub fn global_names(&self) -> Vec<Symbol> {
        self.table().keys().copied().collect()
    }

    pub fn ptr_eq(&self, other: &Env) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_walks_outward() {
        let global = Env::new_global();
        let x = Symbol::intern("x");
        global.define(x, Value::from(1));
        let inner = global.extend([]);
        assert!(inner.lookup(x).unwrap().is_eq(&Value::from(1)));
    }

    #[test]
    fn test_shadowing() {
        let global = Env::new_global();
        let x = Symbol::intern("x");
        global.define(x, Value::from(1));
        let inner = global.extend([(x, Value::from(2))]);
        assert!(inner.lookup(x).unwrap().is_eq(&Value::from(2)));
        assert!(global.lookup(x).unwrap().is_eq(&Value::from(1)));
    }

    #[test]
    fn test_unbound() {
        let global = Env::new_global();
        let err = global.lookup(Symbol::intern("nowhere")).unwrap_err();
        assert_eq!(err.to_string(), "unbound symbol: nowhere");
    }

    #[test]
    fn test_assign_rules() {
        let global = Env::new_global();
        let y = Symbol::intern("y");
        let inner = global.extend([]);
        let err = inner.assign(y, Value::from(1)).unwrap_err();
        assert!(matches!(err, LispError::IllegalGlobalCreation { .. }));

        global.assign(y, Value::from(1)).unwrap();
        inner.assign(y, Value::from(2)).unwrap();
        assert!(global.lookup(y).unwrap().is_eq(&Value::from(2)));
    }

    #[test]
    fn test_global_names_in_order() {
        let global = Env::new_global();
        let names = ["b", "a", "c"].map(Symbol::intern);
        for name in names {
            global.define(name, Value::Nil);
        }
        assert_eq!(global.global_names(), names.to_vec());
    }
}
