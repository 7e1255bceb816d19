//! Interned symbols
//!
//! One process-wide table maps names to small integer handles. The handles
//! are `Copy`, so comparing symbols is comparing integers.

use std::fmt;
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};

use rustc_hash::FxBuildHasher;
use string_interner::backend::StringBackend;
use string_interner::{DefaultSymbol, StringInterner, Symbol as _};

type Interner = StringInterner<StringBackend<DefaultSymbol>, FxBuildHasher>;

/// Interned first, so their handles are the constants on [`Symbol`]
const SENTINELS: [&str; 4] = ["nil", "t", "quote", "&rest"];

static TABLE: LazyLock<Mutex<Interner>> = LazyLock::new(|| {
    let mut table = Interner::new();
    for (index, name) in SENTINELS.iter().enumerate() {
        let symbol = table.get_or_intern_static(name);
        debug_assert_eq!(symbol.to_usize(), index);
    }
    Mutex::new(table)
});

fn table() -> MutexGuard<'static, Interner> {
    TABLE.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An interned name
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

impl Symbol {
    pub const NIL: Symbol = Symbol(0);
    pub const T: Symbol = Symbol(1);
    pub const QUOTE: Symbol = Symbol(2);
    pub const REST: Symbol = Symbol(3);

    /// Return the unique symbol for `name`, creating it on first use
    pub fn intern(name: &str) -> Symbol {
        let symbol = table().get_or_intern(name);
        Symbol(symbol.to_usize() as u32)
    }

    /// Run `f` on the symbol's text without copying it out of the table
    pub fn with_name<R>(self, f: impl FnOnce(&str) -> R) -> R {
        let table = table();
        let name = DefaultSymbol::try_from_usize(self.0 as usize)
            .and_then(|symbol| table.resolve(symbol))
            .unwrap_or("?");
        f(name)
    }

    pub fn name(self) -> String {
        self.with_name(str::to_string)
    }
}

/// Number of symbols interned so far
pub fn symbol_count() -> usize {
    table().len()
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_name(|name| f.write_str(name))
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_name(|name| write!(f, "Symbol({name})"))
    }
}
