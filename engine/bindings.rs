//! Map metavariable keys to the values they capture.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use stencil_syntax::*;

/// Source of key identities.
static NEXT_KEY: AtomicUsize = AtomicUsize::new(0);

/// Names a hole, and the shape `V` of value it may capture.
/// Keys compare by identity, not by name: two keys made with
/// the same name are distinct.
pub struct Key<V> {
    id: usize,
    name: Symbol,
    value: PhantomData<fn() -> V>,
}

impl<V> Key<V> {
    pub fn new(name: impl Into<Symbol>) -> Self {
        Self::existing(NEXT_KEY.fetch_add(1, Ordering::Relaxed), name.into())
    }

    /// Rebuild a key with a known identity.
    pub(crate) fn existing(id: usize, name: Symbol) -> Self {
        Self {
            id,
            name,
            value: PhantomData,
        }
    }

    pub fn name(&self) -> &Symbol {
        &self.name
    }

    pub(crate) fn id(&self) -> usize {
        self.id
    }
}

impl<V> Clone for Key<V> {
    fn clone(&self) -> Self {
        Self::existing(self.id, self.name.clone())
    }
}

impl<V> PartialEq for Key<V> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<V> Eq for Key<V> {}

impl<V> Hash for Key<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

impl<V> fmt::Debug for Key<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("Key(#{}, {})", self.name, self.id))
    }
}

impl<V> fmt::Display for Key<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("#{}", self.name))
    }
}

/// A captured value of any shape.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Value {
    Expr(Expr),
    Stmt(Stmt),
    Ident(Ident),
    Exprs(Vec<Expr>),
    Stmts(Vec<Stmt>),
}

fn join<T: fmt::Display>(items: &[T], sep: &str) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(sep)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expr(e) => e.fmt(f),
            Self::Stmt(s) => s.fmt(f),
            Self::Ident(i) => i.fmt(f),
            Self::Exprs(es) => f.write_fmt(format_args!("[{}]", join(es, ", "))),
            Self::Stmts(ss) => f.write_fmt(format_args!("[{}]", join(ss, " "))),
        }
    }
}

/// Things that a hole may capture.
pub trait Bindable: Clone + PartialEq {
    const KIND: HoleKind;

    fn into_value(self) -> Value;
    fn from_value(value: &Value) -> Option<&Self>;
}

macro_rules! bindable {
    ($type: ty, $variant: ident) => {
        impl Bindable for $type {
            const KIND: HoleKind = HoleKind::$variant;

            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            fn from_value(value: &Value) -> Option<&Self> {
                match value {
                    Value::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

bindable!(Expr, Expr);
bindable!(Stmt, Stmt);
bindable!(Ident, Ident);
bindable!(Vec<Expr>, Exprs);
bindable!(Vec<Stmt>, Stmts);

#[derive(Clone, Debug, PartialEq)]
struct Binding {
    name: Symbol,
    value: Value,
}

/// A set of hole bindings. Copy-on-write: a [fork](Bindings::fork)
/// shares storage with its parent until either one is written.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bindings {
    map: Rc<BTreeMap<usize, Binding>>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<V: Bindable>(&self, key: &Key<V>) -> Option<&V> {
        self.map
            .get(&key.id())
            .and_then(|b| V::from_value(&b.value))
    }

    pub fn contains<V>(&self, key: &Key<V>) -> bool {
        self.map.contains_key(&key.id())
    }

    /// Bind an unbound key. Binding a key twice is a bug.
    pub fn put<V: Bindable>(&mut self, key: &Key<V>, value: V) {
        assert!(!self.contains(key), "hole {key} is already bound");
        Rc::make_mut(&mut self.map).insert(
            key.id(),
            Binding {
                name: key.name().clone(),
                value: value.into_value(),
            },
        );
    }

    /// Rebind a bound key, returning its old value.
    pub fn replace<V: Bindable>(&mut self, key: &Key<V>, value: V) -> V {
        let old = self.remove(key);
        match old {
            Some(old) => {
                self.put(key, value);
                old
            }
            None => panic!("hole {key} is not bound"),
        }
    }

    /// Retract a binding.
    pub fn remove<V: Bindable>(&mut self, key: &Key<V>) -> Option<V> {
        if !self.contains(key) {
            return None;
        }
        Rc::make_mut(&mut self.map)
            .remove(&key.id())
            .and_then(|b| V::from_value(&b.value).cloned())
    }

    /// An independent copy of the current bindings.
    pub fn fork(&self) -> Self {
        self.clone()
    }

    pub fn unmodifiable_view(&self) -> BindingsView {
        BindingsView(self.clone())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Read-only access to a set of bindings, e.g., the
/// result of a successful match.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BindingsView(Bindings);

impl BindingsView {
    pub fn get<V: Bindable>(&self, key: &Key<V>) -> Option<&V> {
        self.0.get(key)
    }

    /// Look up a value by the name of its hole.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.iter().find(|(n, _)| n.name() == name).map(|(_, v)| v)
    }

    /// Iterate in order of key creation.
    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &Value)> {
        self.0.map.values().map(|b| (&b.name, &b.value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn bindings(&self) -> &Bindings {
        &self.0
    }
}

impl fmt::Display for BindingsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!(
            "{{{}}}",
            self.iter()
                .map(|(n, v)| format!("#{n} = {v}"))
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }
}
