//! Build concrete trees from templates and bindings.

use std::collections::BTreeSet;

use thiserror::Error;

use stencil_syntax::*;
use stencil_tracer::{trace, Trace};

use crate::bindings::{Bindable, Bindings, Key};
use crate::resolver::{Resolver, Unresolved};

/// Things that may go wrong while inlining a template.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum InlineError {
    #[error("hole `#{0}` is not bound")]
    Unbound(Symbol),

    #[error(transparent)]
    Unresolved(#[from] Unresolved),

    #[error("`#{0}...` may only appear last in a list")]
    MisplacedCapture(Symbol),

    #[error("no alternative of `#any` could be inlined")]
    NoAlternatives,
}

impl InlineError {
    /// Can a caller reasonably skip this template and try another?
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Unresolved(_))
    }
}

/// Substitutes bound values for holes, and records the imports
/// that resolved class references need.
pub struct Inliner<'a> {
    bindings: Bindings,
    resolver: &'a dyn Resolver,
    imports: BTreeSet<Path>,
    trace: Trace,
}

impl<'a> Inliner<'a> {
    pub fn new(bindings: Bindings, resolver: &'a dyn Resolver, trace: Trace) -> Self {
        Self {
            bindings,
            resolver,
            imports: BTreeSet::new(),
            trace,
        }
    }

    pub fn get<V: Bindable>(&self, key: &Key<V>) -> Result<V, InlineError> {
        self.bindings
            .get(key)
            .cloned()
            .ok_or_else(|| InlineError::Unbound(key.name().clone()))
    }

    /// Refer to an external class, noting any import it needs.
    pub fn class(&mut self, path: &Path) -> Result<Expr, InlineError> {
        let reference = self.resolver.class_reference(path)?;
        if let Some(import) = reference.import {
            trace!(self.trace, Inline, "Importing {}", import);
            self.imports.insert(import);
        }
        Ok(reference.expr)
    }

    /// Run `f`, forgetting any imports it noted if it fails.
    pub fn attempt<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, InlineError>,
    ) -> Result<T, InlineError> {
        let imports = self.imports.clone();
        let result = f(self);
        if result.is_err() {
            self.imports = imports;
        }
        result
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// The imports needed by everything inlined so far.
    pub fn imports(&self) -> &BTreeSet<Path> {
        &self.imports
    }

    pub fn into_imports(self) -> BTreeSet<Path> {
        self.imports
    }

    pub fn trace(&self) -> Trace {
        self.trace
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::resolver::{ImportPolicy, Imports};

    #[test]
    fn get() {
        let a = Key::<Expr>::new("a");
        let b = Key::<Expr>::new("b");
        let mut bindings = Bindings::new();
        bindings.put(&a, name!(x));
        let imports = Imports::default();
        let inliner = Inliner::new(bindings, &imports, Trace::none());
        assert_eq!(inliner.get(&a), Ok(name!(x)));
        assert_eq!(inliner.get(&b), Err(InlineError::Unbound(sym!(b))));
    }

    #[test]
    fn class() {
        let objects = Path::from("java.util.Objects");
        let imports = Imports::new(ImportPolicy::AddImport);
        let mut inliner = Inliner::new(Bindings::new(), &imports, Trace::none());
        assert_eq!(inliner.class(&objects), Ok(name!(Objects)));
        assert!(inliner.imports().contains(&objects));

        let imports = Imports::new(ImportPolicy::ImportedOnly);
        let mut inliner = Inliner::new(Bindings::new(), &imports, Trace::none());
        let e = inliner.class(&objects).expect_err("not imported");
        assert!(e.is_recoverable());
        assert!(!InlineError::Unbound(sym!(a)).is_recoverable());
        assert_eq!(e.to_string(), "can't resolve class `java.util.Objects`");
    }

    #[test]
    fn attempt() {
        let objects = Path::from("java.util.Objects");
        let arrays = Path::from("java.util.Arrays");
        let imports = Imports::new(ImportPolicy::AddImport);
        let mut inliner = Inliner::new(Bindings::new(), &imports, Trace::none());
        let missing = Key::<Expr>::new("missing");
        let failed = inliner.attempt(|i| {
            i.class(&objects)?;
            i.get(&missing)
        });
        assert_eq!(failed, Err(InlineError::Unbound(sym!(missing))));
        assert!(inliner.imports().is_empty(), "failure forgets its imports");

        assert_eq!(inliner.attempt(|i| i.class(&arrays)), Ok(name!(Arrays)));
        assert_eq!(inliner.imports().iter().collect::<Vec<_>>(), [&arrays]);
    }
}
