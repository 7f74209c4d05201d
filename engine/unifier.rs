//! Matching sessions.

use stencil_tracer::Trace;

use crate::bindings::Bindings;
use crate::cancel::Cancellation;
use crate::resolver::Resolver;

/// Knobs for a match, search, or rewrite.
#[derive(Clone, Debug)]
pub struct MatchOptions {
    pub trace: Trace,
    pub cancellation: Cancellation,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            trace: Trace::none(),
            cancellation: Cancellation::new(),
        }
    }
}

impl MatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trace(mut self, trace: Trace) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = cancellation;
        self
    }
}

/// The state of one branch of a match: the bindings made so far,
/// and the context needed to make more. Every speculative branch
/// gets its own [fork](Unifier::fork).
pub struct Unifier<'a> {
    bindings: Bindings,
    resolver: &'a dyn Resolver,
    trace: Trace,
    cancellation: Cancellation,
}

impl<'a> Unifier<'a> {
    pub fn new(resolver: &'a dyn Resolver, options: &MatchOptions) -> Self {
        Self::with_bindings(Bindings::new(), resolver, options)
    }

    /// Start from some existing bindings.
    pub fn with_bindings(
        bindings: Bindings,
        resolver: &'a dyn Resolver,
        options: &MatchOptions,
    ) -> Self {
        Self {
            bindings,
            resolver,
            trace: options.trace,
            cancellation: options.cancellation.clone(),
        }
    }

    /// An independent branch. Matching only asks a resolver
    /// questions (every `Resolver` method takes `&self`), so the
    /// fork shares this one's rather than a `nested` view of it.
    pub fn fork(&self) -> Self {
        Self {
            bindings: self.bindings.fork(),
            resolver: self.resolver,
            trace: self.trace,
            cancellation: self.cancellation.clone(),
        }
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut Bindings {
        &mut self.bindings
    }

    pub fn into_bindings(self) -> Bindings {
        self.bindings
    }

    pub fn resolver(&self) -> &'a dyn Resolver {
        self.resolver
    }

    pub fn trace(&self) -> Trace {
        self.trace
    }

    pub fn cancellation(&self) -> &Cancellation {
        &self.cancellation
    }
}

#[cfg(test)]
mod test {
    use stencil_syntax::*;

    use super::*;
    use crate::bindings::Key;
    use crate::resolver::{ImportPolicy, Imports};

    #[test]
    fn fork_isolation() {
        let imports = Imports::default();
        let options = MatchOptions::new();
        let a = Key::<Expr>::new("a");
        let b = Key::<Expr>::new("b");

        let mut u1 = Unifier::new(&imports, &options);
        u1.bindings_mut().put(&a, name!(x));
        let mut u2 = u1.fork();
        assert_eq!(u2.bindings().get(&a), Some(&name!(x)));

        u2.bindings_mut().put(&b, name!(y));
        assert!(u1.bindings().get(&b).is_none());

        u1.bindings_mut().replace(&a, name!(z));
        assert_eq!(u2.bindings().get(&a), Some(&name!(x)));
    }

    #[test]
    fn fork_shares_resolver() {
        let imports = Imports::new(ImportPolicy::ImportedOnly).with_import("java.util.Objects");
        let options = MatchOptions::new();
        let u1 = Unifier::new(&imports, &options);
        let u2 = u1.fork();
        let objects = Path::from("java.util.Objects");
        assert!(u2.resolver().class_reference(&objects).is_ok());
        assert_eq!(
            u1.resolver().class_reference(&objects),
            u2.resolver().class_reference(&objects)
        );
        assert!(u2.resolver().denotes_class(&name!(Objects), &objects));
    }

    #[test]
    fn options() {
        let c = Cancellation::new();
        let options = MatchOptions::new()
            .with_trace(Trace::Unify)
            .with_cancellation(c.clone());
        let imports = Imports::default();
        let u = Unifier::new(&imports, &options);
        assert!(u.trace().intersects(Trace::Unify));
        c.cancel();
        assert!(u.fork().cancellation().is_cancelled());
    }
}
