//! Match templates against concrete trees, and build new trees from
//! templates and the bindings that matching produces.
//!
//! A template is a tree with named holes. [Unifying](Template::unify)
//! it with a concrete tree is a backtracking search over every way of
//! binding the holes so that the two trees agree; [inlining](Template::inline)
//! substitutes bound values for holes to build a new concrete tree.
//! The search is lazy (see [`Choice`]), so asking for just the first
//! match explores only as much as it needs to.

#![allow(rustdoc::private_intra_doc_links)]

mod bindings;
mod cancel;
mod choice;
mod inliner;
mod resolver;
mod rule;
mod search;
mod template;
mod unifier;

use thiserror::Error;

use stencil_syntax::{IsConcrete as _, SyntaxError, Tree};

pub use bindings::{Bindable, Bindings, BindingsView, Key, Value};
pub use cancel::Cancellation;
pub use choice::Choice;
pub use inliner::{InlineError, Inliner};
pub use resolver::{qualified, ClassReference, ImportPolicy, Imports, Resolver, Unresolved};
pub use rule::{Rewrite, RewriteRule};
pub use search::{search, Found};
pub use stencil_tracer::Trace;
pub use template::{
    Holes, Pattern, Subtree, Template, TemplateError, UCatch, UExpr, UIdent, ULocal, UStmt, UTree,
};
pub use unifier::{MatchOptions, Unifier};

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Inline(#[from] InlineError),

    #[error("`{0}` is a template, not a concrete tree")]
    NotConcrete(Tree),

    #[error("search cancelled")]
    Cancelled,
}

/// Only concrete trees may be matched against.
pub(crate) fn ensure_concrete(target: &Tree) -> Result<(), Error> {
    if target.is_concrete() {
        Ok(())
    } else {
        Err(Error::NotConcrete(target.clone()))
    }
}

/// A cancelled search has no result, not even a partial one.
pub(crate) fn ensure_not_cancelled(options: &MatchOptions) -> Result<(), Error> {
    if options.cancellation.is_cancelled() {
        Err(Error::Cancelled)
    } else {
        Ok(())
    }
}
