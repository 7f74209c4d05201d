//! Templates: trees with holes, compiled for matching and inlining.
//!
//! A template node has one variant per shape of concrete tree, plus
//! holes. Matching a node against a concrete tree ([`Pattern::unify`])
//! yields every way of binding its holes that makes the two agree;
//! inlining ([`Pattern::inline`]) goes the other way, building a
//! concrete tree from a node and some bindings.

mod compile;
mod expr;
mod ident;
mod list;
mod stmt;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use thiserror::Error;

use stencil_syntax::*;
use stencil_tracer::{trace, Trace};

use crate::bindings::{Bindable, BindingsView, Key};
use crate::choice::Choice;
use crate::inliner::{InlineError, Inliner};
use crate::resolver::Resolver;
use crate::unifier::{MatchOptions, Unifier};
use crate::{ensure_concrete, ensure_not_cancelled};

pub use expr::UExpr;
pub use ident::UIdent;
pub use stmt::{UCatch, ULocal, UStmt};

use compile::Compiler;

/// Things that may go wrong compiling a template.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum TemplateError {
    #[error("`#{0}...` may only appear last in a list")]
    MisplacedCapture(Symbol),

    #[error("hole `#{name}` can't be both {first} and {second}")]
    HoleKind {
        name: Symbol,
        first: HoleKind,
        second: HoleKind,
    },

    #[error("hole `#{0}` is not bound by any template it rewrites")]
    UnboundInAfter(Symbol),
}

/// A template node of some shape.
pub trait Pattern {
    /// The concrete shape this node matches and builds.
    type Target: Clone + PartialEq;

    /// Every way of extending `u`'s bindings so that
    /// this node matches `target`, in order.
    fn unify<'a>(&'a self, target: &'a Self::Target, u: Unifier<'a>) -> Choice<'a, Unifier<'a>>;

    /// Build a concrete tree, substituting bound values for holes.
    fn inline(&self, inliner: &mut Inliner) -> Result<Self::Target, InlineError>;

    /// The key and element pattern of a node that
    /// captures the rest of a list.
    fn capture(&self) -> Option<(&Key<Vec<Self::Target>>, &Self)> {
        None
    }
}

/// A hole matches anything once, and then only that.
fn unify_hole<'a, V: Bindable + fmt::Display>(
    key: &Key<V>,
    target: &V,
    mut u: Unifier<'a>,
) -> Choice<'a, Unifier<'a>> {
    match u.bindings().get(key).map(|bound| bound == target) {
        Some(true) => Choice::of(u),
        Some(false) => Choice::none(),
        None => {
            trace!(u.trace(), Unify, "Binding {} = {}", key, target);
            u.bindings_mut().put(key, target.clone());
            Choice::of(u)
        }
    }
}

/// A place in a concrete tree where a template may match.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Subtree<'t> {
    Expr(&'t Expr),
    Stmt(&'t Stmt),
}

impl<'t> Subtree<'t> {
    pub fn to_tree(&self) -> Tree {
        match self {
            Self::Expr(e) => Tree::Expr((*e).clone()),
            Self::Stmt(s) => Tree::Stmt((*s).clone()),
        }
    }
}

impl<'t> From<&'t Tree> for Subtree<'t> {
    fn from(t: &'t Tree) -> Self {
        match t {
            Tree::Expr(e) => Self::Expr(e),
            Tree::Stmt(s) => Self::Stmt(s),
        }
    }
}

impl<'t> From<&'t Expr> for Subtree<'t> {
    fn from(e: &'t Expr) -> Self {
        Self::Expr(e)
    }
}

impl<'t> From<&'t Stmt> for Subtree<'t> {
    fn from(s: &'t Stmt) -> Self {
        Self::Stmt(s)
    }
}

impl fmt::Display for Subtree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expr(e) => e.fmt(f),
            Self::Stmt(s) => s.fmt(f),
        }
    }
}

/// The root of a compiled template.
#[derive(Clone, Debug, PartialEq)]
pub enum UTree {
    Expr(UExpr),
    Stmt(UStmt),
}

impl UTree {
    pub fn unify<'a>(&'a self, target: Subtree<'a>, u: Unifier<'a>) -> Choice<'a, Unifier<'a>> {
        match (self, target) {
            (Self::Expr(p), Subtree::Expr(e)) => p.unify(e, u),
            (Self::Stmt(p), Subtree::Stmt(s)) => p.unify(s, u),
            _ => Choice::none(),
        }
    }

    pub fn inline(&self, inliner: &mut Inliner) -> Result<Tree, InlineError> {
        Ok(match self {
            Self::Expr(p) => Tree::Expr(p.inline(inliner)?),
            Self::Stmt(p) => Tree::Stmt(p.inline(inliner)?),
        })
    }
}

/// Keys by hole name. Templates compiled with the same table
/// share a key for every hole name they have in common.
#[derive(Clone, Debug, Default)]
pub struct Holes {
    keys: BTreeMap<Symbol, (usize, HoleKind)>,
}

impl Holes {
    pub fn new() -> Self {
        Self::default()
    }

    /// The key for the hole named `name`, made on first use.
    pub fn key<V: Bindable>(&mut self, name: &Symbol) -> Result<Key<V>, TemplateError> {
        match self.keys.get(name) {
            Some(&(id, kind)) if kind == V::KIND => Ok(Key::existing(id, name.clone())),
            Some(&(_, kind)) => Err(TemplateError::HoleKind {
                name: name.clone(),
                first: kind,
                second: V::KIND,
            }),
            None => {
                let key = Key::new(name.clone());
                self.keys.insert(name.clone(), (key.id(), V::KIND));
                Ok(key)
            }
        }
    }

    pub fn kind(&self, name: &Symbol) -> Option<HoleKind> {
        self.keys.get(name).map(|&(_, kind)| kind)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// A compiled template, ready to match concrete trees
/// and to build new ones.
#[derive(Clone, Debug)]
pub struct Template {
    source: Tree,
    root: UTree,
    holes: BTreeSet<Symbol>,
}

impl Template {
    pub fn new(tree: &Tree) -> Result<Self, TemplateError> {
        Self::with_holes(tree, &mut Holes::new())
    }

    /// Compile a tree, drawing keys from (and adding them to) `holes`.
    pub fn with_holes(tree: &Tree, holes: &mut Holes) -> Result<Self, TemplateError> {
        if let Some(name) = misplaced_rest(tree) {
            return Err(TemplateError::MisplacedCapture(name.clone()));
        }
        let mut compiler = Compiler::new(holes);
        let root = compiler.tree(tree)?;
        Ok(Self {
            source: tree.clone(),
            root,
            holes: compiler.into_used(),
        })
    }

    /// Read and compile a template.
    pub fn parse(s: &str) -> Result<Self, crate::Error> {
        Ok(Self::new(&parse_tree(s)?)?)
    }

    pub fn root(&self) -> &UTree {
        &self.root
    }

    pub fn source(&self) -> &Tree {
        &self.source
    }

    /// The names of the holes in this template.
    pub fn holes(&self) -> &BTreeSet<Symbol> {
        &self.holes
    }

    /// All of the ways this template matches `target`, lazily.
    /// `target` should be concrete; callers should check for
    /// cancellation once they're done.
    pub fn matches<'a>(
        &'a self,
        target: impl Into<Subtree<'a>>,
        resolver: &'a dyn Resolver,
        options: &MatchOptions,
    ) -> Choice<'a, Unifier<'a>> {
        self.root
            .unify(target.into(), Unifier::new(resolver, options))
    }

    /// All of the ways this template matches `target`.
    pub fn unify(
        &self,
        target: &Tree,
        resolver: &dyn Resolver,
        options: &MatchOptions,
    ) -> Result<Vec<BindingsView>, crate::Error> {
        ensure_concrete(target)?;
        let found = self
            .matches(target, resolver, options)
            .into_iter()
            .map(|u| u.bindings().unmodifiable_view())
            .inspect(|b| trace!(options.trace, Unify, "Matched {} against {}: {}", self, target, b))
            .collect::<Vec<_>>();
        ensure_not_cancelled(options)?;
        Ok(found)
    }

    /// The first way this template matches `target`, if any.
    pub fn first_match(
        &self,
        target: &Tree,
        resolver: &dyn Resolver,
        options: &MatchOptions,
    ) -> Result<Option<BindingsView>, crate::Error> {
        ensure_concrete(target)?;
        let found = self
            .matches(target, resolver, options)
            .first()
            .map(|u| u.bindings().unmodifiable_view());
        ensure_not_cancelled(options)?;
        if let Some(b) = &found {
            trace!(options.trace, Unify, "Matched {} against {}: {}", self, target, b);
        }
        Ok(found)
    }

    /// Build a concrete tree from this template and some bindings.
    pub fn inline(
        &self,
        bindings: &BindingsView,
        resolver: &dyn Resolver,
    ) -> Result<Tree, InlineError> {
        self.inline_with(&mut Inliner::new(
            bindings.bindings().clone(),
            resolver,
            Trace::none(),
        ))
    }

    pub fn inline_with(&self, inliner: &mut Inliner) -> Result<Tree, InlineError> {
        let tree = self.root.inline(inliner)?;
        trace!(inliner.trace(), Inline, "Inlined {} as {}", self, tree);
        Ok(tree)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.source.fmt(f)
    }
}
