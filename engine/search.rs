//! Find every place in a tree where a template matches.

use stencil_syntax::*;
use stencil_tracer::trace;

use crate::bindings::BindingsView;
use crate::resolver::Resolver;
use crate::template::{Subtree, Template};
use crate::unifier::{MatchOptions, Unifier};
use crate::{ensure_concrete, ensure_not_cancelled, Error};

/// A match found by [`search`].
#[derive(Clone, Debug, PartialEq)]
pub struct Found<'t> {
    pub subtree: Subtree<'t>,
    pub bindings: BindingsView,
}

/// Every statement and expression in a tree, in pre-order.
#[derive(Default)]
struct Subtrees<'t>(Vec<Subtree<'t>>);

impl<'t> Visit<'t> for Subtrees<'t> {
    fn visit_expr(&mut self, e: &'t Expr) {
        self.0.push(Subtree::Expr(e));
        visit_expr(self, e);
    }

    fn visit_stmt(&mut self, s: &'t Stmt) {
        self.0.push(Subtree::Stmt(s));
        visit_stmt(self, s);
    }
}

/// The first match of `template` at every sub-tree of `root`,
/// in pre-order.
pub fn search<'t>(
    template: &Template,
    root: &'t Tree,
    resolver: &dyn Resolver,
    options: &MatchOptions,
) -> Result<Vec<Found<'t>>, Error> {
    ensure_concrete(root)?;
    let mut subtrees = Subtrees::default();
    subtrees.visit_tree(root);

    let mut found = Vec::new();
    for subtree in subtrees.0 {
        ensure_not_cancelled(options)?;
        let first = template
            .root()
            .unify(subtree, Unifier::new(resolver, options))
            .first();
        if let Some(u) = first {
            let bindings = u.into_bindings().unmodifiable_view();
            trace!(options.trace, Search, "Found {} at {}: {}", template, subtree, bindings);
            found.push(Found { subtree, bindings });
        }
    }
    ensure_not_cancelled(options)?;
    Ok(found)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cancel::Cancellation;
    use crate::resolver::Imports;

    fn find(template: &str, root: &str) -> Vec<String> {
        let template = Template::parse(template).expect("a template");
        let root = parse_tree(root).expect("a tree");
        search(&template, &root, &Imports::default(), &MatchOptions::new())
            .expect("not cancelled")
            .iter()
            .map(|f| format!("{} {}", f.subtree, f.bindings))
            .collect()
    }

    #[test]
    fn expressions() {
        assert_eq!(
            find(
                "#a.size() == 0",
                "{ if (xs.size() == 0) return; while (ys.size() == 0) ys.add(1); }"
            ),
            ["xs.size() == 0 {#a = xs}", "ys.size() == 0 {#a = ys}"]
        );
        assert_eq!(
            find("f(#a)", "f(f(1));"),
            ["f(f(1)) {#a = f(1)}", "f(1) {#a = 1}"],
            "pre-order"
        );
    }

    #[test]
    fn statements() {
        assert_eq!(
            find("#x++;", "for (i = 0; i < n; i++) { j++; }"),
            ["j++; {#x = j}"],
            "updates are expressions"
        );
        assert!(find("#x++;", "i++").is_empty());
        assert_eq!(find("#s;", "{ f(); }").len(), 2, "the block and its statement");
    }

    #[test]
    fn templates_are_not_roots() {
        let template = Template::parse("#a").expect("a template");
        let root = parse_tree("{ f(#x); }").expect("a tree");
        assert_eq!(
            search(&template, &root, &Imports::default(), &MatchOptions::new()),
            Err(Error::NotConcrete(root.clone()))
        );
    }

    #[test]
    fn cancelled() {
        let template = Template::parse("#a").expect("a template");
        let root = parse_tree("f(x, y)").expect("a tree");
        let cancellation = Cancellation::new();
        cancellation.cancel();
        let options = MatchOptions::new().with_cancellation(cancellation);
        assert_eq!(
            search(&template, &root, &Imports::default(), &options),
            Err(Error::Cancelled)
        );
    }
}
