//! Rewrite rules: match any of several templates, then inline another.

use std::collections::BTreeSet;

use stencil_syntax::*;
use stencil_tracer::trace;

use crate::bindings::BindingsView;
use crate::inliner::Inliner;
use crate::resolver::Resolver;
use crate::template::{Holes, Template, TemplateError};
use crate::unifier::MatchOptions;
use crate::{ensure_concrete, ensure_not_cancelled, Error};

/// The result of a successful rewrite.
#[derive(Clone, Debug, PartialEq)]
pub struct Rewrite {
    pub tree: Tree,
    pub bindings: BindingsView,

    /// Classes that `tree` refers to by a name that must be imported.
    pub imports: BTreeSet<Path>,
}

/// Rewrite whatever matches one of the `before` templates
/// with the `after` template. Holes with the same name
/// in any of the templates are the same hole.
#[derive(Clone, Debug)]
pub struct RewriteRule {
    before: Vec<Template>,
    after: Template,
}

impl RewriteRule {
    pub fn new<'t>(
        before: impl IntoIterator<Item = &'t Tree>,
        after: &Tree,
    ) -> Result<Self, TemplateError> {
        let mut holes = Holes::new();
        let before = before
            .into_iter()
            .map(|t| Template::with_holes(t, &mut holes))
            .collect::<Result<Vec<_>, _>>()?;
        let after = Template::with_holes(after, &mut holes)?;
        if let Some(name) = after
            .holes()
            .iter()
            .find(|h| !before.iter().any(|b| b.holes().contains(*h)))
        {
            return Err(TemplateError::UnboundInAfter(name.clone()));
        }
        Ok(Self { before, after })
    }

    pub fn parse(before: &[&str], after: &str) -> Result<Self, Error> {
        let before = before
            .iter()
            .map(|s| parse_tree(s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(&before, &parse_tree(after)?)?)
    }

    pub fn before(&self) -> &[Template] {
        &self.before
    }

    pub fn after(&self) -> &Template {
        &self.after
    }

    /// Try each `before` template in order, and each of its matches
    /// in order, until the `after` template inlines. A candidate that
    /// refers to a class that can't be resolved is skipped; any other
    /// inlining error is returned.
    pub fn rewrite(
        &self,
        target: &Tree,
        resolver: &dyn Resolver,
        options: &MatchOptions,
    ) -> Result<Option<Rewrite>, Error> {
        ensure_concrete(target)?;
        for before in &self.before {
            ensure_not_cancelled(options)?;
            for u in before.matches(target, resolver, options) {
                let bindings = u.into_bindings();
                let nested = resolver.nested();
                let mut inliner = Inliner::new(bindings.clone(), nested.as_ref(), options.trace);
                match self.after.inline_with(&mut inliner) {
                    Ok(tree) => {
                        trace!(options.trace, Rewrite, "Rewrote {} as {}", target, tree);
                        return Ok(Some(Rewrite {
                            tree,
                            bindings: bindings.unmodifiable_view(),
                            imports: inliner.into_imports(),
                        }));
                    }
                    Err(e) if e.is_recoverable() => {
                        trace!(options.trace, Rewrite, "Skipping {} => {}: {}", before, self.after, e)
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }
        ensure_not_cancelled(options)?;
        Ok(None)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cancel::Cancellation;
    use crate::inliner::InlineError;
    use crate::resolver::{ImportPolicy, Imports};

    fn rewrite(rule: &RewriteRule, target: &str, resolver: &dyn Resolver) -> Option<Rewrite> {
        let target = parse_tree(target).expect("a target");
        rule.rewrite(&target, resolver, &MatchOptions::new())
            .expect("rewrites")
    }

    #[test]
    fn first_template_wins() {
        let rule = RewriteRule::parse(&["#a.size() == 0", "0 == #a.size()"], "#a.isEmpty()")
            .expect("a rule");
        let imports = Imports::default();
        for target in ["xs.size() == 0", "0 == xs.size()"] {
            let rewritten = rewrite(&rule, target, &imports).expect("a rewrite");
            assert_eq!(rewritten.tree.to_string(), "xs.isEmpty()");
            assert_eq!(rewritten.bindings.to_string(), "{#a = xs}");
            assert!(rewritten.imports.is_empty());
        }
        assert_eq!(rewrite(&rule, "xs.size() == 1", &imports), None);
    }

    #[test]
    fn imports() {
        let rule = RewriteRule::parse(
            &["#a == null ? #b == null : #a.equals(#b)"],
            "@{java.util.Objects}.equals(#a, #b)",
        )
        .expect("a rule");
        let target = "x == null ? y == null : x.equals(y)";

        let rewritten = rewrite(&rule, target, &Imports::default()).expect("a rewrite");
        assert_eq!(rewritten.tree.to_string(), "Objects.equals(x, y)");
        assert_eq!(
            rewritten.imports,
            BTreeSet::from([Path::from("java.util.Objects")])
        );

        let imported = Imports::new(ImportPolicy::ImportedOnly).with_import("java.util.Objects");
        let rewritten = rewrite(&rule, target, &imported).expect("a rewrite");
        assert_eq!(rewritten.tree.to_string(), "Objects.equals(x, y)");
        assert!(rewritten.imports.is_empty());

        let strict = Imports::new(ImportPolicy::ImportedOnly);
        assert_eq!(rewrite(&rule, target, &strict), None, "unresolvable, so skipped");
    }

    #[test]
    fn errors() {
        assert_eq!(
            RewriteRule::parse(&["f(#a)"], "g(#b)").map(|_| ()),
            Err(Error::Template(TemplateError::UnboundInAfter(sym!(b))))
        );
        assert!(matches!(
            RewriteRule::parse(&["f(#a)"], "g(#a"),
            Err(Error::Syntax(_))
        ));

        let rule = RewriteRule::parse(&["f(#a)", "g(#b)"], "h(#a, #b)").expect("a rule");
        let target = parse_tree("f(1)").expect("a target");
        assert_eq!(
            rule.rewrite(&target, &Imports::default(), &MatchOptions::new()),
            Err(Error::Inline(InlineError::Unbound(sym!(b))))
        );
    }

    #[test]
    fn templates_are_not_targets() {
        let rule = RewriteRule::parse(&["f(#a)"], "g(#a)").expect("a rule");
        let target = parse_tree("f(#b)").expect("a target");
        assert_eq!(
            rule.rewrite(&target, &Imports::default(), &MatchOptions::new()),
            Err(Error::NotConcrete(target.clone()))
        );
    }

    #[test]
    fn cancelled() {
        let rule = RewriteRule::parse(&["#a + #b"], "#b + #a").expect("a rule");
        let target = parse_tree("1 + 2").expect("a target");
        let cancellation = Cancellation::new();
        let options = MatchOptions::new().with_cancellation(cancellation.clone());
        let imports = Imports::default();
        assert!(rule.rewrite(&target, &imports, &options).is_ok());
        cancellation.cancel();
        assert_eq!(rule.rewrite(&target, &imports, &options), Err(Error::Cancelled));
    }
}
