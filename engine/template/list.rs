//! Lists, optional children, and list captures.

use stencil_tracer::trace;

use crate::bindings::{Bindable, Key};
use crate::choice::Choice;
use crate::inliner::{InlineError, Inliner};
use crate::unifier::Unifier;

use super::Pattern;

/// An optional child matches only another that is
/// present or absent alike.
pub(super) fn unify_optional<'a, P: Pattern>(
    template: Option<&'a P>,
    target: Option<&'a P::Target>,
    u: Unifier<'a>,
) -> Choice<'a, Unifier<'a>> {
    match (template, target) {
        (None, None) => Choice::of(u),
        (Some(p), Some(t)) => p.unify(t, u),
        _ => Choice::none(),
    }
}

/// Pairwise, for lists that may not capture.
pub(super) fn unify_zip<'a, P: Pattern>(
    template: &'a [P],
    target: &'a [P::Target],
    u: Unifier<'a>,
) -> Choice<'a, Unifier<'a>> {
    if template.len() != target.len() {
        return Choice::none();
    }
    let c = u.cancellation().clone();
    template
        .iter()
        .zip(target)
        .fold(Choice::of(u), |choice, (p, t)| {
            choice.flat_map(&c, move |u| p.unify(t, u))
        })
}

/// Match a list of patterns against a list of targets. A capture
/// as the last pattern matches whatever remains of the targets,
/// provided every one of them matches its element pattern.
pub(super) fn unify_list<'a, P>(
    template: &'a [P],
    target: &'a [P::Target],
    u: Unifier<'a>,
) -> Choice<'a, Unifier<'a>>
where
    P: Pattern,
    Vec<P::Target>: Bindable,
{
    match template.split_first() {
        None if target.is_empty() => Choice::of(u),
        None => Choice::none(),
        Some((first, rest)) => match first.capture() {
            Some((key, element)) if rest.is_empty() => capture(key, element, target, u),
            Some(_) => Choice::none(),
            None => match target.split_first() {
                None => Choice::none(),
                Some((head, tail)) => {
                    let c = u.cancellation().clone();
                    first
                        .unify(head, u)
                        .flat_map(&c, move |u| unify_list(rest, tail, u))
                }
            },
        },
    }
}

fn capture<'a, P>(
    key: &'a Key<Vec<P::Target>>,
    element: &'a P,
    target: &'a [P::Target],
    mut u: Unifier<'a>,
) -> Choice<'a, Unifier<'a>>
where
    P: Pattern,
    Vec<P::Target>: Bindable,
{
    if !target
        .iter()
        .all(|t| element.unify(t, u.fork()).first().is_some())
    {
        return Choice::none();
    }
    let captured = target.to_vec();
    match u.bindings().get(key).map(|bound| *bound == captured) {
        Some(true) => Choice::of(u),
        Some(false) => Choice::none(),
        None => {
            trace!(
                u.trace(),
                Unify,
                "Capturing {} = {}",
                key,
                captured.clone().into_value()
            );
            u.bindings_mut().put(key, captured);
            Choice::of(u)
        }
    }
}

/// Inline a list, splicing in the values of any captures.
pub(super) fn inline_list<P>(template: &[P], inliner: &mut Inliner) -> Result<Vec<P::Target>, InlineError>
where
    P: Pattern,
    Vec<P::Target>: Bindable,
{
    let mut items = Vec::with_capacity(template.len());
    for p in template {
        match p.capture() {
            Some((key, _)) => items.extend(inliner.get(key)?),
            None => items.push(p.inline(inliner)?),
        }
    }
    Ok(items)
}

pub(super) fn inline_optional<P: Pattern>(
    template: Option<&P>,
    inliner: &mut Inliner,
) -> Result<Option<P::Target>, InlineError> {
    template.map(|p| p.inline(inliner)).transpose()
}

#[cfg(test)]
mod test {
    use stencil_syntax::*;

    use super::*;
    use crate::bindings::Bindings;
    use crate::resolver::Imports;
    use crate::template::UExpr;
    use crate::unifier::MatchOptions;

    fn hole(name: &str) -> UExpr {
        UExpr::Hole(Key::new(name))
    }

    fn rest(key: &Key<Vec<Expr>>) -> UExpr {
        UExpr::Capture(key.clone(), Box::new(hole("element")))
    }

    fn names(n: usize) -> Vec<Expr> {
        (0..n).map(|i| Expr::name(&format!("x{i}"))).collect()
    }

    #[test]
    fn lengths() {
        let imports = Imports::default();
        let options = MatchOptions::new();
        let xs = Key::<Vec<Expr>>::new("xs");
        for (template, target, expected) in [
            (vec![], 0, 1),
            (vec![], 1, 0),
            (vec![hole("a")], 0, 0),
            (vec![hole("a")], 1, 1),
            (vec![hole("a")], 2, 0),
            (vec![rest(&xs)], 0, 1),
            (vec![rest(&xs)], 3, 1),
            (vec![hole("a"), rest(&xs)], 0, 0),
            (vec![hole("a"), rest(&xs)], 1, 1),
            (vec![hole("a"), rest(&xs)], 4, 1),
            (vec![rest(&xs), hole("a")], 2, 0),
        ] {
            let target = names(target);
            let u = Unifier::new(&imports, &options);
            let found = unify_list(&template, &target, u).into_iter().count();
            assert_eq!(found, expected, "{template:?} against {target:?}");
        }
    }

    #[test]
    fn captures() {
        let imports = Imports::default();
        let options = MatchOptions::new();
        let a = Key::<Expr>::new("a");
        let xs = Key::<Vec<Expr>>::new("xs");
        let template = [UExpr::Hole(a.clone()), rest(&xs)];
        let target = names(3);
        let u = unify_list(&template, &target, Unifier::new(&imports, &options))
            .first()
            .expect("a match");
        assert_eq!(u.bindings().get(&a), Some(&name!(x0)));
        assert_eq!(u.bindings().get(&xs), Some(&names(3)[1..].to_vec()));
        assert_eq!(u.bindings().len(), 2, "element bindings are discarded");

        let mut inliner = crate::inliner::Inliner::new(
            u.into_bindings(),
            &imports,
            stencil_tracer::Trace::none(),
        );
        assert_eq!(inline_list(&template, &mut inliner), Ok(target));
    }

    #[test]
    fn bound_capture() {
        let imports = Imports::default();
        let options = MatchOptions::new();
        let xs = Key::<Vec<Expr>>::new("xs");
        let mut bindings = Bindings::new();
        bindings.put(&xs, names(2));
        let template = [rest(&xs)];
        let u = || Unifier::with_bindings(bindings.clone(), &imports, &options);
        assert!(unify_list(&template, &names(2), u()).first().is_some());
        assert!(unify_list(&template, &names(3), u()).first().is_none());
    }

    #[test]
    fn optional() {
        let imports = Imports::default();
        let options = MatchOptions::new();
        let u = || Unifier::new(&imports, &options);
        let a = hole("a");
        assert!(unify_optional::<UExpr>(None, None, u()).first().is_some());
        assert!(unify_optional(Some(&a), None, u()).first().is_none());
        assert!(unify_optional::<UExpr>(None, Some(&name!(x)), u()).first().is_none());
        assert!(unify_optional(Some(&a), Some(&name!(x)), u()).first().is_some());
    }
}
