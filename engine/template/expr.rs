use stencil_syntax::*;

use crate::bindings::Key;
use crate::choice::Choice;
use crate::inliner::{InlineError, Inliner};
use crate::unifier::Unifier;

use super::list::{inline_list, unify_list, unify_optional};
use super::{unify_hole, Pattern, UIdent};

/// Expression templates.
#[derive(Clone, Debug, PartialEq)]
pub enum UExpr {
    Lit(Lit),
    Name(Symbol),
    Class(Path),
    Field(Box<UExpr>, UIdent),
    Call {
        receiver: Option<Box<UExpr>>,
        method: UIdent,
        args: Vec<UExpr>,
    },
    New(Symbol, Vec<UExpr>),
    Index(Box<UExpr>, Box<UExpr>),
    Unary(UnaryOp, Box<UExpr>),
    Postfix(Box<UExpr>, PostfixOp),
    Binary(Box<UExpr>, BinOp, Box<UExpr>),
    Assign(Box<UExpr>, AssignOp, Box<UExpr>),
    Conditional(Box<UExpr>, Box<UExpr>, Box<UExpr>),
    Paren(Box<UExpr>),
    Hole(Key<Expr>),

    /// The rest of an argument list, each element
    /// of which must match the inner pattern.
    Capture(Key<Vec<Expr>>, Box<UExpr>),

    AnyOf(Vec<UExpr>),
}

impl Pattern for UExpr {
    type Target = Expr;

    fn unify<'a>(&'a self, target: &'a Expr, u: Unifier<'a>) -> Choice<'a, Unifier<'a>> {
        use UExpr::*;
        let c = u.cancellation().clone();
        match (self, target) {
            (Hole(key), e) => unify_hole(key, e, u),
            (AnyOf(alts), e) => {
                Choice::lazy(alts).flat_map(&c, move |alt| alt.unify(e, u.fork()))
            }
            (Capture(..), _) => Choice::none(),
            (Lit(l), Expr::Lit(t)) if l == t => Choice::of(u),
            (Name(s), Expr::Name(t)) if u.resolver().same_entity(s, t) => Choice::of(u),
            (Class(p), e) if u.resolver().denotes_class(e, p) => Choice::of(u),
            (Field(e, f), Expr::Field(te, tf)) => {
                e.unify(te, u).flat_map(&c, move |u| f.unify(tf, u))
            }
            (
                Call {
                    receiver,
                    method,
                    args,
                },
                Expr::Call {
                    receiver: tr,
                    method: tm,
                    args: ta,
                },
            ) => unify_optional(receiver.as_deref(), tr.as_deref(), u)
                .flat_map(&c, move |u| method.unify(tm, u))
                .flat_map(&c, move |u| unify_list(args, ta, u)),
            (New(class, args), Expr::New(tc, ta)) if class == tc => unify_list(args, ta, u),
            (Index(e, i), Expr::Index(te, ti)) => {
                e.unify(te, u).flat_map(&c, move |u| i.unify(ti, u))
            }
            (Unary(op, e), Expr::Unary(top, te)) if op == top => e.unify(te, u),
            (Postfix(e, op), Expr::Postfix(te, top)) if op == top => e.unify(te, u),
            (Binary(l, op, r), Expr::Binary(tl, top, tr)) if op == top => {
                l.unify(tl, u).flat_map(&c, move |u| r.unify(tr, u))
            }
            (Assign(l, op, r), Expr::Assign(tl, top, tr)) if op == top => {
                l.unify(tl, u).flat_map(&c, move |u| r.unify(tr, u))
            }
            (Conditional(i, t, e), Expr::Conditional(ti, tt, te)) => i
                .unify(ti, u)
                .flat_map(&c, move |u| t.unify(tt, u))
                .flat_map(&c, move |u| e.unify(te, u)),
            (Paren(e), Expr::Paren(te)) => e.unify(te, u),
            _ => Choice::none(),
        }
    }

    fn inline(&self, inliner: &mut Inliner) -> Result<Expr, InlineError> {
        use Context::*;
        use UExpr::*;
        Ok(match self {
            Lit(l) => Expr::Lit(l.clone()),
            Name(s) => Expr::Name(s.clone()),
            Class(p) => inliner.class(p)?,
            Field(e, f) => Expr::field(operand(e, inliner, Selector)?, f.inline(inliner)?),
            Call {
                receiver,
                method,
                args,
            } => Expr::call(
                receiver
                    .as_deref()
                    .map(|r| operand(r, inliner, Selector))
                    .transpose()?,
                method.inline(inliner)?,
                inline_list(args, inliner)?,
            ),
            New(class, args) => Expr::New(class.clone(), inline_list(args, inliner)?),
            Index(e, i) => Expr::index(operand(e, inliner, Selector)?, i.inline(inliner)?),
            Unary(op, e) => Expr::unary(*op, operand(e, inliner, Prefix)?),
            Postfix(e, op) => Expr::postfix(operand(e, inliner, Selector)?, *op),
            Binary(l, op, r) => Expr::binary(
                operand(l, inliner, Left(*op))?,
                *op,
                operand(r, inliner, Right(*op))?,
            ),
            Assign(l, op, r) => {
                Expr::assign(operand(l, inliner, Assignee)?, *op, r.inline(inliner)?)
            }
            Conditional(i, t, e) => Expr::conditional(
                operand(i, inliner, Condition)?,
                t.inline(inliner)?,
                operand(e, inliner, Otherwise)?,
            ),
            Paren(e) => Expr::paren(e.inline(inliner)?),
            Hole(key) => inliner.get(key)?,
            Capture(key, _) => return Err(InlineError::MisplacedCapture(key.name().clone())),
            AnyOf(alts) => inline_any(alts, inliner)?,
        })
    }

    fn capture(&self) -> Option<(&Key<Vec<Expr>>, &Self)> {
        match self {
            Self::Capture(key, element) => Some((key, element.as_ref())),
            _ => None,
        }
    }
}

/// The first alternative that can be inlined.
fn inline_any(alts: &[UExpr], inliner: &mut Inliner) -> Result<Expr, InlineError> {
    let mut error = InlineError::NoAlternatives;
    for alt in alts {
        match inliner.attempt(|inliner| alt.inline(inliner)) {
            Ok(e) => return Ok(e),
            Err(e) => error = e,
        }
    }
    Err(error)
}

/// Where an operand lands in its parent expression.
#[derive(Clone, Copy, Debug)]
enum Context {
    /// Before `.`, `[`, or a postfix operator.
    Selector,
    Prefix,
    Left(BinOp),
    Right(BinOp),
    Condition,

    /// The left side of an assignment.
    Assignee,

    /// The last branch of a conditional.
    Otherwise,
}

/// Does `e` read back as itself in `context`, without parentheses?
fn fits(e: &Expr, context: Context) -> bool {
    match (e, context) {
        (Expr::Assign(..), _) => false,
        (_, Context::Assignee | Context::Otherwise) => true,
        (Expr::Conditional(..), _) => false,
        (Expr::Binary(_, inner, _), Context::Left(outer)) => !outer.binds_tighter_than(inner),
        (Expr::Binary(_, inner, _), Context::Right(outer)) => inner.binds_tighter_than(&outer),
        (Expr::Binary(..), Context::Condition) => true,
        (Expr::Binary(..), _) => false,
        (Expr::Unary(..), Context::Selector | Context::Prefix) => false,
        _ => true,
    }
}

/// Inline an operand, parenthesizing a substituted value
/// (a hole's, or one of its alternatives') if it would
/// otherwise re-associate.
fn operand(template: &UExpr, inliner: &mut Inliner, context: Context) -> Result<Expr, InlineError> {
    let e = template.inline(inliner)?;
    Ok(match template {
        UExpr::Hole(_) | UExpr::AnyOf(_) if !fits(&e, context) => Expr::paren(e),
        _ => e,
    })
}

#[cfg(test)]
mod test {
    use stencil_tracer::Trace;

    use super::*;
    use crate::bindings::Bindings;
    use crate::resolver::Imports;
    use crate::template::{Holes, Template};

    /// Inline `template` with each hole bound to the parse of a string.
    fn inline(template: &str, values: &[(&str, &str)]) -> String {
        let mut holes = Holes::new();
        let mut bindings = Bindings::new();
        for (name, value) in values {
            let key = holes.key::<Expr>(&Symbol::from(*name)).expect("expression hole");
            bindings.put(&key, parse_expr(value).expect("an expression"));
        }
        let template = Template::with_holes(&parse_tree(template).expect("a template"), &mut holes)
            .expect("compiles");
        let imports = Imports::default();
        let mut inliner = Inliner::new(bindings, &imports, Trace::none());
        template
            .inline_with(&mut inliner)
            .expect("inlines")
            .to_string()
    }

    #[test]
    fn parenthesize() {
        assert_eq!(inline("#a * 2", &[("a", "x + 1")]), "(x + 1) * 2");
        assert_eq!(inline("2 * #a", &[("a", "x + 1")]), "2 * (x + 1)");
        assert_eq!(inline("#a + 2", &[("a", "x * 1")]), "x * 1 + 2");
        assert_eq!(inline("#a - 2", &[("a", "x - 1")]), "x - 1 - 2");
        assert_eq!(inline("2 - #a", &[("a", "x - 1")]), "2 - (x - 1)");
        assert_eq!(inline("#a.length", &[("a", "x + y")]), "(x + y).length");
        assert_eq!(inline("#a.f()", &[("a", "-x")]), "(-x).f()");
        assert_eq!(inline("#a++", &[("a", "xs[0]")]), "xs[0]++");
        assert_eq!(inline("!#a", &[("a", "x == y")]), "!(x == y)");
        assert_eq!(inline("-#a", &[("a", "-x")]), "-(-x)");
        assert_eq!(inline("#c ? 1 : 2", &[("c", "x < y")]), "x < y ? 1 : 2");
        assert_eq!(inline("#c ? 1 : 2", &[("c", "x = y")]), "(x = y) ? 1 : 2");
        assert_eq!(inline("f(#a)", &[("a", "x = y")]), "f(x = y)");
        assert_eq!(inline("#a = #b", &[("a", "x"), ("b", "y = z")]), "x = y = z");
        assert_eq!(inline("#a = 1", &[("a", "x = y")]), "(x = y) = 1");
        assert_eq!(inline("#c ? #t : #e", &[("c", "p"), ("t", "x = y"), ("e", "b")]), "p ? x = y : b");
        assert_eq!(inline("#c ? #t : #e", &[("c", "p"), ("t", "a"), ("e", "x = y")]), "p ? a : (x = y)");
        assert_eq!(inline("#c ? #t : #e", &[("c", "p"), ("t", "a"), ("e", "q ? b : c")]), "p ? a : q ? b : c");
        assert_eq!(inline("#any(#a, #b) * 2", &[("a", "x + 1")]), "(x + 1) * 2");
    }

    #[test]
    fn parenthesized_reparses() {
        let s = inline("#a * #b", &[("a", "x + 1"), ("b", "y - 1")]);
        let e = parse_expr(&s).expect("reparses");
        assert!(matches!(e, Expr::Binary(_, BinOp::Mul, _)));

        let s = inline("#c ? #t : #e", &[("c", "p"), ("t", "a"), ("e", "x = y")]);
        let e = parse_expr(&s).expect("reparses");
        assert!(matches!(e, Expr::Conditional(..)));

        let s = inline("#any(#a, #b) * 2", &[("a", "x + 1")]);
        let e = parse_expr(&s).expect("reparses");
        assert!(matches!(e, Expr::Binary(_, BinOp::Mul, _)));
    }

    #[test]
    fn any_of() {
        assert_eq!(inline("#any(#a, #b)", &[("b", "y")]), "y");
        assert_eq!(inline("#any(#a, #b)", &[("a", "x"), ("b", "y")]), "x");
    }

    #[test]
    fn failed_alternatives_import_nothing() {
        let mut holes = Holes::new();
        let y = holes.key::<Expr>(&sym!(y)).expect("fresh");
        let source = parse_tree("#any(@{java.util.Objects}.hash(#missing), g(#y))").expect("a template");
        let template = Template::with_holes(&source, &mut holes).expect("compiles");
        let mut bindings = Bindings::new();
        bindings.put(&y, lit!(1));
        let imports = Imports::default();
        let mut inliner = Inliner::new(bindings, &imports, Trace::none());
        assert_eq!(
            template.inline_with(&mut inliner).map(|t| t.to_string()),
            Ok(String::from("g(1)"))
        );
        assert!(inliner.imports().is_empty());
    }
}
