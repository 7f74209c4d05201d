use stencil_syntax::*;

use crate::bindings::Key;
use crate::choice::Choice;
use crate::inliner::{InlineError, Inliner};
use crate::unifier::Unifier;

use super::list::{inline_list, inline_optional, unify_list, unify_optional, unify_zip};
use super::{unify_hole, Pattern, UExpr, UIdent};

/// A local variable declaration template.
#[derive(Clone, Debug, PartialEq)]
pub struct ULocal {
    pub ty: Symbol,
    pub name: UIdent,
    pub init: Option<UExpr>,
}

impl Pattern for ULocal {
    type Target = Local;

    fn unify<'a>(&'a self, target: &'a Local, u: Unifier<'a>) -> Choice<'a, Unifier<'a>> {
        if self.ty != target.ty {
            return Choice::none();
        }
        let c = u.cancellation().clone();
        self.name
            .unify(&target.name, u)
            .flat_map(&c, move |u| {
                unify_optional(self.init.as_ref(), target.init.as_ref(), u)
            })
    }

    fn inline(&self, inliner: &mut Inliner) -> Result<Local, InlineError> {
        Ok(Local::new(
            self.ty.clone(),
            self.name.inline(inliner)?,
            inline_optional(self.init.as_ref(), inliner)?,
        ))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct UCatch {
    pub ty: Symbol,
    pub name: UIdent,
    pub body: Vec<UStmt>,
}

impl Pattern for UCatch {
    type Target = Catch;

    fn unify<'a>(&'a self, target: &'a Catch, u: Unifier<'a>) -> Choice<'a, Unifier<'a>> {
        if self.ty != target.ty {
            return Choice::none();
        }
        let c = u.cancellation().clone();
        self.name
            .unify(&target.name, u)
            .flat_map(&c, move |u| unify_list(&self.body, &target.body.stmts, u))
    }

    fn inline(&self, inliner: &mut Inliner) -> Result<Catch, InlineError> {
        Ok(Catch {
            ty: self.ty.clone(),
            name: self.name.inline(inliner)?,
            body: Block::new(inline_list(&self.body, inliner)?),
        })
    }
}

/// Statement templates.
#[derive(Clone, Debug, PartialEq)]
pub enum UStmt {
    Empty,
    Expr(UExpr),
    Local(ULocal),
    Block(Vec<UStmt>),
    If {
        cond: UExpr,
        then: Box<UStmt>,
        otherwise: Option<Box<UStmt>>,
    },
    While {
        cond: UExpr,
        body: Box<UStmt>,
    },
    DoWhile {
        body: Box<UStmt>,
        cond: UExpr,
    },
    For {
        init: Vec<UStmt>,
        cond: Option<UExpr>,
        update: Vec<UExpr>,
        body: Box<UStmt>,
    },
    ForEach {
        ty: Symbol,
        name: UIdent,
        iterable: UExpr,
        body: Box<UStmt>,
    },
    Break(Option<UIdent>),
    Continue(Option<UIdent>),
    Return(Option<UExpr>),
    Throw(UExpr),
    Labeled(UIdent, Box<UStmt>),
    Try {
        body: Vec<UStmt>,
        catches: Vec<UCatch>,
        finally: Option<Vec<UStmt>>,
    },
    Hole(Key<Stmt>),

    /// The rest of a block or `for` initializer.
    Capture(Key<Vec<Stmt>>, Box<UStmt>),
}

impl Pattern for UStmt {
    type Target = Stmt;

    fn unify<'a>(&'a self, target: &'a Stmt, u: Unifier<'a>) -> Choice<'a, Unifier<'a>> {
        use UStmt::*;
        let c = u.cancellation().clone();
        match (self, target) {
            (Hole(key), s) => unify_hole(key, s, u),
            (Capture(..), _) => Choice::none(),
            (Empty, Stmt::Empty) => Choice::of(u),
            (Expr(e), Stmt::Expr(te)) => e.unify(te, u),
            (Local(l), Stmt::Local(tl)) => l.unify(tl, u),
            (Block(ss), Stmt::Block(tb)) => unify_list(ss, &tb.stmts, u),
            (
                If {
                    cond,
                    then,
                    otherwise,
                },
                Stmt::If {
                    cond: tc,
                    then: tt,
                    otherwise: to,
                },
            ) => cond
                .unify(tc, u)
                .flat_map(&c, move |u| then.unify(tt, u))
                .flat_map(&c, move |u| {
                    unify_optional(otherwise.as_deref(), to.as_deref(), u)
                }),
            (While { cond, body }, Stmt::While { cond: tc, body: tb }) => cond
                .unify(tc, u)
                .flat_map(&c, move |u| body.unify(tb, u)),
            (DoWhile { body, cond }, Stmt::DoWhile { body: tb, cond: tc }) => body
                .unify(tb, u)
                .flat_map(&c, move |u| cond.unify(tc, u)),
            (
                For {
                    init,
                    cond,
                    update,
                    body,
                },
                Stmt::For {
                    init: ti,
                    cond: tc,
                    update: tu,
                    body: tb,
                },
            ) => unify_list(init, ti, u)
                .flat_map(&c, move |u| unify_optional(cond.as_ref(), tc.as_ref(), u))
                .flat_map(&c, move |u| unify_list(update, tu, u))
                .flat_map(&c, move |u| body.unify(tb, u)),
            (
                ForEach {
                    ty,
                    name,
                    iterable,
                    body,
                },
                Stmt::ForEach {
                    ty: tt,
                    name: tn,
                    iterable: ti,
                    body: tb,
                },
            ) if ty == tt => name
                .unify(tn, u)
                .flat_map(&c, move |u| iterable.unify(ti, u))
                .flat_map(&c, move |u| body.unify(tb, u)),
            (Break(l), Stmt::Break(tl)) | (Continue(l), Stmt::Continue(tl)) => {
                unify_optional(l.as_ref(), tl.as_ref(), u)
            }
            (Return(e), Stmt::Return(te)) => unify_optional(e.as_ref(), te.as_ref(), u),
            (Throw(e), Stmt::Throw(te)) => e.unify(te, u),
            (Labeled(l, s), Stmt::Labeled(tl, ts)) => {
                l.unify(tl, u).flat_map(&c, move |u| s.unify(ts, u))
            }
            (
                Try {
                    body,
                    catches,
                    finally,
                },
                Stmt::Try {
                    body: tb,
                    catches: tc,
                    finally: tf,
                },
            ) => unify_list(body, &tb.stmts, u)
                .flat_map(&c, move |u| unify_zip(catches, tc, u))
                .flat_map(&c, move |u| match (finally, tf) {
                    (None, None) => Choice::of(u),
                    (Some(f), Some(tf)) => unify_list(f, &tf.stmts, u),
                    _ => Choice::none(),
                }),
            _ => Choice::none(),
        }
    }

    fn inline(&self, inliner: &mut Inliner) -> Result<Stmt, InlineError> {
        use UStmt::*;
        Ok(match self {
            Hole(key) => inliner.get(key)?,
            Capture(key, _) => return Err(InlineError::MisplacedCapture(key.name().clone())),
            Empty => Stmt::Empty,
            Expr(e) => Stmt::Expr(e.inline(inliner)?),
            Local(l) => Stmt::Local(l.inline(inliner)?),
            Block(ss) => Stmt::block(inline_list(ss, inliner)?),
            If {
                cond,
                then,
                otherwise,
            } => Stmt::r#if(
                cond.inline(inliner)?,
                then.inline(inliner)?,
                inline_optional(otherwise.as_deref(), inliner)?,
            ),
            While { cond, body } => Stmt::r#while(cond.inline(inliner)?, body.inline(inliner)?),
            DoWhile { body, cond } => {
                Stmt::do_while(body.inline(inliner)?, cond.inline(inliner)?)
            }
            For {
                init,
                cond,
                update,
                body,
            } => Stmt::r#for(
                inline_list(init, inliner)?,
                inline_optional(cond.as_ref(), inliner)?,
                inline_list(update, inliner)?,
                body.inline(inliner)?,
            ),
            ForEach {
                ty,
                name,
                iterable,
                body,
            } => Stmt::for_each(
                ty.clone(),
                name.inline(inliner)?,
                iterable.inline(inliner)?,
                body.inline(inliner)?,
            ),
            Break(l) => Stmt::Break(inline_optional(l.as_ref(), inliner)?),
            Continue(l) => Stmt::Continue(inline_optional(l.as_ref(), inliner)?),
            Return(e) => Stmt::Return(inline_optional(e.as_ref(), inliner)?),
            Throw(e) => Stmt::Throw(e.inline(inliner)?),
            Labeled(l, s) => Stmt::labeled(l.inline(inliner)?, s.inline(inliner)?),
            Try {
                body,
                catches,
                finally,
            } => Stmt::Try {
                body: stencil_syntax::Block::new(inline_list(body, inliner)?),
                catches: catches
                    .iter()
                    .map(|c| c.inline(inliner))
                    .collect::<Result<_, _>>()?,
                finally: finally
                    .as_ref()
                    .map(|f| inline_list(f, inliner).map(stencil_syntax::Block::new))
                    .transpose()?,
            },
        })
    }

    fn capture(&self) -> Option<(&Key<Vec<Stmt>>, &Self)> {
        match self {
            Self::Capture(key, element) => Some((key, element.as_ref())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::resolver::Imports;
    use crate::template::Template;
    use crate::unifier::MatchOptions;

    fn count(template: &str, target: &str) -> usize {
        let template = Template::parse(template).expect("compiles");
        let target = parse_tree(target).expect("parses");
        template
            .unify(&target, &Imports::default(), &MatchOptions::new())
            .expect("not cancelled")
            .len()
    }

    #[test]
    fn blocks() {
        assert_eq!(count("{ #s; }", "{ f(); }"), 1);
        assert_eq!(count("{ #s; }", "{ f(); g(); }"), 0);
        assert_eq!(count("{ #ss... }", "{}"), 1);
        assert_eq!(count("{ #first; #ss... }", "{}"), 0);
        assert_eq!(count("{ #first; #ss... }", "{ f(); g(); h(); }"), 1);
        assert_eq!(count("{ f(); #ss... }", "{ g(); h(); }"), 0);
    }

    #[test]
    fn loops() {
        let template = "for (#init; #cond; #update) #body";
        assert_eq!(count(template, "for (i = 0; i < n; i++) sum += i;"), 1);
        assert_eq!(count(template, "for (int i = 0; i < n; i++) {}"), 1);
        assert_eq!(count(template, "for (i = 0, j = 0; i < n; i++) {}"), 0);
        assert_eq!(count(template, "for (;;) {}"), 0);
        assert_eq!(count("for (#init...; ; ) #body", "for (;;) {}"), 1);
        assert_eq!(count("for (int #i = 0; #c; #u) #b", "for (int k = 0; k < 3; k++) f(k);"), 1);
        assert_eq!(count("for (int #i = 0; #c; #u) #b", "for (long k = 0; k < 3; k++) f(k);"), 0);
        assert_eq!(count("while (#c) #body", "while (true) { f(); }"), 1);
        assert_eq!(count("while (#c) #body", "do f(); while (true);"), 0);
    }

    #[test]
    fn try_catch() {
        let template = "try { #body... } catch (Exception #e) { #handler... }";
        assert_eq!(count(template, "try { f(); } catch (Exception e) {}"), 1);
        assert_eq!(count(template, "try { f(); } catch (Error e) {}"), 0);
        assert_eq!(count(template, "try { f(); } catch (Exception e) {} finally {}"), 0);
        assert_eq!(
            count(template, "try {} catch (Exception e) {} catch (Exception f) {}"),
            0,
            "catch clauses don't capture"
        );
    }
}
