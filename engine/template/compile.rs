//! Compile surface trees into templates.

use std::collections::BTreeSet;

use stencil_syntax::*;

use crate::bindings::{Bindable, Key};

use super::{Holes, TemplateError, UCatch, UExpr, UIdent, ULocal, UStmt, UTree};

type Result<T> = std::result::Result<T, TemplateError>;

pub(super) struct Compiler<'h> {
    holes: &'h mut Holes,
    used: BTreeSet<Symbol>,
}

impl<'h> Compiler<'h> {
    pub(super) fn new(holes: &'h mut Holes) -> Self {
        Self {
            holes,
            used: BTreeSet::new(),
        }
    }

    /// The names of all of the holes compiled so far.
    pub(super) fn into_used(self) -> BTreeSet<Symbol> {
        self.used
    }

    fn key<V: Bindable>(&mut self, name: &Symbol) -> Result<Key<V>> {
        self.used.insert(name.clone());
        self.holes.key(name)
    }

    pub(super) fn tree(&mut self, tree: &Tree) -> Result<UTree> {
        Ok(match tree {
            Tree::Expr(e) => UTree::Expr(self.expr(e)?),
            Tree::Stmt(s) => UTree::Stmt(self.stmt(s)?),
        })
    }

    fn ident(&mut self, i: &Ident) -> Result<UIdent> {
        Ok(match i {
            Ident::Name(s) => UIdent::Name(s.clone()),
            Ident::Meta(s) => UIdent::Hole(self.key(s)?),
        })
    }

    fn boxed(&mut self, e: &Expr) -> Result<Box<UExpr>> {
        self.expr(e).map(Box::new)
    }

    fn expr(&mut self, e: &Expr) -> Result<UExpr> {
        Ok(match e {
            Expr::Lit(l) => UExpr::Lit(l.clone()),
            Expr::Name(s) => UExpr::Name(s.clone()),
            Expr::Class(p) => UExpr::Class(p.clone()),
            Expr::Field(e, f) => UExpr::Field(self.boxed(e)?, self.ident(f)?),
            Expr::Call {
                receiver,
                method,
                args,
            } => UExpr::Call {
                receiver: receiver.as_deref().map(|r| self.boxed(r)).transpose()?,
                method: self.ident(method)?,
                args: self.exprs(args)?,
            },
            Expr::New(class, args) => UExpr::New(class.clone(), self.exprs(args)?),
            Expr::Index(e, i) => UExpr::Index(self.boxed(e)?, self.boxed(i)?),
            Expr::Unary(op, e) => UExpr::Unary(*op, self.boxed(e)?),
            Expr::Postfix(e, op) => UExpr::Postfix(self.boxed(e)?, *op),
            Expr::Binary(l, op, r) => UExpr::Binary(self.boxed(l)?, *op, self.boxed(r)?),
            Expr::Assign(l, op, r) => UExpr::Assign(self.boxed(l)?, *op, self.boxed(r)?),
            Expr::Conditional(c, t, e) => {
                UExpr::Conditional(self.boxed(c)?, self.boxed(t)?, self.boxed(e)?)
            }
            Expr::Paren(e) => UExpr::Paren(self.boxed(e)?),
            Expr::Meta(s) => UExpr::Hole(self.key(s)?),
            Expr::Rest(s) => return Err(TemplateError::MisplacedCapture(s.clone())),
            Expr::AnyOf(alts) => UExpr::AnyOf(
                alts.iter()
                    .map(|a| self.expr(a))
                    .collect::<Result<_>>()?,
            ),
        })
    }

    /// A list of expressions, the last of which may capture the rest.
    fn exprs(&mut self, es: &[Expr]) -> Result<Vec<UExpr>> {
        es.iter()
            .map(|e| match e {
                Expr::Rest(s) => Ok(UExpr::Capture(
                    self.key(s)?,
                    Box::new(UExpr::Hole(Key::new(s.clone()))),
                )),
                e => self.expr(e),
            })
            .collect()
    }

    fn boxed_stmt(&mut self, s: &Stmt) -> Result<Box<UStmt>> {
        self.stmt(s).map(Box::new)
    }

    fn local(&mut self, l: &Local) -> Result<ULocal> {
        Ok(ULocal {
            ty: l.ty.clone(),
            name: self.ident(&l.name)?,
            init: l.init.as_ref().map(|e| self.expr(e)).transpose()?,
        })
    }

    fn catch(&mut self, c: &Catch) -> Result<UCatch> {
        Ok(UCatch {
            ty: c.ty.clone(),
            name: self.ident(&c.name)?,
            body: self.stmts(&c.body.stmts)?,
        })
    }

    fn stmt(&mut self, s: &Stmt) -> Result<UStmt> {
        Ok(match s {
            Stmt::Empty => UStmt::Empty,
            Stmt::Expr(e) => UStmt::Expr(self.expr(e)?),
            Stmt::Local(l) => UStmt::Local(self.local(l)?),
            Stmt::Block(b) => UStmt::Block(self.stmts(&b.stmts)?),
            Stmt::If {
                cond,
                then,
                otherwise,
            } => UStmt::If {
                cond: self.expr(cond)?,
                then: self.boxed_stmt(then)?,
                otherwise: otherwise
                    .as_deref()
                    .map(|s| self.boxed_stmt(s))
                    .transpose()?,
            },
            Stmt::While { cond, body } => UStmt::While {
                cond: self.expr(cond)?,
                body: self.boxed_stmt(body)?,
            },
            Stmt::DoWhile { body, cond } => UStmt::DoWhile {
                body: self.boxed_stmt(body)?,
                cond: self.expr(cond)?,
            },
            Stmt::For {
                init,
                cond,
                update,
                body,
            } => UStmt::For {
                init: self.stmts(init)?,
                cond: cond.as_ref().map(|c| self.expr(c)).transpose()?,
                update: self.exprs(update)?,
                body: self.boxed_stmt(body)?,
            },
            Stmt::ForEach {
                ty,
                name,
                iterable,
                body,
            } => UStmt::ForEach {
                ty: ty.clone(),
                name: self.ident(name)?,
                iterable: self.expr(iterable)?,
                body: self.boxed_stmt(body)?,
            },
            Stmt::Break(l) => UStmt::Break(l.as_ref().map(|l| self.ident(l)).transpose()?),
            Stmt::Continue(l) => {
                UStmt::Continue(l.as_ref().map(|l| self.ident(l)).transpose()?)
            }
            Stmt::Return(e) => UStmt::Return(e.as_ref().map(|e| self.expr(e)).transpose()?),
            Stmt::Throw(e) => UStmt::Throw(self.expr(e)?),
            Stmt::Labeled(l, s) => UStmt::Labeled(self.ident(l)?, self.boxed_stmt(s)?),
            Stmt::Try {
                body,
                catches,
                finally,
            } => UStmt::Try {
                body: self.stmts(&body.stmts)?,
                catches: catches
                    .iter()
                    .map(|c| self.catch(c))
                    .collect::<Result<_>>()?,
                finally: finally
                    .as_ref()
                    .map(|f| self.stmts(&f.stmts))
                    .transpose()?,
            },
            Stmt::Meta(s) => UStmt::Hole(self.key(s)?),
            Stmt::Rest(s) => return Err(TemplateError::MisplacedCapture(s.clone())),
        })
    }

    /// A list of statements, the last of which may capture the rest.
    fn stmts(&mut self, ss: &[Stmt]) -> Result<Vec<UStmt>> {
        ss.iter()
            .map(|s| match s {
                Stmt::Rest(name) => Ok(UStmt::Capture(
                    self.key(name)?,
                    Box::new(UStmt::Hole(Key::new(name.clone()))),
                )),
                s => self.stmt(s),
            })
            .collect()
    }
}
