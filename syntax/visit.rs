//! Walk a syntax tree, i.e., visit every sub-element.

use super::*;

/// Walk a shared borrow of a syntactic element.
///
/// We follow [the standard Rust visitor
/// pattern](https://rust-unofficial.github.io/patterns/patterns/behavioural/visitor.html).
/// The methods in this trait are hooks to be overridden.
/// By default, they all call out to walker functions that
/// in turn call back into the visitor to continue the walk.
pub trait Visit<'a> {
    fn visit_literal(&mut self, _l: &'a Lit) {}
    fn visit_name(&mut self, _s: &'a Symbol) {}
    fn visit_class(&mut self, _p: &'a Path) {}
    fn visit_hole(&mut self, _s: &'a Symbol, _kind: HoleKind) {}
    fn visit_tree(&mut self, t: &'a Tree) {
        visit_tree(self, t)
    }
    fn visit_expr(&mut self, e: &'a Expr) {
        visit_expr(self, e)
    }
    fn visit_exprs(&mut self, es: &'a [Expr]) {
        visit_exprs(self, es)
    }
    fn visit_any_of(&mut self, alts: &'a [Expr]) {
        visit_any_of(self, alts)
    }
    fn visit_stmt(&mut self, s: &'a Stmt) {
        visit_stmt(self, s)
    }
    fn visit_stmts(&mut self, ss: &'a [Stmt]) {
        visit_stmts(self, ss)
    }
    fn visit_block(&mut self, b: &'a Block) {
        visit_block(self, b)
    }
    fn visit_catch(&mut self, c: &'a Catch) {
        visit_catch(self, c)
    }
    fn visit_local(&mut self, l: &'a Local) {
        visit_local(self, l)
    }
    fn visit_ident(&mut self, i: &'a Ident) {
        visit_ident(self, i)
    }
}

pub fn visit_tree<'a, V: Visit<'a> + ?Sized>(v: &mut V, tree: &'a Tree) {
    match tree {
        Tree::Expr(e) => v.visit_expr(e),
        Tree::Stmt(s) => v.visit_stmt(s),
    }
}

pub fn visit_expr<'a, V: Visit<'a> + ?Sized>(v: &mut V, expr: &'a Expr) {
    match expr {
        Expr::Lit(l) => v.visit_literal(l),
        Expr::Name(s) => v.visit_name(s),
        Expr::Class(p) => v.visit_class(p),
        Expr::Field(e, i) => {
            v.visit_expr(e);
            v.visit_ident(i);
        }
        Expr::Call {
            receiver,
            method,
            args,
        } => {
            if let Some(r) = receiver {
                v.visit_expr(r);
            }
            v.visit_ident(method);
            v.visit_exprs(args);
        }
        Expr::New(_, args) => v.visit_exprs(args),
        Expr::Index(e, i) => {
            v.visit_expr(e);
            v.visit_expr(i);
        }
        Expr::Unary(_, e) | Expr::Postfix(e, _) | Expr::Paren(e) => v.visit_expr(e),
        Expr::Binary(l, _, r) | Expr::Assign(l, _, r) => {
            v.visit_expr(l);
            v.visit_expr(r);
        }
        Expr::Conditional(c, t, e) => {
            v.visit_expr(c);
            v.visit_expr(t);
            v.visit_expr(e);
        }
        Expr::Meta(s) => v.visit_hole(s, HoleKind::Expr),
        Expr::Rest(s) => v.visit_hole(s, HoleKind::Exprs),
        Expr::AnyOf(alts) => v.visit_any_of(alts),
    }
}

pub fn visit_exprs<'a, V: Visit<'a> + ?Sized>(v: &mut V, exprs: &'a [Expr]) {
    for e in exprs {
        v.visit_expr(e);
    }
}

pub fn visit_any_of<'a, V: Visit<'a> + ?Sized>(v: &mut V, alts: &'a [Expr]) {
    for e in alts {
        v.visit_expr(e);
    }
}

pub fn visit_stmt<'a, V: Visit<'a> + ?Sized>(v: &mut V, stmt: &'a Stmt) {
    match stmt {
        Stmt::Empty => (),
        Stmt::Expr(e) | Stmt::Throw(e) => v.visit_expr(e),
        Stmt::Local(l) => v.visit_local(l),
        Stmt::Block(b) => v.visit_block(b),
        Stmt::If {
            cond,
            then,
            otherwise,
        } => {
            v.visit_expr(cond);
            v.visit_stmt(then);
            if let Some(s) = otherwise {
                v.visit_stmt(s);
            }
        }
        Stmt::While { cond, body } => {
            v.visit_expr(cond);
            v.visit_stmt(body);
        }
        Stmt::DoWhile { body, cond } => {
            v.visit_stmt(body);
            v.visit_expr(cond);
        }
        Stmt::For {
            init,
            cond,
            update,
            body,
        } => {
            v.visit_stmts(init);
            if let Some(c) = cond {
                v.visit_expr(c);
            }
            v.visit_exprs(update);
            v.visit_stmt(body);
        }
        Stmt::ForEach {
            name,
            iterable,
            body,
            ..
        } => {
            v.visit_ident(name);
            v.visit_expr(iterable);
            v.visit_stmt(body);
        }
        Stmt::Break(l) | Stmt::Continue(l) => {
            if let Some(l) = l {
                v.visit_ident(l);
            }
        }
        Stmt::Return(e) => {
            if let Some(e) = e {
                v.visit_expr(e);
            }
        }
        Stmt::Labeled(l, s) => {
            v.visit_ident(l);
            v.visit_stmt(s);
        }
        Stmt::Try {
            body,
            catches,
            finally,
        } => {
            v.visit_block(body);
            for c in catches {
                v.visit_catch(c);
            }
            if let Some(f) = finally {
                v.visit_block(f);
            }
        }
        Stmt::Meta(s) => v.visit_hole(s, HoleKind::Stmt),
        Stmt::Rest(s) => v.visit_hole(s, HoleKind::Stmts),
    }
}

pub fn visit_stmts<'a, V: Visit<'a> + ?Sized>(v: &mut V, stmts: &'a [Stmt]) {
    for s in stmts {
        v.visit_stmt(s);
    }
}

pub fn visit_block<'a, V: Visit<'a> + ?Sized>(v: &mut V, block: &'a Block) {
    v.visit_stmts(&block.stmts);
}

pub fn visit_catch<'a, V: Visit<'a> + ?Sized>(v: &mut V, catch: &'a Catch) {
    v.visit_ident(&catch.name);
    v.visit_block(&catch.body);
}

pub fn visit_local<'a, V: Visit<'a> + ?Sized>(v: &mut V, local: &'a Local) {
    v.visit_ident(&local.name);
    if let Some(init) = &local.init {
        v.visit_expr(init);
    }
}

pub fn visit_ident<'a, V: Visit<'a> + ?Sized>(v: &mut V, ident: &'a Ident) {
    match ident {
        Ident::Name(s) => v.visit_name(s),
        Ident::Meta(s) => v.visit_hole(s, HoleKind::Ident),
    }
}
