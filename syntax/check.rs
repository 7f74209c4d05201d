//! Static checks on trees.

use crate::*;

/// Find a list-capture metavariable that is not the last element
/// of an argument or statement list.
pub fn misplaced_rest(tree: &Tree) -> Option<&Symbol> {
    let mut checker = RestChecker::default();
    checker.visit_tree(tree);
    checker.misplaced
}

#[derive(Default)]
struct RestChecker<'a> {
    misplaced: Option<&'a Symbol>,
}

impl<'a> RestChecker<'a> {
    fn flag(&mut self, s: &'a Symbol) {
        self.misplaced.get_or_insert(s);
    }
}

impl<'a> Visit<'a> for RestChecker<'a> {
    fn visit_expr(&mut self, e: &'a Expr) {
        match e {
            Expr::Rest(s) => self.flag(s),
            e => visit_expr(self, e),
        }
    }

    fn visit_stmt(&mut self, s: &'a Stmt) {
        match s {
            Stmt::Rest(name) => self.flag(name),
            s => visit_stmt(self, s),
        }
    }

    fn visit_exprs(&mut self, es: &'a [Expr]) {
        match es.split_last() {
            Some((Expr::Rest(_), init)) => visit_exprs(self, init),
            _ => visit_exprs(self, es),
        }
    }

    fn visit_stmts(&mut self, ss: &'a [Stmt]) {
        match ss.split_last() {
            Some((Stmt::Rest(_), init)) => visit_stmts(self, init),
            _ => visit_stmts(self, ss),
        }
    }
}

/// A concrete tree has no metavariables or other template-only forms,
/// and so may appear in a real program.
pub trait IsConcrete {
    fn is_concrete(&self) -> bool;
}

#[derive(Default)]
struct Concreteness(bool);

impl<'a> Visit<'a> for Concreteness {
    fn visit_class(&mut self, _p: &'a Path) {
        self.0 = false;
    }

    fn visit_hole(&mut self, _s: &'a Symbol, _kind: HoleKind) {
        self.0 = false;
    }

    fn visit_any_of(&mut self, _alts: &'a [Expr]) {
        self.0 = false;
    }
}

macro_rules! is_concrete {
    ($type: ty, $visit: ident) => {
        impl IsConcrete for $type {
            fn is_concrete(&self) -> bool {
                let mut c = Concreteness(true);
                c.$visit(self);
                c.0
            }
        }
    };
}

is_concrete!(Tree, visit_tree);
is_concrete!(Expr, visit_expr);
is_concrete!(Stmt, visit_stmt);
