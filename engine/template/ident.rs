use stencil_syntax::*;

use crate::bindings::Key;
use crate::choice::Choice;
use crate::inliner::{InlineError, Inliner};
use crate::unifier::Unifier;

use super::{unify_hole, Pattern};

/// Identifiers: method names, labels, and declared variables.
#[derive(Clone, Debug, PartialEq)]
pub enum UIdent {
    Name(Symbol),
    Hole(Key<Ident>),
}

impl Pattern for UIdent {
    type Target = Ident;

    fn unify<'a>(&'a self, target: &'a Ident, u: Unifier<'a>) -> Choice<'a, Unifier<'a>> {
        match (self, target) {
            (Self::Hole(key), i) => unify_hole(key, i, u),
            (Self::Name(s), Ident::Name(t)) if u.resolver().same_entity(s, t) => Choice::of(u),
            _ => Choice::none(),
        }
    }

    fn inline(&self, inliner: &mut Inliner) -> Result<Ident, InlineError> {
        match self {
            Self::Name(s) => Ok(Ident::Name(s.clone())),
            Self::Hole(key) => inliner.get(key),
        }
    }
}
