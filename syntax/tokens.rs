//! Streams of lexical tokens.

use std::iter::Enumerate;
use std::ops::{Range, RangeFrom, RangeFull, RangeTo};
use std::slice;

use nom::{InputIter, InputLength, InputTake, Needed, Slice, UnspecializedInput};

/// A borrowed run of tokens that acts as a
/// [nom](https://crates.io/crates/nom)
/// [custom input type](https://github.com/rust-bakery/nom/blob/main/doc/custom_input_types.md).
#[derive(PartialEq, Debug)]
pub struct Tokens<'a, T> {
    pub tok: &'a [T],
}

// Not derived: a borrowed slice is `Copy` whatever `T` is.
impl<'a, T> Clone for Tokens<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for Tokens<'a, T> {}

impl<'a, T> Tokens<'a, T> {
    pub fn new(tok: &'a [T]) -> Self {
        Tokens { tok }
    }

    pub fn is_empty(&self) -> bool {
        self.tok.is_empty()
    }

    pub fn first(&self) -> Option<&'a T> {
        self.tok.first()
    }

    pub fn last(&self) -> Option<&'a T> {
        self.tok.last()
    }
}

impl<'a, T> InputLength for Tokens<'a, T> {
    #[inline]
    fn input_len(&self) -> usize {
        self.tok.len()
    }
}

impl<'a, T> InputTake for Tokens<'a, T> {
    #[inline]
    fn take(&self, count: usize) -> Self {
        Tokens::new(&self.tok[..count])
    }

    #[inline]
    fn take_split(&self, count: usize) -> (Self, Self) {
        let (prefix, suffix) = self.tok.split_at(count);
        (Tokens::new(suffix), Tokens::new(prefix))
    }
}

impl<'a, T> Slice<Range<usize>> for Tokens<'a, T> {
    #[inline]
    fn slice(&self, range: Range<usize>) -> Self {
        Tokens::new(&self.tok[range])
    }
}

impl<'a, T> Slice<RangeTo<usize>> for Tokens<'a, T> {
    #[inline]
    fn slice(&self, range: RangeTo<usize>) -> Self {
        Tokens::new(&self.tok[range])
    }
}

impl<'a, T> Slice<RangeFrom<usize>> for Tokens<'a, T> {
    #[inline]
    fn slice(&self, range: RangeFrom<usize>) -> Self {
        Tokens::new(&self.tok[range])
    }
}

impl<'a, T> Slice<RangeFull> for Tokens<'a, T> {
    #[inline]
    fn slice(&self, _: RangeFull) -> Self {
        Tokens::new(self.tok)
    }
}

impl<'a, T> InputIter for Tokens<'a, T> {
    type Item = &'a T;
    type Iter = Enumerate<slice::Iter<'a, T>>;
    type IterElem = slice::Iter<'a, T>;

    #[inline]
    fn iter_indices(&self) -> Self::Iter {
        self.tok.iter().enumerate()
    }

    #[inline]
    fn iter_elements(&self) -> Self::IterElem {
        self.tok.iter()
    }

    #[inline]
    fn position<P>(&self, predicate: P) -> Option<usize>
    where
        P: Fn(Self::Item) -> bool,
    {
        self.tok.iter().position(predicate)
    }

    #[inline]
    fn slice_index(&self, count: usize) -> Result<usize, Needed> {
        if self.tok.len() >= count {
            Ok(count)
        } else {
            Err(Needed::new(count - self.tok.len()))
        }
    }
}

impl<'a, T> UnspecializedInput for Tokens<'a, T> {}

#[cfg(feature = "to-rust")]
mod to_rust {
    use proc_macro2::Span;

    use crate::lexer::Token;

    use super::*;

    impl<'a, T: Clone> Tokens<'a, Token<T, Span>> {
        /// Needs experimental `proc_macro::Span::join` to produce a whole span,
        /// so settle for the first token's.
        pub fn span(&self) -> Option<Span> {
            self.first().map(|t| t.source)
        }

        pub fn span_last(&self) -> Option<Span> {
            self.last().map(|t| t.source)
        }
    }
}
