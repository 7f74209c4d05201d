//! Lazy sequences of alternatives for backtracking search.
//!
//! A `Choice` describes every live branch of a search at some point.
//! Building one explores nothing: options are produced only as a
//! caller iterates, so taking just the [first](Choice::first) option
//! bounds the work done to find it.

use std::iter;

use crate::cancel::{Cancellable, Cancellation};

/// Zero, one, or many options.
pub enum Choice<'a, T> {
    None,
    Of(T),
    Many(Box<dyn Iterator<Item = T> + 'a>),
}

impl<'a, T: 'a> Choice<'a, T> {
    /// No options.
    pub fn none() -> Self {
        Self::None
    }

    /// Exactly one option.
    pub fn of(t: T) -> Self {
        Self::Of(t)
    }

    /// Options drawn lazily from an iterator, in order.
    pub fn lazy<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'a,
    {
        Self::Many(Box::new(items.into_iter()))
    }

    /// The options of `self` followed by those of `other`.
    pub fn concat(self, other: Self) -> Self {
        match (self, other) {
            (Self::None, c) | (c, Self::None) => c,
            (a, b) => Self::Many(Box::new(a.into_iter().chain(b))),
        }
    }

    /// Keep just the options that satisfy `predicate`.
    pub fn filter(self, mut predicate: impl FnMut(&T) -> bool + 'a) -> Self {
        match self {
            Self::None => Self::None,
            Self::Of(t) if predicate(&t) => Self::Of(t),
            Self::Of(_) => Self::None,
            Self::Many(i) => Self::Many(Box::new(i.filter(move |t| predicate(t)))),
        }
    }

    pub fn map<U: 'a>(self, mut f: impl FnMut(T) -> U + 'a) -> Choice<'a, U> {
        match self {
            Self::None => Choice::None,
            Self::Of(t) => Choice::Of(f(t)),
            Self::Many(i) => Choice::Many(Box::new(i.map(f))),
        }
    }

    /// Map, dropping options for which `f` has no result.
    pub fn map_if_present<U: 'a>(self, mut f: impl FnMut(T) -> Option<U> + 'a) -> Choice<'a, U> {
        match self {
            Self::None => Choice::None,
            Self::Of(t) => f(t).map_or(Choice::None, Choice::Of),
            Self::Many(i) => Choice::Many(Box::new(i.filter_map(f))),
        }
    }

    /// Sequential composition: for every option, all of the options
    /// that `f` makes of it, in order. The flag is checked before `f`
    /// is first applied and before every step of the result; once it
    /// trips, no more options are produced.
    pub fn flat_map<U: 'a>(
        self,
        cancellation: &Cancellation,
        mut f: impl FnMut(T) -> Choice<'a, U> + 'a,
    ) -> Choice<'a, U> {
        if cancellation.is_cancelled() {
            return Choice::None;
        }
        match self {
            Self::None => Choice::None,
            Self::Of(t) => f(t),
            Self::Many(i) => Choice::Many(Box::new(Cancellable::new(
                i.flat_map(f),
                cancellation.clone(),
            ))),
        }
    }

    /// The first option, if any; nothing after it is evaluated.
    pub fn first(self) -> Option<T> {
        match self {
            Self::None => None,
            Self::Of(t) => Some(t),
            Self::Many(mut i) => i.next(),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Zero options if empty, one if a singleton, otherwise all of them.
impl<'a, T: 'a> From<Vec<T>> for Choice<'a, T> {
    fn from(mut items: Vec<T>) -> Self {
        match items.len() {
            0 => Self::None,
            1 => items.pop().map_or(Self::None, Self::Of),
            _ => Self::lazy(items),
        }
    }
}

impl<'a, T: 'a> IntoIterator for Choice<'a, T> {
    type Item = T;
    type IntoIter = Box<dyn Iterator<Item = T> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        match self {
            Self::None => Box::new(iter::empty()),
            Self::Of(t) => Box::new(iter::once(t)),
            Self::Many(i) => i,
        }
    }
}

#[cfg(test)]
mod test {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    fn options<T: 'static>(c: Choice<'static, T>) -> Vec<T> {
        c.into_iter().collect()
    }

    /// How many representative choices there are.
    const N: usize = 4;

    /// Some representative finite choices.
    fn choice(i: usize) -> Choice<'static, i64> {
        match i {
            0 => Choice::none(),
            1 => Choice::of(3),
            2 => Choice::from(vec![1, 2]),
            _ => Choice::lazy(0..5),
        }
    }

    fn f(x: i64) -> Choice<'static, i64> {
        match x % 3 {
            0 => Choice::none(),
            1 => Choice::of(x * 10),
            _ => Choice::from(vec![x, -x]),
        }
    }

    fn g(x: i64) -> Choice<'static, i64> {
        Choice::from(vec![x + 1, x + 2])
    }

    #[test]
    fn monad_laws() {
        let never = Cancellation::new();
        for x in 0..6 {
            assert_eq!(
                options(Choice::of(x).flat_map(&never, f)),
                options(f(x)),
                "left identity"
            );
        }
        for i in 0..N {
            assert_eq!(
                options(choice(i).flat_map(&never, Choice::of)),
                options(choice(i)),
                "right identity"
            );
            let n = never.clone();
            assert_eq!(
                options(choice(i).flat_map(&never, f).flat_map(&never, g)),
                options(choice(i).flat_map(&never, move |x| f(x).flat_map(&n, g))),
                "associativity"
            );
        }
    }

    #[test]
    fn absorption() {
        let never = Cancellation::new();
        assert!(Choice::<i64>::none().flat_map(&never, f).is_none());
        assert!(Choice::<i64>::none().map(|x| x + 1).is_none());
        assert!(Choice::<i64>::none().map_if_present(Some).is_none());
        assert!(Choice::<i64>::none().filter(|_| true).is_none());
        for i in 0..N {
            assert_eq!(options(choice(i).concat(Choice::none())), options(choice(i)));
            assert_eq!(options(Choice::none().concat(choice(i))), options(choice(i)));
        }
        assert!(matches!(
            Choice::of(1).concat(Choice::none()),
            Choice::Of(1)
        ));
    }

    #[test]
    fn concat_associates() {
        for a in 0..N {
            for b in 0..N {
                for c in 0..N {
                    assert_eq!(
                        options(choice(a).concat(choice(b)).concat(choice(c))),
                        options(choice(a).concat(choice(b).concat(choice(c))))
                    );
                }
            }
        }
    }

    #[test]
    fn from_vec() {
        assert!(Choice::<i64>::from(vec![]).is_none());
        assert!(matches!(Choice::from(vec![7]), Choice::Of(7)));
        assert_eq!(options(Choice::from(vec![3, 1, 2])), [3, 1, 2]);
    }

    #[test]
    fn filter_and_map() {
        let c = Choice::lazy(0..10)
            .filter(|x| x % 2 == 0)
            .map(|x| x * x)
            .map_if_present(|x| (x > 10).then_some(x));
        assert_eq!(options(c), [16, 36, 64]);
        assert!(Choice::of(1).filter(|x| *x > 1).is_none());
    }

    #[test]
    fn laziness() {
        let never = Cancellation::new();
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let c = Choice::lazy(0..100).flat_map(&never, move |x| {
            counter.set(counter.get() + 1);
            Choice::of(x)
        });
        assert_eq!(calls.get(), 0, "nothing explored yet");
        assert_eq!(c.first(), Some(0));
        assert_eq!(calls.get(), 1, "only the first option explored");
    }

    #[test]
    fn cancellation() {
        let c = Cancellation::new();
        c.cancel();
        assert!(Choice::of(1).flat_map(&c, Choice::of).is_none(), "on entry");

        let c = Cancellation::new();
        let d = c.clone();
        let mut i = Choice::lazy(0..)
            .flat_map(&c, move |x| {
                if x == 2 {
                    d.cancel();
                }
                Choice::of(x)
            })
            .into_iter();
        assert_eq!(i.next(), Some(0));
        assert_eq!(i.next(), Some(1));
        assert_eq!(i.next(), Some(2));
        assert_eq!(i.next(), None, "on every step");
    }
}
