//! Tokenize a string representation of a program or template.

use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, tag},
    character::complete::{
        alpha1, alphanumeric1, char, digit1, hex_digit1, multispace1, none_of, not_line_ending,
    },
    combinator::{map, map_res, recognize, value},
    error::ParseError,
    multi::{many0, many0_count, many1},
    sequence::{delimited, pair, preceded, terminated},
    IResult, Parser,
};

use crate::Symbol;

/// Whitespace and `//` line comments.
pub(crate) fn space(input: &str) -> IResult<&str, ()> {
    value(
        (),
        many0_count(alt((
            multispace1,
            recognize(pair(tag("//"), not_line_ending)),
        ))),
    )(input)
}

pub(crate) fn symbol(input: &str) -> IResult<&str, Symbol> {
    let (input, name) = recognize(pair(
        alt((alpha1, tag("_"), tag("$"))),
        many0_count(alt((alphanumeric1, tag("_"), tag("$")))),
    ))(input)?;
    Ok((input, Symbol::new(name.to_owned())))
}

// TODO: remove when escaped_transform handles opt(..).
// Needs investigation, probably related to nom#{1118,1336}.
fn empty_string(input: &str) -> IResult<&str, String> {
    map(tag(r#""""#), |_| String::new())(input)
}

fn quoted_string(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        escaped_transform(
            none_of(r#"\""#),
            '\\',
            alt((
                value("\\", tag("\\")),
                value("\"", tag("\"")),
                value("'", tag("'")),
                value("\0", tag("0")),
                value("\n", tag("n")),
                value("\r", tag("r")),
                value("\t", tag("t")),
            )),
        ),
        char('"'),
    )(input)
}

pub(crate) fn string(input: &str) -> IResult<&str, String> {
    alt((empty_string, quoted_string))(input)
}

/// Digits in the given radix, possibly separated by underscores.
fn digits<'a>(
    digit: fn(&'a str) -> IResult<&'a str, &'a str>,
    radix: u32,
) -> impl FnMut(&'a str) -> IResult<&'a str, i64> {
    map_res(
        recognize(many1(terminated(digit, many0(char('_'))))),
        move |digits: &str| i64::from_str_radix(&digits.replace('_', ""), radix),
    )
}

/// A decimal or hexadecimal integer literal.
pub(crate) fn integer(input: &str) -> IResult<&str, i64> {
    alt((
        preceded(alt((tag("0x"), tag("0X"))), digits(hex_digit1, 16)),
        digits(digit1, 10),
    ))(input)
}

pub(crate) fn token<I, O, E, F>(mut parser: F) -> impl FnMut(I) -> IResult<I, Token<O, I>, E>
where
    I: Clone,
    O: Clone,
    E: ParseError<I>,
    F: Parser<I, O, E>,
{
    move |input: I| {
        let i = input.clone();
        let (input, t) = parser.parse(input)?;
        Ok((input, Token::new(t, i)))
    }
}

/// Define a parser combinator for a token denoted by a tag.
#[macro_export]
macro_rules! lex_token {
    ($function: ident<$ty: ty>, $tag: literal, $token: expr) => {
        pub(crate) fn $function(input: &str) -> IResult<&str, $crate::Token<$ty, &str>> {
            $crate::lexer::token(::nom::combinator::map(
                ::nom::bytes::complete::tag($tag),
                |_| $token,
            ))(input)
        }
    };
}

/// A token with source information.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token<T: Clone, S: Clone> {
    pub token: T,
    pub source: S,
}

impl<T: Clone, S: Clone> Token<T, S> {
    pub fn new(token: T, source: S) -> Self {
        Self { token, source }
    }
}

/// A lexer, a.k.a. lexical analyzer, tokenizer.
pub trait Lex<'a, S> {
    type Input;
    type Token;

    /// Tokenize an input stream.
    fn lex(input: Self::Input) -> IResult<Self::Input, Vec<Self::Token>>;
}
