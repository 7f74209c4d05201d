//! Surface tokens and tokenizer.

use nom::{branch::alt, combinator::map, multi::many0, sequence::delimited, IResult, InputLength};

use crate::lexer::{integer, space, string, symbol, token, Lex, Token};
use crate::{lex_token, Symbol};

/// Lexical element of a program or template.
/// Punctuation is named after how it looks, not what it means.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum SurfaceToken {
    Ident(Symbol),
    String(String),
    Integer(i64),
    If,
    Else,
    While,
    Do,
    For,
    Break,
    Continue,
    Return,
    Throw,
    Try,
    Catch,
    Finally,
    New,
    True,
    False,
    Null,
    Ellipsis,
    Dot,
    Comma,
    Semi,
    Colon,
    Query,
    Pound,
    At,
    Bang,
    Eq,
    EqEq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    AndAnd,
    OrOr,
    Plus,
    Dash,
    Star,
    Slash,
    Percent,
    PlusPlus,
    DashDash,
    PlusEq,
    DashEq,
    StarEq,
    SlashEq,
    PercentEq,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
}

impl SurfaceToken {
    /// Keywords are lexed as identifiers first, then promoted.
    fn word(s: Symbol) -> Self {
        use SurfaceToken::*;
        match s.name() {
            "if" => If,
            "else" => Else,
            "while" => While,
            "do" => Do,
            "for" => For,
            "break" => Break,
            "continue" => Continue,
            "return" => Return,
            "throw" => Throw,
            "try" => Try,
            "catch" => Catch,
            "finally" => Finally,
            "new" => New,
            "true" => True,
            "false" => False,
            "null" => Null,
            _ => Ident(s),
        }
    }
}

impl From<Symbol> for SurfaceToken {
    fn from(s: Symbol) -> Self {
        Self::word(s)
    }
}

impl From<&str> for SurfaceToken {
    fn from(s: &str) -> Self {
        Self::String(String::from(s))
    }
}

impl From<i64> for SurfaceToken {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl InputLength for SurfaceToken {
    #[inline]
    fn input_len(&self) -> usize {
        1
    }
}

macro_rules! surface_token {
    ($function: ident, $tag: literal, $token: ident) => {
        lex_token!($function<SurfaceToken>, $tag, SurfaceToken::$token);
    };
}

surface_token!(ellipsis, "...", Ellipsis);
surface_token!(dot, ".", Dot);
surface_token!(comma, ",", Comma);
surface_token!(semi, ";", Semi);
surface_token!(colon, ":", Colon);
surface_token!(query, "?", Query);
surface_token!(pound, "#", Pound);
surface_token!(at, "@", At);
surface_token!(eq_eq, "==", EqEq);
surface_token!(ne, "!=", Ne);
surface_token!(bang, "!", Bang);
surface_token!(eq, "=", Eq);
surface_token!(le, "<=", Le);
surface_token!(ge, ">=", Ge);
surface_token!(lt, "<", Lt);
surface_token!(gt, ">", Gt);
surface_token!(and_and, "&&", AndAnd);
surface_token!(or_or, "||", OrOr);
surface_token!(plus_plus, "++", PlusPlus);
surface_token!(plus_eq, "+=", PlusEq);
surface_token!(plus, "+", Plus);
surface_token!(dash_dash, "--", DashDash);
surface_token!(dash_eq, "-=", DashEq);
surface_token!(dash, "-", Dash);
surface_token!(star_eq, "*=", StarEq);
surface_token!(star, "*", Star);
surface_token!(slash_eq, "/=", SlashEq);
surface_token!(slash, "/", Slash);
surface_token!(percent_eq, "%=", PercentEq);
surface_token!(percent, "%", Percent);
surface_token!(lparen, "(", LParen);
surface_token!(rparen, ")", RParen);
surface_token!(lbracket, "[", LBracket);
surface_token!(rbracket, "]", RBracket);
surface_token!(lbrace, "{", LBrace);
surface_token!(rbrace, "}", RBrace);

/// Surface syntax lexer.
pub struct SurfaceLexer;

impl<'a> Lex<'a, &str> for SurfaceLexer {
    type Input = &'a str;
    type Token = Token<SurfaceToken, &'a str>;

    /// Tokenize a string representation of a program or template.
    fn lex(input: &'a str) -> IResult<&'a str, Vec<Self::Token>> {
        many0(delimited(
            space,
            alt((
                alt((ellipsis, dot, comma, semi, colon, query, pound, at)),
                alt((eq_eq, ne, bang, eq, le, ge, lt, gt, and_and, or_or)),
                alt((
                    plus_plus, plus_eq, plus, dash_dash, dash_eq, dash, star_eq, star, slash_eq,
                    slash, percent_eq, percent,
                )),
                alt((lparen, rparen, lbracket, rbracket, lbrace, rbrace)),
                token(map(integer, SurfaceToken::Integer)),
                token(map(string, SurfaceToken::String)),
                token(map(symbol, SurfaceToken::word)),
            )),
            space,
        ))(input)
    }
}
