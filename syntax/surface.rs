//! Read trees from strings.
//!
//! The surface syntax is a small Java-like statement language
//! with metavariable leaves:
//!
//! - `#a` stands for one expression, statement, or identifier;
//! - `#xs...` stands for the rest of an argument or statement list;
//! - `#any(a, b)` matches either `a` or `b`;
//! - `@{java.util.Objects}` refers to an external class.

mod lexer;
mod parser;

use nom::{combinator::eof, error::Error, sequence::terminated, IResult};

use crate::{Expr, Lex, Parse, Stmt, SyntaxError, Tokens, Tree};

pub use lexer::{SurfaceLexer, SurfaceToken};
pub use parser::SurfaceParser;

type Input<'a> = crate::parser::Input<'a, SurfaceToken, &'a str>;

/// How much of the offending input to quote in an error message.
const CONTEXT: usize = 24;

fn describe(e: nom::Err<Error<Input>>) -> String {
    match e {
        nom::Err::Incomplete(_) => String::from("incomplete input"),
        nom::Err::Error(e) | nom::Err::Failure(e) => match e.input.first() {
            Some(t) => format!(
                "unexpected input at `{}`",
                t.source.chars().take(CONTEXT).collect::<String>()
            ),
            None => String::from("unexpected end of input"),
        },
    }
}

/// Lex the whole string, then run `parser` over all of its tokens.
fn read<T>(input: &str, parser: impl Fn(Input) -> IResult<Input, T>) -> Result<T, SyntaxError> {
    let (rest, tokens) =
        SurfaceLexer::lex(input).map_err(|_| SyntaxError::Lex(String::from(input)))?;
    if !rest.is_empty() {
        return Err(SyntaxError::Lex(rest.chars().take(CONTEXT).collect()));
    }
    parser(Tokens::new(&tokens))
        .map(|(_, t)| t)
        .map_err(|e| SyntaxError::Parse(describe(e)))
}

/// Parse an expression or a statement.
pub fn parse_tree(input: &str) -> Result<Tree, SyntaxError> {
    read(input, |i| SurfaceParser::parse(i))
}

/// Parse exactly one expression.
pub fn parse_expr(input: &str) -> Result<Expr, SyntaxError> {
    read(input, |i| terminated(parser::expr, eof)(i))
}

/// Parse exactly one statement.
pub fn parse_stmt(input: &str) -> Result<Stmt, SyntaxError> {
    read(input, |i| terminated(parser::stmt, eof)(i))
}
