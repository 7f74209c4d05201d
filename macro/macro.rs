//! A proc-macro reader for templates.
//!
//! Translate Rust tokens into surface ones, parse them,
//! check where list captures appear, and (if all is well)
//! emit Rust code that constructs the corresponding tree.

use std::fmt::{self, Display};

use proc_macro::{Delimiter, Spacing, TokenStream, TokenTree};
use proc_macro2::Span;
use quote::{quote, quote_spanned};

use stencil_syntax::{
    misplaced_rest, Lex as _, Parse as _, SurfaceLexer, SurfaceParser, SurfaceToken, Symbol,
    Tokens,
};

struct Error {
    message: String,
    span: Span,
}

impl Error {
    fn new(message: String, span: Span) -> Self {
        Self { message, span }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

type Result<T> = std::result::Result<T, Error>;
type Token = stencil_syntax::Token<SurfaceToken, Span>;

fn delimited(left: Token, middle: Vec<Token>, right: Token) -> Vec<Token> {
    let mut toks = Vec::new();
    toks.push(left);
    toks.extend(middle);
    toks.push(right);
    toks
}

/// Lex a string with the surface lexer, giving every token `span`.
fn relex(s: &str, span: Span) -> Result<Vec<Token>> {
    let (unused, tokens) =
        SurfaceLexer::lex(s).map_err(|e| Error::new(format!("can't lex `{s}`: {e}"), span))?;
    if !unused.is_empty() {
        return Err(Error::new(format!("can't lex `{unused}`"), span));
    }
    Ok(tokens
        .into_iter()
        .map(|t| Token::new(t.token, span))
        .collect())
}

/// Rust splits multi-character operators like `++` and `...` into
/// runs of joint punctuation; collect a run so that it may be lexed whole.
#[derive(Default)]
struct Run {
    chars: String,
    span: Option<Span>,
}

impl Run {
    fn push(&mut self, c: char, span: Span) {
        self.chars.push(c);
        self.span.get_or_insert(span);
    }

    fn flush(&mut self, tokens: &mut Vec<Token>) -> Result<()> {
        if let Some(span) = self.span.take() {
            tokens.extend(relex(&self.chars, span)?);
            self.chars.clear();
        }
        Ok(())
    }
}

/// Translate a stream of Rust tokens to a sequence of surface tokens.
fn translate_tokens(input: TokenStream) -> Result<Vec<Token>> {
    use SurfaceToken::*;
    let mut tokens = Vec::new();
    let mut run = Run::default();
    for tt in input {
        match tt {
            TokenTree::Punct(p) => {
                run.push(p.as_char(), p.span().into());
                if p.spacing() == Spacing::Alone {
                    run.flush(&mut tokens)?;
                }
            }
            TokenTree::Group(g) => {
                run.flush(&mut tokens)?;
                let open = g.span_open().into();
                let close = g.span_close().into();
                let (left, right) = match g.delimiter() {
                    Delimiter::Parenthesis => (LParen, RParen),
                    Delimiter::Brace => (LBrace, RBrace),
                    Delimiter::Bracket => (LBracket, RBracket),
                    Delimiter::None => {
                        return Err(Error::new("unexpected invisible delimiter".to_string(), open))
                    }
                };
                tokens.extend(delimited(
                    Token::new(left, open),
                    translate_tokens(g.stream())?,
                    Token::new(right, close),
                ));
            }
            TokenTree::Ident(i) => {
                run.flush(&mut tokens)?;
                tokens.push(Token::new(
                    SurfaceToken::from(Symbol::new(i.to_string())),
                    i.span().into(),
                ));
            }
            TokenTree::Literal(l) => {
                // There is no good way to get the value out of a `proc_macro::Literal`,
                // so we re-lex its string representation.
                run.flush(&mut tokens)?;
                let s = l.to_string();
                let span = l.span().into();
                let mut lexed = relex(&s, span)?;
                match lexed.len() {
                    1 => tokens.append(&mut lexed),
                    _ => return Err(Error::new(format!("unsupported literal `{s}`"), span)),
                }
            }
        }
    }
    run.flush(&mut tokens)?;
    Ok(tokens)
}

macro_rules! macro_error {
    ($msg: literal) => {{
        let msg = format!($msg);
        quote!(compile_error!(#msg)).into()
    }};
    ($msg: literal, $span: expr) => {{
        let msg = format!($msg);
        quote_spanned!($span=> compile_error!(#msg)).into()
    }};
}

/// Parse `input` as a template at Rust compile time,
/// yielding a `stencil_syntax::Tree`.
#[proc_macro]
pub fn stencil(input: TokenStream) -> TokenStream {
    match translate_tokens(input) {
        Ok(tokens) => match SurfaceParser::parse(Tokens::new(&tokens[..])) {
            Ok((_, tree)) => match misplaced_rest(&tree) {
                None => quote!(#tree).into(),
                Some(name) => macro_error!("`#{name}...` may only appear last in a list"),
            },
            Err(nom::Err::Incomplete(_)) => macro_error!("incomplete template"),
            Err(nom::Err::Error(e) | nom::Err::Failure(e)) => {
                let span = e
                    .input
                    .span()
                    .or_else(|| tokens.last().map(|t| t.source))
                    .unwrap_or_else(Span::call_site);
                macro_error!("can't parse template", span)
            }
        },
        Err(Error { message, span }) => macro_error!("can't read template: {message}", span),
    }
}
