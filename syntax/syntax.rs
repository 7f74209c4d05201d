//! Syntactic elements of a small Java-like statement language.
//!
//! Trees may contain _metavariable_ leaves (`#a`, `#body`, `#args...`)
//! and a few other template-only forms, in the same way that terms
//! may contain variables. A tree without any of them is _concrete_;
//! see [`IsConcrete`]. A string or macro parser may layer whatever
//! surface syntax it likes on top of these elements.

mod check;
mod lexer;
mod parser;
mod surface;
mod tokens;
mod visit;

use std::fmt;

use thiserror::Error;

pub use check::{misplaced_rest, IsConcrete};
pub use lexer::{Lex, Token};
pub use parser::Parse;
pub use surface::{parse_expr, parse_stmt, parse_tree, SurfaceLexer, SurfaceParser, SurfaceToken};
pub use tokens::Tokens;
pub use visit::*;

/// Uninterpreted element that names a variable, type, method, or label.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(name: String) -> Self {
        Symbol(name)
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Symbol::new(String::from(s))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A dotted, fully qualified name like `java.util.Objects`.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Path(Vec<Symbol>);

impl Path {
    pub fn new(segments: impl IntoIterator<Item = Symbol>) -> Self {
        Self(segments.into_iter().collect())
    }

    pub fn segments(&self) -> &[Symbol] {
        &self.0
    }

    /// The unqualified (last) segment.
    pub fn simple_name(&self) -> Option<&Symbol> {
        self.0.last()
    }
}

impl From<&str> for Path {
    fn from(s: &str) -> Self {
        Self::new(s.split('.').map(Symbol::from))
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(
            &self
                .0
                .iter()
                .map(|s| s.name())
                .collect::<Vec<_>>()
                .join("."),
        )
    }
}

/// A name in a position that is not an expression: a label,
/// a declared variable, a field or method name.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Ident {
    Name(Symbol),
    Meta(Symbol),
}

impl From<&str> for Ident {
    fn from(s: &str) -> Self {
        Self::Name(Symbol::from(s))
    }
}

impl From<Symbol> for Ident {
    fn from(s: Symbol) -> Self {
        Self::Name(s)
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(s) => s.fmt(f),
            Self::Meta(s) => f.write_fmt(format_args!("#{s}")),
        }
    }
}

/// Literal constants.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Lit {
    Int(i64),
    Bool(bool),
    Str(String),
    Null,
}

impl From<i64> for Lit {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<bool> for Lit {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Lit {
    fn from(s: &str) -> Self {
        Self::Str(String::from(s))
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => f.write_fmt(format_args!("{i}")),
            Self::Bool(b) => f.write_fmt(format_args!("{b}")),
            Self::Null => f.write_str("null"),
            Self::Str(s) => {
                f.write_str("\"")?;
                for c in s.chars() {
                    match c {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\r' => f.write_str("\\r")?,
                        '\t' => f.write_str("\\t")?,
                        c => f.write_fmt(format_args!("{c}"))?,
                    }
                }
                f.write_str("\"")
            }
        }
    }
}

/// Prefix operators: numeric negation, logical complement,
/// pre-increment, and pre-decrement.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum UnaryOp {
    Neg,
    Not,
    Inc,
    Dec,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use UnaryOp::*;
        f.write_str(match self {
            Neg => "-",
            Not => "!",
            Inc => "++",
            Dec => "--",
        })
    }
}

/// Postfix operators: `x++` and `x--`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum PostfixOp {
    Inc,
    Dec,
}

impl fmt::Display for PostfixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Inc => "++",
            Self::Dec => "--",
        })
    }
}

/// [Pratt style](https://en.wikipedia.org/wiki/Operator-precedence_parser#Pratt_parsing)
/// precedence for binary operators.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
enum Precedence {
    Lowest,
    Or,
    And,
    Equality,
    Relational,
    Additive,
    Multiplicative,
}

/// Binary (infix) operators.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum BinOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinOp {
    fn precedence(&self) -> Precedence {
        use BinOp::*;
        match self {
            Or => Precedence::Or,
            And => Precedence::And,
            Eq | Ne => Precedence::Equality,
            Lt | Gt | Le | Ge => Precedence::Relational,
            Add | Sub => Precedence::Additive,
            Mul | Div | Rem => Precedence::Multiplicative,
        }
    }

    pub fn binds_tighter_than(&self, other: &BinOp) -> bool {
        self.precedence() > other.precedence()
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use BinOp::*;
        f.write_str(match self {
            Or => "||",
            And => "&&",
            Eq => "==",
            Ne => "!=",
            Lt => "<",
            Gt => ">",
            Le => "<=",
            Ge => ">=",
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Rem => "%",
        })
    }
}

/// Simple and compound assignment.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use AssignOp::*;
        f.write_str(match self {
            Assign => "=",
            Add => "+=",
            Sub => "-=",
            Mul => "*=",
            Div => "/=",
            Rem => "%=",
        })
    }
}

/// Expressions. Parentheses are explicit ([`Expr::Paren`]); the
/// printer never inserts any of its own.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Expr {
    Lit(Lit),
    Name(Symbol),

    /// A reference to an external class, written `@{java.util.Objects}`.
    /// Resolved to a concrete expression when a template is inlined.
    Class(Path),

    Field(Box<Expr>, Ident),
    Call {
        receiver: Option<Box<Expr>>,
        method: Ident,
        args: Vec<Expr>,
    },
    New(Symbol, Vec<Expr>),
    Index(Box<Expr>, Box<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Postfix(Box<Expr>, PostfixOp),
    Binary(Box<Expr>, BinOp, Box<Expr>),
    Assign(Box<Expr>, AssignOp, Box<Expr>),
    Conditional(Box<Expr>, Box<Expr>, Box<Expr>),
    Paren(Box<Expr>),

    /// A hole standing for any one expression.
    Meta(Symbol),

    /// A hole standing for the rest of an argument list.
    Rest(Symbol),

    /// Any one of several alternatives, written `#any(a, b)`.
    AnyOf(Vec<Expr>),
}

impl Expr {
    pub fn name(s: &str) -> Self {
        Self::Name(Symbol::from(s))
    }

    pub fn meta(s: &str) -> Self {
        Self::Meta(Symbol::from(s))
    }

    /// Boxing constructor.
    pub fn field(e: Expr, field: impl Into<Ident>) -> Self {
        Self::Field(Box::new(e), field.into())
    }

    /// Boxing constructor.
    pub fn call(
        receiver: Option<Expr>,
        method: impl Into<Ident>,
        args: impl IntoIterator<Item = Expr>,
    ) -> Self {
        Self::Call {
            receiver: receiver.map(Box::new),
            method: method.into(),
            args: args.into_iter().collect(),
        }
    }

    /// Boxing constructor.
    pub fn index(e: Expr, i: Expr) -> Self {
        Self::Index(Box::new(e), Box::new(i))
    }

    /// Boxing constructor.
    pub fn unary(op: UnaryOp, e: Expr) -> Self {
        Self::Unary(op, Box::new(e))
    }

    /// Boxing constructor.
    pub fn postfix(e: Expr, op: PostfixOp) -> Self {
        Self::Postfix(Box::new(e), op)
    }

    /// Boxing constructor.
    pub fn binary(l: Expr, op: BinOp, r: Expr) -> Self {
        Self::Binary(Box::new(l), op, Box::new(r))
    }

    /// Boxing constructor.
    pub fn assign(l: Expr, op: AssignOp, r: Expr) -> Self {
        Self::Assign(Box::new(l), op, Box::new(r))
    }

    /// Boxing constructor.
    pub fn conditional(c: Expr, t: Expr, e: Expr) -> Self {
        Self::Conditional(Box::new(c), Box::new(t), Box::new(e))
    }

    /// Boxing constructor.
    pub fn paren(e: Expr) -> Self {
        Self::Paren(Box::new(e))
    }
}

impl<T: Into<Lit>> From<T> for Expr {
    fn from(t: T) -> Self {
        Self::Lit(t.into())
    }
}

/// Comma-separated list.
fn list<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Expr::*;
        match self {
            Lit(l) => l.fmt(f),
            Name(s) => s.fmt(f),
            Class(p) => f.write_fmt(format_args!("@{{{p}}}")),
            Field(e, i) => f.write_fmt(format_args!("{e}.{i}")),
            Call {
                receiver: Some(r),
                method,
                args,
            } => f.write_fmt(format_args!("{r}.{method}({})", list(args))),
            Call {
                receiver: None,
                method,
                args,
            } => f.write_fmt(format_args!("{method}({})", list(args))),
            New(class, args) => f.write_fmt(format_args!("new {class}({})", list(args))),
            Index(e, i) => f.write_fmt(format_args!("{e}[{i}]")),
            Unary(op, e) => f.write_fmt(format_args!("{op}{e}")),
            Postfix(e, op) => f.write_fmt(format_args!("{e}{op}")),
            Binary(l, op, r) => f.write_fmt(format_args!("{l} {op} {r}")),
            Assign(l, op, r) => f.write_fmt(format_args!("{l} {op} {r}")),
            Conditional(c, t, e) => f.write_fmt(format_args!("{c} ? {t} : {e}")),
            Paren(e) => f.write_fmt(format_args!("({e})")),
            Meta(s) => f.write_fmt(format_args!("#{s}")),
            Rest(s) => f.write_fmt(format_args!("#{s}...")),
            AnyOf(alts) => f.write_fmt(format_args!("#any({})", list(alts))),
        }
    }
}

/// A local variable declaration, e.g., `int i = 0`.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Local {
    pub ty: Symbol,
    pub name: Ident,
    pub init: Option<Expr>,
}

impl Local {
    pub fn new(ty: Symbol, name: impl Into<Ident>, init: Option<Expr>) -> Self {
        Self {
            ty,
            name: name.into(),
            init,
        }
    }
}

/// Print without the terminating semicolon (as in a `for` header).
impl fmt::Display for Local {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Local { ty, name, init } = self;
        match init {
            Some(init) => f.write_fmt(format_args!("{ty} {name} = {init}")),
            None => f.write_fmt(format_args!("{ty} {name}")),
        }
    }
}

/// A brace-delimited sequence of statements.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

impl Block {
    pub fn new(stmts: impl IntoIterator<Item = Stmt>) -> Self {
        Self {
            stmts: stmts.into_iter().collect(),
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.stmts.is_empty() {
            f.write_str("{}")
        } else {
            f.write_fmt(format_args!(
                "{{ {} }}",
                self.stmts
                    .iter()
                    .map(|s| s.to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            ))
        }
    }
}

/// One `catch (T e) { ... }` clause of a `try` statement.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Catch {
    pub ty: Symbol,
    pub name: Ident,
    pub body: Block,
}

impl fmt::Display for Catch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Catch { ty, name, body } = self;
        f.write_fmt(format_args!("catch ({ty} {name}) {body}"))
    }
}

/// Statements.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Stmt {
    Empty,
    Expr(Expr),
    Local(Local),
    Block(Block),
    If {
        cond: Expr,
        then: Box<Stmt>,
        otherwise: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        cond: Expr,
    },
    For {
        init: Vec<Stmt>,
        cond: Option<Expr>,
        update: Vec<Expr>,
        body: Box<Stmt>,
    },
    ForEach {
        ty: Symbol,
        name: Ident,
        iterable: Expr,
        body: Box<Stmt>,
    },
    Break(Option<Ident>),
    Continue(Option<Ident>),
    Return(Option<Expr>),
    Throw(Expr),
    Labeled(Ident, Box<Stmt>),
    Try {
        body: Block,
        catches: Vec<Catch>,
        finally: Option<Block>,
    },

    /// A hole standing for any one statement.
    Meta(Symbol),

    /// A hole standing for the rest of a statement list.
    Rest(Symbol),
}

impl Stmt {
    pub fn meta(s: &str) -> Self {
        Self::Meta(Symbol::from(s))
    }

    pub fn block(stmts: impl IntoIterator<Item = Stmt>) -> Self {
        Self::Block(Block::new(stmts))
    }

    /// Boxing constructor.
    pub fn r#if(cond: Expr, then: Stmt, otherwise: Option<Stmt>) -> Self {
        Self::If {
            cond,
            then: Box::new(then),
            otherwise: otherwise.map(Box::new),
        }
    }

    /// Boxing constructor.
    pub fn r#while(cond: Expr, body: Stmt) -> Self {
        Self::While {
            cond,
            body: Box::new(body),
        }
    }

    /// Boxing constructor.
    pub fn do_while(body: Stmt, cond: Expr) -> Self {
        Self::DoWhile {
            body: Box::new(body),
            cond,
        }
    }

    /// Boxing constructor.
    pub fn r#for(
        init: impl IntoIterator<Item = Stmt>,
        cond: Option<Expr>,
        update: impl IntoIterator<Item = Expr>,
        body: Stmt,
    ) -> Self {
        Self::For {
            init: init.into_iter().collect(),
            cond,
            update: update.into_iter().collect(),
            body: Box::new(body),
        }
    }

    /// Boxing constructor.
    pub fn for_each(ty: Symbol, name: impl Into<Ident>, iterable: Expr, body: Stmt) -> Self {
        Self::ForEach {
            ty,
            name: name.into(),
            iterable,
            body: Box::new(body),
        }
    }

    /// Boxing constructor.
    pub fn labeled(label: impl Into<Ident>, s: Stmt) -> Self {
        Self::Labeled(label.into(), Box::new(s))
    }

    /// Render as an element of a `for` header: no semicolon.
    fn fmt_header(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expr(e) => fmt::Display::fmt(e, f),
            Self::Local(l) => fmt::Display::fmt(l, f),
            s => fmt::Display::fmt(s, f),
        }
    }
}

impl From<Expr> for Stmt {
    fn from(e: Expr) -> Self {
        Self::Expr(e)
    }
}

impl From<Block> for Stmt {
    fn from(b: Block) -> Self {
        Self::Block(b)
    }
}

struct Header<'a>(&'a [Stmt]);

impl fmt::Display for Header<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, s) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            s.fmt_header(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Stmt::*;
        match self {
            Empty => f.write_str(";"),
            Expr(e) => f.write_fmt(format_args!("{e};")),
            Local(l) => f.write_fmt(format_args!("{l};")),
            Block(b) => b.fmt(f),
            If {
                cond,
                then,
                otherwise: None,
            } => f.write_fmt(format_args!("if ({cond}) {then}")),
            If {
                cond,
                then,
                otherwise: Some(otherwise),
            } => f.write_fmt(format_args!("if ({cond}) {then} else {otherwise}")),
            While { cond, body } => f.write_fmt(format_args!("while ({cond}) {body}")),
            DoWhile { body, cond } => f.write_fmt(format_args!("do {body} while ({cond});")),
            For {
                init,
                cond,
                update,
                body,
            } => f.write_fmt(format_args!(
                "for ({}; {}; {}) {body}",
                Header(init),
                cond.as_ref().map(|c| c.to_string()).unwrap_or_default(),
                list(update),
            )),
            ForEach {
                ty,
                name,
                iterable,
                body,
            } => f.write_fmt(format_args!("for ({ty} {name} : {iterable}) {body}")),
            Break(None) => f.write_str("break;"),
            Break(Some(l)) => f.write_fmt(format_args!("break {l};")),
            Continue(None) => f.write_str("continue;"),
            Continue(Some(l)) => f.write_fmt(format_args!("continue {l};")),
            Return(None) => f.write_str("return;"),
            Return(Some(e)) => f.write_fmt(format_args!("return {e};")),
            Throw(e) => f.write_fmt(format_args!("throw {e};")),
            Labeled(l, s) => f.write_fmt(format_args!("{l}: {s}")),
            Try {
                body,
                catches,
                finally,
            } => {
                f.write_fmt(format_args!("try {body}"))?;
                for c in catches {
                    f.write_fmt(format_args!(" {c}"))?;
                }
                if let Some(finally) = finally {
                    f.write_fmt(format_args!(" finally {finally}"))?;
                }
                Ok(())
            }
            Meta(s) => f.write_fmt(format_args!("#{s}")),
            Rest(s) => f.write_fmt(format_args!("#{s}...")),
        }
    }
}

/// The unit of matching and rewriting: an expression or a statement.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Tree {
    Expr(Expr),
    Stmt(Stmt),
}

impl From<Expr> for Tree {
    fn from(e: Expr) -> Self {
        Self::Expr(e)
    }
}

impl From<Stmt> for Tree {
    fn from(s: Stmt) -> Self {
        Self::Stmt(s)
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expr(e) => e.fmt(f),
            Self::Stmt(s) => s.fmt(f),
        }
    }
}

/// The syntactic category of a metavariable leaf.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum HoleKind {
    Expr,
    Stmt,
    Ident,
    Exprs,
    Stmts,
}

impl fmt::Display for HoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Expr => "expression",
            Self::Stmt => "statement",
            Self::Ident => "identifier",
            Self::Exprs => "expression list",
            Self::Stmts => "statement list",
        })
    }
}

/// Things that may go wrong reading a tree from a string.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum SyntaxError {
    #[error("can't lex input at `{0}`")]
    Lex(String),

    #[error("can't parse input: {0}")]
    Parse(String),
}

/// Render syntax as Rust tokens.
/// See the `stencil!` proc macro parser.
#[cfg(feature = "to-rust")]
mod to_rust {
    use proc_macro2::TokenStream;
    use quote::{quote, ToTokens};

    use super::*;

    fn boxed<T: ToTokens>(t: &T) -> TokenStream {
        quote!(::std::boxed::Box::new(#t))
    }

    fn option<T: ToTokens>(o: &Option<T>) -> TokenStream {
        match o {
            Some(t) => quote!(::std::option::Option::Some(#t)),
            None => quote!(::std::option::Option::None),
        }
    }

    fn option_boxed<T: ToTokens>(o: &Option<Box<T>>) -> TokenStream {
        match o {
            Some(t) => {
                let t = boxed(&**t);
                quote!(::std::option::Option::Some(#t))
            }
            None => quote!(::std::option::Option::None),
        }
    }

    impl ToTokens for Symbol {
        fn to_tokens(&self, tokens: &mut TokenStream) {
            let name = self.name();
            tokens.extend(quote!(::stencil_syntax::Symbol::from(#name)));
        }
    }

    impl ToTokens for Path {
        fn to_tokens(&self, tokens: &mut TokenStream) {
            let segments = self.segments();
            tokens.extend(quote!(::stencil_syntax::Path::new([#(#segments),*])));
        }
    }

    impl ToTokens for Ident {
        fn to_tokens(&self, tokens: &mut TokenStream) {
            tokens.extend(match self {
                Ident::Name(s) => quote!(::stencil_syntax::Ident::Name(#s)),
                Ident::Meta(s) => quote!(::stencil_syntax::Ident::Meta(#s)),
            });
        }
    }

    impl ToTokens for Lit {
        fn to_tokens(&self, tokens: &mut TokenStream) {
            tokens.extend(match self {
                Lit::Int(i) => quote!(::stencil_syntax::Lit::Int(#i)),
                Lit::Bool(b) => quote!(::stencil_syntax::Lit::Bool(#b)),
                Lit::Str(s) => quote!(::stencil_syntax::Lit::Str(::std::string::String::from(#s))),
                Lit::Null => quote!(::stencil_syntax::Lit::Null),
            });
        }
    }

    impl ToTokens for UnaryOp {
        fn to_tokens(&self, tokens: &mut TokenStream) {
            tokens.extend(match self {
                UnaryOp::Neg => quote!(::stencil_syntax::UnaryOp::Neg),
                UnaryOp::Not => quote!(::stencil_syntax::UnaryOp::Not),
                UnaryOp::Inc => quote!(::stencil_syntax::UnaryOp::Inc),
                UnaryOp::Dec => quote!(::stencil_syntax::UnaryOp::Dec),
            });
        }
    }

    impl ToTokens for PostfixOp {
        fn to_tokens(&self, tokens: &mut TokenStream) {
            tokens.extend(match self {
                PostfixOp::Inc => quote!(::stencil_syntax::PostfixOp::Inc),
                PostfixOp::Dec => quote!(::stencil_syntax::PostfixOp::Dec),
            });
        }
    }

    impl ToTokens for BinOp {
        fn to_tokens(&self, tokens: &mut TokenStream) {
            tokens.extend(match self {
                BinOp::Or => quote!(::stencil_syntax::BinOp::Or),
                BinOp::And => quote!(::stencil_syntax::BinOp::And),
                BinOp::Eq => quote!(::stencil_syntax::BinOp::Eq),
                BinOp::Ne => quote!(::stencil_syntax::BinOp::Ne),
                BinOp::Lt => quote!(::stencil_syntax::BinOp::Lt),
                BinOp::Gt => quote!(::stencil_syntax::BinOp::Gt),
                BinOp::Le => quote!(::stencil_syntax::BinOp::Le),
                BinOp::Ge => quote!(::stencil_syntax::BinOp::Ge),
                BinOp::Add => quote!(::stencil_syntax::BinOp::Add),
                BinOp::Sub => quote!(::stencil_syntax::BinOp::Sub),
                BinOp::Mul => quote!(::stencil_syntax::BinOp::Mul),
                BinOp::Div => quote!(::stencil_syntax::BinOp::Div),
                BinOp::Rem => quote!(::stencil_syntax::BinOp::Rem),
            });
        }
    }

    impl ToTokens for AssignOp {
        fn to_tokens(&self, tokens: &mut TokenStream) {
            tokens.extend(match self {
                AssignOp::Assign => quote!(::stencil_syntax::AssignOp::Assign),
                AssignOp::Add => quote!(::stencil_syntax::AssignOp::Add),
                AssignOp::Sub => quote!(::stencil_syntax::AssignOp::Sub),
                AssignOp::Mul => quote!(::stencil_syntax::AssignOp::Mul),
                AssignOp::Div => quote!(::stencil_syntax::AssignOp::Div),
                AssignOp::Rem => quote!(::stencil_syntax::AssignOp::Rem),
            });
        }
    }

    impl ToTokens for Expr {
        fn to_tokens(&self, tokens: &mut TokenStream) {
            tokens.extend(match self {
                Expr::Lit(l) => quote!(::stencil_syntax::Expr::Lit(#l)),
                Expr::Name(s) => quote!(::stencil_syntax::Expr::Name(#s)),
                Expr::Class(p) => quote!(::stencil_syntax::Expr::Class(#p)),
                Expr::Field(e, i) => {
                    let e = boxed(&**e);
                    quote!(::stencil_syntax::Expr::Field(#e, #i))
                }
                Expr::Call {
                    receiver,
                    method,
                    args,
                } => {
                    let receiver = option_boxed(receiver);
                    quote!(::stencil_syntax::Expr::Call {
                        receiver: #receiver,
                        method: #method,
                        args: ::std::vec![#(#args),*],
                    })
                }
                Expr::New(class, args) => {
                    quote!(::stencil_syntax::Expr::New(#class, ::std::vec![#(#args),*]))
                }
                Expr::Index(e, i) => {
                    quote!(::stencil_syntax::Expr::index(#e, #i))
                }
                Expr::Unary(op, e) => quote!(::stencil_syntax::Expr::unary(#op, #e)),
                Expr::Postfix(e, op) => quote!(::stencil_syntax::Expr::postfix(#e, #op)),
                Expr::Binary(l, op, r) => {
                    quote!(::stencil_syntax::Expr::binary(#l, #op, #r))
                }
                Expr::Assign(l, op, r) => {
                    quote!(::stencil_syntax::Expr::assign(#l, #op, #r))
                }
                Expr::Conditional(c, t, e) => {
                    quote!(::stencil_syntax::Expr::conditional(#c, #t, #e))
                }
                Expr::Paren(e) => quote!(::stencil_syntax::Expr::paren(#e)),
                Expr::Meta(s) => quote!(::stencil_syntax::Expr::Meta(#s)),
                Expr::Rest(s) => quote!(::stencil_syntax::Expr::Rest(#s)),
                Expr::AnyOf(alts) => {
                    quote!(::stencil_syntax::Expr::AnyOf(::std::vec![#(#alts),*]))
                }
            });
        }
    }

    impl ToTokens for Local {
        fn to_tokens(&self, tokens: &mut TokenStream) {
            let Local { ty, name, init } = self;
            let init = option(init);
            tokens.extend(quote!(::stencil_syntax::Local::new(#ty, #name, #init)));
        }
    }

    impl ToTokens for Block {
        fn to_tokens(&self, tokens: &mut TokenStream) {
            let stmts = &self.stmts;
            tokens.extend(quote!(::stencil_syntax::Block::new([#(#stmts),*])));
        }
    }

    impl ToTokens for Catch {
        fn to_tokens(&self, tokens: &mut TokenStream) {
            let Catch { ty, name, body } = self;
            tokens.extend(quote!(::stencil_syntax::Catch {
                ty: #ty,
                name: #name,
                body: #body,
            }));
        }
    }

    impl ToTokens for Stmt {
        fn to_tokens(&self, tokens: &mut TokenStream) {
            tokens.extend(match self {
                Stmt::Empty => quote!(::stencil_syntax::Stmt::Empty),
                Stmt::Expr(e) => quote!(::stencil_syntax::Stmt::Expr(#e)),
                Stmt::Local(l) => quote!(::stencil_syntax::Stmt::Local(#l)),
                Stmt::Block(b) => quote!(::stencil_syntax::Stmt::Block(#b)),
                Stmt::If {
                    cond,
                    then,
                    otherwise,
                } => {
                    let otherwise = option(&otherwise.as_deref());
                    quote!(::stencil_syntax::Stmt::r#if(#cond, #then, #otherwise))
                }
                Stmt::While { cond, body } => {
                    quote!(::stencil_syntax::Stmt::r#while(#cond, #body))
                }
                Stmt::DoWhile { body, cond } => {
                    quote!(::stencil_syntax::Stmt::do_while(#body, #cond))
                }
                Stmt::For {
                    init,
                    cond,
                    update,
                    body,
                } => {
                    let cond = option(cond);
                    quote!(::stencil_syntax::Stmt::r#for([#(#init),*], #cond, [#(#update),*], #body))
                }
                Stmt::ForEach {
                    ty,
                    name,
                    iterable,
                    body,
                } => {
                    quote!(::stencil_syntax::Stmt::for_each(#ty, #name, #iterable, #body))
                }
                Stmt::Break(l) => {
                    let l = option(l);
                    quote!(::stencil_syntax::Stmt::Break(#l))
                }
                Stmt::Continue(l) => {
                    let l = option(l);
                    quote!(::stencil_syntax::Stmt::Continue(#l))
                }
                Stmt::Return(e) => {
                    let e = option(e);
                    quote!(::stencil_syntax::Stmt::Return(#e))
                }
                Stmt::Throw(e) => quote!(::stencil_syntax::Stmt::Throw(#e)),
                Stmt::Labeled(l, s) => quote!(::stencil_syntax::Stmt::labeled(#l, #s)),
                Stmt::Try {
                    body,
                    catches,
                    finally,
                } => {
                    let finally = option(finally);
                    quote!(::stencil_syntax::Stmt::Try {
                        body: #body,
                        catches: ::std::vec![#(#catches),*],
                        finally: #finally,
                    })
                }
                Stmt::Meta(s) => quote!(::stencil_syntax::Stmt::Meta(#s)),
                Stmt::Rest(s) => quote!(::stencil_syntax::Stmt::Rest(#s)),
            });
        }
    }

    impl ToTokens for Tree {
        fn to_tokens(&self, tokens: &mut TokenStream) {
            tokens.extend(match self {
                Tree::Expr(e) => quote!(::stencil_syntax::Tree::Expr(#e)),
                Tree::Stmt(s) => quote!(::stencil_syntax::Tree::Stmt(#s)),
            });
        }
    }
}

/// These constructor macros can make tests involving syntactic elements
/// much more readable. They are *not* intended as a public interface,
/// and *should* be behind `#[cfg(test)]`, but [cargo can't currently
/// export test code across crates](https://github.com/rust-lang/cargo/issues/8379).
#[cfg(any(test, feature = "macros"))]
mod macros {
    #[macro_export]
    macro_rules! sym {
        ($name: ident) => {
            $crate::Symbol::from(stringify!($name))
        };
    }

    #[macro_export]
    macro_rules! name {
        ($name: ident) => {
            $crate::Expr::Name($crate::sym!($name))
        };
    }

    #[macro_export]
    macro_rules! meta {
        ($name: ident) => {
            $crate::Expr::Meta($crate::sym!($name))
        };
    }

    #[macro_export]
    macro_rules! lit {
        ($l: expr) => {
            $crate::Expr::Lit($l.into())
        };
    }

    #[macro_export]
    macro_rules! unary {
        ($op: ident, $e: expr) => {
            $crate::Expr::unary($crate::UnaryOp::$op, $e.into())
        };
    }

    #[macro_export]
    macro_rules! postfix {
        ($e: expr, $op: ident) => {
            $crate::Expr::postfix($e.into(), $crate::PostfixOp::$op)
        };
    }

    #[macro_export]
    macro_rules! binary {
        ($l: expr, $op: ident, $r: expr) => {
            $crate::Expr::binary($l.into(), $crate::BinOp::$op, $r.into())
        };
    }

    #[macro_export]
    macro_rules! assign {
        ($l: expr, $op: ident, $r: expr) => {
            $crate::Expr::assign($l.into(), $crate::AssignOp::$op, $r.into())
        };
    }

    #[macro_export]
    macro_rules! call {
        ($method: ident($($arg: expr),* $(,)?)) => {
            $crate::Expr::call(None, $crate::sym!($method), [$($arg.into()),*])
        };
        ($receiver: expr => $method: ident($($arg: expr),* $(,)?)) => {
            $crate::Expr::call(Some($receiver.into()), $crate::sym!($method), [$($arg.into()),*])
        };
    }

    #[macro_export]
    macro_rules! stmt {
        ($e: expr) => {
            $crate::Stmt::Expr($e.into())
        };
    }

    #[macro_export]
    macro_rules! block {
        ($($s: expr),* $(,)?) => {
            $crate::Stmt::block([$($s),*])
        };
    }
}
