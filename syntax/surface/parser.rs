//! Surface syntax parser.
//!
//! Recursive descent over surface tokens, with Pratt-style
//! precedence parsing for binary operators.

use nom::{
    branch::alt,
    bytes::complete::take,
    combinator::{eof, map, opt, peek, success, verify},
    error::{Error, ErrorKind},
    multi::{many0, separated_list0, separated_list1},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

use crate::{
    parse_token, AssignOp, BinOp, Block, Catch, Expr, Ident, Lit, Local, Parse, Path, Precedence,
    Stmt, Symbol, Token, Tokens, Tree, UnaryOp,
};

use super::lexer::SurfaceToken;

/// Local alias.
type Input<'a, S> = crate::parser::Input<'a, SurfaceToken, S>;

/// Surface syntax parser.
pub struct SurfaceParser;

impl<'a, S: Clone> Parse<'a, S> for SurfaceParser {
    type Token = SurfaceToken;
    type Tree = Tree;

    /// Parse a stream of surface tokens as a single expression or statement.
    /// An input that reads as both (e.g., `#x`) is an expression.
    fn parse(input: Input<'a, S>) -> IResult<Input<'a, S>, Self::Tree> {
        alt((
            map(terminated(expr, eof), Tree::Expr),
            map(terminated(stmt, eof), Tree::Stmt),
        ))(input)
    }
}

/// Define a parser combinator that recognizes a single token.
macro_rules! parse_surface_token {
    ($function: ident, $token: ident) => {
        parse_token!($function<SurfaceToken>, SurfaceToken::$token);
    };
}

parse_surface_token!(kw_if, If);
parse_surface_token!(kw_else, Else);
parse_surface_token!(kw_while, While);
parse_surface_token!(kw_do, Do);
parse_surface_token!(kw_for, For);
parse_surface_token!(kw_break, Break);
parse_surface_token!(kw_continue, Continue);
parse_surface_token!(kw_return, Return);
parse_surface_token!(kw_throw, Throw);
parse_surface_token!(kw_try, Try);
parse_surface_token!(kw_catch, Catch);
parse_surface_token!(kw_finally, Finally);
parse_surface_token!(kw_new, New);
parse_surface_token!(ellipsis, Ellipsis);
parse_surface_token!(dot, Dot);
parse_surface_token!(comma, Comma);
parse_surface_token!(semi, Semi);
parse_surface_token!(colon, Colon);
parse_surface_token!(query, Query);
parse_surface_token!(pound, Pound);
parse_surface_token!(at, At);
parse_surface_token!(bang, Bang);
parse_surface_token!(eq, Eq);
parse_surface_token!(eq_eq, EqEq);
parse_surface_token!(ne, Ne);
parse_surface_token!(lt, Lt);
parse_surface_token!(gt, Gt);
parse_surface_token!(le, Le);
parse_surface_token!(ge, Ge);
parse_surface_token!(and_and, AndAnd);
parse_surface_token!(or_or, OrOr);
parse_surface_token!(plus, Plus);
parse_surface_token!(minus, Dash);
parse_surface_token!(times, Star);
parse_surface_token!(over, Slash);
parse_surface_token!(percent, Percent);
parse_surface_token!(plus_plus, PlusPlus);
parse_surface_token!(minus_minus, DashDash);
parse_surface_token!(plus_eq, PlusEq);
parse_surface_token!(minus_eq, DashEq);
parse_surface_token!(times_eq, StarEq);
parse_surface_token!(over_eq, SlashEq);
parse_surface_token!(percent_eq, PercentEq);
parse_surface_token!(lparen, LParen);
parse_surface_token!(rparen, RParen);
parse_surface_token!(lbracket, LBracket);
parse_surface_token!(rbracket, RBracket);
parse_surface_token!(lbrace, LBrace);
parse_surface_token!(rbrace, RBrace);

fn fail<S: Clone>(input: Input<S>) -> nom::Err<Error<Input<S>>> {
    nom::Err::Error(Error::new(input, ErrorKind::Fail))
}

/// Take the next token, whatever it is.
fn next<S: Clone>(input: Input<S>) -> IResult<Input<S>, Input<S>> {
    take(1_usize)(input)
}

fn symbol<S: Clone>(input: Input<S>) -> IResult<Input<S>, Symbol> {
    let (rest, tokens) = next(input)?;
    match &tokens.tok[0].token {
        SurfaceToken::Ident(s) => Ok((rest, s.clone())),
        _ => Err(fail(input)),
    }
}

fn literal<S: Clone>(input: Input<S>) -> IResult<Input<S>, Lit> {
    let (rest, tokens) = next(input)?;
    match &tokens.tok[0].token {
        SurfaceToken::Integer(i) => Ok((rest, Lit::Int(*i))),
        SurfaceToken::String(s) => Ok((rest, Lit::Str(s.clone()))),
        SurfaceToken::True => Ok((rest, Lit::Bool(true))),
        SurfaceToken::False => Ok((rest, Lit::Bool(false))),
        SurfaceToken::Null => Ok((rest, Lit::Null)),
        _ => Err(fail(input)),
    }
}

/// The reserved word after `#` that introduces alternatives.
fn any<S: Clone>(input: Input<S>) -> IResult<Input<S>, Symbol> {
    verify(symbol, |s: &Symbol| s.name() == "any")(input)
}

/// A metavariable name: `#name`.
fn meta_name<S: Clone>(input: Input<S>) -> IResult<Input<S>, Symbol> {
    preceded(pound, verify(symbol, |s: &Symbol| s.name() != "any"))(input)
}

/// A list-capture metavariable name: `#name...`.
fn rest_name<S: Clone>(input: Input<S>) -> IResult<Input<S>, Symbol> {
    terminated(meta_name, ellipsis)(input)
}

fn ident<S: Clone>(input: Input<S>) -> IResult<Input<S>, Ident> {
    alt((map(meta_name, Ident::Meta), map(symbol, Ident::Name)))(input)
}

fn path<S: Clone>(input: Input<S>) -> IResult<Input<S>, Path> {
    map(separated_list1(dot, symbol), Path::new)(input)
}

/// An external class reference: `@{java.util.Objects}`.
fn class<S: Clone>(input: Input<S>) -> IResult<Input<S>, Path> {
    preceded(at, delimited(lbrace, path, rbrace))(input)
}

fn arguments<S: Clone>(input: Input<S>) -> IResult<Input<S>, Vec<Expr>> {
    delimited(lparen, separated_list0(comma, expr), rparen)(input)
}

fn primary<S: Clone>(input: Input<S>) -> IResult<Input<S>, Expr> {
    alt((
        map(literal, Expr::Lit),
        map(delimited(lparen, expr, rparen), Expr::paren),
        map(preceded(kw_new, pair(symbol, arguments)), |(class, args)| {
            Expr::New(class, args)
        }),
        map(
            preceded(
                pair(pound, any),
                delimited(lparen, separated_list1(comma, expr), rparen),
            ),
            Expr::AnyOf,
        ),
        map(rest_name, Expr::Rest),
        map(pair(ident, arguments), |(method, args)| {
            Expr::call(None, method, args)
        }),
        map(meta_name, Expr::Meta),
        map(class, Expr::Class),
        map(symbol, Expr::Name),
    ))(input)
}

/// What may follow a primary expression.
enum Selector {
    Member(Ident, Option<Vec<Expr>>),
    Index(Expr),
    Postfix(crate::PostfixOp),
}

fn selector<S: Clone>(input: Input<S>) -> IResult<Input<S>, Selector> {
    use crate::PostfixOp::*;
    alt((
        map(
            preceded(dot, pair(ident, opt(arguments))),
            |(member, args)| Selector::Member(member, args),
        ),
        map(delimited(lbracket, expr, rbracket), Selector::Index),
        map(plus_plus, |_| Selector::Postfix(Inc)),
        map(minus_minus, |_| Selector::Postfix(Dec)),
    ))(input)
}

fn postfix<S: Clone>(input: Input<S>) -> IResult<Input<S>, Expr> {
    let (input, base) = primary(input)?;
    let (input, selectors) = many0(selector)(input)?;
    Ok((
        input,
        selectors.into_iter().fold(base, |e, s| match s {
            Selector::Member(method, Some(args)) => Expr::call(Some(e), method, args),
            Selector::Member(field, None) => Expr::field(e, field),
            Selector::Index(i) => Expr::index(e, i),
            Selector::Postfix(op) => Expr::postfix(e, op),
        }),
    ))
}

fn unary<S: Clone>(input: Input<S>) -> IResult<Input<S>, Expr> {
    use UnaryOp::*;
    fn unary_op(op: UnaryOp) -> impl Fn(Expr) -> Expr {
        move |e| Expr::unary(op, e)
    }
    alt((
        map(preceded(minus, unary), unary_op(Neg)),
        map(preceded(bang, unary), unary_op(Not)),
        map(preceded(plus_plus, unary), unary_op(Inc)),
        map(preceded(minus_minus, unary), unary_op(Dec)),
        postfix,
    ))(input)
}

fn bin_op<S: Clone>(input: Input<S>) -> IResult<Input<S>, (Precedence, Option<BinOp>)> {
    use BinOp::*;
    map(
        alt((
            map(or_or, |_| Some(Or)),
            map(and_and, |_| Some(And)),
            map(eq_eq, |_| Some(Eq)),
            map(ne, |_| Some(Ne)),
            map(le, |_| Some(Le)),
            map(ge, |_| Some(Ge)),
            map(lt, |_| Some(Lt)),
            map(gt, |_| Some(Gt)),
            map(plus, |_| Some(Add)),
            map(minus, |_| Some(Sub)),
            map(times, |_| Some(Mul)),
            map(over, |_| Some(Div)),
            map(percent, |_| Some(Rem)),
            success(None),
        )),
        |op| match op {
            Some(op) => (op.precedence(), Some(op)),
            None => (Precedence::Lowest, None),
        },
    )(input)
}

fn infix<S: Clone>(input: Input<S>, left: Expr) -> IResult<Input<S>, Expr> {
    let (input, (precedence, op)) = bin_op(input)?;
    match op {
        Some(op) => {
            let (input, right) = pratt_left(input, precedence)?;
            Ok((input, Expr::binary(left, op, right)))
        }
        None => Err(fail(input)),
    }
}

fn pratt_right<S: Clone>(
    input: Input<S>,
    precedence: Precedence,
    left: Expr,
) -> IResult<Input<S>, Expr> {
    let (_, (ahead, _)) = bin_op(input)?;
    if ahead > precedence {
        let (input, left) = infix(input, left)?;
        pratt_right(input, precedence, left)
    } else {
        Ok((input, left))
    }
}

fn pratt_left<S: Clone>(input: Input<S>, precedence: Precedence) -> IResult<Input<S>, Expr> {
    let (input, left) = unary(input)?;
    pratt_right(input, precedence, left)
}

fn conditional<S: Clone>(input: Input<S>) -> IResult<Input<S>, Expr> {
    let (input, cond) = pratt_left(input, Precedence::Lowest)?;
    let (input, branches) =
        opt(pair(preceded(query, expr), preceded(colon, conditional)))(input)?;
    Ok((
        input,
        match branches {
            Some((then, otherwise)) => Expr::conditional(cond, then, otherwise),
            None => cond,
        },
    ))
}

fn assign_op<S: Clone>(input: Input<S>) -> IResult<Input<S>, AssignOp> {
    use AssignOp::*;
    alt((
        map(eq, |_| Assign),
        map(plus_eq, |_| Add),
        map(minus_eq, |_| Sub),
        map(times_eq, |_| Mul),
        map(over_eq, |_| Div),
        map(percent_eq, |_| Rem),
    ))(input)
}

/// Assignment is right associative and binds loosest.
pub(crate) fn expr<S: Clone>(input: Input<S>) -> IResult<Input<S>, Expr> {
    let (input, left) = conditional(input)?;
    let (input, right) = opt(pair(assign_op, expr))(input)?;
    Ok((
        input,
        match right {
            Some((op, right)) => Expr::assign(left, op, right),
            None => left,
        },
    ))
}

fn block<S: Clone>(input: Input<S>) -> IResult<Input<S>, Block> {
    map(delimited(lbrace, many0(stmt), rbrace), Block::new)(input)
}

fn condition<S: Clone>(input: Input<S>) -> IResult<Input<S>, Expr> {
    delimited(lparen, expr, rparen)(input)
}

/// A declaration without its semicolon: `int i = 0`.
fn local<S: Clone>(input: Input<S>) -> IResult<Input<S>, Local> {
    map(
        tuple((symbol, ident, opt(preceded(eq, expr)))),
        |(ty, name, init)| Local::new(ty, name, init),
    )(input)
}

fn if_stmt<S: Clone>(input: Input<S>) -> IResult<Input<S>, Stmt> {
    map(
        tuple((
            preceded(kw_if, condition),
            stmt,
            opt(preceded(kw_else, stmt)),
        )),
        |(cond, then, otherwise)| Stmt::r#if(cond, then, otherwise),
    )(input)
}

fn while_stmt<S: Clone>(input: Input<S>) -> IResult<Input<S>, Stmt> {
    map(preceded(kw_while, pair(condition, stmt)), |(cond, body)| {
        Stmt::r#while(cond, body)
    })(input)
}

fn do_while_stmt<S: Clone>(input: Input<S>) -> IResult<Input<S>, Stmt> {
    map(
        pair(
            preceded(kw_do, stmt),
            delimited(kw_while, condition, semi),
        ),
        |(body, cond)| Stmt::do_while(body, cond),
    )(input)
}

/// One element of a `for` initializer: a declaration,
/// a statement hole, or an expression.
fn for_init<S: Clone>(input: Input<S>) -> IResult<Input<S>, Stmt> {
    alt((
        map(local, Stmt::Local),
        map(rest_name, Stmt::Rest),
        map(terminated(meta_name, peek(alt((semi, comma)))), Stmt::Meta),
        map(expr, Stmt::Expr),
    ))(input)
}

fn for_stmt<S: Clone>(input: Input<S>) -> IResult<Input<S>, Stmt> {
    map(
        pair(
            preceded(
                kw_for,
                delimited(
                    lparen,
                    tuple((
                        separated_list0(comma, for_init),
                        preceded(semi, opt(expr)),
                        preceded(semi, separated_list0(comma, expr)),
                    )),
                    rparen,
                ),
            ),
            stmt,
        ),
        |((init, cond, update), body)| Stmt::r#for(init, cond, update, body),
    )(input)
}

fn for_each_stmt<S: Clone>(input: Input<S>) -> IResult<Input<S>, Stmt> {
    map(
        pair(
            preceded(
                kw_for,
                delimited(
                    lparen,
                    tuple((symbol, ident, preceded(colon, expr))),
                    rparen,
                ),
            ),
            stmt,
        ),
        |((ty, name, iterable), body)| Stmt::for_each(ty, name, iterable, body),
    )(input)
}

fn catch_clause<S: Clone>(input: Input<S>) -> IResult<Input<S>, Catch> {
    map(
        pair(
            preceded(kw_catch, delimited(lparen, pair(symbol, ident), rparen)),
            block,
        ),
        |((ty, name), body)| Catch { ty, name, body },
    )(input)
}

fn try_stmt<S: Clone>(input: Input<S>) -> IResult<Input<S>, Stmt> {
    map(
        tuple((
            preceded(kw_try, block),
            many0(catch_clause),
            opt(preceded(kw_finally, block)),
        )),
        |(body, catches, finally)| Stmt::Try {
            body,
            catches,
            finally,
        },
    )(input)
}

pub(crate) fn stmt<S: Clone>(input: Input<S>) -> IResult<Input<S>, Stmt> {
    alt((
        map(block, Stmt::Block),
        if_stmt,
        while_stmt,
        do_while_stmt,
        for_each_stmt,
        for_stmt,
        map(delimited(kw_break, opt(ident), semi), Stmt::Break),
        map(delimited(kw_continue, opt(ident), semi), Stmt::Continue),
        map(delimited(kw_return, opt(expr), semi), Stmt::Return),
        map(delimited(kw_throw, expr, semi), Stmt::Throw),
        try_stmt,
        map(pair(terminated(ident, colon), stmt), |(label, s)| {
            Stmt::labeled(label, s)
        }),
        map(terminated(local, semi), Stmt::Local),
        map(terminated(rest_name, opt(semi)), Stmt::Rest),
        map(terminated(meta_name, semi), Stmt::Meta),
        map(terminated(expr, semi), Stmt::Expr),
        // A statement hole needs no semicolon, e.g., as a loop body.
        map(meta_name, Stmt::Meta),
        map(semi, |_| Stmt::Empty),
    ))(input)
}

#[cfg(test)]
mod test {
    use crate::*;

    /// Parse a string, or die trying.
    fn tree(s: &str) -> Tree {
        parse_tree(s).unwrap_or_else(|e| panic!("can't parse `{s}`: {e}"))
    }

    macro_rules! assert_parse {
        ($input: expr, $expected: expr) => {
            assert_eq!(tree($input), Tree::from($expected), "{}", $input);
        };
    }

    #[test]
    fn precedence() {
        assert_parse!(
            "a + b * c",
            binary!(name!(a), Add, binary!(name!(b), Mul, name!(c)))
        );
        assert_parse!(
            "a * b + c",
            binary!(binary!(name!(a), Mul, name!(b)), Add, name!(c))
        );
        assert_parse!(
            "a - b - c",
            binary!(binary!(name!(a), Sub, name!(b)), Sub, name!(c))
        );
        assert_parse!(
            "a < b && c || d",
            binary!(
                binary!(binary!(name!(a), Lt, name!(b)), And, name!(c)),
                Or,
                name!(d)
            )
        );
        assert_parse!(
            "(a + b) * c",
            binary!(Expr::paren(binary!(name!(a), Add, name!(b))), Mul, name!(c))
        );
    }

    #[test]
    fn assignment() {
        assert_parse!(
            "a = b = 0",
            assign!(name!(a), Assign, assign!(name!(b), Assign, lit!(0)))
        );
        assert_parse!("sum += i", assign!(name!(sum), Add, name!(i)));
        assert_parse!(
            "x = c ? 1 : -1",
            assign!(
                name!(x),
                Assign,
                Expr::conditional(name!(c), lit!(1), unary!(Neg, lit!(1)))
            )
        );
    }

    #[test]
    fn postfix_and_members() {
        assert_parse!("i++", postfix!(name!(i), Inc));
        assert_parse!("--i", unary!(Dec, name!(i)));
        assert_parse!(
            "a.b.c(d)[0]",
            Expr::index(
                call!(Expr::field(name!(a), "b") => c(name!(d))),
                lit!(0)
            )
        );
        assert_parse!("new Foo(1, \"x\")", Expr::New(sym!(Foo), vec![lit!(1), lit!("x")]));
        assert_parse!("!done", unary!(Not, name!(done)));
        assert_parse!("null", lit!(Lit::Null));
    }

    #[test]
    fn holes() {
        assert_parse!("#a", meta!(a));
        assert_parse!("f(#a, #a)", call!(f(meta!(a), meta!(a))));
        assert_parse!(
            "f(#x, #rest...)",
            call!(f(meta!(x), Expr::Rest(sym!(rest))))
        );
        assert_parse!(
            "#recv.#m(#args...)",
            Expr::call(
                Some(meta!(recv)),
                Ident::Meta(sym!(m)),
                [Expr::Rest(sym!(args))]
            )
        );
        assert_parse!(
            "#any(#a + 1, 1 + #a)",
            Expr::AnyOf(vec![
                binary!(meta!(a), Add, lit!(1)),
                binary!(lit!(1), Add, meta!(a))
            ])
        );
        assert_parse!(
            "@{java.util.Objects}.equals(#a, #b)",
            call!(Expr::Class(Path::from("java.util.Objects")) => equals(meta!(a), meta!(b)))
        );
        assert_parse!("#s;", Stmt::meta("s"));
        assert_parse!("#s = 1;", stmt!(assign!(meta!(s), Assign, lit!(1))));
        assert_parse!(
            "{ #first; #rest... }",
            block![Stmt::meta("first"), Stmt::Rest(sym!(rest))]
        );
    }

    #[test]
    fn for_loops() {
        assert_parse!(
            "for (i = 0; i < n; i++) { sum += i; }",
            Stmt::r#for(
                [stmt!(assign!(name!(i), Assign, lit!(0)))],
                Some(binary!(name!(i), Lt, name!(n))),
                [postfix!(name!(i), Inc)],
                block![stmt!(assign!(name!(sum), Add, name!(i)))]
            )
        );
        assert_parse!(
            "for (#init; #cond; #update) #body",
            Stmt::r#for(
                [Stmt::meta("init")],
                Some(meta!(cond)),
                [meta!(update)],
                Stmt::meta("body")
            )
        );
        assert_parse!(
            "for (int i = 0, j = 1; ; ) ;",
            Stmt::r#for(
                [
                    Stmt::Local(Local::new(sym!(int), "i", Some(lit!(0)))),
                    stmt!(assign!(name!(j), Assign, lit!(1)))
                ],
                None,
                [],
                Stmt::Empty
            )
        );
        assert_parse!(
            "for (String s : names) print(s);",
            Stmt::for_each(
                sym!(String),
                "s",
                name!(names),
                stmt!(call!(print(name!(s))))
            )
        );
    }

    #[test]
    fn control_flow() {
        assert_parse!("break;", Stmt::Break(None));
        assert_parse!("break outer;", Stmt::Break(Some(Ident::from("outer"))));
        assert_parse!("continue #l;", Stmt::Continue(Some(Ident::Meta(sym!(l)))));
        assert_parse!("return;", Stmt::Return(None));
        assert_parse!("throw e;", Stmt::Throw(name!(e)));
        assert_parse!(
            "outer: while (true) break outer;",
            Stmt::labeled(
                "outer",
                Stmt::r#while(lit!(true), Stmt::Break(Some(Ident::from("outer"))))
            )
        );
        assert_parse!(
            "if (a) b(); else { c(); }",
            Stmt::r#if(
                name!(a),
                stmt!(call!(b())),
                Some(block![stmt!(call!(c()))])
            )
        );
        assert_parse!(
            "do x--; while (x > 0);",
            Stmt::do_while(stmt!(postfix!(name!(x), Dec)), binary!(name!(x), Gt, lit!(0)))
        );
        assert_parse!(
            "try { f(); } catch (E e) {} finally { g(); }",
            Stmt::Try {
                body: Block::new([stmt!(call!(f()))]),
                catches: vec![Catch {
                    ty: sym!(E),
                    name: Ident::from("e"),
                    body: Block::default(),
                }],
                finally: Some(Block::new([stmt!(call!(g()))])),
            }
        );
    }

    #[test]
    fn display_reparses() {
        for s in [
            "for (i = 0; i < n; i++) { sum += i; }",
            "for (int i = 0; i < xs.length; i += 2) {}",
            "if (a == null) return; else throw new Error(\"a\\n\");",
            "try { #body... } catch (Exception #e) { log(#e); }",
            "lbl: do { x = f(x, #xs...); } while (!(x >= 10));",
            "@{java.util.Objects}.equals(#a, #b)",
            "#any(a.b, c[d])",
        ] {
            assert_eq!(tree(s).to_string(), s);
        }
    }

    #[test]
    fn errors() {
        assert!(parse_tree("for (;;").is_err());
        assert!(parse_tree("a +").is_err());
        assert!(parse_tree("a b c").is_err());
        assert!(parse_stmt("f(x)").is_err(), "missing semicolon");
        assert!(parse_tree("#any()").is_err(), "no alternatives");
        assert!(matches!(parse_tree("x ` y"), Err(SyntaxError::Lex(_))));
    }
}
