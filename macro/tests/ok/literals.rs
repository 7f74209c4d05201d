use stencil_macro::stencil;
use stencil_syntax::{lit, Tree};

fn main() {
    assert_eq!(stencil!(42), Tree::Expr(lit!(42)));
    assert_eq!(stencil!(true), Tree::Expr(lit!(true)));
    assert_eq!(stencil!("a \"quoted\" string"), Tree::Expr(lit!("a \"quoted\" string")));
}
