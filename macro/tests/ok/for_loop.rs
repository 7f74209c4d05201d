use stencil_macro::stencil;
use stencil_syntax::parse_tree;

fn main() {
    let tree = stencil! {
        for (int #i = 0; #i < #xs.size(); #i++) {
            #body...
        }
    };
    assert_eq!(
        Ok(tree),
        parse_tree("for (int #i = 0; #i < #xs.size(); #i++) { #body... }")
    );
}
