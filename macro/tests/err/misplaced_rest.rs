use stencil_macro::stencil;

fn main() {
    let _ = stencil!(f(#xs..., #y));
}
