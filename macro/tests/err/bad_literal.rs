use stencil_macro::stencil;

fn main() {
    let _ = stencil!(1.5);
}
