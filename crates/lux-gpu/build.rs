fn main() {
    // Recompile when the embedded shader library changes
    println!("cargo:rerun-if-changed=shaders/");
    println!("cargo:rerun-if-changed=shaders/lpv_sample.wgsl");
}
