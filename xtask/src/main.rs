fn main() -> nih_plug_xtask::Result<()> {
    // `cargo xtask bundle peaking_eq --release` builds the CLAP and VST3 bundles
    nih_plug_xtask::main()
}
