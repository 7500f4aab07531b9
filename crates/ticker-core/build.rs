// File: crates/ticker-core/build.rs
// Summary: Build script linking the Windows system libraries Skia's font manager needs.

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    #[cfg(target_os = "windows")]
    {
        // RegOpenKeyExW and friends, used by the DirectWrite font manager.
        println!("cargo:rustc-link-lib=advapi32");
    }
}
