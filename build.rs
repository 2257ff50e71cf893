use std::fs;

// The snapshot format version is tied to the crate release recorded in VERSION.
fn main() {
    println!("cargo:rerun-if-changed=VERSION");

    let recorded = fs::read_to_string("VERSION")
        .expect("VERSION file not found - run: echo '0.1.0' > VERSION");
    let recorded = recorded.trim();
    let manifest = env!("CARGO_PKG_VERSION");

    if recorded != manifest {
        panic!(
            "\n\nVERSION MISMATCH\n  VERSION file: {}\n  Cargo.toml:   {}\n\nUpdate VERSION to {} before building.\n\n",
            recorded, manifest, manifest
        );
    }

    println!("cargo:rustc-env=BRIDGE_CACHE_RELEASE={}", recorded);
}
