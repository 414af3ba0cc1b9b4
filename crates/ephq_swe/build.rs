//! Build script for ephq_swe
//!
//! Locates the Swiss Ephemeris C library (`libswe`). When it cannot be
//! found the crate still builds, without the backend; `acquire_engine`
//! then reports `SweError::NotLinked`.

use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=SWE_LIB_DIR");
    println!("cargo::rustc-check-cfg=cfg(swe_linked)");

    if find_library() {
        println!("cargo:rustc-cfg=swe_linked");
    } else {
        println!("cargo:warning=libswe not found; building ephq_swe without the Swiss Ephemeris backend");
        println!("cargo:warning=set SWE_LIB_DIR or install swisseph with a pkg-config file");
    }
}

fn find_library() -> bool {
    // Strategy 1: explicit directory
    if let Ok(lib_dir) = env::var("SWE_LIB_DIR") {
        println!("cargo:rustc-link-search=native={lib_dir}");
        println!("cargo:rustc-link-lib=swe");
        return true;
    }

    // Strategy 2: pkg-config, under either name distributions use
    for name in ["swisseph", "libswe"] {
        if pkg_config::Config::new().probe(name).is_ok() {
            println!("cargo:info=Found {name} via pkg-config");
            return true;
        }
    }

    // Strategy 3: common install locations
    let search_paths = [
        "/usr/local/lib",
        "/usr/lib",
        "/usr/lib/x86_64-linux-gnu",
        "/usr/lib/aarch64-linux-gnu",
        "/opt/homebrew/lib",
    ];
    for path in &search_paths {
        let found = ["libswe.so", "libswe.a", "libswe.dylib"]
            .iter()
            .any(|f| PathBuf::from(path).join(f).exists());
        if found {
            println!("cargo:rustc-link-search=native={path}");
            println!("cargo:rustc-link-lib=swe");
            return true;
        }
    }

    false
}
