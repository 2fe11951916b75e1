use std::env;

fn main() {
    // --- PROJ.4 C shim ---
    let mut build = cc::Build::new();
    build.file("csrc/proj4_shim.c");

    // Optional override for non-system installs; otherwise the default
    // compiler/linker search paths must find proj_api.h and libproj.
    if let Ok(include) = env::var("PROJ4_INCLUDE_PATH") {
        build.include(include);
    }
    build.compile("proj4_shim");

    if let Ok(lib) = env::var("PROJ4_LIB_PATH") {
        println!("cargo:rustc-link-search=native={lib}");
    }
    println!("cargo:rustc-link-lib=proj");

    // Re-run if the shim source changes
    println!("cargo:rerun-if-changed=csrc/proj4_shim.c");
    println!("cargo:rerun-if-env-changed=PROJ4_INCLUDE_PATH");
    println!("cargo:rerun-if-env-changed=PROJ4_LIB_PATH");
}
