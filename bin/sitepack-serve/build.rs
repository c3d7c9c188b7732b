use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-env-changed=SITEPACK_REGISTRY");

    let out = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo")).join("registry.rs");

    match env::var("SITEPACK_REGISTRY") {
        Ok(source) if !source.is_empty() => {
            println!("cargo:rerun-if-changed={source}");
            fs::copy(&source, &out)
                .unwrap_or_else(|e| panic!("cannot copy registry source {source}: {e}"));
        }
        _ => {
            println!(
                "cargo:warning=SITEPACK_REGISTRY is not set, embedding an empty asset registry"
            );
            fs::write(&out, "pub static ASSETS: &[(&str, &str)] = &[];\n")
                .expect("write empty registry source");
        }
    }
}
