//! Build script for the storefront crate.
//!
//! Fingerprints the static assets so the page can reference
//! `main.<hash>.css` and `store.<hash>.js` and serve them as immutable.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

/// `(path under static/, env var receiving the hash)`
const ASSETS: [(&str, &str); 2] = [("css/main.css", "CSS_HASH"), ("js/store.js", "JS_HASH")];

fn main() {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");
    let static_dir = Path::new(&manifest_dir).join("static");

    for (asset, var) in ASSETS {
        fingerprint(&static_dir, asset, var);
    }
}

/// Copy `asset` to `<dir>/derived/<stem>.<hash>.<ext>` and export the hash.
fn fingerprint(static_dir: &Path, asset: &str, var: &str) {
    let source = static_dir.join(asset);
    println!("cargo:rerun-if-changed={}", source.display());

    let content = match fs::read(&source) {
        Ok(content) => content,
        Err(e) => {
            println!("cargo:warning=Could not read {asset}: {e}");
            println!("cargo:rustc-env={var}=");
            return;
        }
    };

    let digest = format!("{:x}", Sha256::digest(&content));
    let short_hash = &digest[..8];
    println!("cargo:rustc-env={var}={short_hash}");

    let (Some(dir), Some(stem), Some(ext)) = (
        source.parent(),
        source.file_stem().and_then(|s| s.to_str()),
        source.extension().and_then(|s| s.to_str()),
    ) else {
        println!("cargo:warning=Unexpected asset path: {asset}");
        return;
    };

    let derived_dir = dir.join("derived");
    fs::create_dir_all(&derived_dir).expect("Failed to create derived asset directory");
    fs::copy(&source, derived_dir.join(format!("{stem}.{short_hash}.{ext}")))
        .expect("Failed to copy asset to derived directory");
}
