//! 生成 C 头文件 `include/macrotrack.h`
//!
//! 头文件放在源码目录下，供 C/移动端工程直接引用。

use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src/lib.rs");

    let crate_dir = env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let out = PathBuf::from(&crate_dir).join("include").join("macrotrack.h");

    let result = cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("MACROTRACK_H")
        .generate();

    // 头文件生成失败不影响库本身的编译
    match result {
        Ok(bindings) => {
            if let Some(dir) = out.parent() {
                if let Err(e) = std::fs::create_dir_all(dir) {
                    println!("cargo:warning=failed to create {}: {}", dir.display(), e);
                    return;
                }
            }
            let mut header = Vec::new();
            bindings.write(&mut header);
            if let Err(e) = std::fs::write(&out, header) {
                println!("cargo:warning=failed to write {}: {}", out.display(), e);
            }
        }
        Err(e) => println!("cargo:warning=cbindgen failed: {}", e),
    }
}
