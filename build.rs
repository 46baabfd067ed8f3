use std::process::Command;

fn main() {
    println!("cargo:rerun-if-env-changed=RUSTC");

    let rustc = std::env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    let output = Command::new(rustc).arg("--version").output();

    // "rustc 1.85.0 (4d91de4e4 2025-02-17)" -> "1.85.0"
    let version = match output {
        Ok(o) if o.status.success() => String::from_utf8(o.stdout)
            .unwrap_or_default()
            .split_whitespace()
            .nth(1)
            .map(str::to_string)
            .unwrap_or_else(|| "unknown".to_string()),
        _ => "unknown".to_string(),
    };

    println!("cargo:rustc-env=VETCH_RUSTC_VERSION={}", version);
}
