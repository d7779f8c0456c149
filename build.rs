use std::process::Command;

fn main() {
    // toolchain identifier for the version banner
    let rustc = std::env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    let version = Command::new(&rustc)
        .arg("--version")
        .output()
        .ok()
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "rustc unknown".to_string());
    println!("cargo:rustc-env=FTP_PROBE_RUSTC={version}");
    println!("cargo:rerun-if-env-changed=RUSTC");
}
