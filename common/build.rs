// Resolves the short git commit hash at build time and exposes
// `BUILD_VERSION` (package version + hash) to the crate.

use std::process::Command;

fn main() {
    let commit_hash = match option_env!("FATURE_COMMIT_HASH") {
        Some(hash) => hash.get(0..7).unwrap_or(hash).to_string(),
        None => match Command::new("git")
            .args(["rev-parse", "--short", "HEAD"])
            .output()
        {
            Ok(output) if output.status.success() => {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            }
            // Not a git checkout (or git missing)
            _ => "unknown".to_string(),
        },
    };

    let build_version = format!("{}-{}", env!("CARGO_PKG_VERSION"), commit_hash);
    println!("cargo:rerun-if-env-changed=FATURE_COMMIT_HASH");
    println!("cargo:rustc-env=BUILD_VERSION={build_version}");
}
