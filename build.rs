// SPDX-License-Identifier: GPL-3.0-only

use std::process::Command;

fn main() {
    // Re-run build script if git HEAD changes
    println!("cargo::rerun-if-changed=.git/HEAD");
    println!("cargo::rerun-if-changed=.git/refs/tags");

    // Packagers can pin the version
    let version = std::env::var("HOLDCAM_VERSION").unwrap_or_else(|_| describe_version());

    println!("cargo::rustc-env=GIT_VERSION={}", version);
}

fn describe_version() -> String {
    // "v0.1.0" at a tag, "v0.1.0-5-gabcdef1" five commits later
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--match", "v*"])
        .output();

    let version = match output {
        Ok(output) if output.status.success() => {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        }
        // Outside a checkout (crates.io tarball) fall back to the package version
        _ => return env!("CARGO_PKG_VERSION").to_string(),
    };

    // Strip 'v' prefix if present
    let version = version.strip_prefix('v').unwrap_or(&version);

    // "0.1.0-5-gabcdef1" becomes "0.1.0+5.abcdef1"
    match version.rsplitn(3, '-').collect::<Vec<_>>()[..] {
        [hash, commits, base] => {
            let hash = hash.strip_prefix('g').unwrap_or(hash);
            format!("{}+{}.{}", base, commits, hash)
        }
        _ if version.contains('.') => version.to_string(),
        // `--always` printed a bare hash: no tags yet
        _ => format!("{}+{}", env!("CARGO_PKG_VERSION"), version),
    }
}
