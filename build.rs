use std::env;
use std::process::Command;
use time::OffsetDateTime;

/// Exact git tag for HEAD, when there is one
fn exact_git_tag() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--exact-match"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|s| s.trim().to_string())
}

fn main() {
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");
    println!("cargo:rerun-if-env-changed=CARGO_PKG_VERSION");

    // Reproducible builds pin the year through SOURCE_DATE_EPOCH
    let build_year = env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|raw| raw.parse::<i64>().ok())
        .and_then(|epoch| OffsetDateTime::from_unix_timestamp(epoch).ok())
        .map(|dt| dt.year())
        .unwrap_or_else(|| OffsetDateTime::now_utc().year());

    let version = env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".to_string());
    let release = env::var("PROFILE").is_ok_and(|p| p == "release");

    // Untagged debug builds are marked -dev
    let display_version = if release {
        version.clone()
    } else {
        println!("cargo:rerun-if-changed=.git/HEAD");
        println!("cargo:rerun-if-changed=.git/refs/tags");
        match exact_git_tag() {
            Some(tag) if tag == format!("v{version}") => version.clone(),
            _ => format!("{version}-dev"),
        }
    };

    println!("cargo:rustc-env=APP_BUILD_YEAR={build_year}");
    println!("cargo:rustc-env=APP_VERSION_DISPLAY={display_version}");
}
