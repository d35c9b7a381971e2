//! Build script for the Curricula CLI.
//!
//! Injects build metadata into the compilation so the version string can carry
//! the build number, the build status and the build date. Release pipelines set
//! the corresponding environment variables; local builds fall back to the
//! placeholder values below.
//!
//! | Variable                 | Default                |
//! |--------------------------|------------------------|
//! | `CURRICULA_BUILD_NUMBER` | `0`                    |
//! | `CURRICULA_BUILD_STATUS` | `dirty`                |
//! | `CURRICULA_BUILD_DATE`   | `1970-01-01T00:00:00Z` |

use std::env;

const BUILD_METADATA: [(&str, &str); 3] = [
    ("CURRICULA_BUILD_NUMBER", "0"),
    ("CURRICULA_BUILD_STATUS", "dirty"),
    ("CURRICULA_BUILD_DATE", "1970-01-01T00:00:00Z"),
];

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    for (key, default) in BUILD_METADATA {
        // Re-run if the pipeline changes the value
        println!("cargo:rerun-if-env-changed={key}");

        let value = env::var(key)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default.to_string());
        println!("cargo:rustc-env={key}={value}");
    }
}
