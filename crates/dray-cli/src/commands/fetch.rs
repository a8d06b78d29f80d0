//! `dray fetch` command.
//!
//! Accepts either a package URL path (resolved through the registry) or a
//! direct tarball URL, then downloads and extracts it.

use std::path::Path;
use std::time::Duration;

use dray_core::{fetch_package, parse_package_url};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tokio::runtime::Runtime;

use crate::registry::Registry;

#[derive(Serialize)]
struct FetchResult {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    tarball_url: Option<String>,
    output_dir: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Download a package tarball and extract it into the output directory.
pub fn run(target: &str, output: &Path, registry_url: &str, json: bool) -> Result<()> {
    let runtime = Runtime::new().into_diagnostic()?;
    let outcome = runtime.block_on(fetch_target(target, output, registry_url));

    match outcome {
        Ok(tarball_url) => {
            if json {
                let result = FetchResult {
                    ok: true,
                    tarball_url: Some(tarball_url),
                    output_dir: output.display().to_string(),
                    error: None,
                };
                println!("{}", serde_json::to_string_pretty(&result).unwrap());
            } else {
                println!("extracted to {}", output.display());
            }
            Ok(())
        }
        Err(report) => {
            if json {
                let result = FetchResult {
                    ok: false,
                    tarball_url: None,
                    output_dir: output.display().to_string(),
                    error: Some(report.to_string()),
                };
                println!("{}", serde_json::to_string_pretty(&result).unwrap());
            } else {
                eprintln!("error: {report}");
            }
            std::process::exit(1);
        }
    }
}

async fn fetch_target(target: &str, output: &Path, registry_url: &str) -> Result<String> {
    let tarball_url = if target.starts_with('/') {
        let coords = parse_package_url(target)
            .ok_or_else(|| miette::miette!("Invalid package URL: {target}"))?;

        tracing::info!(
            package = %coords.package_name,
            version = %coords.version,
            "resolving tarball"
        );

        let registry = Registry::new(registry_url).into_diagnostic()?;
        registry
            .tarball_url(&coords.package_name, &coords.version)
            .await
            .into_diagnostic()?
    } else {
        target.to_string()
    };

    tracing::debug!(url = %tarball_url, "downloading");

    // No total timeout here: large tarballs stream for as long as they need
    let client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(5))
        .user_agent(concat!("dray/", env!("CARGO_PKG_VERSION")))
        .build()
        .into_diagnostic()?;

    fetch_package(&client, &tarball_url, output)
        .await
        .into_diagnostic()?;

    tracing::info!(dir = %output.display(), "extraction complete");

    Ok(tarball_url)
}
