//! `dray url` command.

use dray_core::create_package_url;
use miette::Result;
use serde::Serialize;

#[derive(Serialize)]
struct UrlResult {
    ok: bool,
    url: String,
}

/// Build a package URL from its parts.
pub fn run(
    name: &str,
    version: Option<&str>,
    filename: Option<&str>,
    search: Option<&str>,
    json: bool,
) -> Result<()> {
    let url = create_package_url(name, version, filename, search);

    if json {
        let result = UrlResult { ok: true, url };
        println!("{}", serde_json::to_string_pretty(&result).unwrap());
    } else {
        println!("{url}");
    }

    Ok(())
}
