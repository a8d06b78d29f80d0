//! `dray parse` command.

use dray_core::{parse_package_url, PackageCoordinates};
use miette::Result;
use serde::Serialize;

#[derive(Serialize)]
struct ParseResult<'a> {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    coordinates: Option<&'a PackageCoordinates>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Parse a package URL and report its coordinates.
pub fn run(url: &str, json: bool) -> Result<()> {
    match parse_package_url(url) {
        Some(coordinates) => {
            if json {
                let result = ParseResult {
                    ok: true,
                    coordinates: Some(&coordinates),
                    error: None,
                };
                println!("{}", serde_json::to_string_pretty(&result).unwrap());
            } else {
                print_human(&coordinates);
            }
            Ok(())
        }
        None => {
            let message = format!("Invalid package URL: {url}");
            if json {
                let result = ParseResult {
                    ok: false,
                    coordinates: None,
                    error: Some(message),
                };
                println!("{}", serde_json::to_string_pretty(&result).unwrap());
            } else {
                eprintln!("error: {message}");
            }
            std::process::exit(1);
        }
    }
}

fn print_human(coords: &PackageCoordinates) {
    println!("package:  {}", coords.package_name);
    println!("version:  {}", coords.version);
    if let Some(filename) = &coords.filename {
        println!("filename: {filename}");
    }
    if !coords.query.is_empty() {
        let pairs: Vec<String> = coords
            .query
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        println!("query:    {}", pairs.join("&"));
    }
    if let Some(jsonp) = &coords.jsonp_opts {
        match &jsonp.encoding {
            Some(encoding) => println!("jsonp:    {} ({encoding})", jsonp.callback),
            None => println!("jsonp:    {}", jsonp.callback),
        }
    }
}
