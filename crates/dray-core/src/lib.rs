#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::too_many_lines)]

pub mod coords;
pub mod error;
pub mod latch;
pub mod tarball;

pub use coords::{
    create_package_url, parse_package_url, JsonpOpts, PackageCoordinates, LATEST_VERSION,
};
pub use error::FetchError;
pub use latch::CompletionLatch;
pub use tarball::fetch_package;
