//! Streaming tarball extraction.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

use bytes::{Buf, Bytes};
use flate2::read::GzDecoder;
use tar::Archive;
use tokio::sync::mpsc;

use crate::error::FetchError;

/// Mode assigned to every extracted directory. Stored modes are not
/// trusted: archives may have been produced under restrictive umasks, and
/// directories need their execute bits to be traversable at all.
pub const DIR_MODE: u32 = 0o777;

/// Mode assigned to every extracted file: world-readable, nothing else.
pub const FILE_MODE: u32 = 0o444;

/// Strips the synthetic top-level directory from an archive entry name.
///
/// Registry tarballs wrap their contents in a single directory, usually
/// `package/` but not always (firebase ships a `firebase_npm/` prefix), so
/// the first segment is stripped whatever its name is. Names without a
/// separator are returned unchanged.
#[must_use]
pub fn normalize_entry_name(name: &str) -> &str {
    match name.find('/') {
        Some(pos) if pos > 0 => &name[pos + 1..],
        _ => name,
    }
}

/// Reads a gzipped tarball from `reader` and extracts it into `dest`,
/// normalizing entry names and permissions along the way.
///
/// Blocking: meant to run on a blocking thread, fed by [`ChannelReader`]
/// or any in-memory reader in tests.
pub fn extract_archive<R: Read>(reader: R, dest: &Path) -> Result<(), FetchError> {
    let gz = GzDecoder::new(reader);
    let mut archive = Archive::new(gz);

    let entries = archive
        .entries()
        .map_err(|err| FetchError::extract(format!("Failed to read archive entries: {err}")))?;

    for entry in entries {
        let mut entry = entry
            .map_err(|err| FetchError::extract(format!("Failed to read archive entry: {err}")))?;

        let raw_name = entry
            .path()
            .map_err(|err| FetchError::extract(format!("Failed to read entry path: {err}")))?
            .to_string_lossy()
            .into_owned();

        let name = normalize_entry_name(&raw_name);
        if name.is_empty() {
            // The wrapper directory's own entry.
            continue;
        }

        let dest_path = resolve_entry_path(dest, name)?;
        let entry_type = entry.header().entry_type();

        if entry_type.is_dir() {
            create_dir_normalized(dest, Path::new(name))?;
        } else if entry_type.is_file() {
            if let Some(parent) = Path::new(name)
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
            {
                create_dir_normalized(dest, parent)?;
            }

            let mut file = File::create(&dest_path).map_err(|err| {
                FetchError::extract(format!("Failed to create {}: {err}", dest_path.display()))
            })?;
            io::copy(&mut entry, &mut file).map_err(|err| {
                FetchError::extract(format!("Failed to write {}: {err}", dest_path.display()))
            })?;
            set_mode(&dest_path, FILE_MODE).map_err(|err| {
                FetchError::extract(format!(
                    "Failed to set permissions on {}: {err}",
                    dest_path.display()
                ))
            })?;
        }
        // Skip symlinks and other special entries for security
    }

    Ok(())
}

/// Joins a normalized entry name onto `dest`, rejecting names that would
/// land outside it.
fn resolve_entry_path(dest: &Path, name: &str) -> Result<PathBuf, FetchError> {
    let path = Path::new(name);

    if path.is_absolute() {
        return Err(FetchError::extract(format!(
            "Archive contains absolute path: {name}"
        )));
    }

    for component in path.components() {
        if matches!(component, Component::ParentDir) {
            return Err(FetchError::extract(format!(
                "Archive contains path traversal: {name}"
            )));
        }
    }

    let resolved = dest.join(path);
    if !resolved.starts_with(dest) {
        return Err(FetchError::extract(format!(
            "Archive entry escapes destination: {name}"
        )));
    }

    Ok(resolved)
}

/// Creates `rel` (and any missing intermediate directories) under `dest`,
/// applying [`DIR_MODE`] to every level.
fn create_dir_normalized(dest: &Path, rel: &Path) -> Result<(), FetchError> {
    let mut current = dest.to_path_buf();

    for component in rel.components() {
        let Component::Normal(part) = component else {
            continue;
        };
        current.push(part);

        match fs::create_dir(&current) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {}
            Err(err) => {
                return Err(FetchError::extract(format!(
                    "Failed to create directory {}: {err}",
                    current.display()
                )));
            }
        }

        set_mode(&current, DIR_MODE).map_err(|err| {
            FetchError::extract(format!(
                "Failed to set permissions on {}: {err}",
                current.display()
            ))
        })?;
    }

    Ok(())
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}

/// Adapts the chunk channel between the network task and the extraction
/// task into a blocking [`Read`]. Channel closure reads as end of stream.
pub struct ChannelReader {
    chunks: mpsc::Receiver<Bytes>,
    current: Bytes,
}

impl ChannelReader {
    #[must_use]
    pub fn new(chunks: mpsc::Receiver<Bytes>) -> Self {
        Self {
            chunks,
            current: Bytes::new(),
        }
    }
}

impl Read for ChannelReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.current.is_empty() {
            match self.chunks.blocking_recv() {
                Some(chunk) => self.current = chunk,
                None => return Ok(0),
            }
        }

        let len = self.current.len().min(buf.len());
        buf[..len].copy_from_slice(&self.current[..len]);
        self.current.advance(len);
        Ok(len)
    }
}
