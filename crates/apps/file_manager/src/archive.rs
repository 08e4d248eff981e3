//! Zip packing for configuration backups.

use std::io::{Cursor, Read, Write};

use view_binder::AdminError;
use zip::{write::FileOptions, CompressionMethod, ZipArchive, ZipWriter};

#[derive(Debug, Clone, PartialEq, Eq)]
/// One file stored in an archive.
pub struct ArchiveEntry {
    /// Entry name: a device path without its leading slash.
    pub name: String,
    /// File body.
    pub bytes: Vec<u8>,
}

impl ArchiveEntry {
    /// Builds an entry.
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

fn archive_error(err: impl std::fmt::Display) -> AdminError {
    AdminError::Archive(err.to_string())
}

/// Packs `entries` into a deflate-compressed zip.
///
/// # Errors
///
/// Returns [`AdminError::Archive`] when the writer fails.
pub fn pack(entries: &[ArchiveEntry]) -> Result<Vec<u8>, AdminError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    for entry in entries {
        writer
            .start_file(entry.name.as_str(), options)
            .map_err(archive_error)?;
        writer.write_all(&entry.bytes).map_err(archive_error)?;
    }
    let cursor = writer.finish().map_err(archive_error)?;
    Ok(cursor.into_inner())
}

/// Reads every file entry of a zip. Directory entries are skipped.
///
/// # Errors
///
/// Returns [`AdminError::Archive`] for unreadable archives or entries.
pub fn unpack(bytes: &[u8]) -> Result<Vec<ArchiveEntry>, AdminError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(archive_error)?;
    let mut entries = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let mut file = archive.by_index(index).map_err(archive_error)?;
        if file.is_dir() {
            continue;
        }
        let mut body = Vec::new();
        file.read_to_end(&mut body).map_err(archive_error)?;
        entries.push(ArchiveEntry::new(file.name(), body));
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn unpack_skips_directory_entries() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();
        writer.add_directory("config/", options).expect("dir");
        writer.start_file("config/a.json", options).expect("file");
        writer.write_all(b"{}").expect("write");
        let bytes = writer.finish().expect("finish").into_inner();

        assert_eq!(
            unpack(&bytes).expect("unpack"),
            vec![ArchiveEntry::new("config/a.json", b"{}".to_vec())]
        );
    }

    #[test]
    fn garbage_is_an_archive_error() {
        assert!(matches!(unpack(b"not a zip"), Err(AdminError::Archive(_))));
    }
}
