//! Directory listing data types exchanged with the device.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Path of the filesystem root.
pub const ROOT_PATH: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One entry of a directory listing.
pub struct DirEntry {
    /// Base name of the entry.
    pub name: String,
    /// Whether the entry is a directory. Encoded as `0|1` on the wire.
    #[serde(
        rename = "isDir",
        serialize_with = "serialize_flag",
        deserialize_with = "deserialize_flag"
    )]
    pub is_dir: bool,
}

impl DirEntry {
    /// Builds a file entry.
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }

    /// Builds a directory entry.
    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Listing of one directory level.
pub struct DirectoryRecord {
    /// Absolute directory path without trailing slash (`/` for the root).
    pub path: String,
    /// Entries of the directory.
    #[serde(default)]
    pub content: Vec<DirEntry>,
}

impl DirectoryRecord {
    /// Builds a record from a path and its entries.
    pub fn new(path: impl Into<String>, content: Vec<DirEntry>) -> Self {
        Self {
            path: path.into(),
            content,
        }
    }
}

fn serialize_flag<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*value))
}

fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(flag) => flag,
        Flag::Int(value) => value != 0,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn dir_flag_accepts_integers_and_booleans() {
        let entries: Vec<DirEntry> = serde_json::from_value(json!([
            {"name": "file1.txt", "isDir": 0},
            {"name": "config", "isDir": 1},
            {"name": "www", "isDir": true}
        ]))
        .expect("deserialize");

        assert_eq!(
            entries,
            vec![
                DirEntry::file("file1.txt"),
                DirEntry::dir("config"),
                DirEntry::dir("www"),
            ]
        );
    }

    #[test]
    fn dir_flag_serializes_as_integer() {
        let record = DirectoryRecord::new("/config", vec![DirEntry::file("a.json")]);
        assert_eq!(
            serde_json::to_value(&record).expect("serialize"),
            json!({"path": "/config", "content": [{"name": "a.json", "isDir": 0}]})
        );
    }
}
