//! Sharded document store helpers.
//!
//! Every collection stores one record per directory under the sharded layout
//! `<collection>/<s1>/<s2>/<32hex-uuid>/`. These helpers allocate record
//! directories, read and write record files, and walk a collection
//! tolerantly (records that fail to parse are skipped by callers, not
//! fatal).

use crate::{CareError, CareResult};
use carebook_uuid::ShardableUuid;
use std::{
    fs,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

/// Creates a unique sharded record directory within a collection.
///
/// Generates UUIDs and attempts to create the corresponding sharded
/// directory, guarding against UUID collisions or pre-existing directories
/// by retrying up to 5 times with different UUIDs.
///
/// # Errors
///
/// Returns `CareError::RecordDirCreation` if directory creation fails after
/// 5 attempts, or `CareError::StorageDirCreation` if the parent shard
/// directories cannot be created.
pub(crate) fn create_unique_record_dir(
    collection_dir: &Path,
) -> CareResult<(ShardableUuid, PathBuf)> {
    for _attempt in 0..5 {
        let id = ShardableUuid::new();
        let candidate = id.sharded_dir(collection_dir);

        if candidate.exists() {
            continue;
        }

        if let Some(parent) = candidate.parent() {
            fs::create_dir_all(parent).map_err(CareError::StorageDirCreation)?;
        }

        match fs::create_dir(&candidate) {
            Ok(()) => return Ok((id, candidate)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(CareError::RecordDirCreation(e)),
        }
    }

    Err(CareError::RecordDirCreation(io::Error::new(
        ErrorKind::AlreadyExists,
        "failed to allocate a unique record directory after 5 attempts",
    )))
}

/// Writes a record file, replacing any existing content.
pub(crate) fn write_record(path: &Path, content: &str) -> CareResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(CareError::StorageDirCreation)?;
    }
    fs::write(path, content).map_err(CareError::FileWrite)
}

/// Reads a record file to a string.
pub(crate) fn read_record(path: &Path) -> CareResult<String> {
    fs::read_to_string(path).map_err(CareError::FileRead)
}

/// Walks a collection's sharded layout and returns every record directory
/// with its identifier.
///
/// Entries whose leaf directory name is not a canonical UUID are skipped
/// with a warning. A missing collection directory yields an empty list, not
/// an error: collections are created lazily on first write.
pub(crate) fn walk_record_dirs(collection_dir: &Path) -> Vec<(ShardableUuid, PathBuf)> {
    let mut records = Vec::new();

    let s1_iter = match fs::read_dir(collection_dir) {
        Ok(it) => it,
        Err(_) => return records,
    };

    for s1 in s1_iter.flatten() {
        let s1_path = s1.path();
        if !s1_path.is_dir() {
            continue;
        }

        let s2_iter = match fs::read_dir(&s1_path) {
            Ok(it) => it,
            Err(_) => continue,
        };

        for s2 in s2_iter.flatten() {
            let s2_path = s2.path();
            if !s2_path.is_dir() {
                continue;
            }

            let id_iter = match fs::read_dir(&s2_path) {
                Ok(it) => it,
                Err(_) => continue,
            };

            for id_entry in id_iter.flatten() {
                let id_path = id_entry.path();
                if !id_path.is_dir() {
                    continue;
                }

                let Some(name) = id_path.file_name().and_then(|os| os.to_str()) else {
                    continue;
                };

                match ShardableUuid::parse(name) {
                    Ok(id) => records.push((id, id_path)),
                    Err(_) => {
                        tracing::warn!("skipping non-record directory: {}", id_path.display());
                    }
                }
            }
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn allocates_sharded_dirs() {
        let temp = TempDir::new().unwrap();
        let collection = temp.path().join("users");

        let (id, dir) = create_unique_record_dir(&collection).expect("allocate");
        assert!(dir.is_dir());
        assert!(dir.ends_with(id.to_string()));
        assert_eq!(dir, id.sharded_dir(&collection));
    }

    #[test]
    fn walk_finds_allocated_records_and_skips_noise() {
        let temp = TempDir::new().unwrap();
        let collection = temp.path().join("appointments");

        let (first, _) = create_unique_record_dir(&collection).unwrap();
        let (second, _) = create_unique_record_dir(&collection).unwrap();
        fs::create_dir_all(collection.join("aa").join("bb").join("not-a-uuid")).unwrap();

        let mut found: Vec<String> = walk_record_dirs(&collection)
            .into_iter()
            .map(|(id, _)| id.to_string())
            .collect();
        found.sort();

        let mut expected = vec![first.to_string(), second.to_string()];
        expected.sort();
        assert_eq!(found, expected);
    }

    #[test]
    fn walk_of_missing_collection_is_empty() {
        let temp = TempDir::new().unwrap();
        assert!(walk_record_dirs(&temp.path().join("nothing")).is_empty());
    }

    #[test]
    fn record_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sub").join("record.yaml");

        write_record(&path, "status: pending\n").expect("write");
        assert_eq!(read_record(&path).expect("read"), "status: pending\n");
    }
}
