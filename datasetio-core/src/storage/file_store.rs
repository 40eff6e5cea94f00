use crate::error::{DatasetError, Result};
use bytes::Bytes;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// FileStore holds dataset bytes on disk under
/// `{storage_root}/{owner}/{project}/datasets/{name}`.
pub struct FileStore {
    storage_root: PathBuf,
}

impl FileStore {
    pub fn new(storage_root: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&storage_root)?;
        Ok(Self { storage_root })
    }

    pub fn storage_root(&self) -> &Path {
        &self.storage_root
    }

    pub async fn write(&self, owner: &str, project: &str, name: &str, data: &[u8]) -> Result<()> {
        let path = self.dataset_path(owner, project, name)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let tmp_path = path.with_extension(format!("{}.tmp", ulid::Ulid::new()));
        let mut file = fs::File::create(&tmp_path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&tmp_path, &path).await?;

        Ok(())
    }

    /// Reads the backing file for a record that is known to exist. A missing
    /// file here means the metadata and the filesystem have diverged.
    pub async fn read(&self, owner: &str, project: &str, name: &str) -> Result<Bytes> {
        let path = self.dataset_path(owner, project, name)?;
        if !path.exists() {
            return Err(DatasetError::Inconsistent(format!(
                "backing file missing: {}",
                Self::relative_path(owner, project, name)?
            )));
        }

        let bytes = fs::read(path).await?;
        Ok(Bytes::from(bytes))
    }

    pub async fn rename(
        &self,
        owner: &str,
        project: &str,
        old_name: &str,
        new_name: &str,
    ) -> Result<()> {
        let old_path = self.dataset_path(owner, project, old_name)?;
        let new_path = self.dataset_path(owner, project, new_name)?;
        fs::rename(&old_path, &new_path).await?;
        Ok(())
    }

    pub async fn remove(&self, owner: &str, project: &str, name: &str) -> Result<()> {
        let path = self.dataset_path(owner, project, name)?;
        fs::remove_file(&path).await?;
        Ok(())
    }

    pub fn exists(&self, owner: &str, project: &str, name: &str) -> bool {
        self.dataset_path(owner, project, name)
            .map(|path| path.exists())
            .unwrap_or(false)
    }

    /// Content path as persisted in the record, relative to the storage root.
    pub fn relative_path(owner: &str, project: &str, name: &str) -> Result<String> {
        Ok(format!(
            "{}/{}/datasets/{}",
            validate_segment(owner)?,
            validate_segment(project)?,
            validate_segment(name)?
        ))
    }

    pub fn dataset_path(&self, owner: &str, project: &str, name: &str) -> Result<PathBuf> {
        let mut path = self.storage_root.join(validate_segment(owner)?);
        path.push(validate_segment(project)?);
        path.push("datasets");
        path.push(validate_segment(name)?);
        Ok(path)
    }
}

/// Owner, project, and dataset names become single path components; anything
/// that could escape its directory is rejected rather than normalized.
pub(crate) fn validate_segment(segment: &str) -> Result<&str> {
    if segment.is_empty() || segment == "." || segment == ".." {
        return Err(DatasetError::InvalidSegment(segment.to_string()));
    }

    if segment.contains('/') || segment.contains('\\') || segment.contains('\0') {
        return Err(DatasetError::InvalidSegment(segment.to_string()));
    }

    Ok(segment)
}

pub fn compute_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();
        assert!(store.storage_root().exists());

        let body = b"x,y\n1,2\n";
        store.write("a@x.com", "p1", "d.csv", body).await.unwrap();
        assert!(store.exists("a@x.com", "p1", "d.csv"));

        let read = store.read("a@x.com", "p1", "d.csv").await.unwrap();
        assert_eq!(read.as_ref(), body);

        store
            .rename("a@x.com", "p1", "d.csv", "renamed.csv")
            .await
            .unwrap();
        assert!(!store.exists("a@x.com", "p1", "d.csv"));
        let read = store.read("a@x.com", "p1", "renamed.csv").await.unwrap();
        assert_eq!(read.as_ref(), body);

        store.remove("a@x.com", "p1", "renamed.csv").await.unwrap();
        assert!(!store.exists("a@x.com", "p1", "renamed.csv"));
    }

    #[tokio::test]
    async fn test_write_overwrites_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        store.write("a@x.com", "p1", "d.csv", b"first").await.unwrap();
        store.write("a@x.com", "p1", "d.csv", b"second").await.unwrap();

        let read = store.read("a@x.com", "p1", "d.csv").await.unwrap();
        assert_eq!(read.as_ref(), b"second");
    }

    #[tokio::test]
    async fn test_read_missing_file_is_inconsistent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        let error = store.read("a@x.com", "p1", "d.csv").await.unwrap_err();
        assert!(matches!(error, DatasetError::Inconsistent(_)));
    }

    #[test]
    fn test_segments_cannot_escape_storage_root() {
        for bad in ["", ".", "..", "a/b", "..\\evil", "nul\0byte"] {
            assert!(
                matches!(
                    FileStore::relative_path("a@x.com", "p1", bad),
                    Err(DatasetError::InvalidSegment(_))
                ),
                "segment {:?} should be rejected",
                bad
            );
        }

        assert!(FileStore::relative_path("../a", "p1", "d.csv").is_err());
        assert!(FileStore::relative_path("a@x.com", "../p1", "d.csv").is_err());
    }

    #[test]
    fn test_relative_path_layout() {
        let path = FileStore::relative_path("a@x.com", "p1", "d.csv").unwrap();
        assert_eq!(path, "a@x.com/p1/datasets/d.csv");
    }
}
