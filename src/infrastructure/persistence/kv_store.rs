//! Flat-file key-value store
//!
//! One text file per group, one escaped `key=value` record per line. The
//! whole file is the unit of read and rewrite: mutations parse the table,
//! apply the change, write the full replacement to a sibling temp file and
//! atomically rename it over the original, so a reader never observes a
//! partial write. All access to one group's file runs under that group's
//! keyed lock; nothing is cached across the lock's release.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::application::ports::outbound::{KeyValueStorePort, StoreError};
use crate::application::sync::GroupKeyedLock;
use crate::domain::entities::Group;

pub struct FlatFileKeyValueStore {
    data_dir: PathBuf,
    locks: Arc<GroupKeyedLock>,
}

impl FlatFileKeyValueStore {
    pub fn new(data_dir: impl Into<PathBuf>, locks: Arc<GroupKeyedLock>) -> Self {
        Self {
            data_dir: data_dir.into(),
            locks,
        }
    }

    fn file_path(&self, group: &Group) -> Result<PathBuf, StoreError> {
        group
            .store_file
            .as_ref()
            .map(|file_name| self.data_dir.join(file_name))
            .ok_or(StoreError::Unconfigured)
    }

    /// Read and parse the whole table, creating an empty file on first
    /// access.
    async fn read_table(path: &Path) -> Result<Vec<(String, String)>, StoreError> {
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::write(path, "").await?;
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        let mut table = Vec::new();
        for line in contents.lines() {
            if line.is_empty() {
                continue;
            }
            if let Some(pair) = form_urlencoded::parse(line.as_bytes()).into_owned().next() {
                table.push(pair);
            }
        }
        Ok(table)
    }

    /// Write the full replacement table and atomically swap it in.
    async fn write_table(path: &Path, table: &[(String, String)]) -> Result<(), StoreError> {
        let mut contents = String::new();
        for (key, value) in table {
            let mut serializer = form_urlencoded::Serializer::new(String::new());
            serializer.append_pair(key, value);
            contents.push_str(&serializer.finish());
            contents.push('\n');
        }

        let tmp = path.with_extension("swap");
        tokio::fs::write(&tmp, contents).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStorePort for FlatFileKeyValueStore {
    async fn get(&self, group: &Group, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.file_path(group)?;
        let _guard = self.locks.acquire(group.id).await;
        let table = Self::read_table(&path).await?;
        Ok(table.into_iter().find(|(k, _)| k == key).map(|(_, v)| v))
    }

    async fn set(&self, group: &Group, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.file_path(group)?;
        let _guard = self.locks.acquire(group.id).await;
        let mut table = Self::read_table(&path).await?;
        match table.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => table.push((key.to_string(), value.to_string())),
        }
        Self::write_table(&path, &table).await
    }

    async fn delete(&self, group: &Group, key: &str) -> Result<(), StoreError> {
        let path = self.file_path(group)?;
        let _guard = self.locks.acquire(group.id).await;
        let mut table = Self::read_table(&path).await?;
        let before = table.len();
        table.retain(|(k, _)| k != key);
        if table.len() == before {
            // Absent key: nothing to rewrite.
            return Ok(());
        }
        Self::write_table(&path, &table).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::CapabilitySet;

    fn store_fixture() -> (tempfile::TempDir, Arc<FlatFileKeyValueStore>, Group) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FlatFileKeyValueStore::new(
            dir.path(),
            Arc::new(GroupKeyedLock::new()),
        ));
        let group = Group::new("Wardens", CapabilitySet::empty()).with_store_file("wardens.db");
        (dir, store, group)
    }

    #[tokio::test]
    async fn test_round_trip_set_get_delete() {
        let (_dir, store, group) = store_fixture();

        store.set(&group, "a", "1").await.unwrap();
        assert_eq!(store.get(&group, "a").await.unwrap(), Some("1".to_string()));

        store.delete(&group, "a").await.unwrap();
        assert_eq!(store.get(&group, "a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_replaces_existing_key() {
        let (_dir, store, group) = store_fixture();

        store.set(&group, "a", "1").await.unwrap();
        store.set(&group, "b", "2").await.unwrap();
        store.set(&group, "a", "3").await.unwrap();

        assert_eq!(store.get(&group, "a").await.unwrap(), Some("3".to_string()));
        assert_eq!(store.get(&group, "b").await.unwrap(), Some("2".to_string()));
    }

    #[tokio::test]
    async fn test_values_survive_separators_and_newlines() {
        let (_dir, store, group) = store_fixture();

        store.set(&group, "wicked", "a=b&c\nd").await.unwrap();
        store.set(&group, "plain", "x").await.unwrap();

        assert_eq!(
            store.get(&group, "wicked").await.unwrap(),
            Some("a=b&c\nd".to_string())
        );
    }

    #[tokio::test]
    async fn test_missing_file_reads_as_empty_and_is_created() {
        let (dir, store, group) = store_fixture();

        assert_eq!(store.get(&group, "a").await.unwrap(), None);
        assert!(dir.path().join("wardens.db").exists());
    }

    #[tokio::test]
    async fn test_delete_absent_key_is_a_no_op() {
        let (_dir, store, group) = store_fixture();
        store.set(&group, "keep", "me").await.unwrap();

        store.delete(&group, "ghost").await.unwrap();
        assert_eq!(
            store.get(&group, "keep").await.unwrap(),
            Some("me".to_string())
        );
    }

    #[tokio::test]
    async fn test_unconfigured_group_is_storage_error() {
        let (_dir, store, _group) = store_fixture();
        let bare = Group::new("Drifters", CapabilitySet::empty());

        let err = store.get(&bare, "a").await.unwrap_err();
        assert!(matches!(err, StoreError::Unconfigured));
    }

    #[tokio::test]
    async fn test_concurrent_sets_leave_one_complete_value() {
        let (dir, store, group) = store_fixture();
        let group = Arc::new(group);

        let mut tasks = Vec::new();
        for value in ["first", "second"] {
            let store = store.clone();
            let group = group.clone();
            tasks.push(tokio::spawn(async move {
                store.set(&group, "contested", value).await.unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let value = store.get(&group, "contested").await.unwrap().unwrap();
        assert!(value == "first" || value == "second");

        // The file itself holds exactly one complete record.
        let raw = std::fs::read_to_string(dir.path().join("wardens.db")).unwrap();
        let records: Vec<&str> = raw.lines().filter(|l| !l.is_empty()).collect();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_groups_use_separate_files() {
        let (_dir, store, first) = store_fixture();
        let second = Group::new("Scouts", CapabilitySet::empty()).with_store_file("scouts.db");

        store.set(&first, "shared-key", "wardens").await.unwrap();
        store.set(&second, "shared-key", "scouts").await.unwrap();

        assert_eq!(
            store.get(&first, "shared-key").await.unwrap(),
            Some("wardens".to_string())
        );
        assert_eq!(
            store.get(&second, "shared-key").await.unwrap(),
            Some("scouts".to_string())
        );
    }
}
