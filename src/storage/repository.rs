//! Generic JSON-file repository
//!
//! Every entity lives in its own JSON file (see [`super::file_io`]) and is
//! held in memory behind an `RwLock` between loads and saves.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ConvenioError;

use super::file_io::{load_records, save_records};

/// An entity that can be stored in a [`Repository`]
pub trait Record: Clone + Serialize + DeserializeOwned {
    type Id: Copy + Eq + Hash + std::fmt::Display;

    /// Entity name used in logs and errors
    const ENTITY: &'static str;

    fn id(&self) -> Self::Id;

    /// Default listing order
    fn default_order(&self, other: &Self) -> Ordering;
}

/// Repository for one entity type
pub struct Repository<T: Record> {
    path: PathBuf,
    data: RwLock<HashMap<T::Id, T>>,
}

impl<T: Record> Repository<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<T::Id, T>>, ConvenioError> {
        self.data
            .read()
            .map_err(|e| ConvenioError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<T::Id, T>>, ConvenioError> {
        self.data
            .write()
            .map_err(|e| ConvenioError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    /// Load records from disk, replacing what is in memory
    pub fn load(&self) -> Result<(), ConvenioError> {
        let records: Vec<T> = load_records(&self.path)?;

        let mut data = self.write()?;
        data.clear();
        for record in records {
            data.insert(record.id(), record);
        }

        tracing::debug!(entity = T::ENTITY, count = data.len(), "loaded records");
        Ok(())
    }

    /// Save records to disk in their default order
    pub fn save(&self) -> Result<(), ConvenioError> {
        save_records(&self.path, &self.get_all()?)
    }

    pub fn get(&self, id: T::Id) -> Result<Option<T>, ConvenioError> {
        Ok(self.read()?.get(&id).cloned())
    }

    /// All records in default order
    pub fn get_all(&self) -> Result<Vec<T>, ConvenioError> {
        let mut records: Vec<T> = self.read()?.values().cloned().collect();
        records.sort_by(|a, b| a.default_order(b));
        Ok(records)
    }

    /// Records matching a predicate, in default order
    pub fn filter<F>(&self, predicate: F) -> Result<Vec<T>, ConvenioError>
    where
        F: Fn(&T) -> bool,
    {
        let mut records: Vec<T> = self
            .read()?
            .values()
            .filter(|r| predicate(r))
            .cloned()
            .collect();
        records.sort_by(|a, b| a.default_order(b));
        Ok(records)
    }

    /// First record matching a predicate
    pub fn find<F>(&self, predicate: F) -> Result<Option<T>, ConvenioError>
    where
        F: Fn(&T) -> bool,
    {
        Ok(self.read()?.values().find(|r| predicate(r)).cloned())
    }

    /// Insert or update a record
    pub fn upsert(&self, record: T) -> Result<(), ConvenioError> {
        self.write()?.insert(record.id(), record);
        Ok(())
    }

    /// Remove a record, returning it if it existed
    pub fn delete(&self, id: T::Id) -> Result<Option<T>, ConvenioError> {
        Ok(self.write()?.remove(&id))
    }

    /// Remove every record matching a predicate, returning the removed ones
    pub fn delete_where<F>(&self, predicate: F) -> Result<Vec<T>, ConvenioError>
    where
        F: Fn(&T) -> bool,
    {
        let mut data = self.write()?;
        let ids: Vec<T::Id> = data
            .values()
            .filter(|r| predicate(r))
            .map(|r| r.id())
            .collect();
        Ok(ids.into_iter().filter_map(|id| data.remove(&id)).collect())
    }

    pub fn exists(&self, id: T::Id) -> Result<bool, ConvenioError> {
        Ok(self.read()?.contains_key(&id))
    }

    pub fn count(&self) -> Result<usize, ConvenioError> {
        Ok(self.read()?.len())
    }

    /// Number of records matching a predicate
    pub fn count_where<F>(&self, predicate: F) -> Result<usize, ConvenioError>
    where
        F: Fn(&T) -> bool,
    {
        Ok(self.read()?.values().filter(|r| predicate(r)).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: u32,
        text: String,
    }

    impl Record for Note {
        type Id = u32;
        const ENTITY: &'static str = "Note";

        fn id(&self) -> u32 {
            self.id
        }

        fn default_order(&self, other: &Self) -> Ordering {
            self.id.cmp(&other.id)
        }
    }

    fn note(id: u32, text: &str) -> Note {
        Note {
            id,
            text: text.to_string(),
        }
    }

    fn create_test_repo() -> (TempDir, Repository<Note>) {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::new(temp_dir.path().join("notes.json"));
        (temp_dir, repo)
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_save_and_reload_in_order() {
        let (temp_dir, repo) = create_test_repo();
        repo.upsert(note(3, "c")).unwrap();
        repo.upsert(note(1, "a")).unwrap();
        repo.upsert(note(2, "b")).unwrap();
        repo.save().unwrap();

        let repo2: Repository<Note> = Repository::new(temp_dir.path().join("notes.json"));
        repo2.load().unwrap();
        let ids: Vec<u32> = repo2.get_all().unwrap().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_upsert_replaces() {
        let (_temp_dir, repo) = create_test_repo();
        repo.upsert(note(1, "old")).unwrap();
        repo.upsert(note(1, "new")).unwrap();
        assert_eq!(repo.count().unwrap(), 1);
        assert_eq!(repo.get(1).unwrap().unwrap().text, "new");
    }

    #[test]
    fn test_delete_where() {
        let (_temp_dir, repo) = create_test_repo();
        for i in 1..=5 {
            repo.upsert(note(i, "x")).unwrap();
        }
        let removed = repo.delete_where(|n| n.id % 2 == 1).unwrap();
        assert_eq!(removed.len(), 3);
        assert_eq!(repo.count().unwrap(), 2);
        assert!(!repo.exists(1).unwrap());
        assert!(repo.exists(2).unwrap());
    }

    #[test]
    fn test_filter_find_and_delete() {
        let (_temp_dir, repo) = create_test_repo();
        repo.upsert(note(1, "alpha")).unwrap();
        repo.upsert(note(2, "beta")).unwrap();

        assert_eq!(repo.filter(|n| n.text.contains('a')).unwrap().len(), 2);
        assert_eq!(repo.find(|n| n.text == "beta").unwrap().unwrap().id, 2);
        assert_eq!(repo.count_where(|n| n.id > 1).unwrap(), 1);

        assert!(repo.delete(1).unwrap().is_some());
        assert!(repo.delete(1).unwrap().is_none());
    }
}
