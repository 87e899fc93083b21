use std::{collections::HashMap, hash::Hash, path::PathBuf, sync::Arc};
use tokio::{fs, sync::RwLock};

use crate::errors::StoreError;

/// Generic JSON file-backed key-value map store.
///
/// Persists a `HashMap<K, V>` to a JSON file. Every mutation runs under the
/// write lock and is only committed to memory once the file write succeeded,
/// so the in-memory view never runs ahead of disk.
#[derive(Clone)]
pub struct JsonMapStore<K, V> {
    inner: Arc<RwLock<HashMap<K, V>>>,
    file_path: PathBuf,
}

impl<K, V> JsonMapStore<K, V>
where
    K: Eq + Hash + serde::Serialize + serde::de::DeserializeOwned + Clone,
    V: serde::Serialize + serde::de::DeserializeOwned + Clone,
{
    /// Initialize the store from a path. Creates the file with an empty map if missing;
    /// a file that exists but does not parse is an error rather than silently emptied.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, StoreError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let map: HashMap<K, V> = match fs::read(&file_path).await {
            Ok(bytes) if bytes.is_empty() => HashMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let empty: HashMap<K, V> = HashMap::new();
                fs::write(&file_path, serde_json::to_vec(&empty)?).await?;
                empty
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Arc::new(Self { inner: Arc::new(RwLock::new(map)), file_path }))
    }

    // Write to a sibling temp file then rename, so a crash mid-write leaves the old file.
    async fn persist(&self, map: &HashMap<K, V>) -> Result<(), StoreError> {
        let data = serde_json::to_vec(map)?;
        let mut tmp = self.file_path.clone().into_os_string();
        tmp.push(".tmp");
        fs::write(&tmp, data).await?;
        fs::rename(&tmp, &self.file_path).await?;
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Get value by key.
    pub async fn get(&self, key: &K) -> Option<V> {
        let map = self.inner.read().await;
        map.get(key).cloned()
    }

    /// Insert or update a value by key and persist.
    pub async fn insert(&self, key: K, value: V) -> Result<(), StoreError> {
        self.update_map(|m| {
            m.insert(key, value);
            ((), true)
        })
        .await
    }

    /// Insert only when the key is vacant; returns whether the insert happened.
    pub async fn insert_if_absent(&self, key: K, value: V) -> Result<bool, StoreError> {
        self.update_map(|m| {
            if m.contains_key(&key) {
                return (false, false);
            }
            m.insert(key, value);
            (true, true)
        })
        .await
    }

    /// Overwrite only when the key is occupied; returns whether it was.
    pub async fn replace_if_present(&self, key: K, value: V) -> Result<bool, StoreError> {
        self.update_map(|m| match m.get_mut(&key) {
            Some(slot) => {
                *slot = value;
                (true, true)
            }
            None => (false, false),
        })
        .await
    }

    /// Remove a key and persist; returns whether it existed.
    pub async fn remove(&self, key: &K) -> Result<bool, StoreError> {
        self.update_map(|m| {
            let existed = m.remove(key).is_some();
            (existed, existed)
        })
        .await
    }

    /// Apply a mutation to a copy of the map and persist it atomically.
    ///
    /// The closure returns its result plus whether anything changed; unchanged
    /// maps skip the file write.
    async fn update_map<F, R>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut HashMap<K, V>) -> (R, bool),
    {
        let mut map = self.inner.write().await;
        let mut next = map.clone();
        let (out, changed) = f(&mut next);
        if changed {
            self.persist(&next).await?;
            *map = next;
        }
        Ok(out)
    }
}
