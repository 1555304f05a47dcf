use async_trait::async_trait;
use cineflix_models::{MovieKey, ReviewAggregate, User, UserId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info};
use crate::error::Result;

/// Persistence for review aggregates, keyed by movie
#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn get(&self, key: &MovieKey) -> Result<Option<ReviewAggregate>>;
    async fn put(&self, aggregate: ReviewAggregate) -> Result<()>;
    async fn remove(&self, key: &MovieKey) -> Result<bool>;
    async fn all(&self) -> Result<Vec<ReviewAggregate>>;
}

/// Persistence for user accounts
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get(&self, id: &UserId) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    /// Insert unless the email is taken. Returns false when it is.
    async fn insert(&self, user: User) -> Result<bool>;
    /// Replace an existing account. Returns false when the id is unknown.
    async fn update(&self, user: User) -> Result<bool>;
    async fn remove(&self, id: &UserId) -> Result<bool>;
    async fn all(&self) -> Result<Vec<User>>;
}

/// A keyed document set held in memory and optionally mirrored to a JSON file.
///
/// Every mutation rewrites the whole file while the write lock is held, so the
/// file always matches some state the map was in.
struct Collection<K, V> {
    path: Option<PathBuf>,
    entries: RwLock<HashMap<K, V>>,
}

impl<K, V> Collection<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Serialize + DeserializeOwned + Send + Sync,
{
    fn in_memory() -> Self {
        Self {
            path: None,
            entries: RwLock::new(HashMap::new()),
        }
    }

    async fn open(path: PathBuf, key_of: impl Fn(&V) -> K) -> Result<Self> {
        let entries = if tokio::fs::try_exists(&path).await? {
            let content = tokio::fs::read_to_string(&path).await?;
            let documents: Vec<V> = if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&content)?
            };
            info!(path = %path.display(), count = documents.len(), "Loaded document store");
            documents.into_iter().map(|doc| (key_of(&doc), doc)).collect()
        } else {
            debug!(path = %path.display(), "Store file does not exist, starting empty");
            HashMap::new()
        };

        Ok(Self {
            path: Some(path),
            entries: RwLock::new(entries),
        })
    }

    async fn get(&self, key: &K) -> Option<V> {
        self.entries.read().await.get(key).cloned()
    }

    async fn values(&self) -> Vec<V> {
        self.entries.read().await.values().cloned().collect()
    }

    /// Apply `f` to a staged copy; the live map only changes once the copy is on disk
    async fn mutate<T>(&self, f: impl FnOnce(&mut HashMap<K, V>) -> T) -> Result<T> {
        let mut entries = self.entries.write().await;
        let mut staged = entries.clone();
        let outcome = f(&mut staged);
        if let Some(path) = &self.path {
            persist(path, &staged).await?;
        }
        *entries = staged;
        Ok(outcome)
    }
}

/// Atomic write: serialize to a sibling temp file, then rename over the target
async fn persist<K, V: Serialize>(path: &Path, entries: &HashMap<K, V>) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let documents: Vec<&V> = entries.values().collect();
    let json = serde_json::to_string_pretty(&documents)?;

    let temp_path = path.with_extension("json.tmp");
    tokio::fs::write(&temp_path, json).await?;
    tokio::fs::rename(&temp_path, path).await?;

    debug!(path = %path.display(), count = documents.len(), "Store persisted");
    Ok(())
}

pub struct JsonReviewStore {
    inner: Collection<MovieKey, ReviewAggregate>,
}

impl JsonReviewStore {
    pub async fn open(path: PathBuf) -> Result<Self> {
        let inner = Collection::open(path, |aggregate: &ReviewAggregate| aggregate.key.clone()).await?;
        Ok(Self { inner })
    }

    pub fn in_memory() -> Self {
        Self {
            inner: Collection::in_memory(),
        }
    }
}

#[async_trait]
impl ReviewStore for JsonReviewStore {
    async fn get(&self, key: &MovieKey) -> Result<Option<ReviewAggregate>> {
        Ok(self.inner.get(key).await)
    }

    async fn put(&self, aggregate: ReviewAggregate) -> Result<()> {
        self.inner
            .mutate(|entries| {
                entries.insert(aggregate.key.clone(), aggregate);
            })
            .await
    }

    async fn remove(&self, key: &MovieKey) -> Result<bool> {
        self.inner.mutate(|entries| entries.remove(key).is_some()).await
    }

    async fn all(&self) -> Result<Vec<ReviewAggregate>> {
        let mut aggregates = self.inner.values().await;
        aggregates.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(aggregates)
    }
}

pub struct JsonUserStore {
    inner: Collection<UserId, User>,
}

impl JsonUserStore {
    pub async fn open(path: PathBuf) -> Result<Self> {
        let inner = Collection::open(path, |user: &User| user.id).await?;
        Ok(Self { inner })
    }

    pub fn in_memory() -> Self {
        Self {
            inner: Collection::in_memory(),
        }
    }
}

#[async_trait]
impl UserStore for JsonUserStore {
    async fn get(&self, id: &UserId) -> Result<Option<User>> {
        Ok(self.inner.get(id).await)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.inner.values().await.into_iter().find(|user| user.email == email))
    }

    async fn insert(&self, user: User) -> Result<bool> {
        self.inner
            .mutate(|entries| {
                if entries.values().any(|existing| existing.email == user.email) {
                    return false;
                }
                entries.insert(user.id, user);
                true
            })
            .await
    }

    async fn update(&self, user: User) -> Result<bool> {
        self.inner
            .mutate(|entries| match entries.get_mut(&user.id) {
                Some(existing) => {
                    *existing = user;
                    true
                }
                None => false,
            })
            .await
    }

    async fn remove(&self, id: &UserId) -> Result<bool> {
        self.inner.mutate(|entries| entries.remove(id).is_some()).await
    }

    async fn all(&self) -> Result<Vec<User>> {
        let mut users = self.inner.values().await;
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.email.cmp(&b.email)));
        Ok(users)
    }
}
