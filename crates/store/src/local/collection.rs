//! One JSON array per storage key.
//!
//! Every read loads and parses the whole array, every write serializes and
//! stores the whole array. Load-mutate-save sequences hold the collection's
//! mutex so concurrent writers in this process cannot lose each other's
//! changes.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard};
use wayfarer_core::error::{CoreError, CoreResult};
use wayfarer_core::types::Timestamp;
use wayfarer_db::models::day_plan::DayPlan;
use wayfarer_db::models::story::Story;
use wayfarer_db::models::trip::Trip;

use crate::kv::KeyValueStore;

/// A record kept in a local collection.
pub trait LocalRecord: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Entity name used in `NotFound` errors.
    const ENTITY: &'static str;

    fn id(&self) -> &str;
    fn created_at(&self) -> Timestamp;
    fn updated_at(&self) -> Timestamp;
}

macro_rules! impl_local_record {
    ($ty:ty, $entity:literal) => {
        impl LocalRecord for $ty {
            const ENTITY: &'static str = $entity;

            fn id(&self) -> &str {
                &self.id
            }

            fn created_at(&self) -> Timestamp {
                self.created_at
            }

            fn updated_at(&self) -> Timestamp {
                self.updated_at
            }
        }
    };
}

impl_local_record!(Trip, "Trip");
impl_local_record!(DayPlan, "DayPlan");
impl_local_record!(Story, "Story");

/// Sort newest-first, breaking ties by id like the remote `ORDER BY`.
pub fn sort_newest_first<T: LocalRecord>(items: &mut [T]) {
    items.sort_by(|a, b| {
        b.created_at()
            .cmp(&a.created_at())
            .then_with(|| b.id().cmp(a.id()))
    });
}

/// A typed JSON array stored under one key.
pub struct Collection<T> {
    kv: Arc<dyn KeyValueStore>,
    key: &'static str,
    lock: Mutex<()>,
    _record: PhantomData<fn() -> T>,
}

impl<T: LocalRecord> Collection<T> {
    pub fn new(kv: Arc<dyn KeyValueStore>, key: &'static str) -> Self {
        Self {
            kv,
            key,
            lock: Mutex::new(()),
            _record: PhantomData,
        }
    }

    /// Unparseable content is logged and treated as an empty collection;
    /// the next successful write replaces it.
    async fn load(&self) -> CoreResult<Vec<T>> {
        let Some(raw) = self.kv.get_item(self.key).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(items) => Ok(items),
            Err(e) => {
                tracing::warn!(key = self.key, error = %e, "Unreadable local collection, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    async fn save(&self, items: &[T]) -> CoreResult<()> {
        let raw = serde_json::to_string(items)?;
        self.kv.set_item(self.key, &raw).await
    }

    /// Current contents in stored order.
    pub async fn snapshot(&self) -> CoreResult<Vec<T>> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    /// Run `f` against the loaded array and save the result.
    ///
    /// Nothing is written when `f` fails.
    pub async fn mutate<R, F>(&self, f: F) -> CoreResult<R>
    where
        F: FnOnce(&mut Vec<T>) -> CoreResult<R> + Send,
        R: Send,
    {
        let _guard = self.lock.lock().await;
        let mut items = self.load().await?;
        let out = f(&mut items)?;
        self.save(&items).await?;
        Ok(out)
    }

    /// Current contents, with the lock held until the guard drops.
    ///
    /// Writers to this collection wait for the guard, so the contents stay
    /// accurate while the caller acts on them elsewhere.
    pub async fn hold(&self) -> CoreResult<(MutexGuard<'_, ()>, Vec<T>)> {
        let guard = self.lock.lock().await;
        let items = self.load().await?;
        Ok((guard, items))
    }

    pub async fn find(&self, id: &str) -> CoreResult<Option<T>> {
        Ok(self.snapshot().await?.into_iter().find(|r| r.id() == id))
    }

    /// Append `record` after `check` approves it against the current contents.
    pub async fn insert<C>(&self, record: T, check: C) -> CoreResult<T>
    where
        C: FnOnce(&[T], &T) -> CoreResult<()> + Send,
    {
        self.mutate(move |items| {
            if items.iter().any(|r| r.id() == record.id()) {
                return Err(CoreError::Conflict(format!(
                    "{} id {} already exists",
                    T::ENTITY,
                    record.id()
                )));
            }
            check(items, &record)?;
            items.push(record.clone());
            Ok(record)
        })
        .await
    }

    /// Overwrite the stored record with `record.id()` if its `updated_at`
    /// still equals `expected`.
    pub async fn replace<C>(&self, record: T, expected: Timestamp, check: C) -> CoreResult<T>
    where
        C: FnOnce(&[T], &T) -> CoreResult<()> + Send,
    {
        self.mutate(move |items| {
            let index = items
                .iter()
                .position(|r| r.id() == record.id())
                .ok_or_else(|| CoreError::not_found(T::ENTITY, record.id()))?;
            if items[index].updated_at() != expected {
                return Err(CoreError::Conflict(format!(
                    "{} {} was modified concurrently",
                    T::ENTITY,
                    record.id()
                )));
            }
            check(items, &record)?;
            items[index] = record.clone();
            Ok(record)
        })
        .await
    }

    /// Remove every record matching `predicate`; returns how many went.
    pub async fn remove_where<P>(&self, predicate: P) -> CoreResult<u64>
    where
        P: Fn(&T) -> bool + Send,
    {
        self.mutate(move |items| {
            let before = items.len();
            items.retain(|r| !predicate(r));
            Ok((before - items.len()) as u64)
        })
        .await
    }

    pub async fn remove(&self, id: &str) -> CoreResult<bool> {
        Ok(self.remove_where(|r| r.id() == id).await? > 0)
    }
}

/// Accept any record.
pub fn no_check<T>(_: &[T], _: &T) -> CoreResult<()> {
    Ok(())
}
