//! The prize collection: which prizes the player has won, in winning order.

use crate::{CollectionError, KeyValueStore};
use clawcade_core::{PrizeCollection, PrizeId};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Store key holding the serialized [`CollectionData`].
pub const COLLECTION_KEY: &str = "CollectionData";

/// Persisted form of the collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionData {
    /// Collected ids, oldest first, without duplicates.
    pub collected_prize_ids: Vec<PrizeId>,
}

/// Collection backed by a [`KeyValueStore`].
#[derive(Debug)]
pub struct CollectionManager<S> {
    store: S,
    data: CollectionData,
}

impl<S: KeyValueStore> CollectionManager<S> {
    /// Load the collection from `store`. Missing data starts empty.
    pub fn load(store: S) -> Result<Self, CollectionError> {
        let mut data: CollectionData = match store.get(COLLECTION_KEY) {
            Some(json) => serde_json::from_str(&json)?,
            None => CollectionData::default(),
        };
        let mut seen = std::collections::BTreeSet::new();
        data.collected_prize_ids.retain(|id| seen.insert(id.clone()));
        Ok(Self { store, data })
    }

    /// Load, falling back to an empty collection when the stored data is bad.
    pub fn load_or_default(store: S) -> Self
    where
        S: Clone,
    {
        match Self::load(store.clone()) {
            Ok(manager) => manager,
            Err(err) => {
                warn!(%err, "collection unreadable; starting empty");
                Self {
                    store,
                    data: CollectionData::default(),
                }
            }
        }
    }

    /// Current data.
    pub fn data(&self) -> &CollectionData {
        &self.data
    }

    /// Number of collected prizes.
    pub fn len(&self) -> usize {
        self.data.collected_prize_ids.len()
    }

    /// Whether nothing is collected.
    pub fn is_empty(&self) -> bool {
        self.data.collected_prize_ids.is_empty()
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record `id` and persist. Returns `false` if it was already collected.
    pub fn try_add_prize(&mut self, id: &PrizeId) -> Result<bool, CollectionError> {
        if self.data.collected_prize_ids.contains(id) {
            return Ok(false);
        }
        self.data.collected_prize_ids.push(id.clone());
        if let Err(err) = self.save() {
            self.data.collected_prize_ids.pop();
            return Err(err);
        }
        info!(prize = %id, total = self.len(), "prize added to collection");
        Ok(true)
    }

    /// Write the collection to the store.
    pub fn save(&mut self) -> Result<(), CollectionError> {
        let json = serde_json::to_string(&self.data)?;
        self.store.set(COLLECTION_KEY, json)
    }
}

impl<S: KeyValueStore> PrizeCollection for CollectionManager<S> {
    fn add_prize(&mut self, id: &PrizeId) {
        if let Err(err) = self.try_add_prize(id) {
            warn!(%err, prize = %id, "could not persist collection");
        }
    }

    fn has_prize(&self, id: &PrizeId) -> bool {
        self.data.collected_prize_ids.contains(id)
    }

    fn collected_prizes(&self) -> Vec<PrizeId> {
        self.data.collected_prize_ids.clone()
    }
}
