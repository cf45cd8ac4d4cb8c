//! Storage abstraction for listing records and their metadata

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::trace;

use crate::error::{FieldsError, Result};
use crate::geocode::Geocoder;
use crate::terms::{Term, TermSource};
use crate::types::{ListingRecord, ListingUpdate, MetaValue};

/// Content storage owned by the host.
pub trait MetaStore: Send + Sync {
    /// Get a listing record by id
    fn get_listing(&self, id: u64) -> Result<Option<ListingRecord>>;

    /// Change a listing's status and/or author
    fn update_listing(&self, id: u64, update: ListingUpdate) -> Result<()>;

    /// Read one metadata value
    fn get_meta(&self, id: u64, key: &str) -> Result<Option<MetaValue>>;

    /// Whether a metadata key is stored, whatever its value
    fn meta_exists(&self, id: u64, key: &str) -> Result<bool> {
        Ok(self.get_meta(id, key)?.is_some())
    }

    /// Write a metadata value. Returns `false` when the stored value was
    /// already equal.
    fn update_meta(&self, id: u64, key: &str, value: MetaValue) -> Result<bool>;

    /// Write a metadata value only if the key is absent. Returns whether it
    /// was written.
    fn add_meta(&self, id: u64, key: &str, value: MetaValue) -> Result<bool>;

    /// Remove a metadata key. Returns whether it existed.
    fn delete_meta(&self, id: u64, key: &str) -> Result<bool>;
}

/// Resolves user ids to login names.
pub trait UserDirectory: Send + Sync {
    fn login(&self, user_id: u64) -> Option<String>;
}

/// Process-local host: listings, metadata, users, generated locations and
/// taxonomy terms kept in concurrent maps.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    listings: DashMap<u64, ListingRecord>,
    meta: DashMap<(u64, String), MetaValue>,
    users: DashMap<u64, String>,
    locations: DashMap<u64, String>,
    terms: DashMap<String, Vec<Term>>,
    listing_terms: DashMap<(u64, String), Vec<u64>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_listing(&self, listing: ListingRecord) {
        self.listings.insert(listing.id, listing);
    }

    pub fn insert_user(&self, id: u64, login: impl Into<String>) {
        self.users.insert(id, login.into());
    }

    /// Store a metadata value without change tracking.
    pub fn set_meta(&self, id: u64, key: &str, value: impl Into<MetaValue>) {
        self.meta.insert((id, key.to_string()), value.into());
    }

    /// Generated location data for a listing.
    pub fn location_data(&self, id: u64) -> Option<String> {
        self.locations.get(&id).map(|entry| entry.value().clone())
    }

    pub fn insert_term(&self, taxonomy: &str, term: Term) {
        self.terms.entry(taxonomy.to_string()).or_default().push(term);
    }

    pub fn assign_term(&self, listing_id: u64, taxonomy: &str, term_id: u64) {
        self.listing_terms
            .entry((listing_id, taxonomy.to_string()))
            .or_default()
            .push(term_id);
    }
}

impl MetaStore for InMemoryStore {
    fn get_listing(&self, id: u64) -> Result<Option<ListingRecord>> {
        Ok(self.listings.get(&id).map(|entry| entry.value().clone()))
    }

    fn update_listing(&self, id: u64, update: ListingUpdate) -> Result<()> {
        let mut listing = self
            .listings
            .get_mut(&id)
            .ok_or(FieldsError::ListingNotFound { id })?;
        if let Some(status) = update.status {
            listing.status = status;
        }
        if let Some(author) = update.author {
            listing.author = author;
        }
        trace!(id, status = %listing.status, author = listing.author, "listing updated");
        Ok(())
    }

    fn get_meta(&self, id: u64, key: &str) -> Result<Option<MetaValue>> {
        Ok(self
            .meta
            .get(&(id, key.to_string()))
            .map(|entry| entry.value().clone()))
    }

    fn update_meta(&self, id: u64, key: &str, value: MetaValue) -> Result<bool> {
        let previous = self.meta.insert((id, key.to_string()), value.clone());
        Ok(previous.is_none_or(|prev| prev != value))
    }

    fn add_meta(&self, id: u64, key: &str, value: MetaValue) -> Result<bool> {
        match self.meta.entry((id, key.to_string())) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(value);
                Ok(true)
            }
        }
    }

    fn delete_meta(&self, id: u64, key: &str) -> Result<bool> {
        Ok(self.meta.remove(&(id, key.to_string())).is_some())
    }
}

impl UserDirectory for InMemoryStore {
    fn login(&self, user_id: u64) -> Option<String> {
        self.users.get(&user_id).map(|entry| entry.value().clone())
    }
}

impl Geocoder for InMemoryStore {
    fn has_location_data(&self, listing_id: u64) -> bool {
        self.locations.contains_key(&listing_id)
    }

    fn generate_location_data(&self, listing_id: u64, location: &str) {
        self.locations.insert(listing_id, location.to_string());
    }
}

impl TermSource for InMemoryStore {
    fn terms(&self, taxonomy: &str) -> Vec<Term> {
        self.terms
            .get(taxonomy)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    fn popular_terms(&self, taxonomy: &str, limit: usize) -> Vec<Term> {
        let mut terms = self.terms(taxonomy);
        terms.sort_by(|a, b| b.count.cmp(&a.count));
        terms.truncate(limit);
        terms
    }

    fn listing_terms(&self, listing_id: u64, taxonomy: &str) -> Vec<Term> {
        let Some(ids) = self
            .listing_terms
            .get(&(listing_id, taxonomy.to_string()))
            .map(|entry| entry.value().clone())
        else {
            return Vec::new();
        };
        let all = self.terms(taxonomy);
        ids.iter()
            .filter_map(|id| all.iter().find(|term| term.id == *id).cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ListingStatus;

    #[test]
    fn update_meta_reports_change() {
        let store = InMemoryStore::new();
        assert!(store.update_meta(1, "_job_location", "London".into()).unwrap());
        assert!(!store.update_meta(1, "_job_location", "London".into()).unwrap());
        assert!(store.update_meta(1, "_job_location", "Paris".into()).unwrap());
    }

    #[test]
    fn add_meta_never_overwrites() {
        let store = InMemoryStore::new();
        store.set_meta(1, "_filled", 1_i64);
        assert!(!store.add_meta(1, "_filled", MetaValue::Number(0)).unwrap());
        assert_eq!(store.get_meta(1, "_filled").unwrap(), Some(MetaValue::Number(1)));
        assert!(store.add_meta(1, "_featured", MetaValue::Number(0)).unwrap());
    }

    #[test]
    fn delete_meta_reports_existence() {
        let store = InMemoryStore::new();
        store.set_meta(1, "_job_expires", "2024-01-01");
        assert!(store.delete_meta(1, "_job_expires").unwrap());
        assert!(!store.delete_meta(1, "_job_expires").unwrap());
        assert!(!store.meta_exists(1, "_job_expires").unwrap());
    }

    #[test]
    fn update_missing_listing_errors() {
        let store = InMemoryStore::new();
        let result = store.update_listing(9, ListingUpdate::status(ListingStatus::Expired));
        assert!(matches!(result, Err(FieldsError::ListingNotFound { id: 9 })));
    }

    #[test]
    fn popular_terms_sorted_by_count() {
        let store = InMemoryStore::new();
        for (id, name, count) in [(1, "Full Time", 3), (2, "Part Time", 9), (3, "Freelance", 5)] {
            store.insert_term(
                "job_listing_type",
                Term {
                    id,
                    name: name.into(),
                    count,
                },
            );
        }
        let names: Vec<_> = store
            .popular_terms("job_listing_type", 2)
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["Part Time", "Freelance"]);
    }
}
