//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use jobboard_config::JobBoardConfig;
use jobboard_fields::{
    keys, ActingUser, Capability, FixedClock, InMemoryStore, ListingRecord, ListingStatus,
    PanelExtensions, Submission, WritePanels,
};

pub const MANAGER_ID: u64 = 1;
pub const OWNER_ID: u64 = 3;
pub const LISTING_ID: u64 = 10;

/// The fixed "today" of every fixture.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

pub struct Fixture {
    pub store: Arc<InMemoryStore>,
    pub panels: WritePanels,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with(JobBoardConfig::default(), PanelExtensions::new())
    }

    pub fn with_config(config: JobBoardConfig) -> Self {
        Self::with(config, PanelExtensions::new())
    }

    pub fn with_extensions(extensions: PanelExtensions) -> Self {
        Self::with(JobBoardConfig::default(), extensions)
    }

    /// A fixture whose store holds users 1 (`admin`) and 3 (`alice`) and a
    /// published listing owned by user 3.
    pub fn with(config: JobBoardConfig, extensions: PanelExtensions) -> Self {
        let store = Arc::new(InMemoryStore::new());
        store.insert_user(MANAGER_ID, "admin");
        store.insert_user(OWNER_ID, "alice");
        store.insert_listing(ListingRecord::job_listing(
            LISTING_ID,
            OWNER_ID,
            ListingStatus::Publish,
        ));

        let panels = WritePanels::builder(config, store.clone())
            .users(store.clone())
            .geocoder(store.clone())
            .terms(store.clone())
            .clock(Arc::new(FixedClock::on(today())))
            .extensions(extensions)
            .build()
            .unwrap();
        Self { store, panels }
    }

    pub fn listing(&self) -> ListingRecord {
        use jobboard_fields::MetaStore;
        self.store.get_listing(LISTING_ID).unwrap().unwrap()
    }

    /// `submission` plus a valid nonce for `user`.
    pub fn signed(&self, user: &ActingUser, submission: Submission) -> Submission {
        submission.with(keys::NONCE_FIELD, self.panels.create_nonce(user))
    }
}

/// A user holding every capability.
pub fn manager() -> ActingUser {
    ActingUser::new(MANAGER_ID, "admin@example.com")
        .with_capability(Capability::EditJobListings)
        .with_capability(Capability::EditOthersJobListings)
        .with_capability(Capability::ManageJobListings)
}

/// The listing's author, able to edit only their own listings.
pub fn owner() -> ActingUser {
    ActingUser::new(OWNER_ID, "alice@example.com").with_capability(Capability::EditJobListings)
}

/// Another plain editor.
pub fn stranger() -> ActingUser {
    ActingUser::new(4, "bob@example.com").with_capability(Capability::EditJobListings)
}
