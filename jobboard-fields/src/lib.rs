//! Metadata field panels for job listings
//!
//! `jobboard-fields` renders and persists the custom metadata fields attached
//! to a job listing record in a host content-management system. The host owns
//! storage, users, geocoding and taxonomies; this crate reaches them through
//! the traits in [`store`], [`geocode`], [`expiry`], [`nonce`] and [`terms`].
//!
//! # Architecture
//!
//! - **Schema**: [`WritePanels::job_listing_fields`] builds the ordered field
//!   list for a listing and an acting user
//! - **Rendering**: built-in widgets per [`FieldType`], then widgets registered
//!   by exact type tag in [`PanelExtensions`]
//! - **Saving**: [`WritePanels::save_post`] runs the guard gate, normalizes
//!   every submitted field and reconciles the expiry date
//! - **Injected service**: the host builds one [`WritePanels`] and passes it
//!   around; there is no global instance

pub mod definitions;
pub mod error;
pub mod expiry;
pub mod geocode;
pub mod metabox;
pub mod nonce;
pub mod panels;
pub mod render;
pub mod sanitize;
pub mod save;
pub mod schema;
pub mod store;
pub mod terms;
pub mod types;

pub use definitions::FieldDefinitions;
pub use error::{FieldsError, Result};
pub use expiry::{Clock, DurationExpiryPolicy, ExpiryOutcome, ExpiryPolicy, FixedClock, SystemClock};
pub use geocode::Geocoder;
pub use metabox::{MetaBoxPlan, TaxonomyPanel};
pub use nonce::{HashNonces, NonceVerifier};
pub use panels::{WritePanels, WritePanelsBuilder};
pub use render::{PanelExtensions, RenderContext, RenderObserver, WidgetRenderer};
pub use save::{SaveOutcome, SaveReport, SaveRequest, SaveTrigger, SkipReason};
pub use schema::SchemaExtension;
pub use store::{InMemoryStore, MetaStore, UserDirectory};
pub use terms::{Term, TermSource};
pub use types::{
    keys, ActingUser, Capability, FieldDescriptor, FieldType, ListingRecord, ListingStatus,
    ListingUpdate, MetaValue, Submission, SubmittedValue,
};
