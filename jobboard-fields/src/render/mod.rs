//! Field widget rendering
//!
//! Every descriptor is drawn by a built-in widget chosen by its
//! [`FieldType`](crate::types::FieldType). Types without a built-in widget go
//! to a [`WidgetRenderer`] registered for that exact tag in
//! [`PanelExtensions`]; anything else is skipped.

mod html;
mod registry;
mod widgets;

pub use registry::PanelExtensions;

pub(crate) use widgets::render_builtin;

use jobboard_config::JobBoardConfig;

use crate::error::Result;
use crate::store::{MetaStore, UserDirectory};
use crate::types::{FieldDescriptor, ListingRecord, MetaValue};

/// Everything a widget may read while drawing one field. Widgets never
/// write.
pub struct RenderContext<'a> {
    pub listing: &'a ListingRecord,
    pub store: &'a dyn MetaStore,
    pub users: &'a dyn UserDirectory,
    pub config: &'a JobBoardConfig,
}

impl RenderContext<'_> {
    /// The stored value for `key`, or an empty string when absent.
    pub fn stored(&self, key: &str) -> Result<MetaValue> {
        Ok(self
            .store
            .get_meta(self.listing.id, key)?
            .unwrap_or_else(|| MetaValue::Text(String::new())))
    }

    /// The descriptor's value when it has one, else the stored value.
    pub fn value_or_stored(&self, field: &FieldDescriptor) -> Result<MetaValue> {
        match &field.value {
            Some(value) => Ok(value.clone()),
            None => self.stored(&field.key),
        }
    }

    /// Like [`value_or_stored`](Self::value_or_stored), but a falsy value
    /// also falls back to storage.
    pub fn truthy_or_stored(&self, field: &FieldDescriptor) -> Result<MetaValue> {
        match &field.value {
            Some(value) if !value.is_empty() => Ok(value.clone()),
            _ => self.stored(&field.key),
        }
    }
}

/// Draws fields of one custom type tag.
pub trait WidgetRenderer: Send + Sync {
    fn render(&self, ctx: &RenderContext<'_>, field: &FieldDescriptor) -> Result<String>;
}

/// Gets to add markup around the field list of the listing panel.
pub trait RenderObserver: Send + Sync {
    fn before_fields(&self, _listing_id: u64) -> String {
        String::new()
    }

    fn after_fields(&self, _listing_id: u64) -> String {
        String::new()
    }
}
