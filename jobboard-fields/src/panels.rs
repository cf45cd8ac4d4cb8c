//! The write panels service and its builder

use std::fmt;
use std::sync::Arc;

use dashmap::DashSet;
use jobboard_config::JobBoardConfig;
use tracing::debug;

use crate::definitions::FieldDefinitions;
use crate::error::{FieldsError, Result};
use crate::expiry::{Clock, DurationExpiryPolicy, ExpiryPolicy, SystemClock};
use crate::geocode::Geocoder;
use crate::nonce::{HashNonces, NonceVerifier};
use crate::render::{render_builtin, PanelExtensions, RenderContext};
use crate::sanitize::esc_html;
use crate::store::{InMemoryStore, MetaStore, UserDirectory};
use crate::terms::TermSource;
use crate::types::{keys, ActingUser, FieldDescriptor, ListingRecord};

/// Renders and saves the metadata panel of job listings.
///
/// The host builds one with [`WritePanelsBuilder`] and hands it to whatever
/// serves the edit screen. All collaborators are shared behind `Arc`.
pub struct WritePanels {
    pub(crate) config: JobBoardConfig,
    pub(crate) store: Arc<dyn MetaStore>,
    pub(crate) users: Arc<dyn UserDirectory>,
    pub(crate) geocoder: Arc<dyn Geocoder>,
    pub(crate) terms: Arc<dyn TermSource>,
    pub(crate) expiry: Arc<dyn ExpiryPolicy>,
    pub(crate) nonces: Arc<dyn NonceVerifier>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) extensions: PanelExtensions,
    /// Listings whose status the service is correcting right now. A save
    /// the host fires for one of them from inside the correction is ignored.
    pub(crate) correcting: DashSet<u64>,
}

impl WritePanels {
    pub fn builder(config: JobBoardConfig, store: Arc<dyn MetaStore>) -> WritePanelsBuilder {
        WritePanelsBuilder::new(config, store)
    }

    /// A service whose every collaborator is the given in-memory host.
    pub fn in_memory(config: JobBoardConfig, store: Arc<InMemoryStore>) -> Result<Self> {
        WritePanelsBuilder::new(config, store.clone())
            .users(store.clone())
            .geocoder(store.clone())
            .terms(store)
            .build()
    }

    pub fn config(&self) -> &JobBoardConfig {
        &self.config
    }

    pub fn extensions(&self) -> &PanelExtensions {
        &self.extensions
    }

    /// A fresh nonce for the save form of `user`.
    pub fn create_nonce(&self, user: &ActingUser) -> String {
        self.nonces.create(keys::NONCE_ACTION, user.id)
    }

    /// The complete listing data panel: nonce, observer output and every
    /// field widget, wrapped in the panel container.
    pub fn render_listing_data(&self, listing: &ListingRecord, user: &ActingUser) -> Result<String> {
        let fields = self.job_listing_fields(listing, user)?;
        let ctx = RenderContext {
            listing,
            store: self.store.as_ref(),
            users: self.users.as_ref(),
            config: &self.config,
        };

        let mut out = String::from("<div class=\"wp_job_manager_meta_data\">\n");
        out.push_str(&format!(
            "<input type=\"hidden\" id=\"{field}\" name=\"{field}\" value=\"{}\" />\n",
            esc_html(&self.create_nonce(user)),
            field = keys::NONCE_FIELD,
        ));

        for observer in self.extensions.observers() {
            out.push_str(&observer.before_fields(listing.id));
        }
        for field in &fields {
            if let Some(html) = self.render_field(&ctx, field)? {
                out.push_str(&html);
            }
        }
        for observer in self.extensions.observers() {
            out.push_str(&observer.after_fields(listing.id));
        }

        out.push_str("</div>\n");
        Ok(out)
    }

    /// Draw one field: built-in widget first, then a widget registered for
    /// the exact type tag. `None` when neither exists.
    pub fn render_field(
        &self,
        ctx: &RenderContext<'_>,
        field: &FieldDescriptor,
    ) -> Result<Option<String>> {
        if let Some(html) = render_builtin(ctx, field) {
            return html.map(Some);
        }
        if let Some(widget) = self.extensions.widget(field.type_.as_str()) {
            return widget.render(ctx, field).map(Some);
        }
        debug!(key = %field.key, type_tag = %field.type_, "no widget for field type; skipped");
        Ok(None)
    }
}

impl fmt::Debug for WritePanels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WritePanels")
            .field("config", &self.config)
            .field("extensions", &self.extensions)
            .field("correcting", &self.correcting.len())
            .finish_non_exhaustive()
    }
}

/// Builder for [`WritePanels`].
///
/// The store, user directory, geocoder and term source are required. The
/// clock defaults to local time, expiry to [`DurationExpiryPolicy`] over the
/// configured submission duration, and nonces to [`HashNonces`] with the
/// configured secret and lifetime.
pub struct WritePanelsBuilder {
    config: JobBoardConfig,
    store: Arc<dyn MetaStore>,
    users: Option<Arc<dyn UserDirectory>>,
    geocoder: Option<Arc<dyn Geocoder>>,
    terms: Option<Arc<dyn TermSource>>,
    expiry: Option<Arc<dyn ExpiryPolicy>>,
    nonces: Option<Arc<dyn NonceVerifier>>,
    clock: Option<Arc<dyn Clock>>,
    extensions: PanelExtensions,
}

impl WritePanelsBuilder {
    pub fn new(config: JobBoardConfig, store: Arc<dyn MetaStore>) -> Self {
        Self {
            config,
            store,
            users: None,
            geocoder: None,
            terms: None,
            expiry: None,
            nonces: None,
            clock: None,
            extensions: PanelExtensions::default(),
        }
    }

    pub fn users(mut self, users: Arc<dyn UserDirectory>) -> Self {
        self.users = Some(users);
        self
    }

    pub fn geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    pub fn terms(mut self, terms: Arc<dyn TermSource>) -> Self {
        self.terms = Some(terms);
        self
    }

    pub fn expiry_policy(mut self, expiry: Arc<dyn ExpiryPolicy>) -> Self {
        self.expiry = Some(expiry);
        self
    }

    pub fn nonces(mut self, nonces: Arc<dyn NonceVerifier>) -> Self {
        self.nonces = Some(nonces);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn extensions(mut self, extensions: PanelExtensions) -> Self {
        self.extensions = extensions;
        self
    }

    /// Assemble the service. Loads YAML field definitions from
    /// `config.fields_dir` when set.
    pub fn build(self) -> Result<WritePanels> {
        let users = self
            .users
            .ok_or(FieldsError::MissingCollaborator { name: "users" })?;
        let geocoder = self
            .geocoder
            .ok_or(FieldsError::MissingCollaborator { name: "geocoder" })?;
        let terms = self
            .terms
            .ok_or(FieldsError::MissingCollaborator { name: "terms" })?;

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let expiry = self.expiry.unwrap_or_else(|| {
            Arc::new(DurationExpiryPolicy::new(
                self.store.clone(),
                clock.clone(),
                self.config.submission_duration_days(),
            ))
        });
        let nonces = self.nonces.unwrap_or_else(|| {
            Arc::new(HashNonces::new(
                self.config.nonce_secret.clone(),
                self.config.nonce_lifetime_hours,
                clock.clone(),
            ))
        });

        let mut extensions = self.extensions;
        if let Some(dir) = &self.config.fields_dir {
            let definitions = FieldDefinitions::open(dir)?;
            debug!(dir = %dir.display(), count = definitions.all().len(), "loaded field definitions");
            extensions = extensions.with_schema_extension(Arc::new(definitions));
        }

        Ok(WritePanels {
            config: self.config,
            store: self.store,
            users,
            geocoder,
            terms,
            expiry,
            nonces,
            clock,
            extensions,
            correcting: DashSet::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_requires_collaborators() {
        let store = Arc::new(InMemoryStore::new());
        let result = WritePanelsBuilder::new(JobBoardConfig::default(), store.clone())
            .users(store.clone())
            .terms(store)
            .build();
        assert!(matches!(
            result,
            Err(FieldsError::MissingCollaborator { name: "geocoder" })
        ));
    }

    #[test]
    fn in_memory_builds() {
        let panels =
            WritePanels::in_memory(JobBoardConfig::default(), Arc::new(InMemoryStore::new()))
                .unwrap();
        assert!(panels.extensions().schema_extensions().is_empty());
    }

    #[test]
    fn missing_fields_dir_fails_build() {
        let dir = tempfile::tempdir().unwrap();
        let config = JobBoardConfig {
            fields_dir: Some(dir.path().join("absent")),
            ..JobBoardConfig::default()
        };
        let result = WritePanels::in_memory(config, Arc::new(InMemoryStore::new()));
        assert!(matches!(result, Err(FieldsError::NotInitialized { .. })));
    }
}
