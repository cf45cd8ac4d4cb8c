//! Registry of schema extensions, custom widgets and render observers

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use super::{RenderObserver, WidgetRenderer};
use crate::schema::SchemaExtension;
use crate::types::FieldType;

/// Extension points of the panel, assembled before the service is built.
#[derive(Default, Clone)]
pub struct PanelExtensions {
    schema: Vec<Arc<dyn SchemaExtension>>,
    widgets: HashMap<String, Arc<dyn WidgetRenderer>>,
    observers: Vec<Arc<dyn RenderObserver>>,
}

impl PanelExtensions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema_extension(mut self, extension: Arc<dyn SchemaExtension>) -> Self {
        self.schema.push(extension);
        self
    }

    /// Register a widget for the exact type tag `type_tag`. Tags of built-in
    /// widgets are accepted but never reached.
    pub fn with_widget(
        mut self,
        type_tag: impl Into<String>,
        renderer: Arc<dyn WidgetRenderer>,
    ) -> Self {
        let tag = type_tag.into();
        if FieldType::from(tag.as_str()).is_builtin() {
            warn!(%tag, "widget registered for a built-in type will not be used");
        } else {
            debug!(%tag, "registered widget");
        }
        self.widgets.insert(tag, renderer);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn RenderObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn schema_extensions(&self) -> &[Arc<dyn SchemaExtension>] {
        &self.schema
    }

    pub fn widget(&self, type_tag: &str) -> Option<&Arc<dyn WidgetRenderer>> {
        self.widgets.get(type_tag)
    }

    pub fn observers(&self) -> &[Arc<dyn RenderObserver>] {
        &self.observers
    }
}

impl fmt::Debug for PanelExtensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<_> = self.widgets.keys().collect();
        tags.sort();
        f.debug_struct("PanelExtensions")
            .field("schema", &self.schema.len())
            .field("widgets", &tags)
            .field("observers", &self.observers.len())
            .finish()
    }
}
