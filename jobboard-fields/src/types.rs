//! Core types: field descriptors, stored values, listing records, users and
//! submissions.

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Metadata keys and form names with special handling.
pub mod keys {
    pub const LOCATION: &str = "_job_location";
    pub const APPLICATION: &str = "_application";
    pub const COMPANY_NAME: &str = "_company_name";
    pub const COMPANY_WEBSITE: &str = "_company_website";
    pub const COMPANY_TAGLINE: &str = "_company_tagline";
    pub const COMPANY_TWITTER: &str = "_company_twitter";
    pub const COMPANY_VIDEO: &str = "_company_video";
    pub const FILLED: &str = "_filled";
    pub const FEATURED: &str = "_featured";
    pub const EXPIRES: &str = "_job_expires";
    pub const AUTHOR: &str = "_job_author";
    /// Per-listing lifetime override, in days.
    pub const DURATION: &str = "_job_duration";

    pub const NONCE_FIELD: &str = "job_manager_nonce";
    pub const NONCE_ACTION: &str = "save_meta_data";
    pub const POST_STATUS: &str = "post_status";
    pub const ORIGINAL_POST_STATUS: &str = "original_post_status";
}

/// Content type of job listing records.
pub const JOB_LISTING_TYPE: &str = "job_listing";

/// Priority given to descriptors that do not declare one. Sorts after every
/// built-in field.
pub const DEFAULT_PRIORITY: i32 = 100;

/// Widget type of a field. Unknown tags are kept as [`FieldType::Custom`] so
/// registered renderers can pick them up.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    #[default]
    Text,
    Textarea,
    Select,
    Multiselect,
    Checkbox,
    Radio,
    File,
    Author,
    Hidden,
    Info,
    Custom(String),
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Select => "select",
            Self::Multiselect => "multiselect",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::File => "file",
            Self::Author => "author",
            Self::Hidden => "hidden",
            Self::Info => "info",
            Self::Custom(tag) => tag,
        }
    }

    /// Whether a built-in widget exists for this type.
    pub fn is_builtin(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }
}

impl From<&str> for FieldType {
    fn from(tag: &str) -> Self {
        match tag {
            "" | "text" => Self::Text,
            "textarea" => Self::Textarea,
            "select" => Self::Select,
            "multiselect" => Self::Multiselect,
            "checkbox" => Self::Checkbox,
            "radio" => Self::Radio,
            "file" => Self::File,
            "author" => Self::Author,
            "hidden" => Self::Hidden,
            "info" => Self::Info,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl From<String> for FieldType {
    fn from(tag: String) -> Self {
        Self::from(tag.as_str())
    }
}

impl From<FieldType> for String {
    fn from(ty: FieldType) -> Self {
        ty.as_str().to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored metadata value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Number(i64),
    Text(String),
    List(Vec<String>),
}

impl MetaValue {
    /// Scalar text form. Lists join with commas.
    pub fn as_text(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
            Self::List(items) => items.join(","),
        }
    }

    /// Falsy values: `0`, `""`, `"0"` and the empty list.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Number(n) => *n == 0,
            Self::Text(s) => s.is_empty() || s == "0",
            Self::List(items) => items.is_empty(),
        }
    }

    /// The value as a list of entries; a scalar becomes a single entry.
    pub fn to_list(&self) -> Vec<String> {
        match self {
            Self::List(items) => items.clone(),
            other => vec![other.as_text()],
        }
    }
}

impl From<&str> for MetaValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for MetaValue {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<Vec<String>> for MetaValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

/// Describes one field of the listing panel: how it is labelled, which widget
/// draws it, where it sorts and what it currently holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub type_: FieldType,
    #[serde(default = "default_priority")]
    pub priority: i32,
    /// Explicit value; `None` means "read the stored metadata".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<MetaValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    /// Option key → display label, in display order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub options: IndexMap<String, String>,
    /// Form input name when it differs from the key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub multiple: bool,
    /// Display-only HTML for `info` fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub information: Option<String>,
}

impl FieldDescriptor {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            placeholder: String::new(),
            description: None,
            type_: FieldType::Text,
            priority: DEFAULT_PRIORITY,
            value: None,
            classes: Vec::new(),
            options: IndexMap::new(),
            name: None,
            multiple: false,
            information: None,
        }
    }

    pub fn kind(mut self, type_: FieldType) -> Self {
        self.type_ = type_;
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn value(mut self, value: impl Into<MetaValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classes = classes.into_iter().map(Into::into).collect();
        self
    }

    pub fn options<I, K, V>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.options = options
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }

    pub fn information(mut self, information: impl Into<String>) -> Self {
        self.information = Some(information.into());
        self
    }

    /// The form input name: the override when non-empty, else the key.
    pub fn input_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.key,
        }
    }

    /// Whether the explicit value is missing or falsy.
    pub fn value_is_empty(&self) -> bool {
        self.value.as_ref().is_none_or(MetaValue::is_empty)
    }
}

/// Status of a listing record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ListingStatus {
    Draft,
    Pending,
    Publish,
    Expired,
    Preview,
    Other(String),
}

impl ListingStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Publish => "publish",
            Self::Expired => "expired",
            Self::Preview => "preview",
            Self::Other(s) => s,
        }
    }
}

impl From<&str> for ListingStatus {
    fn from(s: &str) -> Self {
        match s {
            "draft" => Self::Draft,
            "pending" => Self::Pending,
            "publish" => Self::Publish,
            "expired" => Self::Expired,
            "preview" => Self::Preview,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for ListingStatus {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<ListingStatus> for String {
    fn from(status: ListingStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The content record a set of fields belongs to. Metadata lives in the
/// [`MetaStore`](crate::store::MetaStore) beside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub id: u64,
    pub post_type: String,
    /// `0` marks a guest submission.
    pub author: u64,
    pub status: ListingStatus,
}

impl ListingRecord {
    /// A job listing record.
    pub fn job_listing(id: u64, author: u64, status: ListingStatus) -> Self {
        Self {
            id,
            post_type: JOB_LISTING_TYPE.to_string(),
            author,
            status,
        }
    }

    pub fn is_job_listing(&self) -> bool {
        self.post_type == JOB_LISTING_TYPE
    }
}

/// Record attributes to change. `None` leaves the attribute alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingUpdate {
    pub status: Option<ListingStatus>,
    pub author: Option<u64>,
}

impl ListingUpdate {
    pub fn status(status: ListingStatus) -> Self {
        Self {
            status: Some(status),
            author: None,
        }
    }

    pub fn author(author: u64) -> Self {
        Self {
            status: None,
            author: Some(author),
        }
    }
}

/// Capabilities that gate fields and saving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    EditJobListings,
    EditOthersJobListings,
    ManageJobListings,
}

/// The user performing the render or save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActingUser {
    pub id: u64,
    pub email: String,
    pub capabilities: HashSet<Capability>,
}

impl ActingUser {
    pub fn new(id: u64, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            capabilities: HashSet::new(),
        }
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    pub fn has_cap(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Managers and editors of others' listings may edit any listing; plain
    /// editors only their own.
    pub fn can_edit_listing(&self, listing: &ListingRecord) -> bool {
        self.has_cap(Capability::ManageJobListings)
            || self.has_cap(Capability::EditOthersJobListings)
            || (self.has_cap(Capability::EditJobListings) && listing.author == self.id)
    }
}

/// One submitted form value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmittedValue {
    Text(String),
    List(Vec<String>),
}

/// The submitted form payload, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Submission {
    values: IndexMap<String, SubmittedValue>,
}

impl Submission {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a scalar value.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values
            .insert(key.into(), SubmittedValue::Text(value.into()));
        self
    }

    /// Add a list value.
    pub fn with_list<I, S>(mut self, key: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values.insert(
            key.into(),
            SubmittedValue::List(items.into_iter().map(Into::into).collect()),
        );
        self
    }

    pub fn get(&self, key: &str) -> Option<&SubmittedValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Scalar text for `key`. Absent keys and lists read as `""`.
    pub fn text(&self, key: &str) -> &str {
        match self.values.get(key) {
            Some(SubmittedValue::Text(s)) => s,
            _ => "",
        }
    }

    /// Absent, `""`, `"0"` or an empty list.
    pub fn is_blank(&self, key: &str) -> bool {
        match self.values.get(key) {
            None => true,
            Some(SubmittedValue::Text(s)) => s.is_empty() || s == "0",
            Some(SubmittedValue::List(items)) => items.is_empty(),
        }
    }

    /// An expired listing being published again from the edit screen.
    pub fn is_reactivation(&self) -> bool {
        self.get(keys::POST_STATUS).is_some()
            && self.get(keys::ORIGINAL_POST_STATUS).is_some()
            && self.text(keys::ORIGINAL_POST_STATUS) == ListingStatus::Expired.as_str()
            && self.text(keys::POST_STATUS) == ListingStatus::Publish.as_str()
    }
}

impl<K, V> FromIterator<(K, V)> for Submission
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), SubmittedValue::Text(v.into())))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", FieldType::Text)]
    #[case("checkbox", FieldType::Checkbox)]
    #[case("multiselect", FieldType::Multiselect)]
    #[case("term-checklist", FieldType::Custom("term-checklist".into()))]
    fn field_type_from_tag(#[case] tag: &str, #[case] expected: FieldType) {
        assert_eq!(FieldType::from(tag), expected);
    }

    #[rstest]
    #[case(MetaValue::Number(0), true)]
    #[case(MetaValue::Number(1), false)]
    #[case(MetaValue::Text("0".into()), true)]
    #[case(MetaValue::Text(String::new()), true)]
    #[case(MetaValue::Text("London".into()), false)]
    #[case(MetaValue::List(vec![]), true)]
    fn meta_value_emptiness(#[case] value: MetaValue, #[case] empty: bool) {
        assert_eq!(value.is_empty(), empty);
    }

    #[test]
    fn descriptor_from_yaml_uses_defaults() {
        let yaml = r#"
key: _job_salary
label: Salary
type: select
options:
  low: Under 30k
  high: Over 30k
"#;
        let field: FieldDescriptor = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(field.type_, FieldType::Select);
        assert_eq!(field.priority, DEFAULT_PRIORITY);
        assert_eq!(field.value, None);
        let keys: Vec<_> = field.options.keys().cloned().collect();
        assert_eq!(keys, vec!["low", "high"]);
    }

    #[test]
    fn descriptor_yaml_keeps_custom_type_tag() {
        let field = FieldDescriptor::new("_salary", "Salary").kind(FieldType::from("money"));
        let yaml = serde_yaml_ng::to_string(&field).unwrap();
        assert!(yaml.contains("type: money"));
        let parsed: FieldDescriptor = serde_yaml_ng::from_str(&yaml).unwrap();
        assert_eq!(parsed.type_, FieldType::Custom("money".into()));
    }

    #[test]
    fn input_name_ignores_empty_override() {
        let field = FieldDescriptor::new("_company_name", "Company").name("");
        assert_eq!(field.input_name(), "_company_name");
        let field = field.name("company");
        assert_eq!(field.input_name(), "company");
    }

    #[test]
    fn capability_gates_editing() {
        let listing = ListingRecord::job_listing(7, 3, ListingStatus::Publish);
        let owner = ActingUser::new(3, "a@example.com").with_capability(Capability::EditJobListings);
        let stranger =
            ActingUser::new(4, "b@example.com").with_capability(Capability::EditJobListings);
        let editor =
            ActingUser::new(5, "c@example.com").with_capability(Capability::EditOthersJobListings);
        assert!(owner.can_edit_listing(&listing));
        assert!(!stranger.can_edit_listing(&listing));
        assert!(editor.can_edit_listing(&listing));
    }

    #[rstest]
    #[case(Some("publish"), Some("expired"), true)]
    #[case(Some("publish"), Some("draft"), false)]
    #[case(Some("draft"), Some("expired"), false)]
    #[case(None, Some("expired"), false)]
    fn reactivation_detection(
        #[case] status: Option<&str>,
        #[case] original: Option<&str>,
        #[case] expected: bool,
    ) {
        let mut submission = Submission::new();
        if let Some(s) = status {
            submission = submission.with(keys::POST_STATUS, s);
        }
        if let Some(s) = original {
            submission = submission.with(keys::ORIGINAL_POST_STATUS, s);
        }
        assert_eq!(submission.is_reactivation(), expected);
    }

    #[test]
    fn submission_text_of_list_is_empty() {
        let submission = Submission::new().with_list("_tags", ["a", "b"]);
        assert_eq!(submission.text("_tags"), "");
        assert!(!submission.is_blank("_tags"));
        assert!(submission.is_blank("_missing"));
    }
}
