//! The field schema of the listing data panel

use chrono::NaiveDate;
use tracing::debug;

use crate::error::Result;
use crate::panels::WritePanels;
use crate::sanitize::{epoch, parse_date, DATE_FORMAT};
use crate::types::{keys, ActingUser, Capability, FieldDescriptor, FieldType, ListingRecord};

/// Adds or modifies descriptors before they are sorted.
///
/// Implementations see the list in registration order and may push new
/// fields, edit existing ones in place or remove them.
pub trait SchemaExtension: Send + Sync {
    fn extend_fields(&self, listing_id: u64, fields: &mut Vec<FieldDescriptor>);
}

/// Stable ascending sort by priority. Equal priorities keep their order.
pub fn sort_by_priority(fields: &mut [FieldDescriptor]) {
    fields.sort_by(|a, b| a.priority.cmp(&b.priority));
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

impl WritePanels {
    /// The ordered fields of the listing panel as seen by `user`.
    pub fn job_listing_fields(
        &self,
        listing: &ListingRecord,
        user: &ActingUser,
    ) -> Result<Vec<FieldDescriptor>> {
        let application = match self.store.get_meta(listing.id, keys::APPLICATION)? {
            Some(stored) => stored,
            None => user.email.clone().into(),
        };

        let mut fields = vec![
            FieldDescriptor::new(keys::LOCATION, "Location")
                .placeholder("e.g. \"London\"")
                .description("Leave this blank if the location is not important.")
                .priority(1),
            FieldDescriptor::new(keys::APPLICATION, "Application Email or URL")
                .placeholder("URL or email which applicants use to apply")
                .description(
                    "This field is required for the \"application\" area to appear beneath the listing.",
                )
                .value(application)
                .priority(2),
            FieldDescriptor::new(keys::COMPANY_NAME, "Company Name").priority(3),
            FieldDescriptor::new(keys::COMPANY_WEBSITE, "Company Website").priority(4),
            FieldDescriptor::new(keys::COMPANY_TAGLINE, "Company Tagline")
                .placeholder("Brief description about the company")
                .priority(5),
            FieldDescriptor::new(keys::COMPANY_TWITTER, "Company Twitter")
                .placeholder("@yourcompany")
                .priority(6),
            FieldDescriptor::new(keys::COMPANY_VIDEO, "Company Video")
                .placeholder("URL to the company video")
                .kind(FieldType::File)
                .priority(8),
            FieldDescriptor::new(keys::FILLED, "Position Filled")
                .kind(FieldType::Checkbox)
                .priority(9)
                .description("Filled listings will no longer accept applications."),
        ];

        if user.has_cap(Capability::ManageJobListings) {
            fields.push(
                FieldDescriptor::new(keys::FEATURED, "Featured Listing")
                    .kind(FieldType::Checkbox)
                    .description(
                        "Featured listings will be sticky during searches, and can be styled differently.",
                    )
                    .priority(10),
            );
            fields.push(self.expiry_field(listing)?);
        }

        if user.has_cap(Capability::EditOthersJobListings) {
            fields.push(
                FieldDescriptor::new(keys::AUTHOR, "Posted by")
                    .kind(FieldType::Author)
                    .priority(12),
            );
        }

        for extension in self.extensions.schema_extensions() {
            extension.extend_fields(listing.id, &mut fields);
        }

        sort_by_priority(&mut fields);
        debug!(
            listing = listing.id,
            user = user.id,
            count = fields.len(),
            "built listing fields"
        );
        Ok(fields)
    }

    fn expiry_field(&self, listing: &ListingRecord) -> Result<FieldDescriptor> {
        let stored = self
            .store
            .get_meta(listing.id, keys::EXPIRES)?
            .filter(|value| !value.is_empty())
            .map(|value| value.as_text());

        let (value, placeholder) = match stored {
            Some(text) => {
                let normalized =
                    format_date(parse_date(&text, self.clock.today()).unwrap_or_else(epoch));
                (normalized, "yyyy-mm-dd".to_string())
            }
            None => {
                let default = self
                    .expiry
                    .default_expiry(listing.id)?
                    .map(format_date)
                    .unwrap_or_default();
                (String::new(), default)
            }
        };

        Ok(FieldDescriptor::new(keys::EXPIRES, "Listing Expiry Date")
            .priority(11)
            .classes(["job-manager-datepicker"])
            .placeholder(placeholder)
            .value(value))
    }
}
