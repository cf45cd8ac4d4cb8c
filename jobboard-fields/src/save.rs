//! The save pipeline: guard gate, per-field normalization and expiry
//! reconciliation.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::expiry::ExpiryOutcome;
use crate::panels::WritePanels;
use crate::sanitize::{
    epoch, is_email, kses_post, parse_date, positive_id, sanitize_text_field, stripslashes,
    url_decode, DATE_FORMAT,
};
use crate::types::{
    keys, ActingUser, FieldDescriptor, FieldType, ListingRecord, ListingUpdate, MetaValue,
    Submission, SubmittedValue,
};

/// What caused the host to save the listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveTrigger {
    /// A user submitted the edit form
    #[default]
    Edit,
    /// The editor's periodic autosave
    Autosave,
    /// A revision snapshot being written
    Revision,
}

/// One save event as delivered by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveRequest {
    pub listing_id: Option<u64>,
    pub trigger: SaveTrigger,
    pub submission: Submission,
}

impl SaveRequest {
    /// A form submission for `listing_id`.
    pub fn edit(listing_id: u64, submission: Submission) -> Self {
        Self {
            listing_id: Some(listing_id),
            trigger: SaveTrigger::Edit,
            submission,
        }
    }

    pub fn trigger(mut self, trigger: SaveTrigger) -> Self {
        self.trigger = trigger;
        self
    }
}

/// Why a save event was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The service is correcting this listing's status right now
    Reentrant,
    MissingId,
    ListingNotFound,
    EmptySubmission,
    Autosave,
    Revision,
    BadNonce,
    NotAuthorized,
    /// The record is not a job listing
    WrongType,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::Reentrant => "re-entrant save",
            Self::MissingId => "no listing id",
            Self::ListingNotFound => "listing not found",
            Self::EmptySubmission => "empty submission",
            Self::Autosave => "autosave",
            Self::Revision => "revision",
            Self::BadNonce => "nonce missing or invalid",
            Self::NotAuthorized => "user may not edit listing",
            Self::WrongType => "not a job listing",
        };
        f.write_str(reason)
    }
}

/// What a completed save wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    /// Keys written, deleted or applied to the record, in schema order.
    pub written: Vec<String>,
    pub expiry: ExpiryOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Skipped(SkipReason),
    Saved(SaveReport),
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved(_))
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Self::Skipped(reason) => Some(*reason),
            Self::Saved(_) => None,
        }
    }
}

impl WritePanels {
    /// Handle a save event from the host. Requests that fail a guard are
    /// ignored and reported as [`SaveOutcome::Skipped`].
    pub fn save_post(&self, request: &SaveRequest, user: &ActingUser) -> Result<SaveOutcome> {
        let listing = match self.check_guards(request, user)? {
            Ok(listing) => listing,
            Err(reason) => {
                debug!(listing = ?request.listing_id, user = user.id, %reason, "save skipped");
                return Ok(SaveOutcome::Skipped(reason));
            }
        };
        let report = self.save_listing_data(&listing, &request.submission, user)?;
        Ok(SaveOutcome::Saved(report))
    }

    fn check_guards(
        &self,
        request: &SaveRequest,
        user: &ActingUser,
    ) -> Result<std::result::Result<ListingRecord, SkipReason>> {
        let Some(id) = request.listing_id.filter(|id| *id > 0) else {
            return Ok(Err(SkipReason::MissingId));
        };
        if self.correcting.contains(&id) {
            return Ok(Err(SkipReason::Reentrant));
        }
        let Some(listing) = self.store.get_listing(id)? else {
            return Ok(Err(SkipReason::ListingNotFound));
        };
        if request.submission.is_empty() {
            return Ok(Err(SkipReason::EmptySubmission));
        }
        match request.trigger {
            SaveTrigger::Autosave => return Ok(Err(SkipReason::Autosave)),
            SaveTrigger::Revision => return Ok(Err(SkipReason::Revision)),
            SaveTrigger::Edit => {}
        }
        let token = request.submission.text(keys::NONCE_FIELD);
        if token.is_empty() || !self.nonces.verify(token, keys::NONCE_ACTION, user.id) {
            return Ok(Err(SkipReason::BadNonce));
        }
        if !user.can_edit_listing(&listing) {
            return Ok(Err(SkipReason::NotAuthorized));
        }
        if !listing.is_job_listing() {
            return Ok(Err(SkipReason::WrongType));
        }
        Ok(Ok(listing))
    }

    /// Normalize and store every field of the schema from `submission`, then
    /// reconcile the expiry date. Runs without the guard gate.
    pub fn save_listing_data(
        &self,
        listing: &ListingRecord,
        submission: &Submission,
        user: &ActingUser,
    ) -> Result<SaveReport> {
        self.store
            .add_meta(listing.id, keys::FILLED, MetaValue::Number(0))?;
        self.store
            .add_meta(listing.id, keys::FEATURED, MetaValue::Number(0))?;

        let mut written = Vec::new();
        for field in self.job_listing_fields(listing, user)? {
            if field.type_ == FieldType::Info {
                continue;
            }
            if self.save_field(listing, &field, submission)? {
                written.push(field.key);
            }
        }

        let expiry = self.reconcile_expiry(listing, submission)?;
        debug!(listing = listing.id, written = written.len(), ?expiry, "listing data saved");
        Ok(SaveReport { written, expiry })
    }

    /// Store one field. Returns `false` when the field was left alone.
    fn save_field(
        &self,
        listing: &ListingRecord,
        field: &FieldDescriptor,
        submission: &Submission,
    ) -> Result<bool> {
        let key = field.key.as_str();
        let id = listing.id;

        match key {
            keys::EXPIRES => {
                if submission.is_blank(key) {
                    let default = match self.config.submission_duration_days() {
                        Some(_) => self.expiry.default_expiry(id)?,
                        None => None,
                    };
                    match default {
                        Some(date) => {
                            self.store.update_meta(
                                id,
                                key,
                                date.format(DATE_FORMAT).to_string().into(),
                            )?;
                        }
                        None => {
                            self.store.delete_meta(id, key)?;
                        }
                    }
                } else {
                    let text = sanitize_text_field(submission.text(key));
                    let date = parse_date(&text, self.clock.today()).unwrap_or_else(|| {
                        warn!(listing = id, input = %text, "unparseable expiry date; stored as epoch");
                        epoch()
                    });
                    self.store
                        .update_meta(id, key, date.format(DATE_FORMAT).to_string().into())?;
                }
            }
            keys::LOCATION => {
                let location = sanitize_text_field(submission.text(key));
                let changed = self.store.update_meta(id, key, location.clone().into())?;
                if !changed
                    && self.config.geolocation_enabled
                    && !self.geocoder.has_location_data(id)
                {
                    debug!(listing = id, %location, "generating location data");
                    self.geocoder.generate_location_data(id, &location);
                }
            }
            keys::AUTHOR => {
                let author = positive_id(submission.text(key));
                self.store.update_listing(id, ListingUpdate::author(author))?;
                if author != listing.author {
                    info!(listing = id, from = listing.author, to = author, "listing author changed");
                }
            }
            keys::APPLICATION => {
                let raw = submission.text(key);
                let value = if is_email(raw) {
                    sanitize_text_field(raw)
                } else {
                    sanitize_text_field(&url_decode(raw))
                };
                self.store.update_meta(id, key, value.into())?;
            }
            _ => return self.save_generic(id, field, submission),
        }
        Ok(true)
    }

    fn save_generic(&self, id: u64, field: &FieldDescriptor, submission: &Submission) -> Result<bool> {
        let key = field.key.as_str();
        match field.type_ {
            FieldType::Textarea => {
                let html = kses_post(&stripslashes(submission.text(key)));
                self.store.update_meta(id, key, html.into())?;
            }
            FieldType::Checkbox => {
                let flag = i64::from(submission.contains(key));
                self.store.update_meta(id, key, MetaValue::Number(flag))?;
            }
            _ => match submission.get(key) {
                None => return Ok(false),
                Some(SubmittedValue::List(items)) => {
                    let kept: Vec<String> = items
                        .iter()
                        .map(|item| sanitize_text_field(item))
                        .filter(|item| !item.is_empty())
                        .collect();
                    self.store.update_meta(id, key, MetaValue::List(kept))?;
                }
                Some(SubmittedValue::Text(text)) => {
                    self.store
                        .update_meta(id, key, sanitize_text_field(text).into())?;
                }
            },
        }
        Ok(true)
    }
}
