//! Listing expiry: the clock, the default-expiry policy and the reconciliation
//! that runs at the end of every save.

use std::sync::Arc;

use chrono::{Days, Local, NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::panels::WritePanels;
use crate::sanitize::{positive_id, DATE_FORMAT};
use crate::store::MetaStore;
use crate::types::{keys, ListingRecord, ListingStatus, ListingUpdate, MetaValue, Submission};

/// Site-local time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// The machine's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock stuck at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl FixedClock {
    /// Midnight of `date`.
    pub fn on(date: NaiveDate) -> Self {
        Self(date.and_time(chrono::NaiveTime::MIN))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Computes the expiry date a listing gets when none is given.
pub trait ExpiryPolicy: Send + Sync {
    fn default_expiry(&self, listing_id: u64) -> Result<Option<NaiveDate>>;
}

/// `today + duration`, where the duration is the listing's own
/// `_job_duration` if positive, else the site-wide submission duration.
pub struct DurationExpiryPolicy {
    store: Arc<dyn MetaStore>,
    clock: Arc<dyn Clock>,
    submission_duration: Option<u32>,
}

impl DurationExpiryPolicy {
    pub fn new(
        store: Arc<dyn MetaStore>,
        clock: Arc<dyn Clock>,
        submission_duration: Option<u32>,
    ) -> Self {
        Self {
            store,
            clock,
            submission_duration: submission_duration.filter(|days| *days > 0),
        }
    }
}

impl ExpiryPolicy for DurationExpiryPolicy {
    fn default_expiry(&self, listing_id: u64) -> Result<Option<NaiveDate>> {
        let own = self
            .store
            .get_meta(listing_id, keys::DURATION)?
            .map(|value| positive_id(&value.as_text()))
            .filter(|days| *days > 0);

        let Some(days) = own.or(self.submission_duration.map(u64::from)) else {
            return Ok(None);
        };
        Ok(self.clock.today().checked_add_days(Days::new(days)))
    }
}

/// Whether a stored expiry date lies strictly before `today`. Both sides are
/// canonical `YYYY-MM-DD`, so string order is date order.
pub fn is_expired(expiry: &str, today: NaiveDate) -> bool {
    if expiry.is_empty() || expiry == "0" {
        return false;
    }
    today.format(DATE_FORMAT).to_string().as_str() > expiry
}

/// What reconciliation did to a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpiryOutcome {
    /// No expiry date, or one in the future
    Active,
    /// Status forced to expired
    Expired,
    /// An expired listing was republished and got a fresh expiry date
    Renewed { expires: Option<NaiveDate> },
}

impl WritePanels {
    /// Compare the stored expiry date with today and expire or renew the
    /// listing. Runs after all fields of a save are written.
    pub fn reconcile_expiry(
        &self,
        listing: &ListingRecord,
        submission: &Submission,
    ) -> Result<ExpiryOutcome> {
        let expiry = self
            .store
            .get_meta(listing.id, keys::EXPIRES)?
            .map(|value| value.as_text())
            .unwrap_or_default();

        if !is_expired(&expiry, self.clock.today()) {
            return Ok(ExpiryOutcome::Active);
        }

        if submission.is_reactivation() {
            let expires = self.expiry.default_expiry(listing.id)?;
            match expires {
                Some(date) => {
                    self.store.update_meta(
                        listing.id,
                        keys::EXPIRES,
                        MetaValue::Text(date.format(DATE_FORMAT).to_string()),
                    )?;
                }
                None => {
                    warn!(
                        listing = listing.id,
                        "reactivated listing has no default expiry; clearing the old date"
                    );
                    self.store.delete_meta(listing.id, keys::EXPIRES)?;
                }
            }
            info!(listing = listing.id, expires = ?expires, "expired listing reactivated");
            return Ok(ExpiryOutcome::Renewed { expires });
        }

        self.correcting.insert(listing.id);
        let _reset = scopeguard::guard(&self.correcting, |correcting| {
            correcting.remove(&listing.id);
        });
        debug!(listing = listing.id, %expiry, "expiry date has passed");
        self.store
            .update_listing(listing.id, ListingUpdate::status(ListingStatus::Expired))?;
        info!(listing = listing.id, "listing expired");
        Ok(ExpiryOutcome::Expired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use rstest::rstest;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case("2020-01-01", true)]
    #[case("2024-06-14", true)]
    #[case("2024-06-15", false)]
    #[case("2030-01-01", false)]
    #[case("", false)]
    #[case("0", false)]
    fn expiry_comparison(#[case] expiry: &str, #[case] expired: bool) {
        assert_eq!(is_expired(expiry, day(2024, 6, 15)), expired);
    }

    #[test]
    fn policy_uses_site_duration() {
        let store = Arc::new(InMemoryStore::new());
        let policy = DurationExpiryPolicy::new(
            store,
            Arc::new(FixedClock::on(day(2024, 6, 15))),
            Some(30),
        );
        assert_eq!(policy.default_expiry(1).unwrap(), Some(day(2024, 7, 15)));
    }

    #[test]
    fn policy_prefers_listing_duration() {
        let store = Arc::new(InMemoryStore::new());
        store.set_meta(1, keys::DURATION, "7");
        let policy = DurationExpiryPolicy::new(
            store,
            Arc::new(FixedClock::on(day(2024, 6, 15))),
            Some(30),
        );
        assert_eq!(policy.default_expiry(1).unwrap(), Some(day(2024, 6, 22)));
    }

    #[test]
    fn policy_without_duration_has_no_default() {
        let store = Arc::new(InMemoryStore::new());
        let policy =
            DurationExpiryPolicy::new(store, Arc::new(FixedClock::on(day(2024, 6, 15))), Some(0));
        assert_eq!(policy.default_expiry(1).unwrap(), None);
    }
}
