//! Geolocation collaborator

/// Generates location data (coordinates, normalized address) for listings.
/// Generation is fire-and-forget: the save pipeline never waits on or
/// inspects its result.
pub trait Geocoder: Send + Sync {
    /// Whether the listing already carries generated location data.
    fn has_location_data(&self, listing_id: u64) -> bool;

    /// Generate location data for `location`.
    fn generate_location_data(&self, listing_id: u64, location: &str);
}
