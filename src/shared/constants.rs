/// Number of featured vehicles shown on the home page
pub const FEATURED_VEHICLE_LIMIT: i64 = 6;

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Staff role - can use the CMS to manage vehicles
pub const ROLE_STAFF: &str = "staff";

// =============================================================================
// STORAGE LAYOUT
// =============================================================================

/// Prefix for vehicle primary images
pub const VEHICLE_IMAGE_PREFIX: &str = "vehicles";

/// Prefix for vehicle gallery images
pub const GALLERY_IMAGE_PREFIX: &str = "vehicles/gallery";

/// Prefix for contact form attachments (followed by `YYYY/MM`)
pub const CONTACT_UPLOAD_PREFIX: &str = "contact_uploads";
