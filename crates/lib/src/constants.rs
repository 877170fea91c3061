//! Constants used throughout the Kindred library.
//!
//! Storage names of collections, asset folders and well-known editable text keys.

/// Storage name for hero carousel images.
pub const HERO_IMAGES: &str = "hero_images";

/// Storage name for photo albums.
pub const ALBUMS: &str = "albums";

/// Storage name for photos (always scoped to an album).
pub const PHOTOS: &str = "photos";

/// Storage name for activity cards.
pub const ACTIVITIES: &str = "activities";

/// Storage name for events.
pub const EVENTS: &str = "events";

/// Storage name for free-form editable text regions.
pub const SITE_TEXTS: &str = "site_texts";

/// Storage name for donation methods.
pub const DONATION_METHODS: &str = "donation_methods";

/// Asset folder for hero images.
pub const HERO_FOLDER: &str = "hero";

/// Asset folder for album covers.
pub const COVERS_FOLDER: &str = "covers";

/// Asset folder for album photos.
pub const PHOTOS_FOLDER: &str = "photos";

/// Asset folders accepted by asset stores.
pub const ASSET_FOLDERS: &[&str] = &[HERO_FOLDER, COVERS_FOLDER, PHOTOS_FOLDER, "misc"];

/// Default JSON persistence file for the in-memory backend.
pub const CONTENT_FILE: &str = "kindred.json";

/// Default SQLite database file.
pub const SQLITE_FILE: &str = "kindred.db";

/// Well-known site text keys rendered on the home page.
pub mod text_keys {
    /// Headline over the hero carousel.
    pub const HERO_TITLE: &str = "hero_title";
    /// Sub-headline over the hero carousel.
    pub const HERO_SUBTITLE: &str = "hero_subtitle";
    /// Mission statement paragraph.
    pub const MISSION: &str = "mission";
    /// Call-to-action text in the donation section.
    pub const DONATE_CALL: &str = "donate_call";
    /// Footer line.
    pub const FOOTER: &str = "footer";

    /// Keys rendered on the home page, in display order.
    pub const HOME: &[&str] = &[HERO_TITLE, HERO_SUBTITLE, MISSION, DONATE_CALL, FOOTER];
}
