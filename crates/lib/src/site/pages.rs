use std::collections::BTreeMap;

use serde::Serialize;

use crate::entity::{Activity, Album, DonationMethod, Event, HeroImage, Item, Photo};

/// Everything the home page renders.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HomePage {
    pub hero_images: Vec<Item<HeroImage>>,
    /// Editable text regions by key.
    pub texts: BTreeMap<String, String>,
    pub activities: Vec<Item<Activity>>,
    pub upcoming_events: Vec<Item<Event>>,
    pub albums: Vec<Item<Album>>,
    pub donation_methods: Vec<Item<DonationMethod>>,
}

impl HomePage {
    /// Text for `key`, or an empty string when it has never been edited.
    pub fn text(&self, key: &str) -> &str {
        self.texts.get(key).map(String::as_str).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AlbumPage {
    pub album: Item<Album>,
    pub photos: Vec<Item<Photo>>,
}
