//! Collection kinds and scopes.
//!
//! A [`CollectionScope`] names one orderable collection: the kind of content
//! plus, for photos, the album the photos belong to.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{ContentError, ItemId};
use crate::constants;

/// The kinds of content the site stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    HeroImages,
    Albums,
    /// Photos inside one album. Always scoped by the album id.
    Photos,
    Activities,
    Events,
    SiteTexts,
    DonationMethods,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 7] = [
        CollectionKind::HeroImages,
        CollectionKind::Albums,
        CollectionKind::Photos,
        CollectionKind::Activities,
        CollectionKind::Events,
        CollectionKind::SiteTexts,
        CollectionKind::DonationMethods,
    ];

    /// Stable storage name.
    pub fn as_str(self) -> &'static str {
        match self {
            CollectionKind::HeroImages => constants::HERO_IMAGES,
            CollectionKind::Albums => constants::ALBUMS,
            CollectionKind::Photos => constants::PHOTOS,
            CollectionKind::Activities => constants::ACTIVITIES,
            CollectionKind::Events => constants::EVENTS,
            CollectionKind::SiteTexts => constants::SITE_TEXTS,
            CollectionKind::DonationMethods => constants::DONATION_METHODS,
        }
    }

    /// Whether collections of this kind live under a parent item.
    pub fn requires_parent(self) -> bool {
        matches!(self, CollectionKind::Photos)
    }
}

impl FromStr for CollectionKind {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CollectionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ContentError::UnknownCollection {
                name: s.to_string(),
            })
    }
}

impl std::fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One orderable collection: a kind plus an optional parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CollectionScope {
    kind: CollectionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent: Option<ItemId>,
}

impl CollectionScope {
    /// Build a scope, checking that the parent matches the kind.
    pub fn new(kind: CollectionKind, parent: Option<ItemId>) -> Result<Self, ContentError> {
        match (kind.requires_parent(), &parent) {
            (true, None) => Err(ContentError::InvalidScope {
                kind: kind.to_string(),
                reason: "a parent id is required".to_string(),
            }),
            (true, Some(p)) if p.is_empty() => Err(ContentError::InvalidScope {
                kind: kind.to_string(),
                reason: "parent id is empty".to_string(),
            }),
            (false, Some(_)) => Err(ContentError::InvalidScope {
                kind: kind.to_string(),
                reason: "this collection does not take a parent".to_string(),
            }),
            _ => Ok(Self { kind, parent }),
        }
    }

    pub fn hero_images() -> Self {
        Self::unscoped(CollectionKind::HeroImages)
    }

    pub fn albums() -> Self {
        Self::unscoped(CollectionKind::Albums)
    }

    pub fn activities() -> Self {
        Self::unscoped(CollectionKind::Activities)
    }

    pub fn events() -> Self {
        Self::unscoped(CollectionKind::Events)
    }

    pub fn site_texts() -> Self {
        Self::unscoped(CollectionKind::SiteTexts)
    }

    pub fn donation_methods() -> Self {
        Self::unscoped(CollectionKind::DonationMethods)
    }

    fn unscoped(kind: CollectionKind) -> Self {
        Self { kind, parent: None }
    }

    /// Scope of the photos inside one album.
    pub fn photos(album: ItemId) -> Self {
        Self {
            kind: CollectionKind::Photos,
            parent: Some(album),
        }
    }

    /// Parse a scope from a collection name and an optional, possibly empty, parent.
    pub fn parse(collection: &str, parent: Option<&str>) -> Result<Self, ContentError> {
        let kind = collection.parse()?;
        let parent = parent.filter(|p| !p.is_empty()).map(ItemId::from);
        Self::new(kind, parent)
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    pub fn parent(&self) -> Option<&ItemId> {
        self.parent.as_ref()
    }
}

impl std::fmt::Display for CollectionScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.parent {
            Some(parent) => write!(f, "{}/{}", self.kind, parent),
            None => write!(f, "{}", self.kind),
        }
    }
}
