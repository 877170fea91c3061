use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entity::{CollectionKind, CollectionScope, ContentError, Fields, ItemId};

/// A region of a rendered page that can be edited in place.
///
/// Pages mark editable regions with the target's attribute string; the admin
/// overlay posts it back together with the new field values.
///
/// | Target | Attribute |
/// |--------|-----------|
/// | `SiteText { key: "hero_title" }` | `text:hero_title` |
/// | `Item { scope: albums, id }` | `item:albums:<id>` |
/// | `Item { scope: photos/<album>, id }` | `item:photos/<album>:<id>` |
/// | `AlbumCover { album }` | `cover:<album>` |
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditTarget {
    SiteText { key: String },
    Item { scope: CollectionScope, id: ItemId },
    AlbumCover { album: ItemId },
}

impl EditTarget {
    /// The collection an edit of this target writes to.
    pub fn scope(&self) -> CollectionScope {
        match self {
            EditTarget::SiteText { .. } => CollectionScope::site_texts(),
            EditTarget::Item { scope, .. } => scope.clone(),
            EditTarget::AlbumCover { .. } => CollectionScope::albums(),
        }
    }

    /// Fields the overlay form offers for this target.
    pub fn editable_fields(&self) -> &'static [&'static str] {
        match self {
            EditTarget::SiteText { .. } => &["value"],
            EditTarget::AlbumCover { .. } => &["cover_url"],
            EditTarget::Item { scope, .. } => editable_fields(scope.kind()),
        }
    }
}

/// Fields an admin may edit on items of `kind`.
pub fn editable_fields(kind: CollectionKind) -> &'static [&'static str] {
    match kind {
        CollectionKind::HeroImages => &["alt_text", "caption"],
        CollectionKind::Albums => &["title", "description"],
        CollectionKind::Photos => &["caption"],
        CollectionKind::Activities => &["title", "summary", "image_url"],
        CollectionKind::Events => &["title", "description", "location", "starts_at"],
        CollectionKind::SiteTexts => &["value"],
        CollectionKind::DonationMethods => &["label", "details", "link"],
    }
}

fn valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl fmt::Display for EditTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditTarget::SiteText { key } => write!(f, "text:{key}"),
            EditTarget::Item { scope, id } => write!(f, "item:{scope}:{id}"),
            EditTarget::AlbumCover { album } => write!(f, "cover:{album}"),
        }
    }
}

impl FromStr for EditTarget {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ContentError::InvalidTarget {
            target: s.to_string(),
        };
        let (prefix, rest) = s.split_once(':').ok_or_else(invalid)?;
        match prefix {
            "text" if valid_key(rest) => Ok(EditTarget::SiteText {
                key: rest.to_string(),
            }),
            "cover" if valid_key(rest) => Ok(EditTarget::AlbumCover {
                album: ItemId::from(rest),
            }),
            "item" => {
                let (scope, id) = rest.rsplit_once(':').ok_or_else(invalid)?;
                if !valid_key(id) {
                    return Err(invalid());
                }
                let scope = match scope.split_once('/') {
                    Some((kind, parent)) => CollectionScope::parse(kind, Some(parent)),
                    None => CollectionScope::parse(scope, None),
                }
                .map_err(|_| invalid())?;
                Ok(EditTarget::Item {
                    scope,
                    id: ItemId::from(id),
                })
            }
            _ => Err(invalid()),
        }
    }
}

/// One in-place edit: which region, and the new values of its fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditRequest {
    pub target: EditTarget,
    pub fields: Fields,
}

impl EditRequest {
    pub fn new(target: EditTarget, fields: Fields) -> Self {
        Self { target, fields }
    }
}
