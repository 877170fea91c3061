//! Typed site content.
//!
//! Each entity is a plain serde struct. [`Content`] ties it to a collection
//! kind and converts it to and from the stored field map.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use super::{CollectionKind, ContentError, Fields, ItemId, Position, Record};

/// A typed entity stored in one kind of collection.
pub trait Content: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The collection kind this entity lives in.
    const KIND: CollectionKind;

    /// Encode into a stored field map.
    fn to_fields(&self) -> Result<Fields, ContentError> {
        let encode_err = |source| ContentError::FieldEncode {
            kind: Self::KIND.to_string(),
            source,
        };
        match serde_json::to_value(self).map_err(encode_err)? {
            serde_json::Value::Object(map) => Ok(map),
            other => Err(encode_err(serde::ser::Error::custom(format!(
                "expected an object, got {other}"
            )))),
        }
    }

    /// Decode from a stored field map.
    fn from_fields(fields: &Fields) -> Result<Self, ContentError> {
        serde_json::from_value(serde_json::Value::Object(fields.clone())).map_err(|source| {
            ContentError::FieldDecode {
                kind: Self::KIND.to_string(),
                source,
            }
        })
    }
}

/// Typed view of a stored record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item<T> {
    pub id: ItemId,
    pub position: Position,
    pub content: T,
}

impl<T: Content> Item<T> {
    /// Decode a record, checking that it belongs to `T`'s collection kind.
    pub fn from_record(record: &Record) -> Result<Self, ContentError> {
        if record.scope.kind() != T::KIND {
            return Err(ContentError::KindMismatch {
                id: record.id.to_string(),
                expected: T::KIND.to_string(),
                actual: record.scope.kind().to_string(),
            });
        }
        Ok(Self {
            id: record.id.clone(),
            position: record.position,
            content: T::from_fields(&record.fields)?,
        })
    }
}

/// Full-width image in the home page carousel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroImage {
    pub image_url: String,
    #[serde(default)]
    pub alt_text: String,
    #[serde(default)]
    pub caption: String,
}

impl Content for HeroImage {
    const KIND: CollectionKind = CollectionKind::HeroImages;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
}

impl Content for Album {
    const KIND: CollectionKind = CollectionKind::Albums;
}

/// A photo inside an album.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub image_url: String,
    #[serde(default)]
    pub caption: String,
}

impl Content for Photo {
    const KIND: CollectionKind = CollectionKind::Photos;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Content for Activity {
    const KIND: CollectionKind = CollectionKind::Activities;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub starts_at: DateTime<Utc>,
}

impl Content for Event {
    const KIND: CollectionKind = CollectionKind::Events;
}

/// Free-form editable text region, addressed by key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteText {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

impl Content for SiteText {
    const KIND: CollectionKind = CollectionKind::SiteTexts;
}

/// A way to donate: bank transfer details, a payment link and so on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationMethod {
    pub label: String,
    #[serde(default)]
    pub details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Content for DonationMethod {
    const KIND: CollectionKind = CollectionKind::DonationMethods;
}
