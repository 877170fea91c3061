//! Content model: identifiers, positions, collection scopes and typed entities.

mod content;
mod errors;
mod id;
mod record;
mod scope;

pub use content::{Activity, Album, Content, DonationMethod, Event, HeroImage, Item, Photo, SiteText};
pub use errors::ContentError;
pub use id::{ItemId, Position};
pub use record::{Fields, NewRecord, Record, sort_records};
pub use scope::{CollectionKind, CollectionScope};
