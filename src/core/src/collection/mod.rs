//! Observable record collections.
//!
//! - **`record`**: record identity (`Record`, `RecordId`)
//! - **`events`**: change events and the listener registry
//! - **`collection`**: the ordered, deduplicated `Collection`

#[allow(clippy::module_inception)]
mod collection;
mod events;
mod record;

pub use collection::Collection;
pub use events::{CollectionEvent, EventBus, EventFilter, EventKind, Subscription};
pub use record::{Record, RecordId};
