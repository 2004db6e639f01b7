pub mod catalog;
pub mod config;
pub mod daily;
pub mod error;
pub mod gateway;
pub mod locale;
pub mod options;
pub mod reference;
pub mod selection;
pub mod session;

// Re-export main types for convenience
pub use catalog::{Book, BookEntry, Catalog, Testament};
pub use config::Config;
pub use daily::{daily_reference, Mode};
pub use error::{CatalogError, FetchError, SelectionError, SubmitError, UnsupportedLocale};
pub use gateway::{Passage, PassageVerse, ProxyGateway};
pub use locale::{Labels, Locale, Translation};
pub use options::{build_options, OptionGroup, OptionItem, RangeOption, VerseOptions};
pub use reference::{canonicalize, CanonicalReference, ReferenceQuery};
pub use selection::{Availability, Selection, SelectionState, VerseChoice};
pub use session::{Delivery, PendingLookup, Session};
