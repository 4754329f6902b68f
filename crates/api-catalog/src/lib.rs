#![doc = include_str!("../README.md")]

extern crate alloc;

mod attributes;
pub mod codec;
mod defaults;
mod entry;
mod error;
mod item;
mod listing;
mod order;

pub use attributes::EntryAttributes;
pub use codec::{WireCodec, decode_icon_cache, encode_icon_cache};
pub use defaults::DefaultsTable;
pub use entry::{CatalogEntry, entry_id};
pub use error::{CatalogError, parse_link};
pub use item::{CatalogItem, rewrite_link};
pub use listing::CatalogListing;
pub use order::by_rank;
