//! Book assets: timestamps, narration audio, illustrations, and the catalog.

pub mod fs;
pub mod store;

pub use fs::FsLibrary;
pub use store::{AssetStore, AudioRef, BookEntry, Catalog, ImageRef, MemoryAssetStore};
