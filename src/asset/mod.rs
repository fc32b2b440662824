//! Asset model and store
//!
//! This module provides the asset record handed out by the capability
//! endpoints and the store collaborator they read from and write to:
//! - `Asset`, `AssetType`, `AssetFlags`
//! - `AssetStore` trait
//! - `MemoryAssetStore`, an LRU cached tier over a canonical map

mod error;
mod model;
mod store;
#[cfg(test)]
mod tests;

pub use error::AssetError;
pub use model::{Asset, AssetFlags, AssetType};
pub use store::{AssetStore, MemoryAssetStore, DEFAULT_CACHE_CAPACITY};
