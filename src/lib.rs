//! asset-caps - capability-gated asset delivery for virtual-world viewers
//!
//! This crate provides:
//! - A process-wide capability registry mapping unguessable URLs to handlers
//! - GetTexture with cache/origin/transcode fallback and byte ranges
//! - GetMesh with diagnostic 404s
//! - The two-step UploadBakedTexture handshake with single-use uploaders
//! - Per-agent issue and revoke of the capability set
//! - An axum front end, JSON configuration and `tracing` based logging

pub mod asset;
pub mod caps;
pub mod config;
pub mod core;
pub mod logging;
pub mod server;
pub mod transcode;

// Re-export commonly used items
pub use asset::{Asset, AssetFlags, AssetStore, AssetType, MemoryAssetStore};
pub use caps::{AssetCaps, CapsRegistry, CapsRequest, CapsResponse, CapsUrls};
pub use config::{AppConfig, ConfigStore};
pub use crate::core::error::{CapsError, Result};
pub use server::{CapsServer, ServerHandle};
pub use transcode::{ImageTranscoder, Transcoder};
