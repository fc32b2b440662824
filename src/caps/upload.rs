//! UploadBakedTexture capability and its one-shot uploader
//!
//! The viewer POSTs to `UploadBakedTexture` and receives the URL of a freshly
//! minted single-use endpoint. It then POSTs the raw texture bytes there; the
//! completion callback stores them and the endpoint is gone.

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use parking_lot::Mutex;
use serde::Serialize;
use uuid::Uuid;

use super::llsd::{self, LLSD_XML_CONTENT_TYPE};
use super::registry::{CapsHandler, CapsRegistry, RegistryError};
use super::request::{CapsRequest, CapsResponse};
use crate::asset::{Asset, AssetError, AssetFlags, AssetStore, AssetType};

/// Capability name of the one-shot upload endpoints
pub const UPLOAD_CAP_NAME: &str = "Upload";

/// Receives the uploaded bytes and returns the id of the stored asset
pub type UploadCallback = Arc<dyn Fn(Vec<u8>) -> Result<String, AssetError> + Send + Sync>;

/// Acknowledgement returned when an upload endpoint is issued
#[derive(Debug, Clone, Serialize)]
pub struct UploaderTicket {
    pub uploader: String,
    pub state: String,
}

/// Acknowledgement returned after the bytes were received
#[derive(Debug, Clone, Serialize)]
pub struct UploadComplete {
    pub new_asset: String,
    pub item_id: Uuid,
    pub state: String,
}

/// Mint a single-use POST endpoint wired to `on_complete` and return its URL
pub fn begin_upload(
    registry: &CapsRegistry,
    on_complete: UploadCallback,
) -> Result<String, RegistryError> {
    let path = register_uploader(registry, on_complete)?;
    Ok(registry.url_for(&path))
}

fn register_uploader(
    registry: &CapsRegistry,
    on_complete: UploadCallback,
) -> Result<String, RegistryError> {
    let path = CapsRegistry::mint_path(UPLOAD_CAP_NAME);
    let uploader = BakedTextureUploader {
        path: path.clone(),
        on_complete,
    };
    registry.register(Method::POST, path.clone(), Arc::new(uploader), true)?;
    Ok(path)
}

/// Default completion: store the bytes as a temporary baked texture owned by
/// `agent_id`
pub fn store_baked_texture(store: Arc<dyn AssetStore>, agent_id: Uuid) -> UploadCallback {
    Arc::new(move |data: Vec<u8>| -> Result<String, AssetError> {
        let asset = Asset::new(
            Uuid::new_v4().to_string(),
            "Baked Texture",
            AssetType::Texture,
            agent_id,
        )
        .with_data(data)
        .with_flags(AssetFlags::DELETABLE | AssetFlags::TEMPORARY);

        let new_asset_id = store.store(asset)?;
        tracing::debug!("Baked texture new id {}", new_asset_id);
        Ok(new_asset_id)
    })
}

fn llsd_response<T: Serialize>(status: StatusCode, body: &T) -> CapsResponse {
    match llsd::to_xml(body) {
        Ok(xml) => CapsResponse::bytes(status, LLSD_XML_CONTENT_TYPE, xml.into_bytes()),
        Err(e) => {
            tracing::error!("Failed to encode upload response: {}", e);
            CapsResponse::blank(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Uploader paths minted for one agent.
///
/// Once closed, the owning handler refuses to mint further uploaders. Minting
/// and closing both happen under the same lock, so every minted path is
/// either returned by `close` or never registered.
#[derive(Debug, Default)]
pub struct IssuedUploaders {
    paths: Vec<String>,
    closed: bool,
}

impl IssuedUploaders {
    /// Stop minting and hand back every path still to be revoked
    pub fn close(&mut self) -> Vec<String> {
        self.closed = true;
        std::mem::take(&mut self.paths)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Handler behind `/CAPS/UploadBakedTexture/<rand>/`
pub struct UploadBakedTexture {
    registry: Arc<CapsRegistry>,
    on_complete: UploadCallback,
    issued: Arc<Mutex<IssuedUploaders>>,
}

impl UploadBakedTexture {
    pub fn new(registry: Arc<CapsRegistry>, on_complete: UploadCallback) -> Self {
        Self {
            registry,
            on_complete,
            issued: Arc::new(Mutex::new(IssuedUploaders::default())),
        }
    }

    /// Share the record of every uploader path this handler mints
    pub fn with_issued(mut self, issued: Arc<Mutex<IssuedUploaders>>) -> Self {
        self.issued = issued;
        self
    }

    /// Register a fresh uploader unless the owning agent was torn down
    fn mint_uploader(&self) -> Result<Option<String>, RegistryError> {
        let mut issued = self.issued.lock();
        if issued.closed {
            return Ok(None);
        }

        // Consumed uploaders have already left the registry
        issued
            .paths
            .retain(|p| self.registry.contains(&Method::POST, p));
        let path = register_uploader(&self.registry, Arc::clone(&self.on_complete))?;
        issued.paths.push(path.clone());
        Ok(Some(path))
    }
}

impl CapsHandler for UploadBakedTexture {
    fn handle(&self, _request: &CapsRequest) -> CapsResponse {
        match self.mint_uploader() {
            Ok(Some(path)) => {
                let ticket = UploaderTicket {
                    uploader: self.registry.url_for(&path),
                    state: "upload".to_string(),
                };
                llsd_response(StatusCode::OK, &ticket)
            }
            Ok(None) => {
                tracing::debug!("Refusing to issue an uploader after capabilities were revoked");
                CapsResponse::blank(StatusCode::NOT_FOUND)
            }
            Err(e) => {
                tracing::error!("Failed to issue baked texture uploader: {}", e);
                CapsResponse::blank(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

/// One-shot endpoint receiving the raw texture bytes
pub struct BakedTextureUploader {
    path: String,
    on_complete: UploadCallback,
}

impl CapsHandler for BakedTextureUploader {
    fn handle(&self, request: &CapsRequest) -> CapsResponse {
        let data = request.body.to_vec();
        tracing::debug!("Received {} bytes on {}", data.len(), self.path);

        match (self.on_complete)(data) {
            Ok(new_asset) => {
                let ack = UploadComplete {
                    new_asset,
                    item_id: Uuid::nil(),
                    state: "complete".to_string(),
                };
                llsd_response(StatusCode::OK, &ack)
            }
            Err(e) => {
                tracing::error!("Baked texture upload on {} failed: {}", self.path, e);
                let ack = UploadComplete {
                    new_asset: Uuid::nil().to_string(),
                    item_id: Uuid::nil(),
                    state: "failed".to_string(),
                };
                llsd_response(StatusCode::INTERNAL_SERVER_ERROR, &ack)
            }
        }
    }
}
