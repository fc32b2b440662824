//! Per-agent capability lifecycle
//!
//! Session establishment calls `issue_capabilities`, which mints and
//! registers the GetTexture, GetMesh and UploadBakedTexture endpoints for one
//! agent. Session teardown calls `revoke_capabilities`, which removes them
//! together with any upload endpoint the agent was issued but never used.

use std::sync::Arc;

use axum::http::Method;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::mesh::MeshDelivery;
use super::registry::CapsRegistry;
use super::texture::TextureDelivery;
use super::upload::{store_baked_texture, IssuedUploaders, UploadBakedTexture, UploadCallback};
use crate::asset::{AssetError, AssetStore};
use crate::config::CapsConfig;
use crate::core::Result;
use crate::transcode::Transcoder;

pub const GET_TEXTURE_CAP: &str = "GetTexture";
pub const GET_MESH_CAP: &str = "GetMesh";
pub const UPLOAD_BAKED_TEXTURE_CAP: &str = "UploadBakedTexture";

/// Capability URLs handed to the viewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapsUrls {
    #[serde(rename = "GetTexture")]
    pub get_texture: String,
    #[serde(rename = "GetMesh")]
    pub get_mesh: String,
    #[serde(rename = "UploadBakedTexture")]
    pub upload_baked_texture: String,
}

/// Registry paths owned by one agent
struct AgentCaps {
    get_texture: String,
    get_mesh: String,
    upload_baked_texture: String,
    uploaders: Arc<Mutex<IssuedUploaders>>,
}

/// Issues and revokes the asset capabilities of each agent
pub struct AssetCaps {
    registry: Arc<CapsRegistry>,
    store: Option<Arc<dyn AssetStore>>,
    transcoder: Arc<dyn Transcoder>,
    settings: CapsConfig,
    agents: DashMap<Uuid, AgentCaps>,
}

impl AssetCaps {
    pub fn new(
        registry: Arc<CapsRegistry>,
        store: Option<Arc<dyn AssetStore>>,
        transcoder: Arc<dyn Transcoder>,
        settings: CapsConfig,
    ) -> Self {
        Self {
            registry,
            store,
            transcoder,
            settings,
            agents: DashMap::new(),
        }
    }

    pub fn registry(&self) -> &Arc<CapsRegistry> {
        &self.registry
    }

    /// Mint and register the capability set for `agent_id`.
    ///
    /// An agent that already holds capabilities has them revoked first.
    pub fn issue_capabilities(&self, agent_id: Uuid) -> Result<CapsUrls> {
        if self.revoke_capabilities(agent_id) {
            tracing::debug!("Replacing existing capabilities of agent {}", agent_id);
        }

        let texture = TextureDelivery::new(
            self.store.clone(),
            Arc::clone(&self.transcoder),
            self.settings.default_format.clone(),
        )
        .with_redirect(self.settings.redirect_url.clone());
        let mesh = MeshDelivery::new(self.store.clone())
            .with_content_type(self.settings.mesh_content_type.clone());

        let uploaders = Arc::new(Mutex::new(IssuedUploaders::default()));
        let upload = UploadBakedTexture::new(
            Arc::clone(&self.registry),
            self.upload_callback(agent_id),
        )
        .with_issued(Arc::clone(&uploaders));

        let caps = AgentCaps {
            get_texture: CapsRegistry::mint_path(GET_TEXTURE_CAP),
            get_mesh: CapsRegistry::mint_path(GET_MESH_CAP),
            upload_baked_texture: CapsRegistry::mint_path(UPLOAD_BAKED_TEXTURE_CAP),
            uploaders,
        };

        let registered = self
            .registry
            .register(Method::GET, caps.get_texture.clone(), Arc::new(texture), false)
            .and_then(|_| {
                self.registry
                    .register(Method::GET, caps.get_mesh.clone(), Arc::new(mesh), false)
            })
            .and_then(|_| {
                self.registry.register(
                    Method::POST,
                    caps.upload_baked_texture.clone(),
                    Arc::new(upload),
                    false,
                )
            });
        if let Err(e) = registered {
            Self::unregister(&self.registry, &caps);
            return Err(e.into());
        }

        let urls = CapsUrls {
            get_texture: self.registry.url_for(&caps.get_texture),
            get_mesh: self.registry.url_for(&caps.get_mesh),
            upload_baked_texture: self.registry.url_for(&caps.upload_baked_texture),
        };
        // A concurrent issue for the same agent may have landed in between
        if let Some(replaced) = self.agents.insert(agent_id, caps) {
            Self::unregister(&self.registry, &replaced);
        }

        tracing::info!("Issued asset capabilities for agent {}", agent_id);
        Ok(urls)
    }

    /// Remove every capability of `agent_id`. Returns false if it held none.
    pub fn revoke_capabilities(&self, agent_id: Uuid) -> bool {
        let Some((_, caps)) = self.agents.remove(&agent_id) else {
            return false;
        };
        Self::unregister(&self.registry, &caps);
        tracing::info!("Revoked asset capabilities for agent {}", agent_id);
        true
    }

    /// Whether `agent_id` currently holds capabilities
    pub fn has_capabilities(&self, agent_id: &Uuid) -> bool {
        self.agents.contains_key(agent_id)
    }

    /// Number of agents holding capabilities
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Revoke every agent's capabilities, e.g. at shutdown
    pub fn revoke_all(&self) {
        let agents: Vec<Uuid> = self.agents.iter().map(|entry| *entry.key()).collect();
        for agent_id in agents {
            self.revoke_capabilities(agent_id);
        }
    }

    fn upload_callback(&self, agent_id: Uuid) -> UploadCallback {
        match &self.store {
            Some(store) => store_baked_texture(Arc::clone(store), agent_id),
            None => Arc::new(|_data: Vec<u8>| -> std::result::Result<String, AssetError> {
                Err(AssetError::Unavailable {
                    reason: "no asset service configured".to_string(),
                })
            }),
        }
    }

    fn unregister(registry: &CapsRegistry, caps: &AgentCaps) {
        registry.revoke(&Method::GET, &caps.get_texture);
        registry.revoke(&Method::GET, &caps.get_mesh);
        registry.revoke(&Method::POST, &caps.upload_baked_texture);
        let outstanding = caps.uploaders.lock().close();
        for path in outstanding {
            registry.revoke(&Method::POST, &path);
        }
    }
}
