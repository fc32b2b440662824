//! GetMesh capability
//!
//! Cached tier, then the store's mesh lookup. One wire format only: no
//! transcoding and no range support.

use std::sync::Arc;

use axum::http::StatusCode;
use uuid::Uuid;

use super::registry::CapsHandler;
use super::request::{CapsRequest, CapsResponse};
use crate::asset::{Asset, AssetStore, AssetType};

/// Content type of served meshes
pub const MESH_CONTENT_TYPE: &str = "application/vnd.ll.mesh";

const STORE_UNAVAILABLE: &str = "The asset service is unavailable.  So is your mesh.";
const NOT_A_MESH: &str = "Unfortunately, this asset isn't a mesh.";
const MESH_NOT_FOUND: &str = "Your Mesh wasn't found.  Sorry!";
const BAD_MESH_ID: &str = "Failed to find mesh";

/// Handler behind `/CAPS/GetMesh/<rand>/`
pub struct MeshDelivery {
    store: Option<Arc<dyn AssetStore>>,
    content_type: String,
}

impl MeshDelivery {
    pub fn new(store: Option<Arc<dyn AssetStore>>) -> Self {
        Self {
            store,
            content_type: MESH_CONTENT_TYPE.to_string(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    fn serve(&self, mesh: &Asset) -> CapsResponse {
        if mesh.asset_type == AssetType::Mesh {
            CapsResponse::bytes(StatusCode::OK, &self.content_type, mesh.data.to_vec())
        } else {
            CapsResponse::text(StatusCode::NOT_FOUND, NOT_A_MESH)
        }
    }
}

impl CapsHandler for MeshDelivery {
    fn handle(&self, request: &CapsRequest) -> CapsResponse {
        let mesh_id = request
            .query_param("mesh_id")
            .and_then(|s| Uuid::parse_str(s).ok());
        let Some(mesh_id) = mesh_id else {
            tracing::debug!("GetMesh request without a valid mesh_id: {}", request.path);
            return CapsResponse::text(StatusCode::NOT_FOUND, BAD_MESH_ID);
        };

        let Some(store) = self.store.as_deref() else {
            tracing::warn!("GetMesh called with no asset service available");
            return CapsResponse::text(StatusCode::NOT_FOUND, STORE_UNAVAILABLE);
        };

        let key = mesh_id.to_string();
        match store.get_cached(&key).or_else(|| store.get_mesh(&key)) {
            Some(mesh) => self.serve(&mesh),
            None => CapsResponse::text(StatusCode::NOT_FOUND, MESH_NOT_FOUND),
        }
    }
}
