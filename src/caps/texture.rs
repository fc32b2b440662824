//! GetTexture capability
//!
//! Decision tree for each preferred format, in order:
//! 1. Cached tier by `<id>` (default format) or `<id>-<format>`
//! 2. Canonical tier by bare `<id>`; the default format is served as stored
//! 3. Other formats are transcoded, stored as a `Collectable | Temporary`
//!    variant and served. Empty transcoder output moves on to the next format.
//!
//! Every hit passes the texture type gate before any bytes are written.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use axum::http::{header, StatusCode};
use uuid::Uuid;

use super::negotiate::preferred_image_types;
use super::range::{ByteRange, RangeResolution};
use super::registry::CapsHandler;
use super::request::{CapsRequest, CapsResponse};
use crate::asset::{Asset, AssetFlags, AssetStore, AssetType};
use crate::core::CapsError;
use crate::transcode::Transcoder;

/// Canonical wire format of stored textures
pub const DEFAULT_TEXTURE_FORMAT: &str = "x-j2c";

/// Outcome of one format attempt
enum FetchOutcome {
    /// Final answer for this request, success or not
    Served(CapsResponse),
    /// The transcoder produced nothing; try the caller's next format
    TryNextFormat,
}

/// Handler behind `/CAPS/GetTexture/<rand>/`
pub struct TextureDelivery {
    store: Option<Arc<dyn AssetStore>>,
    transcoder: Arc<dyn Transcoder>,
    default_format: String,
    redirect_url: Option<String>,
}

impl TextureDelivery {
    pub fn new(
        store: Option<Arc<dyn AssetStore>>,
        transcoder: Arc<dyn Transcoder>,
        default_format: impl Into<String>,
    ) -> Self {
        Self {
            store,
            transcoder,
            default_format: default_format.into(),
            redirect_url: None,
        }
    }

    /// Serve only cached textures and redirect misses to `<url><textureId>`
    pub fn with_redirect(mut self, redirect_url: Option<String>) -> Self {
        self.redirect_url = redirect_url.filter(|url| !url.is_empty());
        self
    }

    /// Formats to try, most preferred first
    fn requested_formats(&self, request: &CapsRequest) -> Vec<String> {
        if let Some(format) = request.query_param("format") {
            return vec![format.to_ascii_lowercase()];
        }

        let formats = request
            .header(&header::ACCEPT)
            .map(preferred_image_types)
            .unwrap_or_default();
        if formats.is_empty() {
            vec![self.default_format.clone()]
        } else {
            formats
        }
    }

    fn fetch_texture(
        &self,
        store: &dyn AssetStore,
        request: &CapsRequest,
        texture_id: Uuid,
        format: &str,
    ) -> FetchOutcome {
        let is_default = format == self.default_format;
        let full_id = if is_default {
            texture_id.to_string()
        } else {
            format!("{}-{}", texture_id, format)
        };

        if let Some(redirect_url) = &self.redirect_url {
            return match store.get_cached(&full_id) {
                Some(texture) => FetchOutcome::Served(self.serve_checked(request, &texture, format)),
                None => {
                    let location = format!("{}{}", redirect_url, texture_id);
                    tracing::debug!("Redirecting texture request to {}", location);
                    FetchOutcome::Served(
                        CapsResponse::blank(StatusCode::FOUND)
                            .with_header(header::LOCATION, &location),
                    )
                }
            };
        }

        if let Some(texture) = store.get_cached(&full_id) {
            return FetchOutcome::Served(self.serve_checked(request, &texture, format));
        }

        let Some(texture) = store.get(&texture_id.to_string()) else {
            tracing::warn!("Texture {} not found", texture_id);
            return FetchOutcome::Served(
                CapsError::NotFound {
                    id: texture_id.to_string(),
                }
                .into(),
            );
        };

        if !texture.asset_type.is_texture_like() || is_default {
            return FetchOutcome::Served(self.serve_checked(request, &texture, format));
        }

        let data = self.convert_texture_data(&texture, format);
        if data.is_empty() {
            return FetchOutcome::TryNextFormat;
        }

        let mut variant = Asset::new(
            format!("{}-{}", texture.id, format),
            texture.name.clone(),
            AssetType::Texture,
            texture.creator_id,
        )
        .with_data(data)
        .with_flags(AssetFlags::COLLECTABLE | AssetFlags::TEMPORARY);

        match store.store(variant.clone()) {
            Ok(id) => variant.id = id,
            Err(e) => tracing::warn!("Failed to cache texture variant {}: {}", variant.id, e),
        }

        FetchOutcome::Served(self.write_texture_data(request, &variant, format))
    }

    /// Type gate, then serialize
    fn serve_checked(&self, request: &CapsRequest, texture: &Asset, format: &str) -> CapsResponse {
        if !texture.asset_type.is_texture_like() {
            tracing::debug!(
                "Asset {} is {:?}, refusing to serve it as a texture",
                texture.id,
                texture.asset_type
            );
            return CapsError::NotFound {
                id: texture.id.clone(),
            }
            .into();
        }
        self.write_texture_data(request, texture, format)
    }

    /// Transcode canonical bytes; any failure yields an empty buffer
    fn convert_texture_data(&self, texture: &Asset, format: &str) -> Vec<u8> {
        tracing::debug!("Converting texture {} to {}", texture.id, format);

        let transcoder = Arc::clone(&self.transcoder);
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            transcoder.transcode(&texture.data, format)
        }));

        match result {
            Ok(Ok(data)) => data,
            Ok(Err(e)) => {
                tracing::debug!("Unable to convert texture {} to {}: {}", texture.id, format, e);
                Vec::new()
            }
            Err(_) => {
                tracing::debug!("Transcoder panicked converting {} to {}", texture.id, format);
                Vec::new()
            }
        }
    }

    fn content_type_for(&self, texture: &Asset, format: &str) -> String {
        if format == self.default_format {
            texture.type_string().to_string()
        } else {
            format!("image/{}", format)
        }
    }

    /// Serialize a texture honoring any `Range` header
    fn write_texture_data(&self, request: &CapsRequest, texture: &Asset, format: &str) -> CapsResponse {
        let content_type = self.content_type_for(texture, format);

        let Some(range_header) = request.header(&header::RANGE) else {
            return CapsResponse::bytes(StatusCode::OK, &content_type, texture.data.to_vec());
        };

        let Some(range) = ByteRange::parse(range_header) else {
            tracing::warn!("Malformed Range header: {}", range_header);
            return CapsError::BadRequest {
                reason: format!("malformed range {}", range_header),
            }
            .into();
        };

        let total = texture.data.len();
        match range.resolve(total) {
            RangeResolution::Unsatisfiable => CapsError::RangeUnsatisfiable { length: total }.into(),
            RangeResolution::Satisfiable { start, end } => {
                let slice = texture.data[start..=end].to_vec();
                let status = if slice.len() < total {
                    StatusCode::PARTIAL_CONTENT
                } else {
                    StatusCode::OK
                };
                CapsResponse::bytes(status, &content_type, slice).with_header(
                    header::CONTENT_RANGE,
                    &format!("bytes {}-{}/{}", start, end, total),
                )
            }
        }
    }
}

impl CapsHandler for TextureDelivery {
    fn handle(&self, request: &CapsRequest) -> CapsResponse {
        let Some(store) = self.store.as_deref() else {
            tracing::warn!("GetTexture called with no asset service available");
            return CapsError::UpstreamUnavailable.into();
        };

        let texture_id = request
            .query_param("texture_id")
            .and_then(|s| Uuid::parse_str(s).ok());
        let Some(texture_id) = texture_id else {
            tracing::warn!(
                "Failed to parse a texture_id from GetTexture request: {}",
                request.path
            );
            return CapsError::NotFound {
                id: request.query_param("texture_id").unwrap_or_default().to_string(),
            }
            .into();
        };

        let formats = self.requested_formats(request);
        for format in &formats {
            match self.fetch_texture(store, request, texture_id, format) {
                FetchOutcome::Served(response) => return response,
                FetchOutcome::TryNextFormat => continue,
            }
        }

        tracing::warn!(
            "Texture {} could not be produced in any of {:?}",
            texture_id,
            formats
        );
        CapsError::NotFound {
            id: texture_id.to_string(),
        }
        .into()
    }
}
