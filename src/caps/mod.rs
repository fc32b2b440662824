//! Capability-gated asset delivery
//!
//! Viewers reach textures, meshes and the baked-texture upload through
//! per-agent URLs whose random path segment is the only credential:
//! - `CapsRegistry`: (method, path) → handler table, with single-use entries
//! - `TextureDelivery`: cache / origin / transcode decision tree with ranges
//! - `MeshDelivery`: cache then origin, one wire format
//! - `UploadBakedTexture`: issues one-shot upload endpoints
//! - `AssetCaps`: issues and revokes the set for each agent

mod llsd;
mod mesh;
mod negotiate;
mod range;
mod registry;
mod request;
mod service;
mod texture;
mod upload;

pub use llsd::{to_xml as to_llsd_xml, LlsdError, LLSD_XML_CONTENT_TYPE};
pub use mesh::{MeshDelivery, MESH_CONTENT_TYPE};
pub use negotiate::preferred_image_types;
pub use range::{ByteRange, RangeResolution};
pub use registry::{CapsHandler, CapsRegistry, RegistryError};
pub use request::{CapsRequest, CapsResponse};
pub use service::{
    AssetCaps, CapsUrls, GET_MESH_CAP, GET_TEXTURE_CAP, UPLOAD_BAKED_TEXTURE_CAP,
};
pub use texture::{TextureDelivery, DEFAULT_TEXTURE_FORMAT};
pub use upload::{
    begin_upload, store_baked_texture, BakedTextureUploader, IssuedUploaders, UploadBakedTexture,
    UploadCallback, UploadComplete, UploaderTicket, UPLOAD_CAP_NAME,
};
