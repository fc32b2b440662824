//! Asset data model
//!
//! An `Asset` is immutable once stored. Its `asset_type` is fixed at creation
//! and is the only thing deciding whether the texture or mesh capability will
//! hand it out.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Asset type with the numeric codes used on the wire by viewers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetType {
    Unknown,
    Texture,
    Sound,
    CallingCard,
    Landmark,
    Clothing,
    Object,
    Notecard,
    LslText,
    LslBytecode,
    TextureTga,
    Bodypart,
    SoundWav,
    ImageTga,
    ImageJpeg,
    Animation,
    Gesture,
    Simstate,
    Mesh,
}

impl AssetType {
    /// Numeric code of this type
    pub fn code(&self) -> i8 {
        match self {
            AssetType::Unknown => -1,
            AssetType::Texture => 0,
            AssetType::Sound => 1,
            AssetType::CallingCard => 2,
            AssetType::Landmark => 3,
            AssetType::Clothing => 5,
            AssetType::Object => 6,
            AssetType::Notecard => 7,
            AssetType::LslText => 10,
            AssetType::LslBytecode => 11,
            AssetType::TextureTga => 12,
            AssetType::Bodypart => 13,
            AssetType::SoundWav => 17,
            AssetType::ImageTga => 18,
            AssetType::ImageJpeg => 19,
            AssetType::Animation => 20,
            AssetType::Gesture => 21,
            AssetType::Simstate => 22,
            AssetType::Mesh => 49,
        }
    }

    /// Look up a type by its numeric code; unassigned codes map to `Unknown`
    pub fn from_code(code: i8) -> Self {
        match code {
            0 => AssetType::Texture,
            1 => AssetType::Sound,
            2 => AssetType::CallingCard,
            3 => AssetType::Landmark,
            5 => AssetType::Clothing,
            6 => AssetType::Object,
            7 => AssetType::Notecard,
            10 => AssetType::LslText,
            11 => AssetType::LslBytecode,
            12 => AssetType::TextureTga,
            13 => AssetType::Bodypart,
            17 => AssetType::SoundWav,
            18 => AssetType::ImageTga,
            19 => AssetType::ImageJpeg,
            20 => AssetType::Animation,
            21 => AssetType::Gesture,
            22 => AssetType::Simstate,
            49 => AssetType::Mesh,
            _ => AssetType::Unknown,
        }
    }

    /// MIME type string for the stored encoding
    pub fn content_type(&self) -> &'static str {
        match self {
            AssetType::Unknown => "application/octet-stream",
            AssetType::Texture => "image/x-j2c",
            AssetType::Sound => "audio/ogg",
            AssetType::CallingCard => "application/vnd.ll.callingcard",
            AssetType::Landmark => "application/vnd.ll.landmark",
            AssetType::Clothing => "application/vnd.ll.clothing",
            AssetType::Object => "application/vnd.ll.primitive",
            AssetType::Notecard => "application/vnd.ll.notecard",
            AssetType::LslText => "application/vnd.ll.lsltext",
            AssetType::LslBytecode => "application/vnd.ll.lslbyte",
            AssetType::TextureTga | AssetType::ImageTga => "image/tga",
            AssetType::Bodypart => "application/vnd.ll.bodypart",
            AssetType::SoundWav => "audio/x-wav",
            AssetType::ImageJpeg => "image/jpeg",
            AssetType::Animation => "application/vnd.ll.animation",
            AssetType::Gesture => "application/vnd.ll.gesture",
            AssetType::Simstate => "application/x-metaverse-simstate",
            AssetType::Mesh => "application/vnd.ll.mesh",
        }
    }

    /// Types the texture capability is allowed to serve
    pub fn is_texture_like(&self) -> bool {
        matches!(
            self,
            AssetType::Texture | AssetType::Unknown | AssetType::Simstate
        )
    }
}

/// Asset flag bitset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetFlags(u32);

impl AssetFlags {
    pub const NONE: AssetFlags = AssetFlags(0);
    pub const MAPTILE: AssetFlags = AssetFlags(1);
    pub const REWRITABLE: AssetFlags = AssetFlags(1 << 1);
    pub const COLLECTABLE: AssetFlags = AssetFlags(1 << 2);
    pub const DELETABLE: AssetFlags = AssetFlags(1 << 3);
    pub const SYSTEM: AssetFlags = AssetFlags(1 << 4);
    pub const TEMPORARY: AssetFlags = AssetFlags(1 << 5);
    pub const LOCAL: AssetFlags = AssetFlags(1 << 6);
    pub const REMOTE: AssetFlags = AssetFlags(1 << 7);

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn from_bits(bits: u32) -> Self {
        AssetFlags(bits)
    }

    /// True if every bit of `other` is set in `self`
    pub fn contains(&self, other: AssetFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl BitOr for AssetFlags {
    type Output = AssetFlags;

    fn bitor(self, rhs: AssetFlags) -> AssetFlags {
        AssetFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for AssetFlags {
    fn bitor_assign(&mut self, rhs: AssetFlags) {
        self.0 |= rhs.0;
    }
}

/// A stored binary asset
#[derive(Clone)]
pub struct Asset {
    /// Content key; variants use `<originalId>-<format>`
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Asset type, fixed at creation
    pub asset_type: AssetType,
    /// Agent that created the asset
    pub creator_id: Uuid,
    /// Encoded asset bytes
    pub data: Arc<Vec<u8>>,
    /// Storage flags
    pub flags: AssetFlags,
    /// When this record was created
    pub created_at: DateTime<Utc>,
}

impl Asset {
    /// Create an asset with no data and no flags
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        asset_type: AssetType,
        creator_id: Uuid,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            asset_type,
            creator_id,
            data: Arc::new(Vec::new()),
            flags: AssetFlags::NONE,
            created_at: Utc::now(),
        }
    }

    pub fn with_data(mut self, data: Vec<u8>) -> Self {
        self.data = Arc::new(data);
        self
    }

    pub fn with_flags(mut self, flags: AssetFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Size of the asset data in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// MIME type of the stored encoding
    pub fn type_string(&self) -> &'static str {
        self.asset_type.content_type()
    }
}

impl fmt::Debug for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Asset")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("asset_type", &self.asset_type)
            .field("creator_id", &self.creator_id)
            .field("size", &self.data.len())
            .field("flags", &self.flags)
            .field("created_at", &self.created_at.to_rfc3339())
            .finish()
    }
}
