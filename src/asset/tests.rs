//! Tests for the asset module

use super::*;
use std::sync::Arc;
use uuid::Uuid;

fn texture(id: &str, data: Vec<u8>) -> Asset {
    Asset::new(id, "test texture", AssetType::Texture, Uuid::nil()).with_data(data)
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_asset_type_codes_round_trip() {
        for t in [
            AssetType::Texture,
            AssetType::Mesh,
            AssetType::Simstate,
            AssetType::Notecard,
            AssetType::Unknown,
        ] {
            assert_eq!(AssetType::from_code(t.code()), t);
        }
        assert_eq!(AssetType::from_code(99), AssetType::Unknown);
    }

    #[test]
    fn test_texture_gate() {
        assert!(AssetType::Texture.is_texture_like());
        assert!(AssetType::Unknown.is_texture_like());
        assert!(AssetType::Simstate.is_texture_like());
        assert!(!AssetType::Mesh.is_texture_like());
        assert!(!AssetType::Notecard.is_texture_like());
    }

    #[test]
    fn test_type_strings() {
        assert_eq!(AssetType::Texture.content_type(), "image/x-j2c");
        assert_eq!(AssetType::Mesh.content_type(), "application/vnd.ll.mesh");
        assert_eq!(AssetType::Unknown.content_type(), "application/octet-stream");
    }

    #[test]
    fn test_flags() {
        let flags = AssetFlags::DELETABLE | AssetFlags::TEMPORARY;
        assert!(flags.contains(AssetFlags::DELETABLE));
        assert!(flags.contains(AssetFlags::TEMPORARY));
        assert!(!flags.contains(AssetFlags::COLLECTABLE));
        assert!(!flags.contains(AssetFlags::COLLECTABLE | AssetFlags::TEMPORARY));

        let mut flags = AssetFlags::NONE;
        assert!(flags.is_empty());
        flags |= AssetFlags::COLLECTABLE;
        assert_eq!(AssetFlags::from_bits(flags.bits()), AssetFlags::COLLECTABLE);
    }

    #[test]
    fn test_debug_omits_bytes_and_shows_creation_time() {
        let asset = texture("dbg", vec![7u8; 4096]);
        let rendered = format!("{:?}", asset);

        assert!(rendered.contains("size: 4096"));
        assert!(rendered.contains(&asset.created_at.to_rfc3339()));
        assert!(!rendered.contains("7, 7, 7"));
    }

    #[test]
    fn test_store_keeps_creation_time() {
        let store = MemoryAssetStore::new(8);
        let asset = texture("stamped", vec![1, 2, 3]);
        let created = asset.created_at;

        store.store(asset).unwrap();
        assert_eq!(store.get("stamped").unwrap().created_at, created);
    }

    #[test]
    fn test_store_and_get() {
        let store = MemoryAssetStore::new(16);
        let id = store.store(texture("abc", vec![1, 2, 3])).unwrap();
        assert_eq!(id, "abc");

        let asset = store.get("abc").unwrap();
        assert_eq!(asset.data.as_ref(), &vec![1, 2, 3]);
        assert!(store.get_cached("abc").is_some());
        assert!(store.get("missing").is_none());
    }

    #[test]
    fn test_store_assigns_id_when_empty() {
        let store = MemoryAssetStore::default();
        let id = store.store(texture("", vec![9])).unwrap();
        assert!(Uuid::parse_str(&id).is_ok());
        assert_eq!(store.get(&id).unwrap().id, id);
    }

    #[test]
    fn test_canonical_only_until_fetched() {
        let store = MemoryAssetStore::new(16);
        store.put_canonical(texture("cold", vec![7; 10]));

        assert!(store.get_cached("cold").is_none());
        assert!(store.get("cold").is_some());
        // A full lookup promotes into the cached tier
        assert!(store.get_cached("cold").is_some());
    }

    #[test]
    fn test_cache_tier_is_bounded() {
        let store = MemoryAssetStore::new(2);
        for id in ["a", "b", "c"] {
            store.store(texture(id, vec![0])).unwrap();
        }

        assert_eq!(store.cached_len(), 2);
        assert_eq!(store.len(), 3);
        assert!(store.get_cached("a").is_none());
        assert!(store.get("a").is_some());
    }

    #[test]
    fn test_evict_cached() {
        let store = MemoryAssetStore::new(4);
        store.store(texture("x", vec![1])).unwrap();
        assert!(store.evict_cached("x"));
        assert!(!store.evict_cached("x"));
        assert!(store.get_cached("x").is_none());
        assert!(store.get("x").is_some());
    }

    #[test]
    fn test_overwrite_replaces_whole_record() {
        let store = MemoryAssetStore::new(4);
        store.store(texture("v", vec![1; 4])).unwrap();
        store.store(texture("v", vec![2; 8])).unwrap();

        let asset = store.get("v").unwrap();
        assert_eq!(asset.data.as_ref(), &vec![2; 8]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_mesh_lookup_defaults_to_get() {
        let store = MemoryAssetStore::new(4);
        let mesh = Asset::new("m", "mesh", AssetType::Mesh, Uuid::nil()).with_data(vec![5]);
        store.put_canonical(mesh);
        assert_eq!(store.get_mesh("m").unwrap().asset_type, AssetType::Mesh);
    }
}

#[cfg(test)]
mod concurrency_tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_concurrent_writers_leave_consistent_record() {
        let store = Arc::new(MemoryAssetStore::new(8));
        let handles: Vec<_> = (0..8u8)
            .map(|n| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..50 {
                        store.store(texture("shared", vec![n; 64])).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let asset = store.get("shared").unwrap();
        let first = asset.data[0];
        assert_eq!(asset.size(), 64);
        assert!(asset.data.iter().all(|b| *b == first));
    }
}
