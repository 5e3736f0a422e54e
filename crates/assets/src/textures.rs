use std::fmt::Debug;
use std::path::Path;

use crate::{AssetError, DecodedImage, decode_rgba};

/// GPU side of the texture registry.
///
/// Uploads use repeat wrapping and trilinear filtering over a full mip chain.
pub trait TextureBackend {
    type Handle: Clone + Debug;

    /// Create a texture from decoded pixels.
    fn upload(&mut self, tag: &str, image: &DecodedImage) -> Result<Self::Handle, AssetError>;

    /// Make `handle` the texture sampled through `unit`.
    fn bind(&mut self, unit: u32, handle: &Self::Handle);

    /// Free the texture. Called exactly once per uploaded handle.
    fn release(&mut self, handle: Self::Handle);

    /// Number of texture units available for binding.
    fn max_units(&self) -> u32 {
        16
    }
}

/// A registered texture.
#[derive(Debug, Clone)]
pub struct TextureSlot<H> {
    pub tag: String,
    pub handle: H,
}

/// Ordered texture registry. Slot index doubles as the texture unit.
#[derive(Debug)]
pub struct TextureRegistry<H> {
    slots: Vec<TextureSlot<H>>,
}

impl<H> Default for TextureRegistry<H> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<H: Clone + Debug> TextureRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `path`, upload it and append a slot tagged `tag`.
    ///
    /// Returns the new slot index. The registry is untouched on failure.
    pub fn load<B>(
        &mut self,
        backend: &mut B,
        path: impl AsRef<Path>,
        tag: &str,
    ) -> Result<usize, AssetError>
    where
        B: TextureBackend<Handle = H> + ?Sized,
    {
        let image = decode_rgba(path.as_ref())?;
        self.insert(backend, tag, &image)
    }

    /// Upload already-decoded pixels and append a slot.
    pub fn insert<B>(
        &mut self,
        backend: &mut B,
        tag: &str,
        image: &DecodedImage,
    ) -> Result<usize, AssetError>
    where
        B: TextureBackend<Handle = H> + ?Sized,
    {
        let handle = backend.upload(tag, image)?;
        let slot = self.slots.len();
        tracing::debug!("registered texture '{tag}' in slot {slot} ({handle:?})");
        self.slots.push(TextureSlot {
            tag: tag.to_string(),
            handle,
        });
        Ok(slot)
    }

    /// Bind every slot to the texture unit equal to its index.
    pub fn bind_all<B>(&self, backend: &mut B)
    where
        B: TextureBackend<Handle = H> + ?Sized,
    {
        let max_units = backend.max_units() as usize;
        for (unit, slot) in self.slots.iter().enumerate() {
            if unit >= max_units {
                tracing::warn!(
                    "texture '{}' in slot {unit} is past the {max_units} texture units; not bound",
                    slot.tag
                );
                continue;
            }
            backend.bind(unit as u32, &slot.handle);
        }
    }

    /// Slot index of the first texture tagged `tag`.
    pub fn find_slot(&self, tag: &str) -> Option<usize> {
        self.slots.iter().position(|slot| slot.tag == tag)
    }

    /// Backend handle of the first texture tagged `tag`.
    pub fn find_handle(&self, tag: &str) -> Option<&H> {
        self.slots
            .iter()
            .find(|slot| slot.tag == tag)
            .map(|slot| &slot.handle)
    }

    /// Release every texture and empty the registry. Safe to call repeatedly.
    pub fn clear<B>(&mut self, backend: &mut B)
    where
        B: TextureBackend<Handle = H> + ?Sized,
    {
        let released = self.slots.len();
        for slot in self.slots.drain(..) {
            backend.release(slot.handle);
        }
        if released > 0 {
            tracing::debug!("released {released} textures");
        }
    }

    pub fn slots(&self) -> &[TextureSlot<H>] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Headless backend that keeps texture metadata in memory.
///
/// Used by the CLI and by tests; handles are sequential ids.
#[derive(Debug, Default)]
pub struct CpuTextureBackend {
    next_id: u32,
    live: Vec<(u32, u32, u32)>,
    units: Vec<Option<u32>>,
    released: Vec<u32>,
}

impl CpuTextureBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle bound to `unit`, if any.
    pub fn bound(&self, unit: u32) -> Option<u32> {
        self.units.get(unit as usize).copied().flatten()
    }

    /// Dimensions of a live texture.
    pub fn dimensions(&self, handle: u32) -> Option<(u32, u32)> {
        self.live
            .iter()
            .find(|(id, _, _)| *id == handle)
            .map(|&(_, w, h)| (w, h))
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Handles released so far, in release order.
    pub fn released(&self) -> &[u32] {
        &self.released
    }
}

impl TextureBackend for CpuTextureBackend {
    type Handle = u32;

    fn upload(&mut self, tag: &str, image: &DecodedImage) -> Result<u32, AssetError> {
        if image.width == 0 || image.height == 0 {
            return Err(AssetError::Upload {
                tag: tag.to_string(),
                reason: "zero-sized image".into(),
            });
        }
        let id = self.next_id;
        self.next_id += 1;
        self.live.push((id, image.width, image.height));
        Ok(id)
    }

    fn bind(&mut self, unit: u32, handle: &u32) {
        let unit = unit as usize;
        if self.units.len() <= unit {
            self.units.resize(unit + 1, None);
        }
        self.units[unit] = Some(*handle);
    }

    fn release(&mut self, handle: u32) {
        self.live.retain(|(id, _, _)| *id != handle);
        for unit in self.units.iter_mut() {
            if *unit == Some(handle) {
                *unit = None;
            }
        }
        self.released.push(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(tags: &[&str]) -> (TextureRegistry<u32>, CpuTextureBackend) {
        let mut backend = CpuTextureBackend::new();
        let mut registry = TextureRegistry::new();
        for tag in tags {
            registry
                .insert(&mut backend, tag, &DecodedImage::solid(2, 2, [255; 4]))
                .unwrap();
        }
        (registry, backend)
    }

    #[test]
    fn distinct_tags_get_distinct_slots() {
        let (registry, _) = registry_with(&["TEX_WOOD", "TEX_PLASTIC", "TEX_WALL"]);
        assert_eq!(registry.find_slot("TEX_WOOD"), Some(0));
        assert_eq!(registry.find_slot("TEX_PLASTIC"), Some(1));
        assert_eq!(registry.find_slot("TEX_WALL"), Some(2));
    }

    #[test]
    fn duplicate_tag_resolves_to_first_slot() {
        let (registry, _) = registry_with(&["TEX_WOOD", "TEX_WOOD"]);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.find_slot("TEX_WOOD"), Some(0));
        assert_eq!(registry.find_handle("TEX_WOOD"), Some(&0));
    }

    #[test]
    fn unknown_tag_is_not_found() {
        let (registry, _) = registry_with(&["TEX_WOOD"]);
        assert_eq!(registry.find_slot("nonexistent"), None);
        assert_eq!(registry.find_handle("nonexistent"), None);
    }

    #[test]
    fn failed_load_leaves_registry_unchanged() {
        let (mut registry, mut backend) = registry_with(&["TEX_WOOD"]);
        let result = registry.load(&mut backend, "/no/such/carpet.jpg", "TEX_CARPET");
        assert!(matches!(result, Err(AssetError::NotFound(_))));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.find_slot("TEX_CARPET"), None);
        assert_eq!(backend.live_count(), 1);
    }

    #[test]
    fn rejected_upload_leaves_registry_unchanged() {
        let (mut registry, mut backend) = registry_with(&[]);
        let empty = DecodedImage {
            width: 0,
            height: 0,
            pixels: Vec::new(),
        };
        assert!(registry.insert(&mut backend, "TEX_EMPTY", &empty).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn load_from_disk_appends_slot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wood_oak.png");
        image::RgbaImage::from_pixel(4, 2, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();

        let (mut registry, mut backend) = registry_with(&["TEX_WALL"]);
        let slot = registry.load(&mut backend, &path, "TEX_WOOD").unwrap();
        assert_eq!(slot, 1);
        let handle = *registry.find_handle("TEX_WOOD").unwrap();
        assert_eq!(backend.dimensions(handle), Some((4, 2)));
    }

    #[test]
    fn bind_all_uses_slot_index_as_unit() {
        let (registry, mut backend) = registry_with(&["A", "B", "C"]);
        registry.bind_all(&mut backend);
        for (unit, slot) in registry.slots().iter().enumerate() {
            assert_eq!(backend.bound(unit as u32), Some(slot.handle));
        }
    }

    #[test]
    fn bind_all_stops_at_unit_limit() {
        let tags: Vec<String> = (0..18).map(|i| format!("T{i}")).collect();
        let refs: Vec<&str> = tags.iter().map(String::as_str).collect();
        let (registry, mut backend) = registry_with(&refs);
        registry.bind_all(&mut backend);
        assert_eq!(backend.bound(15), Some(15));
        assert_eq!(backend.bound(16), None);
        assert_eq!(backend.bound(17), None);
    }

    #[test]
    fn clear_releases_once_and_is_idempotent() {
        let (mut registry, mut backend) = registry_with(&["A", "B"]);
        registry.clear(&mut backend);
        assert!(registry.is_empty());
        assert_eq!(backend.released(), &[0, 1]);
        assert_eq!(backend.live_count(), 0);

        registry.clear(&mut backend);
        assert_eq!(backend.released(), &[0, 1]);
        assert_eq!(registry.find_slot("A"), None);
    }
}
