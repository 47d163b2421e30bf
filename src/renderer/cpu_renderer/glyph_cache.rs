use std::collections::HashMap;

use crate::font_storage::FontStorage;
use crate::glyph_key::GlyphKey;

/// Cache size at which the whole map is flushed and refilled.
///
/// A poster composition reuses a few dozen distinct glyphs per element, so
/// the cache rarely fills; the wholesale flush keeps the bookkeeping at a
/// single map without an eviction list.
pub const DEFAULT_GLYPH_CACHE_CAPACITY: usize = 2048;

/// One rasterized coverage bitmap, row-major, 0 = empty, 255 = opaque.
pub struct RasterGlyph {
    pub width: usize,
    pub height: usize,
    pub coverage: Vec<u8>,
}

/// Keyed store of rasterized glyphs.
pub struct GlyphCache {
    map: HashMap<GlyphKey, RasterGlyph, fxhash::FxBuildHasher>,
    capacity: usize,
}

impl Default for GlyphCache {
    fn default() -> Self {
        Self::new(DEFAULT_GLYPH_CACHE_CAPACITY)
    }
}

impl GlyphCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            map: HashMap::with_hasher(fxhash::FxBuildHasher::default()),
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Returns the rasterized coverage for a glyph, rasterizing through
    /// `fontdue` on a miss. `None` when the key's font is gone from
    /// storage.
    pub fn get(
        &mut self,
        key: &GlyphKey,
        fonts: &mut FontStorage,
    ) -> Option<&RasterGlyph> {
        if !self.map.contains_key(key) {
            let font = fonts.font(key.font_id())?;
            let (metrics, coverage) =
                font.rasterize_indexed(key.glyph_index(), key.font_size());

            if self.map.len() >= self.capacity {
                log::debug!("glyph cache reached {} entries, flushing", self.capacity);
                self.map.clear();
            }

            self.map.insert(
                *key,
                RasterGlyph {
                    width: metrics.width,
                    height: metrics.height,
                    coverage,
                },
            );
        }

        self.map.get(key)
    }

    #[cfg(test)]
    fn insert_raw(&mut self, key: GlyphKey, glyph: RasterGlyph) {
        if self.map.len() >= self.capacity {
            self.map.clear();
        }
        self.map.insert(key, glyph);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_key(index: u16) -> GlyphKey {
        // fontdb::ID is an opaque 64-bit id; fabricate one for key tests.
        let font_id: fontdb::ID = unsafe { std::mem::transmute(1u64) };
        GlyphKey::new(font_id, index, 12.0)
    }

    fn blank_glyph() -> RasterGlyph {
        RasterGlyph {
            width: 2,
            height: 2,
            coverage: vec![0, 255, 255, 0],
        }
    }

    #[test]
    fn missing_font_yields_none() {
        let mut cache = GlyphCache::new(8);
        let mut storage = FontStorage::new();
        assert!(cache.get(&make_key(1), &mut storage).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn flushes_when_capacity_is_reached() {
        let mut cache = GlyphCache::new(2);
        cache.insert_raw(make_key(1), blank_glyph());
        cache.insert_raw(make_key(2), blank_glyph());
        assert_eq!(cache.len(), 2);

        cache.insert_raw(make_key(3), blank_glyph());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn quantized_sizes_share_entries() {
        let font_id: fontdb::ID = unsafe { std::mem::transmute(1u64) };
        let a = GlyphKey::new(font_id, 7, 12.0);
        let b = GlyphKey::new(font_id, 7, 12.0001);
        assert_eq!(a, b);
    }

    #[test]
    fn cached_glyphs_survive_until_flush() {
        let mut cache = GlyphCache::new(8);
        let mut storage = FontStorage::new();
        storage.load_system_fonts();
        let Some((id, font)) = storage.resolve("sans-serif", 400) else {
            return;
        };
        let index = font.lookup_glyph_index('A');
        let key = GlyphKey::new(id, index, 24.0);

        let first = cache.get(&key, &mut storage).expect("font is present");
        let (w, h) = (first.width, first.height);
        assert!(w > 0 && h > 0);
        assert_eq!(cache.len(), 1);

        let second = cache.get(&key, &mut storage).expect("cached");
        assert_eq!((second.width, second.height), (w, h));
        assert_eq!(cache.len(), 1);
    }
}
