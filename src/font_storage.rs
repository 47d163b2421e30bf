use std::{
    collections::{HashMap, HashSet},
    path::PathBuf,
    sync::Arc,
};

/// Font database plus a cache of parsed font instances.
///
/// `fontdb` answers family/weight queries; `fontdue` instances are parsed
/// lazily on first use and kept behind `Arc` so layout and rasterization
/// share them. Family resolution never fails hard: a missing family falls
/// back to the generic sans-serif, and failing that to any registered face.
pub struct FontStorage {
    font_db: fontdb::Database,
    loaded: HashMap<fontdb::ID, Arc<fontdue::Font>, fxhash::FxBuildHasher>,
    /// Families already warned about, so a composition with many elements
    /// does not repeat the same fallback warning every frame.
    warned_families: HashSet<String, fxhash::FxBuildHasher>,
}

impl Default for FontStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl FontStorage {
    pub fn new() -> Self {
        Self {
            font_db: fontdb::Database::new(),
            loaded: HashMap::with_hasher(fxhash::FxBuildHasher::default()),
            warned_families: HashSet::with_hasher(fxhash::FxBuildHasher::default()),
        }
    }

    /// Loads a font from binary data.
    pub fn load_font_binary(&mut self, data: impl Into<Vec<u8>>) {
        self.font_db.load_font_data(data.into());
    }

    /// Loads a font from a file path.
    pub fn load_font_file(&mut self, path: PathBuf) -> Result<(), std::io::Error> {
        self.font_db.load_font_file(path)
    }

    /// Loads all fonts from a directory.
    pub fn load_fonts_dir(&mut self, dir: PathBuf) {
        self.font_db.load_fonts_dir(dir)
    }

    /// Loads the system fonts.
    pub fn load_system_fonts(&mut self) {
        self.font_db.load_system_fonts();
    }

    /// Sets the family used for the generic "sans-serif" fallback.
    pub fn set_sans_serif_family(&mut self, family: impl Into<String>) {
        self.font_db.set_sans_serif_family(family);
    }

    pub fn is_empty(&self) -> bool {
        self.font_db.is_empty()
    }

    pub fn len(&self) -> usize {
        self.font_db.len()
    }
}

impl FontStorage {
    /// Resolves a requested family and weight to a usable font.
    ///
    /// Resolution order: the named family, then the generic sans-serif at
    /// the same weight, then any registered face. The first fallback step
    /// logs a warning once per family name; an empty database returns
    /// `None` and the element is simply not drawn.
    pub fn resolve(
        &mut self,
        family: &str,
        weight: u16,
    ) -> Option<(fontdb::ID, Arc<fontdue::Font>)> {
        let weight = fontdb::Weight(weight);

        if let Some(found) = self.query(&[fontdb::Family::Name(family)], weight) {
            return Some(found);
        }

        if self.warned_families.insert(family.to_string()) {
            log::warn!("font family '{family}' unavailable, substituting sans-serif");
        }

        if let Some(found) = self.query(&[fontdb::Family::SansSerif], weight) {
            return Some(found);
        }

        let any_face = self.font_db.faces().next().map(|face| face.id)?;
        self.font(any_face).map(|font| (any_face, font))
    }

    fn query(
        &mut self,
        families: &[fontdb::Family<'_>],
        weight: fontdb::Weight,
    ) -> Option<(fontdb::ID, Arc<fontdue::Font>)> {
        let id = self.font_db.query(&fontdb::Query {
            families,
            weight,
            stretch: fontdb::Stretch::Normal,
            style: fontdb::Style::Normal,
        })?;
        self.font(id).map(|font| (id, font))
    }

    /// Retrieves a parsed font by ID, parsing and caching it if necessary.
    pub fn font(&mut self, id: fontdb::ID) -> Option<Arc<fontdue::Font>> {
        use std::collections::hash_map::Entry;

        match self.loaded.entry(id) {
            Entry::Occupied(entry) => Some(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let font_result = self.font_db.with_face_data(id, |data, index| {
                    fontdue::Font::from_bytes(
                        data,
                        fontdue::FontSettings {
                            collection_index: index,
                            scale: 40.0,
                            load_substitutions: true,
                        },
                    )
                })?;

                match font_result {
                    Ok(font) => {
                        let cached: &mut Arc<fontdue::Font> = entry.insert(Arc::new(font));
                        Some(Arc::clone(cached))
                    }
                    Err(e) => {
                        log::error!("failed to parse font (id: {id:?}): {e}");
                        None
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_database_resolves_to_none() {
        let mut storage = FontStorage::new();
        assert!(storage.resolve("Helvetica", 400).is_none());
        assert!(storage.is_empty());
    }

    #[test]
    fn unknown_family_falls_back() {
        let mut storage = FontStorage::new();
        storage.load_system_fonts();
        if storage.is_empty() {
            return; // host has no fonts, nothing to assert
        }

        let fallback = storage.resolve("definitely-not-a-font-family", 400);
        assert!(fallback.is_some(), "fallback chain must yield some face");
    }

    #[test]
    fn parsed_fonts_are_cached() {
        let mut storage = FontStorage::new();
        storage.load_system_fonts();
        let Some((id, first)) = storage.resolve("sans-serif", 400) else {
            return;
        };
        let second = storage.font(id).expect("already resolved once");
        assert!(Arc::ptr_eq(&first, &second));
    }
}
