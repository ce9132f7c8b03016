use crate::scene::serialization::{self, SerializationError};
use crate::scene::{MaterialId, MaterialLibrary};
use std::path::Path;

/// Linear RGBA colour, components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const RED: Color = Color::rgba(1.0, 0.0, 0.0, 1.0);
    pub const GREEN: Color = Color::rgba(0.0, 1.0, 0.0, 1.0);
    pub const BLUE: Color = Color::rgba(0.0, 0.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

/// Which collider family a palette entry paints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum EntryKind {
    Shape3D,
    Shape2D,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PaletteEntry {
    pub material: Option<MaterialId>,
    #[serde(default)]
    pub color: Color,
}

impl PaletteEntry {
    pub fn new(material: Option<MaterialId>, color: Color) -> Self {
        Self { material, color }
    }

    pub fn display_name<'a>(&self, materials: &'a MaterialLibrary) -> &'a str {
        materials.display_name(self.material)
    }
}

/// Ordered material/colour pairs, one list per collider family.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Palette {
    #[serde(default)]
    pub entries_3d: Vec<PaletteEntry>,
    #[serde(default)]
    pub entries_2d: Vec<PaletteEntry>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self, kind: EntryKind) -> &[PaletteEntry] {
        match kind {
            EntryKind::Shape3D => &self.entries_3d,
            EntryKind::Shape2D => &self.entries_2d,
        }
    }

    pub fn entry(&self, kind: EntryKind, index: usize) -> Option<&PaletteEntry> {
        self.entries(kind).get(index)
    }

    pub fn push(&mut self, kind: EntryKind, entry: PaletteEntry) -> usize {
        let list = match kind {
            EntryKind::Shape3D => &mut self.entries_3d,
            EntryKind::Shape2D => &mut self.entries_2d,
        };
        list.push(entry);
        list.len() - 1
    }

    /// First 3D entry whose material is identical to `material`.
    ///
    /// Duplicate materials are allowed; the lowest index always wins. An entry
    /// without a material matches shapes that have none.
    pub fn find_by_material(&self, material: Option<MaterialId>) -> Option<(usize, &PaletteEntry)> {
        self.entries_3d
            .iter()
            .enumerate()
            .find(|(_, entry)| entry.material == material)
    }

    pub fn load(path: &Path) -> Result<Self, SerializationError> {
        serialization::load_json(path)
    }

    pub fn save(&self, path: &Path) -> Result<(), SerializationError> {
        serialization::save_json(self, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_returns_first_of_duplicates() {
        let mat_a = Some(MaterialId(1));
        let mut palette = Palette::new();
        palette.push(EntryKind::Shape3D, PaletteEntry::new(Some(MaterialId(7)), Color::GREEN));
        palette.push(EntryKind::Shape3D, PaletteEntry::new(mat_a, Color::RED));
        palette.push(EntryKind::Shape3D, PaletteEntry::new(mat_a, Color::BLUE));

        for _ in 0..3 {
            let (index, entry) = palette.find_by_material(mat_a).unwrap();
            assert_eq!(index, 1);
            assert_eq!(entry.color, Color::RED);
        }
    }

    #[test]
    fn null_entry_matches_unassigned_shapes_only() {
        let mut palette = Palette::new();
        palette.push(EntryKind::Shape3D, PaletteEntry::new(Some(MaterialId(3)), Color::RED));
        palette.push(EntryKind::Shape3D, PaletteEntry::new(None, Color::WHITE));

        assert_eq!(palette.find_by_material(None).map(|(i, _)| i), Some(1));
        assert!(palette.find_by_material(Some(MaterialId(4))).is_none());
    }

    #[test]
    fn lookup_ignores_2d_entries() {
        let mut palette = Palette::new();
        palette.push(EntryKind::Shape2D, PaletteEntry::new(Some(MaterialId(1)), Color::RED));
        assert!(palette.find_by_material(Some(MaterialId(1))).is_none());
        assert_eq!(palette.entries(EntryKind::Shape2D).len(), 1);
    }

    #[test]
    fn display_name_uses_library() {
        let mut library = MaterialLibrary::new();
        let metal = library.add("Metal", 0.4, 0.5, 0.1);
        assert_eq!(PaletteEntry::new(Some(metal), Color::WHITE).display_name(&library), "Metal");
        assert_eq!(PaletteEntry::new(None, Color::WHITE).display_name(&library), "null");
    }

    #[test]
    fn palette_file_roundtrip_keeps_order() {
        let mut palette = Palette::new();
        palette.push(EntryKind::Shape3D, PaletteEntry::new(Some(MaterialId(2)), Color::BLUE));
        palette.push(EntryKind::Shape3D, PaletteEntry::new(Some(MaterialId(1)), Color::RED));
        palette.push(EntryKind::Shape2D, PaletteEntry::new(None, Color::GREEN));

        let path = crate::scene::serialization::temp_path("collider_paint_palette");
        palette.save(&path).unwrap();
        let loaded = Palette::load(&path).unwrap();
        let _ = std::fs::remove_file(path);

        assert_eq!(loaded, palette);
        assert_eq!(loaded.entries_3d[0].material, Some(MaterialId(2)));
    }

    #[test]
    fn missing_color_defaults_to_white() {
        let loaded: Palette =
            serde_json::from_str(r#"{ "entries_3d": [ { "material": 5 } ] }"#).unwrap();
        assert_eq!(loaded.entries_3d[0].color, Color::WHITE);
        assert!(loaded.entries_2d.is_empty());
    }
}
