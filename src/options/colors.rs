use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::util::color::hash_color;

/// Color palette options for annotation overlays.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ColorOptions {
    /// Fixed RGB color per ligand component id.
    pub ligand_colors: HashMap<String, [f32; 3]>,
    /// Saturation of hash-derived ligand colors, `[0, 1]`.
    pub hash_saturation: f32,
    /// Lightness of hash-derived ligand colors, `[0, 1]`.
    pub hash_lightness: f32,
    /// RGB color for mutation columns/residues.
    pub mutation_color: [f32; 3],
}

impl Default for ColorOptions {
    fn default() -> Self {
        let mut ligand_colors = HashMap::new();
        let _ = ligand_colors.insert("GTP".to_owned(), [0.263, 0.388, 0.847]);
        let _ = ligand_colors.insert("GDP".to_owned(), [1.0, 0.843, 0.0]);
        let _ = ligand_colors.insert("TAX".to_owned(), [0.235, 0.706, 0.294]);
        let _ = ligand_colors.insert("TXL".to_owned(), [0.235, 0.706, 0.294]);
        let _ = ligand_colors.insert("EPO".to_owned(), [0.961, 0.510, 0.192]);
        let _ = ligand_colors.insert("VLB".to_owned(), [0.902, 0.098, 0.294]);
        let _ = ligand_colors.insert("COL".to_owned(), [0.569, 0.118, 0.706]);
        let _ = ligand_colors.insert("MG".to_owned(), [0.259, 0.831, 0.957]);
        let _ = ligand_colors.insert("CA".to_owned(), [0.941, 0.196, 0.902]);
        let _ = ligand_colors.insert("ZN".to_owned(), [0.749, 0.937, 0.271]);

        Self {
            ligand_colors,
            hash_saturation: 0.7,
            hash_lightness: 0.5,
            mutation_color: [0.9, 0.15, 0.1],
        }
    }
}

impl ColorOptions {
    /// Color for a ligand component id: the fixed palette entry if there is
    /// one, otherwise an HSL color whose hue is derived from the id.
    ///
    /// The same id always yields the same color.
    #[must_use]
    pub fn ligand_color(&self, ligand_id: &str) -> [f32; 3] {
        let ligand_id = ligand_id.trim();
        self.ligand_colors.get(ligand_id).copied().unwrap_or_else(|| {
            hash_color(ligand_id, self.hash_saturation, self.hash_lightness)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_lookup() {
        let colors = ColorOptions::default();
        assert_eq!(colors.ligand_color("GTP"), [0.263, 0.388, 0.847]);
        assert_eq!(colors.ligand_color("TAX"), colors.ligand_color("TXL"));
    }

    #[test]
    fn unknown_ligands_are_stable() {
        let colors = ColorOptions::default();
        let a = colors.ligand_color("ABCD");
        assert_eq!(a, colors.ligand_color("ABCD"));
        assert_eq!(a, ColorOptions::default().ligand_color("ABCD"));
        assert_ne!(a, colors.ligand_color("ABCE"));
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let colors = ColorOptions::default();
        assert_eq!(colors.ligand_color(" ABCD "), colors.ligand_color("ABCD"));
        assert_eq!(colors.ligand_color("GTP\n"), colors.ligand_color("GTP"));
    }
}
