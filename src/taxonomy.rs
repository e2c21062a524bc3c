//! Tissue taxonomy and acoustic property tables
//!
//! Label ids follow the VICTRE breast phantom segmentation. Property units:
//!
//! | Property           | Unit            |
//! |--------------------|-----------------|
//! | Speed of sound     | m/s             |
//! | Density            | kg/m^3          |
//! | Attenuation alpha0 | Np/m/MHz^b      |

use serde::{Deserialize, Serialize};

use crate::error::{PhantomError, Result};
use crate::sampler::PropertySpec;

/// Tissue classes present in the segmented label volumes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tissue {
    Water,
    Fat,
    Skin,
    Glandular,
    Nipple,
    Muscle,
    Ligament,
    #[serde(rename = "TDLU")]
    Tdlu,
    Duct,
    Artery,
    Tumor,
    Vein,
}

impl Tissue {
    pub const ALL: [Tissue; 12] = [
        Tissue::Water,
        Tissue::Fat,
        Tissue::Skin,
        Tissue::Glandular,
        Tissue::Nipple,
        Tissue::Muscle,
        Tissue::Ligament,
        Tissue::Tdlu,
        Tissue::Duct,
        Tissue::Artery,
        Tissue::Tumor,
        Tissue::Vein,
    ];

    /// Vascular labels removed by neighbour voting during cleanup
    pub const EXTRA: [Tissue; 2] = [Tissue::Artery, Tissue::Vein];

    /// Label id stored in the volume
    pub const fn label(self) -> u8 {
        match self {
            Tissue::Water => 0,
            Tissue::Fat => 1,
            Tissue::Skin => 2,
            Tissue::Glandular => 29,
            Tissue::Nipple => 33,
            Tissue::Muscle => 40,
            Tissue::Ligament => 88,
            Tissue::Tdlu => 95,
            Tissue::Duct => 125,
            Tissue::Artery => 150,
            Tissue::Tumor => 200,
            Tissue::Vein => 225,
        }
    }

    pub fn from_label(label: u8) -> Option<Tissue> {
        Tissue::ALL.iter().copied().find(|t| t.label() == label)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Tissue::Water => "Water",
            Tissue::Fat => "Fat",
            Tissue::Skin => "Skin",
            Tissue::Glandular => "Glandular",
            Tissue::Nipple => "Nipple",
            Tissue::Muscle => "Muscle",
            Tissue::Ligament => "Ligament",
            Tissue::Tdlu => "TDLU",
            Tissue::Duct => "Duct",
            Tissue::Artery => "Artery",
            Tissue::Tumor => "Tumor",
            Tissue::Vein => "Vein",
        }
    }

    /// Class this tissue is folded into before property assignment.
    ///
    /// Ducts and terminal duct lobular units are glandular tissue acoustically;
    /// the nipple is treated as skin.
    pub const fn parent(self) -> Option<Tissue> {
        match self {
            Tissue::Tdlu | Tissue::Duct => Some(Tissue::Glandular),
            Tissue::Nipple => Some(Tissue::Skin),
            _ => None,
        }
    }

    pub const fn is_extra(self) -> bool {
        matches!(self, Tissue::Artery | Tissue::Vein)
    }
}

/// Acoustic quantity carried by one property field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    SpeedOfSound,
    Density,
    Attenuation,
}

impl Quantity {
    pub const ALL: [Quantity; 3] = [Quantity::SpeedOfSound, Quantity::Density, Quantity::Attenuation];

    pub const fn name(self) -> &'static str {
        match self {
            Quantity::SpeedOfSound => "sos",
            Quantity::Density => "density",
            Quantity::Attenuation => "attenuation",
        }
    }
}

/// Distributions of the three acoustic quantities for one tissue
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TissueProperties {
    #[serde(default)]
    pub sos: Option<PropertySpec>,
    #[serde(default)]
    pub density: Option<PropertySpec>,
    #[serde(default)]
    pub attenuation: Option<PropertySpec>,
}

impl TissueProperties {
    pub fn new(sos: PropertySpec, density: PropertySpec, attenuation: PropertySpec) -> Self {
        Self {
            sos: Some(sos),
            density: Some(density),
            attenuation: Some(attenuation),
        }
    }

    pub fn get(&self, quantity: Quantity) -> Option<&PropertySpec> {
        match quantity {
            Quantity::SpeedOfSound => self.sos.as_ref(),
            Quantity::Density => self.density.as_ref(),
            Quantity::Attenuation => self.attenuation.as_ref(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyEntry {
    pub tissue: Tissue,
    pub properties: TissueProperties,
}

/// Immutable table of tissues that receive acoustic properties
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TaxonomyEntry>", into = "Vec<TaxonomyEntry>")]
pub struct Taxonomy {
    entries: Vec<TaxonomyEntry>,
}

impl Taxonomy {
    /// Build a taxonomy, rejecting duplicate tissues and malformed specs
    pub fn new(entries: Vec<TaxonomyEntry>) -> Result<Self> {
        let taxonomy = Self { entries };
        taxonomy.validate()?;
        Ok(taxonomy)
    }

    pub fn validate(&self) -> Result<()> {
        for (i, entry) in self.entries.iter().enumerate() {
            if self.entries[..i].iter().any(|e| e.tissue == entry.tissue) {
                return Err(PhantomError::DuplicateTissue(entry.tissue));
            }
            let p = &entry.properties;
            for spec in [&p.sos, &p.density, &p.attenuation].into_iter().flatten() {
                spec.validate().map_err(|e| match e {
                    PhantomError::InvalidSpec { reason } => PhantomError::InvalidSpec {
                        reason: format!("{}: {}", entry.tissue.name(), reason),
                    },
                    other => other,
                })?;
            }
        }
        Ok(())
    }

    pub fn entries(&self) -> &[TaxonomyEntry] {
        &self.entries
    }

    pub fn get(&self, tissue: Tissue) -> Option<&TissueProperties> {
        self.entries
            .iter()
            .find(|e| e.tissue == tissue)
            .map(|e| &e.properties)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl TryFrom<Vec<TaxonomyEntry>> for Taxonomy {
    type Error = PhantomError;

    fn try_from(entries: Vec<TaxonomyEntry>) -> Result<Self> {
        Taxonomy::new(entries)
    }
}

impl From<Taxonomy> for Vec<TaxonomyEntry> {
    fn from(taxonomy: Taxonomy) -> Self {
        taxonomy.entries
    }
}

impl Default for Taxonomy {
    /// Breast tissue properties used for the USCT phantoms
    fn default() -> Self {
        use PropertySpec::{Constant, TruncatedNormal};

        let tn = |mean: f64, sd: f64, min: f64, max: f64| TruncatedNormal { mean, sd, min, max };

        let entries = vec![
            TaxonomyEntry {
                tissue: Tissue::Water,
                properties: TissueProperties::new(
                    Constant(1500.0),
                    Constant(994.0),
                    Constant(0.025328436023),
                ),
            },
            TaxonomyEntry {
                tissue: Tissue::Fat,
                properties: TissueProperties::new(
                    tn(1440.2, 20.9, 1412.0, 1485.0),
                    tn(911.0, 53.0, 812.0, 961.0),
                    Constant(4.3578),
                ),
            },
            TaxonomyEntry {
                tissue: Tissue::Skin,
                properties: TissueProperties::new(
                    tn(1555.0, 10.0, 1530.0, 1580.0),
                    tn(1109.0, 14.0, 1100.0, 1125.0),
                    Constant(21.158),
                ),
            },
            TaxonomyEntry {
                tissue: Tissue::Glandular,
                properties: TissueProperties::new(
                    tn(1520.0, 10.0, 1505.0, 1550.0),
                    tn(1041.0, 45.3, 990.0, 1092.0),
                    Constant(8.635),
                ),
            },
            TaxonomyEntry {
                tissue: Tissue::Tumor,
                properties: TissueProperties::new(
                    Constant(1548.0),
                    Constant(945.0),
                    Constant(31.0),
                ),
            },
            TaxonomyEntry {
                tissue: Tissue::Ligament,
                properties: TissueProperties::new(
                    tn(1440.0, 10.0, 1410.0, 1470.0),
                    Constant(1142.0),
                    Constant(14.506),
                ),
            },
        ];

        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_roundtrip() {
        for tissue in Tissue::ALL {
            assert_eq!(Tissue::from_label(tissue.label()), Some(tissue));
        }
        assert_eq!(Tissue::from_label(7), None);
    }

    #[test]
    fn test_label_ids_unique() {
        let mut ids: Vec<u8> = Tissue::ALL.iter().map(|t| t.label()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), Tissue::ALL.len());
    }

    #[test]
    fn test_parents_are_not_remapped_again() {
        for tissue in Tissue::ALL {
            if let Some(parent) = tissue.parent() {
                assert!(parent.parent().is_none(), "{:?} maps to a remapped class", tissue);
                assert!(!parent.is_extra());
            }
        }
    }

    #[test]
    fn test_default_taxonomy_is_valid() {
        let taxonomy = Taxonomy::default();
        taxonomy.validate().unwrap();
        assert_eq!(taxonomy.entries().len(), 6);
        assert!(taxonomy.get(Tissue::Fat).is_some());
        assert!(taxonomy.get(Tissue::Artery).is_none());
    }

    #[test]
    fn test_duplicate_tissue_rejected() {
        let entry = TaxonomyEntry {
            tissue: Tissue::Fat,
            properties: TissueProperties::default(),
        };
        let err = Taxonomy::new(vec![entry.clone(), entry]).unwrap_err();
        assert!(matches!(err, PhantomError::DuplicateTissue(Tissue::Fat)));
    }

    #[test]
    fn test_malformed_spec_names_tissue() {
        let entry = TaxonomyEntry {
            tissue: Tissue::Skin,
            properties: TissueProperties {
                sos: Some(PropertySpec::TruncatedNormal { mean: 1555.0, sd: -1.0, min: 1530.0, max: 1580.0 }),
                ..Default::default()
            },
        };
        match Taxonomy::new(vec![entry]) {
            Err(PhantomError::InvalidSpec { reason }) => assert!(reason.starts_with("Skin")),
            other => panic!("expected InvalidSpec, got {:?}", other),
        }
    }

    #[test]
    fn test_taxonomy_from_json() {
        let json = r#"[
            {"tissue": "Water", "properties": {"sos": 1500.0, "density": 994, "attenuation": 0.025}},
            {"tissue": "Fat", "properties": {
                "sos": {"mean": 1440.2, "sd": 20.9, "min": 1412, "max": 1485},
                "density": {"mean": 911, "sd": 53, "min": 812, "max": 961}
            }}
        ]"#;
        let taxonomy = Taxonomy::from_json(json).unwrap();
        assert_eq!(taxonomy.entries().len(), 2);
        let fat = taxonomy.get(Tissue::Fat).unwrap();
        assert!(fat.attenuation.is_none());
        assert_eq!(
            fat.sos,
            Some(PropertySpec::TruncatedNormal { mean: 1440.2, sd: 20.9, min: 1412.0, max: 1485.0 })
        );
    }

    #[test]
    fn test_taxonomy_json_rejects_duplicates() {
        let json = r#"[
            {"tissue": "Water", "properties": {"sos": 1500.0}},
            {"tissue": "Water", "properties": {"sos": 1480.0}}
        ]"#;
        assert!(Taxonomy::from_json(json).is_err());
    }
}
