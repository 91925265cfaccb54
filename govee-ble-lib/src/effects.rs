//! Scene/effect catalog lookup
//!
//! Each model ships a JSON document listing its scenes as a four-level tree
//! (category, scene, light effect, special effect). Leaves carry a base64
//! parameter blob that is sent verbatim through the multi-frame stream.
//!
//! The catalog is read-only; this module only walks the tree and decodes the
//! blob at the requested index path.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::GoveeError;

static EFFECT_INDEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(\d+)/(\d+)/(\d+)/(\d+)]").expect("effect index pattern is valid")
});

/// Four-level index path into a model's effect catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectRef {
    pub category: usize,
    pub scene: usize,
    pub light_effect: usize,
    pub special_effect: usize,
}

impl EffectRef {
    pub fn new(category: usize, scene: usize, light_effect: usize, special_effect: usize) -> Self {
        Self {
            category,
            scene,
            light_effect,
            special_effect,
        }
    }
}

impl fmt::Display for EffectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}/{}/{}/{}]",
            self.category, self.scene, self.light_effect, self.special_effect
        )
    }
}

/// Accepts a full effect display name (`"Life - Sunrise - Sunrise [0/1/0/0]"`)
/// or a bare `[0/1/0/0]`.
impl FromStr for EffectRef {
    type Err = GoveeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let captures = EFFECT_INDEX
            .captures(s)
            .ok_or_else(|| GoveeError::InvalidEffectName(s.to_string()))?;

        let mut indexes = [0usize; 4];
        for (slot, index) in indexes.iter_mut().enumerate() {
            *index = captures[slot + 1]
                .parse()
                .map_err(|_| GoveeError::InvalidEffectName(s.to_string()))?;
        }
        Ok(EffectRef::new(indexes[0], indexes[1], indexes[2], indexes[3]))
    }
}

/// Source of scene parameter blobs, keyed by model id
pub trait EffectCatalog: Send + Sync {
    /// Resolve an index path to the raw parameter blob
    fn lookup(&self, model: &str, effect: EffectRef) -> Result<Bytes, GoveeError>;

    /// Selectable effects for `model`
    fn effects(&self, _model: &str) -> Vec<EffectEntry> {
        Vec::new()
    }
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogFile {
    data: CatalogData,
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogData {
    categories: Vec<Category>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Category {
    category_name: String,
    #[serde(default)]
    scenes: Vec<Scene>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Scene {
    scene_name: String,
    #[serde(default)]
    light_effects: Vec<LightEffect>,
}

// The vendor documents spell these fields "scence".
#[derive(Debug, Clone, Deserialize)]
struct LightEffect {
    #[serde(rename = "scenceName", default)]
    name: String,
    #[serde(rename = "specialEffect", default)]
    special_effects: Vec<SpecialEffect>,
}

#[derive(Debug, Clone, Deserialize)]
struct SpecialEffect {
    #[serde(rename = "scenceParam", default)]
    param: String,
}

/// One selectable effect with its display name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectEntry {
    pub name: String,
    pub effect: EffectRef,
}

/// Parsed effect catalog for a single model
#[derive(Debug, Clone)]
pub struct CatalogDocument {
    categories: Vec<Category>,
}

impl CatalogDocument {
    pub fn from_json(json: &str) -> Result<Self, GoveeError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Ok(Self {
            categories: file.data.categories,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, GoveeError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Every leaf effect, in catalog order
    pub fn effects(&self) -> Vec<EffectEntry> {
        let mut entries = Vec::new();
        for (category_idx, category) in self.categories.iter().enumerate() {
            for (scene_idx, scene) in category.scenes.iter().enumerate() {
                for (light_idx, light_effect) in scene.light_effects.iter().enumerate() {
                    for special_idx in 0..light_effect.special_effects.len() {
                        let effect = EffectRef::new(category_idx, scene_idx, light_idx, special_idx);
                        entries.push(EffectEntry {
                            name: format!(
                                "{} - {} - {} {}",
                                category.category_name, scene.scene_name, light_effect.name, effect
                            ),
                            effect,
                        });
                    }
                }
            }
        }
        entries
    }

    /// Decode the parameter blob at `effect`, or `None` if the path does not
    /// resolve or the blob is not valid base64
    pub fn params(&self, effect: EffectRef) -> Option<Bytes> {
        let special = self
            .categories
            .get(effect.category)?
            .scenes
            .get(effect.scene)?
            .light_effects
            .get(effect.light_effect)?
            .special_effects
            .get(effect.special_effect)?;

        match STANDARD.decode(special.param.trim()) {
            Ok(raw) => Some(Bytes::from(raw)),
            Err(e) => {
                warn!("Malformed scene parameter at {}: {}", effect, e);
                None
            }
        }
    }
}

/// A directory of `<MODEL>.json` catalog documents, loaded up front.
///
/// A document that fails to load is skipped with a warning, so one broken
/// file only costs that model its effects.
#[derive(Debug, Clone, Default)]
pub struct CatalogDirectory {
    documents: BTreeMap<String, CatalogDocument>,
}

impl CatalogDirectory {
    pub fn open(root: impl AsRef<Path>) -> Result<Self, GoveeError> {
        let root = root.as_ref();
        let mut documents = BTreeMap::new();

        for entry in std::fs::read_dir(root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(model) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };
            match CatalogDocument::from_path(&path) {
                Ok(document) => {
                    debug!("Loaded catalog for {} from {}", model, path.display());
                    documents.insert(model, document);
                }
                Err(e) => warn!("Skipping catalog for {} at {}: {}", model, path.display(), e),
            }
        }

        info!("Loaded {} effect catalogs from {}", documents.len(), root.display());
        Ok(Self { documents })
    }

    /// Model ids with a catalog, sorted
    pub fn models(&self) -> Vec<&str> {
        self.documents.keys().map(String::as_str).collect()
    }

    pub fn document(&self, model: &str) -> Option<&CatalogDocument> {
        self.documents.get(model)
    }
}

impl EffectCatalog for CatalogDirectory {
    fn lookup(&self, model: &str, effect: EffectRef) -> Result<Bytes, GoveeError> {
        self.document(model)
            .and_then(|doc| doc.params(effect))
            .ok_or_else(|| GoveeError::EffectNotFound {
                model: model.to_string(),
                effect,
            })
    }

    fn effects(&self, model: &str) -> Vec<EffectEntry> {
        self.document(model).map(CatalogDocument::effects).unwrap_or_default()
    }
}

/// A catalog with no effects; every lookup fails
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyCatalog;

impl EffectCatalog for EmptyCatalog {
    fn lookup(&self, model: &str, effect: EffectRef) -> Result<Bytes, GoveeError> {
        Err(GoveeError::EffectNotFound {
            model: model.to_string(),
            effect,
        })
    }
}
