use serde::{Deserialize, Serialize};

/// Trait value shown for every attribute until the collection is revealed.
pub const PLACEHOLDER_TRAIT_VALUE: &str = "?";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraitAttribute {
    pub trait_type: String,
    /// Revealed collections mix string and numeric trait values.
    pub value: serde_json::Value,
}

/// Per-token metadata document in the shape marketplaces expect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetadataRecord {
    pub name: String,
    pub description: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(default)]
    pub attributes: Vec<TraitAttribute>,
}

impl MetadataRecord {
    /// Check that `bytes` hold a well-formed metadata document.
    ///
    /// Used both on freshly generated files before they are published and on
    /// published files before they are served.
    pub fn validate(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    #[cfg(test)]
    pub(crate) fn is_placeholder(&self) -> bool {
        !self.attributes.is_empty()
            && self
                .attributes
                .iter()
                .all(|attribute| attribute.value == PLACEHOLDER_TRAIT_VALUE)
    }
}
