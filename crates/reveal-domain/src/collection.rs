use serde::{Deserialize, Serialize};

use crate::{MetadataRecord, PLACEHOLDER_TRAIT_VALUE, TokenId, TokenIdError, TraitAttribute};

/// Static description of the collection: its size and the fields every
/// placeholder record shares.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CollectionProfile {
    /// Number of tokens in the collection; valid ids are `1..=max_supply`.
    pub max_supply: u64,
    /// Prefix of every token name, e.g. `"CHIBI"` gives `"CHIBI #42"`.
    pub name_prefix: String,
    pub description: String,
    pub image: String,
    pub animation_url: Option<String>,
    pub external_url: Option<String>,
    pub creator: Option<String>,
}

impl CollectionProfile {
    pub fn token_id(&self, raw: &str) -> Result<TokenId, TokenIdError> {
        TokenId::parse(raw, self.max_supply)
    }

    pub fn token_name(&self, id: TokenId) -> String {
        format!("{} #{}", self.name_prefix, id)
    }

    /// Build the pre-reveal record for `id`.
    ///
    /// The result depends only on the profile and the id, so repeated calls
    /// always produce the same document.
    pub fn placeholder(&self, id: TokenId) -> MetadataRecord {
        let name = self.token_name(id);
        MetadataRecord {
            attributes: vec![TraitAttribute {
                trait_type: name.clone(),
                value: serde_json::Value::String(PLACEHOLDER_TRAIT_VALUE.to_string()),
            }],
            name,
            description: self.description.clone(),
            image: self.image.clone(),
            animation_url: self.animation_url.clone(),
            external_url: self.external_url.clone(),
            creator: self.creator.clone(),
        }
    }
}
