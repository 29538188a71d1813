mod collection;
mod metadata;
mod token_id;

pub use collection::CollectionProfile;
pub use metadata::{MetadataRecord, PLACEHOLDER_TRAIT_VALUE, TraitAttribute};
pub use token_id::{TokenId, TokenIdError};
