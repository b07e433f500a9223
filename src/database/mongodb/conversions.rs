/*!
 * MongoDB Index Conversion Module
 *
 * Conversions between the crate's index representations and the driver's
 * native index types.
 *
 * - IndexDefinition -> IndexModel, for creating indexes
 * - IndexModel -> ExistingIndex, for comparing against what a collection already has
 * - SearchIndexDefinition -> SearchIndexModel, for Atlas Search requests
 */

use crate::database::index::{ExistingIndex, IndexDefinition, KeyPattern, SearchIndexDefinition};
use crate::AdminError;
use mongodb::{options::IndexOptions, IndexModel, SearchIndexModel};

/// Builds the name the server assigns to an index created without one,
/// e.g. `category.main_1_pricing.actual_price_-1`.
pub(crate) fn default_index_name(key_pattern: &KeyPattern) -> String {
    key_pattern
        .keys()
        .iter()
        .map(|key| format!("{}_{}", key.field, key.kind))
        .collect::<Vec<String>>()
        .join("_")
}

/// Converts a listed MongoDB index into the shape the provisioner compares against.
impl From<IndexModel> for ExistingIndex {
    fn from(model: IndexModel) -> Self {
        let key_pattern = KeyPattern::from(&model.keys);

        let name = model
            .options
            .and_then(|opts| opts.name)
            .unwrap_or_else(|| default_index_name(&key_pattern));

        ExistingIndex { name, key_pattern }
    }
}

/// Converts a requested index into a driver IndexModel.
///
/// The definition's options are read with the server's option names (`unique`,
/// `sparse`, `expireAfterSeconds`, ...). The definition's name always wins over a
/// `name` entry inside the options.
impl TryFrom<&IndexDefinition> for IndexModel {
    type Error = AdminError;

    fn try_from(definition: &IndexDefinition) -> Result<Self, Self::Error> {
        if definition.key_pattern.is_empty() {
            return Err(AdminError::IndexError(format!(
                "Index `{}` has an empty key pattern",
                definition.name
            )));
        }

        let mut options: IndexOptions = bson::from_document(definition.options.clone())?;
        options.name = Some(definition.name.clone());

        let mut index_model = IndexModel::builder()
            .keys(definition.key_pattern.to_document())
            .build();
        index_model.options = Some(options);
        Ok(index_model)
    }
}

impl From<&SearchIndexDefinition> for SearchIndexModel {
    fn from(definition: &SearchIndexDefinition) -> Self {
        let mut model = SearchIndexModel::builder()
            .definition(definition.definition.clone())
            .build();
        model.name = Some(definition.name.clone());
        model
    }
}
