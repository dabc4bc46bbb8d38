// Single-level edits expressed as catalog transformations
//
// An edit only produces a candidate; the candidate is accepted or rejected
// as a whole by the validator like any full replacement.

use super::{form::LevelForm, Category, EditError};
use crate::config::LEVEL_ID_PREFIX;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(
    tag = "action",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum CatalogEdit {
    AddLevel {
        category_id: String,
        form: LevelForm,
    },
    UpdateLevel {
        category_id: String,
        level_id: String,
        form: LevelForm,
    },
    RemoveLevel {
        category_id: String,
        level_id: String,
    },
}

impl CatalogEdit {
    pub fn category_id(&self) -> &str {
        match self {
            Self::AddLevel { category_id, .. }
            | Self::UpdateLevel { category_id, .. }
            | Self::RemoveLevel { category_id, .. } => category_id,
        }
    }
}

pub fn apply_edit(categories: &mut [Category], edit: CatalogEdit) -> Result<(), EditError> {
    let category = find_category(categories, edit.category_id())?;

    match edit {
        CatalogEdit::AddLevel { form, .. } => {
            let id = next_level_id(category);
            let name = default_level_name(category.levels.len());
            let level = form.parse(&id, &name)?;

            // keep the category ordered by range start
            let position = category
                .levels
                .partition_point(|other| other.min_referrals() <= level.min_referrals());
            category.levels.insert(position, level);
            renumber_levels(category);
        }
        CatalogEdit::UpdateLevel { level_id, form, .. } => {
            let category_id = category.id.clone();
            let level = category
                .get_level_mut(&level_id)
                .ok_or_else(|| EditError::LevelNotFound {
                    category: category_id,
                    level: level_id.clone(),
                })?;
            *level = form.parse(&level_id, &level.name)?;
            category
                .levels
                .sort_by_key(|level| level.requirements.min_referrals);
            renumber_levels(category);
        }
        CatalogEdit::RemoveLevel { level_id, .. } => {
            let position = category
                .levels
                .iter()
                .position(|level| level.id == level_id)
                .ok_or_else(|| EditError::LevelNotFound {
                    category: category.id.clone(),
                    level: level_id,
                })?;
            category.levels.remove(position);
            renumber_levels(category);
        }
    }

    Ok(())
}

/// Apply `edits` in order; stops at the first failing edit
pub fn apply_edits<I>(categories: &mut [Category], edits: I) -> Result<(), EditError>
where
    I: IntoIterator<Item = CatalogEdit>,
{
    edits
        .into_iter()
        .try_for_each(|edit| apply_edit(categories, edit))
}

fn find_category<'a>(
    categories: &'a mut [Category],
    id: &str,
) -> Result<&'a mut Category, EditError> {
    categories
        .iter_mut()
        .find(|category| category.id == id)
        .ok_or_else(|| EditError::CategoryNotFound(id.to_string()))
}

fn default_level_name(index: usize) -> String {
    format!("Level {}", index + 1)
}

fn is_default_level_name(name: &str) -> bool {
    name.strip_prefix("Level ")
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

// Default names follow position; custom names and ids stay as they are
fn renumber_levels(category: &mut Category) {
    for (i, level) in category.levels.iter_mut().enumerate() {
        if is_default_level_name(&level.name) {
            level.name = default_level_name(i);
        }
    }
}

/// First `level-N` not already used in the category
fn next_level_id(category: &Category) -> String {
    let mut n = category.levels.len() + 1;
    loop {
        let id = format!("{}{}", LEVEL_ID_PREFIX, n);
        if category.get_level(&id).is_none() {
            return id;
        }
        n += 1;
    }
}
