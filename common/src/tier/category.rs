use super::Level;
use serde::{Deserialize, Serialize};

/// Affiliate category (Jogador, Iniciante, ...) grouping consecutive levels
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Ordered by ascending `minReferrals`
    #[serde(default)]
    pub levels: Vec<Level>,
}

impl Category {
    pub fn new<I: Into<String>, N: Into<String>, D: Into<String>>(
        id: I,
        name: N,
        description: D,
        levels: Vec<Level>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            levels,
        }
    }

    pub fn get_level(&self, id: &str) -> Option<&Level> {
        self.levels.iter().find(|level| level.id == id)
    }

    pub fn get_level_mut(&mut self, id: &str) -> Option<&mut Level> {
        self.levels.iter_mut().find(|level| level.id == id)
    }

    /// Summary without the nested levels
    pub fn summary(&self) -> CategorySummary {
        CategorySummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategorySummary {
    pub id: String,
    pub name: String,
    pub description: String,
}
