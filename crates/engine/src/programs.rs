//! Assistance programs.
//!
//! Admin-managed catalogue. `applications.program` is a free-text match
//! against `title`, so matching folds case and accents instead of using a
//! foreign key.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "programs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub title: String,
    pub description: String,
    pub icon_path: Option<String>,
    pub is_active: bool,
    /// JSON array of requirement labels.
    pub requirements: String,
    pub default_amount_minor: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn requirement_list(&self) -> Vec<String> {
        serde_json::from_str(&self.requirements).unwrap_or_default()
    }
}

/// Coarse grouping used to vary the claim checklist on outbound messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramCategory {
    Medical,
    Burial,
    General,
}

/// Fold a program title for matching: NFD, strip combining marks, lowercase.
pub fn fold_title(title: &str) -> String {
    title
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

impl ProgramCategory {
    pub fn classify(program: &str) -> Self {
        let folded = fold_title(program);
        const MEDICAL: [&str; 5] = ["hospital", "chemo", "dialysis", "medic", "laboratory"];
        const BURIAL: [&str; 2] = ["funeral", "burial"];

        if MEDICAL.iter().any(|needle| folded.contains(needle)) {
            Self::Medical
        } else if BURIAL.iter().any(|needle| folded.contains(needle)) {
            Self::Burial
        } else {
            Self::General
        }
    }
}
