//! Statblock Records
//!
//! Persisted rows and the query types used by [`super::StatblockOps`].

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

use crate::statblock::CanonicalStatblock;

// ============================================================================
// Statblock Record
// ============================================================================

/// Statblock database record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct StatblockRecord {
    pub id: String,
    pub name: String,
    /// Lowercased name, unique across the library.
    pub name_key: String,
    pub creature_type: String,
    pub challenge_rating: f64,
    pub source: String,
    pub custom_type: Option<String>,
    pub data: String, // JSON CanonicalStatblock
    pub created_at: String,
    pub updated_at: String,
}

impl StatblockRecord {
    /// Fresh record with a new id and both timestamps set to now.
    pub fn new(statblock: &CanonicalStatblock) -> Result<Self, serde_json::Error> {
        let now = chrono::Utc::now().to_rfc3339();
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: statblock.name.clone(),
            name_key: Self::key_for(&statblock.name),
            creature_type: statblock.creature_type.clone(),
            challenge_rating: f64::from(statblock.challenge_rating.value()),
            source: statblock.source.clone(),
            custom_type: None,
            data: serde_json::to_string(statblock)?,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Case-folded lookup key for a statblock name.
    pub fn key_for(name: &str) -> String {
        name.to_lowercase()
    }

    pub fn statblock(&self) -> Result<CanonicalStatblock, serde_json::Error> {
        serde_json::from_str(&self.data)
    }
}

// ============================================================================
// Upsert
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertAction {
    Created,
    Updated,
}

impl fmt::Display for UpsertAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Updated => write!(f, "updated"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertOutcome {
    pub action: UpsertAction,
    pub record: StatblockRecord,
    /// The row as it was before an update.
    pub previous: Option<StatblockRecord>,
}

// ============================================================================
// Listing
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Name,
    #[value(name = "cr", alias = "challenge_rating")]
    ChallengeRating,
    #[value(name = "created", alias = "created_at")]
    CreatedAt,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            Self::Name => "name_key",
            Self::ChallengeRating => "challenge_rating",
            Self::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Library listing options. Every filter is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatblockFilter {
    /// Substring matched against name, type and tags, case-insensitively.
    pub query: Option<String>,
    pub creature_type: Option<String>,
    pub challenge_rating: Option<f32>,
    pub sort_by: SortField,
    pub order: SortOrder,
}
