//! Database models

use crate::time::release_date;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored catalog entry (`songs` table)
///
/// `id`, `created_at` and `updated_at` are owned by the database and are
/// never written by application code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: i64,
    #[sqlx(rename = "group_name")]
    pub group: String,
    pub title: String,
    #[serde(default, with = "release_date")]
    pub release_date: Option<DateTime<Utc>>,
    pub text: String,
    pub link: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a song
///
/// `title` also accepts the legacy `song` key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSong {
    pub group: String,
    #[serde(alias = "song")]
    pub title: String,
    #[serde(default, with = "release_date")]
    pub release_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub link: String,
}

impl NewSong {
    pub fn new(group: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    /// Reject blank identity fields before anything touches the database
    pub fn validate(&self) -> Result<()> {
        require_non_blank("group", &self.group)?;
        require_non_blank("title", &self.title)
    }
}

/// Partial update payload
///
/// Absent fields, and fields sent as `null`, leave the stored value unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, alias = "song", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        with = "release_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub release_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl SongPatch {
    /// A provided `group` or `title` must not be blank
    pub fn validate(&self) -> Result<()> {
        if let Some(group) = &self.group {
            require_non_blank("group", group)?;
        }
        if let Some(title) = &self.title {
            require_non_blank("title", title)?;
        }
        Ok(())
    }
}

fn require_non_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(())
}
