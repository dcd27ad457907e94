//! Song data access
//!
//! Handlers talk to storage only through [`SongRepository`], so the HTTP
//! layer can be exercised against any implementation.

mod postgres;

pub use postgres::{build_list_query, build_update_query, PgSongRepository};

use async_trait::async_trait;
use mlib_common::db::{NewSong, Song, SongPatch};
use mlib_common::Result;

use crate::pagination::Page;

/// Optional equality filters for listings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongFilter {
    pub group: Option<String>,
    pub title: Option<String>,
}

impl SongFilter {
    /// Build a filter from raw query values; blank values mean "no filter"
    pub fn from_params(group: Option<String>, title: Option<String>) -> Self {
        let keep = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Self {
            group: keep(group),
            title: keep(title),
        }
    }

    pub fn matches(&self, song: &Song) -> bool {
        self.group.as_ref().map_or(true, |g| *g == song.group)
            && self.title.as_ref().map_or(true, |t| *t == song.title)
    }
}

/// Data-access contract for the `songs` table
#[async_trait]
pub trait SongRepository: Send + Sync {
    /// Songs matching `filter`, ordered by id, restricted to `page`
    async fn list(&self, filter: &SongFilter, page: Page) -> Result<Vec<Song>>;

    /// Insert a song; storage assigns id and timestamps
    async fn create(&self, song: &NewSong) -> Result<Song>;

    /// The song with `id`, or `Error::NotFound`
    async fn get_by_id(&self, id: i64) -> Result<Song>;

    /// Overwrite only the fields present in `patch`
    ///
    /// Returns `Error::NotFound` when no row has `id`.
    async fn update_by_id(&self, id: i64, patch: &SongPatch) -> Result<Song>;

    /// Hard delete; `Error::NotFound` when no row has `id`
    async fn delete_by_id(&self, id: i64) -> Result<()>;
}
