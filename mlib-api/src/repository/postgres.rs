//! PostgreSQL implementation of [`SongRepository`]
//!
//! Dynamic statements are composed with `QueryBuilder` from a fixed set of
//! optional fields. User input only ever reaches the database as bound
//! parameters.

use async_trait::async_trait;
use mlib_common::db::{NewSong, Song, SongPatch};
use mlib_common::{Error, Result};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;

use super::{SongFilter, SongRepository};
use crate::pagination::Page;

const SONG_COLUMNS: &str =
    "id, group_name, title, release_date, text, link, created_at, updated_at";

/// `SELECT` for a filtered, paginated listing
pub fn build_list_query(filter: &SongFilter, page: Page) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {} FROM songs", SONG_COLUMNS));
    let mut keyword = " WHERE ";

    if let Some(group) = &filter.group {
        qb.push(keyword).push("group_name = ").push_bind(group.clone());
        keyword = " AND ";
    }
    if let Some(title) = &filter.title {
        qb.push(keyword).push("title = ").push_bind(title.clone());
    }

    qb.push(" ORDER BY id ASC LIMIT ")
        .push_bind(page.limit)
        .push(" OFFSET ")
        .push_bind(page.offset);
    qb
}

/// `UPDATE ... RETURNING` touching only the fields present in `patch`
pub fn build_update_query(id: i64, patch: &SongPatch) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("UPDATE songs SET ");

    {
        let mut set = qb.separated(", ");
        if let Some(group) = &patch.group {
            set.push("group_name = ").push_bind_unseparated(group.clone());
        }
        if let Some(title) = &patch.title {
            set.push("title = ").push_bind_unseparated(title.clone());
        }
        if let Some(release_date) = patch.release_date {
            set.push("release_date = ").push_bind_unseparated(release_date);
        }
        if let Some(text) = &patch.text {
            set.push("text = ").push_bind_unseparated(text.clone());
        }
        if let Some(link) = &patch.link {
            set.push("link = ").push_bind_unseparated(link.clone());
        }
        set.push("updated_at = now()");
    }

    qb.push(" WHERE id = ")
        .push_bind(id)
        .push(format!(" RETURNING {}", SONG_COLUMNS));
    qb
}

/// Song repository backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgSongRepository {
    pool: PgPool,
}

impl PgSongRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SongRepository for PgSongRepository {
    async fn list(&self, filter: &SongFilter, page: Page) -> Result<Vec<Song>> {
        let mut qb = build_list_query(filter, page);
        debug!(sql = qb.sql(), ?filter, ?page, "Listing songs");

        let songs = qb.build_query_as::<Song>().fetch_all(&self.pool).await?;
        Ok(songs)
    }

    async fn create(&self, song: &NewSong) -> Result<Song> {
        let sql = format!(
            "INSERT INTO songs (group_name, title, release_date, text, link) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            SONG_COLUMNS
        );

        let created = sqlx::query_as::<_, Song>(&sql)
            .bind(&song.group)
            .bind(&song.title)
            .bind(song.release_date)
            .bind(&song.text)
            .bind(&song.link)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Song> {
        let sql = format!("SELECT {} FROM songs WHERE id = $1", SONG_COLUMNS);

        sqlx::query_as::<_, Song>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("song {}", id)))
    }

    async fn update_by_id(&self, id: i64, patch: &SongPatch) -> Result<Song> {
        let mut qb = build_update_query(id, patch);
        debug!(sql = qb.sql(), id, "Updating song");

        qb.build_query_as::<Song>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("song {}", id)))
    }

    async fn delete_by_id(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM songs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("song {}", id)));
        }
        Ok(())
    }
}
