//! Song CRUD endpoints
//!
//! | Method | Path        | Success               |
//! |--------|-------------|-----------------------|
//! | GET    | /songs      | 200, array of songs   |
//! | POST   | /songs      | 201, created song     |
//! | GET    | /songs/:id  | 200, song             |
//! | PUT    | /songs/:id  | 200, applied fields   |
//! | DELETE | /songs/:id  | 204, empty            |

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use mlib_common::db::{NewSong, Song, SongPatch};
use tracing::info;

use crate::pagination::Page;
use crate::repository::SongFilter;
use crate::{ApiError, ApiResult, AppState};

/// Query parameters for listing
///
/// `limit`/`offset` stay as strings so a malformed value falls back to the
/// default page instead of rejecting the request.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub group: Option<String>,
    pub title: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl ListQuery {
    /// Collect known keys from raw query pairs; the first occurrence of a
    /// repeated key wins and unknown keys are ignored
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "group" => &mut query.group,
                "title" => &mut query.title,
                "limit" => &mut query.limit,
                "offset" => &mut query.offset,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }
}

/// GET /songs
pub async fn list_songs(
    State(state): State<AppState>,
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> ApiResult<Json<Vec<Song>>> {
    let Query(pairs) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let query = ListQuery::from_pairs(pairs);
    let page = Page::from_params(query.limit.as_deref(), query.offset.as_deref());
    let filter = SongFilter::from_params(query.group, query.title);

    let songs = state.songs.list(&filter, page).await?;
    Ok(Json(songs))
}

/// POST /songs
///
/// The metadata lookup runs before the insert. If it fails nothing is
/// written.
pub async fn create_song(
    State(state): State<AppState>,
    payload: Result<Json<NewSong>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Song>)> {
    let Json(mut song) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    song.validate()?;

    let details = state
        .enricher
        .fetch_details(&song.group, &song.title)
        .await?;

    if details.release_date.is_some() {
        song.release_date = details.release_date;
    }
    song.text = details.text;
    song.link = details.link;

    let created = state.songs.create(&song).await?;
    info!(id = created.id, group = %created.group, title = %created.title, "Created song");

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /songs/:id
pub async fn get_song(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Song>> {
    let id = song_id(id)?;
    let song = state.songs.get_by_id(id).await?;
    Ok(Json(song))
}

/// PUT /songs/:id
///
/// Partial update: only fields present in the body are written. Responds
/// with the fields that were applied.
pub async fn update_song(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<SongPatch>, JsonRejection>,
) -> ApiResult<Json<SongPatch>> {
    let id = song_id(id)?;
    let Json(patch) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    patch.validate()?;

    state.songs.update_by_id(id, &patch).await?;
    info!(id, "Updated song");

    Ok(Json(patch))
}

/// DELETE /songs/:id
pub async fn delete_song(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let id = song_id(id)?;

    state.songs.get_by_id(id).await?;
    state.songs.delete_by_id(id).await?;
    info!(id, "Deleted song");

    Ok(StatusCode::NO_CONTENT)
}

fn song_id(id: Result<Path<i64>, PathRejection>) -> ApiResult<i64> {
    id.map(|Path(id)| id)
        .map_err(|e| ApiError::BadRequest(format!("invalid song id: {}", e.body_text())))
}

/// Build song routes
pub fn song_routes() -> Router<AppState> {
    Router::new()
        .route("/songs", get(list_songs).post(create_song))
        .route(
            "/songs/:id",
            get(get_song).put(update_song).delete(delete_song),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_list_query_first_value_wins() {
        let q = ListQuery::from_pairs(pairs(&[
            ("limit", "2"),
            ("limit", "3"),
            ("group", "Queen"),
        ]));
        assert_eq!(q.limit.as_deref(), Some("2"));
        assert_eq!(q.group.as_deref(), Some("Queen"));
        assert!(q.offset.is_none());
    }

    #[test]
    fn test_list_query_ignores_unknown_keys() {
        let q = ListQuery::from_pairs(pairs(&[("sort", "desc"), ("title", "Uprising")]));
        assert_eq!(
            q,
            ListQuery {
                title: Some("Uprising".to_string()),
                ..Default::default()
            }
        );
    }
}
