//! Shared test doubles for mlib-api integration tests
//!
//! `InMemorySongRepository` and `StubEnricher` stand in for PostgreSQL and
//! the metadata service so the router can be exercised without either.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use chrono::{TimeZone, Utc};
use mlib_api::pagination::Page;
use mlib_api::repository::{SongFilter, SongRepository};
use mlib_api::services::{EnrichmentError, SongDetails, SongEnricher};
use mlib_api::{build_router, AppState};
use mlib_common::db::{NewSong, Song, SongPatch};
use mlib_common::{Error, Result};
use serde_json::Value;
use tokio::sync::Mutex;

#[derive(Default)]
struct Store {
    songs: Vec<Song>,
    next_id: i64,
}

/// Song repository backed by a Vec, ordered by id like the SQL store
#[derive(Default)]
pub struct InMemorySongRepository {
    store: Mutex<Store>,
}

impl InMemorySongRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.store.lock().await.songs.len()
    }
}

#[async_trait]
impl SongRepository for InMemorySongRepository {
    async fn list(&self, filter: &SongFilter, page: Page) -> Result<Vec<Song>> {
        let store = self.store.lock().await;
        Ok(store
            .songs
            .iter()
            .filter(|s| filter.matches(s))
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .cloned()
            .collect())
    }

    async fn create(&self, song: &NewSong) -> Result<Song> {
        let mut store = self.store.lock().await;
        store.next_id += 1;
        let now = Utc::now();
        let created = Song {
            id: store.next_id,
            group: song.group.clone(),
            title: song.title.clone(),
            release_date: song.release_date,
            text: song.text.clone(),
            link: song.link.clone(),
            created_at: now,
            updated_at: now,
        };
        store.songs.push(created.clone());
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Song> {
        let store = self.store.lock().await;
        store
            .songs
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("song {}", id)))
    }

    async fn update_by_id(&self, id: i64, patch: &SongPatch) -> Result<Song> {
        let mut store = self.store.lock().await;
        let song = store
            .songs
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| Error::NotFound(format!("song {}", id)))?;

        if let Some(group) = &patch.group {
            song.group = group.clone();
        }
        if let Some(title) = &patch.title {
            song.title = title.clone();
        }
        if patch.release_date.is_some() {
            song.release_date = patch.release_date;
        }
        if let Some(text) = &patch.text {
            song.text = text.clone();
        }
        if let Some(link) = &patch.link {
            song.link = link.clone();
        }
        song.updated_at = Utc::now();
        Ok(song.clone())
    }

    async fn delete_by_id(&self, id: i64) -> Result<()> {
        let mut store = self.store.lock().await;
        let before = store.songs.len();
        store.songs.retain(|s| s.id != id);
        if store.songs.len() == before {
            return Err(Error::NotFound(format!("song {}", id)));
        }
        Ok(())
    }
}

/// Repository whose every call fails like a lost database connection
pub struct FailingRepository;

fn storage_down() -> Error {
    Error::Database(sqlx::Error::PoolClosed)
}

#[async_trait]
impl SongRepository for FailingRepository {
    async fn list(&self, _filter: &SongFilter, _page: Page) -> Result<Vec<Song>> {
        Err(storage_down())
    }

    async fn create(&self, _song: &NewSong) -> Result<Song> {
        Err(storage_down())
    }

    async fn get_by_id(&self, _id: i64) -> Result<Song> {
        Err(storage_down())
    }

    async fn update_by_id(&self, _id: i64, _patch: &SongPatch) -> Result<Song> {
        Err(storage_down())
    }

    async fn delete_by_id(&self, _id: i64) -> Result<()> {
        Err(storage_down())
    }
}

/// Metadata source returning fixed details, or a 503 when `details` is None
pub struct StubEnricher {
    details: Option<SongDetails>,
    calls: AtomicUsize,
}

impl StubEnricher {
    pub fn returning(details: SongDetails) -> Self {
        Self {
            details: Some(details),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            details: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SongEnricher for StubEnricher {
    async fn fetch_details(
        &self,
        _group: &str,
        _title: &str,
    ) -> std::result::Result<SongDetails, EnrichmentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.details {
            Some(details) => Ok(details.clone()),
            None => Err(EnrichmentError::Status(503)),
        }
    }
}

/// Details the stub hands back for every lookup
pub fn sample_details() -> SongDetails {
    SongDetails {
        release_date: Some(Utc.with_ymd_and_hms(1975, 10, 31, 0, 0, 0).unwrap()),
        text: "Is this the real life? Is this just fantasy?".to_string(),
        link: "https://example.com/bohemian-rhapsody".to_string(),
    }
}

/// Router wired to the given doubles
pub fn test_app(
    songs: Arc<InMemorySongRepository>,
    enricher: Arc<StubEnricher>,
) -> Router {
    build_router(AppState::new(songs, enricher))
}

/// Router whose storage is unavailable
pub fn failing_storage_app() -> Router {
    build_router(AppState::new(
        Arc::new(FailingRepository),
        Arc::new(StubEnricher::returning(sample_details())),
    ))
}

/// Router with an empty store and a working enricher
pub fn default_app() -> Router {
    test_app(
        Arc::new(InMemorySongRepository::new()),
        Arc::new(StubEnricher::returning(sample_details())),
    )
}

/// Request with no body
pub fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Request carrying a JSON body
pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Read a response body as JSON
pub async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}
