//! Outbound service clients

pub mod enrichment_client;

pub use enrichment_client::{EnrichmentError, HttpEnrichmentClient, SongDetails, SongEnricher};
