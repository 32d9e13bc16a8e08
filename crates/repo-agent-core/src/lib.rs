//! # Repo Agent Core
//!
//! Runtime-free logic for the repository chat assistant: content
//! normalization, sentence chunking, content digests, the permission
//! gate, keyword retrieval, the storage port, and response providers.
//!
//! This crate contains no tokio, sqlx, HTTP, or filesystem I/O. Storage
//! is reached only through the [`store::Store`] trait, so the whole
//! pipeline runs against [`store::memory::InMemoryStore`] in tests.
//!
//! ```text
//! content ─▶ normalize ─▶ chunk ─▶ Store::upsert_chunk
//!
//! query ─▶ permissions ─▶ retrieve ─▶ provider ─▶ (content, citations)
//! ```

pub mod chunk;
pub mod error;
pub mod index;
pub mod models;
pub mod normalize;
pub mod permissions;
pub mod provider;
pub mod retrieve;
pub mod store;
