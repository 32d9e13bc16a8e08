//! # Repo Agent
//!
//! A retrieval-augmented chat assistant for content repositories.
//!
//! Content is split into sentence-aligned chunks, deduplicated by SHA-256
//! digest, and stored per repository. Each chat turn retrieves the best
//! matching chunks by keyword overlap and hands them, together with the
//! thread history, to the provider configured for the repository.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌──────────────┐   ┌──────────┐
//! │  Content  │──▶│ Chunk+Digest │──▶│  SQLite  │
//! │ (CLI/HTTP)│   │   (core)     │   │  chunks  │
//! └───────────┘   └──────────────┘   └────┬─────┘
//!                                         │
//!                ┌────────────────────────┤
//!                ▼                        ▼
//!          ┌───────────┐  gate   ┌──────────────┐
//!          │ Retriever │◀────────│ Chat (thread)│──▶ Provider
//!          └───────────┘         └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! repo-agent init
//! repo-agent repo add --owner acme --name handbook
//! repo-agent index <repo-id> ./handbook.md
//! repo-agent chat <repo-id> "What does the handbook say about onboarding?"
//! repo-agent serve
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`sqlite_store`] | SQLite implementation of the store trait |
//! | [`validate`] | Request validation |
//! | [`ingest`] | Content indexing |
//! | [`chat`] | Chat orchestration |
//! | [`repos`] | Repository administration and search preview |
//! | [`server`] | HTTP server |
//!
//! Domain logic (chunking, retrieval, permissions, providers) lives in
//! the `repo_agent_core` crate.

pub mod chat;
pub mod config;
pub mod db;
pub mod ingest;
pub mod migrate;
pub mod repos;
pub mod server;
pub mod sqlite_store;
pub mod validate;
