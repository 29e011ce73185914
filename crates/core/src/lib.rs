#![warn(clippy::all, missing_docs)]

//! Storage engine for the deck builder.
//!
//! Games own collections, collections own decks. Each entity is a JSON
//! descriptor on disk with an optional sidecar image, laid out as nested
//! directories under a configured root. This crate hosts the models, the
//! path layout, the repositories that enforce parent/child consistency, and
//! the configuration used to wire them up.

pub mod config;
pub mod entity;
pub mod error;
pub mod fs;
pub mod identity;
pub mod images;
pub mod models;
pub mod paths;
pub mod repository;
pub mod views;

pub use self::config::AppConfig;
pub use entity::{Ancestry, Entity};
pub use error::{EntityKind, StatusHint, StorageError, StorageResult};
pub use identity::name_to_id;
pub use images::{validate_image, HttpFetcher, ImageFetcher, ImageFormat, StoredImage};
pub use models::{
    CollectionInfo, CreateCollection, CreateDeck, CreateGame, DeckInfo, GameInfo,
    UpdateCollection, UpdateDeck, UpdateGame, UpdateInfo,
};
pub use paths::{InCollection, InGame, Layout};
pub use repository::{Repository, SortOrder, Store};
