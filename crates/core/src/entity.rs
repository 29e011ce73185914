//! Per-kind capabilities consumed by the generic [`Repository`](crate::Repository).

use std::{fmt, path::PathBuf};

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    error::{EntityKind, StorageResult},
    fs::ListEntry,
    models::{CollectionInfo, DeckInfo, GameInfo, UpdateDeck, UpdateInfo},
    paths::{InCollection, InGame, Layout},
    repository::Store,
};

/// Ancestor chain that must exist before an entity can be touched.
pub trait Ancestry: Clone + fmt::Debug {
    /// Fail with the missing ancestor's `NotExists` if any link is absent.
    fn resolve(&self, store: &Store) -> StorageResult<()>;
}

impl Ancestry for () {
    fn resolve(&self, _store: &Store) -> StorageResult<()> {
        Ok(())
    }
}

impl Ancestry for InGame {
    fn resolve(&self, store: &Store) -> StorageResult<()> {
        store.games().get_by_id(&(), &self.game_id).map(drop)
    }
}

impl Ancestry for InCollection {
    fn resolve(&self, store: &Store) -> StorageResult<()> {
        store
            .collections()
            .get_by_id(&self.game(), &self.collection_id)
            .map(drop)
    }
}

/// An entity kind stored as a JSON descriptor with an optional sidecar image.
pub trait Entity: Serialize + DeserializeOwned + Clone + fmt::Debug {
    /// Level in the hierarchy, used for error reporting.
    const KIND: EntityKind;

    /// Ancestor chain locating the entity's siblings.
    type Parent: Ancestry;
    /// Replacement fields accepted by `update`.
    type Update;

    /// Build a fresh entity (new id, `created_at` = now) from update fields.
    fn from_update(update: Self::Update) -> Self;

    /// Identifier derived from the display name; also the on-disk name.
    fn id(&self) -> &str;
    /// Name the id was derived from.
    fn display_name(&self) -> &str;
    /// URL the sidecar image is fetched from; empty for none.
    fn image_source(&self) -> &str;
    /// Creation time, kept across updates and renames.
    fn created_at(&self) -> DateTime<Utc>;
    /// Time of the last content-changing update, if any.
    fn updated_at(&self) -> Option<DateTime<Utc>>;
    /// Overwrite both timestamps.
    fn set_timestamps(&mut self, created_at: DateTime<Utc>, updated_at: Option<DateTime<Utc>>);
    /// Structural equality on id and user fields.
    fn same_content(&self, other: &Self) -> bool;

    /// Descriptor file of `id`.
    fn descriptor_path(layout: &Layout, parent: &Self::Parent, id: &str) -> PathBuf;
    /// Sidecar image file of `id`.
    fn image_path(layout: &Layout, parent: &Self::Parent, id: &str) -> PathBuf;
    /// Path moved on rename and removed on delete.
    fn storage_unit(layout: &Layout, parent: &Self::Parent, id: &str) -> PathBuf;
    /// Directory enumerated by `get_all`.
    fn listing_dir(layout: &Layout, parent: &Self::Parent) -> PathBuf;
    /// Id of the sibling stored under `entry`, if the entry is one.
    fn id_from_entry(layout: &Layout, entry: &ListEntry) -> Option<String>;

    /// Ids whose paths would overlap another entity's files.
    fn is_reserved_id(_layout: &Layout, _id: &str) -> bool {
        false
    }
}

impl Entity for GameInfo {
    const KIND: EntityKind = EntityKind::Game;

    type Parent = ();
    type Update = UpdateInfo;

    fn from_update(update: UpdateInfo) -> Self {
        update.into()
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn image_source(&self) -> &str {
        &self.image
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    fn set_timestamps(&mut self, created_at: DateTime<Utc>, updated_at: Option<DateTime<Utc>>) {
        self.created_at = created_at;
        self.updated_at = updated_at;
    }

    fn same_content(&self, other: &Self) -> bool {
        GameInfo::same_content(self, other)
    }

    fn descriptor_path(layout: &Layout, _parent: &(), id: &str) -> PathBuf {
        layout.game_info(id)
    }

    fn image_path(layout: &Layout, _parent: &(), id: &str) -> PathBuf {
        layout.game_image(id)
    }

    fn storage_unit(layout: &Layout, _parent: &(), id: &str) -> PathBuf {
        layout.game_dir(id)
    }

    fn listing_dir(layout: &Layout, _parent: &()) -> PathBuf {
        layout.root().to_path_buf()
    }

    fn id_from_entry(_layout: &Layout, entry: &ListEntry) -> Option<String> {
        entry.is_dir.then(|| entry.name.clone())
    }
}

impl Entity for CollectionInfo {
    const KIND: EntityKind = EntityKind::Collection;

    type Parent = InGame;
    type Update = UpdateInfo;

    fn from_update(update: UpdateInfo) -> Self {
        update.into()
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn image_source(&self) -> &str {
        &self.image
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    fn set_timestamps(&mut self, created_at: DateTime<Utc>, updated_at: Option<DateTime<Utc>>) {
        self.created_at = created_at;
        self.updated_at = updated_at;
    }

    fn same_content(&self, other: &Self) -> bool {
        CollectionInfo::same_content(self, other)
    }

    fn descriptor_path(layout: &Layout, parent: &InGame, id: &str) -> PathBuf {
        layout.collection_info(&parent.game_id, id)
    }

    fn image_path(layout: &Layout, parent: &InGame, id: &str) -> PathBuf {
        layout.collection_image(&parent.game_id, id)
    }

    fn storage_unit(layout: &Layout, parent: &InGame, id: &str) -> PathBuf {
        layout.collection_dir(&parent.game_id, id)
    }

    fn listing_dir(layout: &Layout, parent: &InGame) -> PathBuf {
        layout.game_dir(&parent.game_id)
    }

    fn id_from_entry(_layout: &Layout, entry: &ListEntry) -> Option<String> {
        entry.is_dir.then(|| entry.name.clone())
    }
}

impl Entity for DeckInfo {
    const KIND: EntityKind = EntityKind::Deck;

    type Parent = InCollection;
    type Update = UpdateDeck;

    fn from_update(update: UpdateDeck) -> Self {
        update.into()
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.deck_type
    }

    fn image_source(&self) -> &str {
        &self.backside_image
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    fn set_timestamps(&mut self, created_at: DateTime<Utc>, updated_at: Option<DateTime<Utc>>) {
        self.created_at = created_at;
        self.updated_at = updated_at;
    }

    fn same_content(&self, other: &Self) -> bool {
        DeckInfo::same_content(self, other)
    }

    fn descriptor_path(layout: &Layout, parent: &InCollection, id: &str) -> PathBuf {
        layout.deck_info(&parent.game_id, &parent.collection_id, id)
    }

    fn image_path(layout: &Layout, parent: &InCollection, id: &str) -> PathBuf {
        layout.deck_image(&parent.game_id, &parent.collection_id, id)
    }

    // Decks are single files; their image sits next to them.
    fn storage_unit(layout: &Layout, parent: &InCollection, id: &str) -> PathBuf {
        Self::descriptor_path(layout, parent, id)
    }

    fn listing_dir(layout: &Layout, parent: &InCollection) -> PathBuf {
        layout.collection_dir(&parent.game_id, &parent.collection_id)
    }

    fn id_from_entry(layout: &Layout, entry: &ListEntry) -> Option<String> {
        if entry.is_dir || entry.extension() != Some("json") {
            return None;
        }
        let id = entry.stem();
        (!Self::is_reserved_id(layout, id)).then(|| id.to_string())
    }

    fn is_reserved_id(layout: &Layout, id: &str) -> bool {
        layout.deck_shadows_collection(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, is_dir: bool) -> ListEntry {
        ListEntry {
            name: name.to_string(),
            is_dir,
        }
    }

    #[test]
    fn deck_listing_skips_collection_files() {
        let layout = Layout::new("/data");
        assert_eq!(
            DeckInfo::id_from_entry(&layout, &entry("heroes.json", false)),
            Some("heroes".to_string())
        );
        assert_eq!(DeckInfo::id_from_entry(&layout, &entry("info.json", false)), None);
        assert_eq!(DeckInfo::id_from_entry(&layout, &entry("heroes.bin", false)), None);
        assert_eq!(DeckInfo::id_from_entry(&layout, &entry("image.bin", false)), None);
        assert_eq!(DeckInfo::id_from_entry(&layout, &entry("sub.json", true)), None);
        assert_eq!(DeckInfo::id_from_entry(&layout, &entry("image.json", false)), None);
    }

    #[test]
    fn directory_kinds_list_directories_only() {
        let layout = Layout::new("/data");
        assert_eq!(
            GameInfo::id_from_entry(&layout, &entry("my-game", true)),
            Some("my-game".to_string())
        );
        assert_eq!(GameInfo::id_from_entry(&layout, &entry("notes.txt", false)), None);
        assert_eq!(
            CollectionInfo::id_from_entry(&layout, &entry("info.json", false)),
            None
        );
    }

    #[test]
    fn only_deck_images_live_outside_the_storage_unit() {
        let layout = Layout::new("/data");
        let game_unit = GameInfo::storage_unit(&layout, &(), "g");
        assert!(GameInfo::image_path(&layout, &(), "g").starts_with(&game_unit));

        let chain = InCollection::new("g", "c");
        let deck_unit = DeckInfo::storage_unit(&layout, &chain, "d");
        assert!(!DeckInfo::image_path(&layout, &chain, "d").starts_with(&deck_unit));
    }
}
