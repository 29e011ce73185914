//! Filesystem-backed repositories for games, collections and decks.
//!
//! One [`Repository`] implementation serves all three kinds through the
//! [`Entity`] capabilities. Every operation resolves the ancestor chain
//! first, so a deck lookup inside a missing collection reports the
//! collection as missing rather than the deck.
//!
//! Listing is best-effort: a descriptor that fails to read is logged and
//! skipped. Updates are not transactional; a failure part way through a
//! rename or image replacement leaves the state reached so far on disk.

use std::{cmp::Reverse, marker::PhantomData, path::PathBuf, str::FromStr, sync::Arc};

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::{
    entity::{Ancestry, Entity},
    error::{StorageError, StorageResult},
    fs,
    images::{validate_image, ImageFetcher, StoredImage},
    models::{CollectionInfo, DeckInfo, GameInfo},
    paths::Layout,
};

/// Shared context for all repositories: the on-disk layout and the image source.
#[derive(Clone)]
pub struct Store {
    layout: Arc<Layout>,
    fetcher: Arc<dyn ImageFetcher>,
}

impl Store {
    /// Build a store over `layout`, fetching images through `fetcher`.
    pub fn new(layout: Layout, fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self {
            layout: Arc::new(layout),
            fetcher,
        }
    }

    /// On-disk layout in use.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Repository of games.
    pub fn games(&self) -> Repository<GameInfo> {
        Repository::new(self.clone())
    }

    /// Repository of collections.
    pub fn collections(&self) -> Repository<CollectionInfo> {
        Repository::new(self.clone())
    }

    /// Repository of decks.
    pub fn decks(&self) -> Repository<DeckInfo> {
        Repository::new(self.clone())
    }
}

/// Order of entities returned by [`Repository::list`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// By id, the order of `get_all`.
    #[default]
    Id,
    /// By display name, ascending.
    Name,
    /// By display name, descending.
    NameDesc,
    /// Oldest first.
    Created,
    /// Newest first.
    CreatedDesc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "id" => Ok(SortOrder::Id),
            "name" => Ok(SortOrder::Name),
            "name-desc" | "name_desc" => Ok(SortOrder::NameDesc),
            "created" => Ok(SortOrder::Created),
            "created-desc" | "created_desc" => Ok(SortOrder::CreatedDesc),
            other => Err(format!("unknown sort order {other:?}")),
        }
    }
}

/// Create/read/update/delete access to one entity kind.
pub struct Repository<E: Entity> {
    store: Store,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self::new(self.store.clone())
    }
}

impl<E: Entity> Repository<E> {
    /// Repository backed by `store`.
    pub fn new(store: Store) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    pub(crate) fn store(&self) -> &Store {
        &self.store
    }

    fn descriptor_path(&self, parent: &E::Parent, id: &str) -> PathBuf {
        E::descriptor_path(&self.store.layout, parent, id)
    }

    fn image_path(&self, parent: &E::Parent, id: &str) -> PathBuf {
        E::image_path(&self.store.layout, parent, id)
    }

    fn storage_unit(&self, parent: &E::Parent, id: &str) -> PathBuf {
        E::storage_unit(&self.store.layout, parent, id)
    }

    fn is_storable(&self, id: &str) -> bool {
        is_storable_id(id) && !E::is_reserved_id(&self.store.layout, id)
    }

    // Leftovers without a descriptor still block a rename onto `id`.
    fn is_occupied(&self, parent: &E::Parent, id: &str) -> StorageResult<bool> {
        Ok(fs::exists(&self.descriptor_path(parent, id))?
            || fs::exists(&self.storage_unit(parent, id))?
            || fs::exists(&self.image_path(parent, id))?)
    }

    /// Store a new entity and, if it names an image source, fetch its image.
    pub fn create(&self, parent: &E::Parent, entity: E) -> StorageResult<E> {
        if !self.is_storable(entity.id()) {
            return Err(StorageError::BadName(entity.display_name().to_string()));
        }
        parent.resolve(&self.store)?;

        let path = self.descriptor_path(parent, entity.id());
        if fs::exists(&path)? {
            return Err(StorageError::AlreadyExists(E::KIND));
        }

        fs::write_json(&path, &entity)?;
        info!("created {} {}", E::KIND, entity.id());

        if !entity.image_source().is_empty() {
            self.create_image(parent, entity.id(), entity.image_source())?;
        }

        Ok(entity)
    }

    /// Load one entity.
    pub fn get_by_id(&self, parent: &E::Parent, id: &str) -> StorageResult<E> {
        parent.resolve(&self.store)?;
        self.read(parent, id)
    }

    fn read(&self, parent: &E::Parent, id: &str) -> StorageResult<E> {
        if !self.is_storable(id) {
            return Err(StorageError::NotExists(E::KIND));
        }
        let path = self.descriptor_path(parent, id);
        debug!("reading {} descriptor {}", E::KIND, path.display());
        if !fs::exists(&path)? {
            return Err(StorageError::NotExists(E::KIND));
        }
        fs::read_json(&path)
    }

    /// Every readable sibling under `parent`, ordered by id.
    ///
    /// Entries whose descriptor is missing or corrupt are logged and skipped.
    pub fn get_all(&self, parent: &E::Parent) -> StorageResult<Vec<E>> {
        parent.resolve(&self.store)?;

        let dir = E::listing_dir(&self.store.layout, parent);
        let mut items = Vec::new();
        for entry in fs::list(&dir)? {
            let Some(id) = E::id_from_entry(&self.store.layout, &entry) else {
                continue;
            };
            match self.read(parent, &id) {
                Ok(item) => items.push(item),
                Err(err) => warn!("skipping {} {:?} in {}: {err}", E::KIND, id, dir.display()),
            }
        }

        items.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(items)
    }

    /// Like [`get_all`](Self::get_all) with a caller-chosen order.
    pub fn list(&self, parent: &E::Parent, order: SortOrder) -> StorageResult<Vec<E>> {
        let mut items = self.get_all(parent)?;
        match order {
            SortOrder::Id => {}
            SortOrder::Name => items.sort_by_key(|item| item.display_name().to_lowercase()),
            SortOrder::NameDesc => {
                items.sort_by_key(|item| Reverse(item.display_name().to_lowercase()))
            }
            SortOrder::Created => items.sort_by_key(|item| item.created_at()),
            SortOrder::CreatedDesc => items.sort_by_key(|item| Reverse(item.created_at())),
        }
        Ok(items)
    }

    /// Replace an entity's fields, renaming it when its derived id changes.
    ///
    /// `created_at` is preserved. `updated_at` moves only when the content
    /// differs. A changed image source drops the old image and fetches the
    /// new one.
    pub fn update(&self, parent: &E::Parent, id: &str, update: E::Update) -> StorageResult<E> {
        let old = self.get_by_id(parent, id)?;

        let mut entity = E::from_update(update);
        entity.set_timestamps(old.created_at(), old.updated_at());
        if !self.is_storable(entity.id()) {
            return Err(StorageError::BadName(entity.display_name().to_string()));
        }

        if entity.id() != old.id() {
            if self.is_occupied(parent, entity.id())? {
                return Err(StorageError::AlreadyExists(E::KIND));
            }
            self.rename(parent, old.id(), entity.id())?;
        }

        if !old.same_content(&entity) {
            entity.set_timestamps(old.created_at(), Some(Utc::now()));
            fs::write_json(&self.descriptor_path(parent, entity.id()), &entity)?;
            info!("updated {} {}", E::KIND, entity.id());
        }

        if entity.image_source() != old.image_source() {
            let image = self.image_path(parent, entity.id());
            if fs::exists(&image)? {
                fs::remove(&image)?;
            }
            if !entity.image_source().is_empty() {
                self.create_image(parent, entity.id(), entity.image_source())?;
            }
        }

        Ok(entity)
    }

    // Two steps: the image (only when it lives outside the storage unit), then
    // the storage unit itself. A failure of the second step is reported, not
    // undone.
    fn rename(&self, parent: &E::Parent, old_id: &str, new_id: &str) -> StorageResult<()> {
        let unit_from = self.storage_unit(parent, old_id);
        let unit_to = self.storage_unit(parent, new_id);
        let image_from = self.image_path(parent, old_id);

        let image_moved = !image_from.starts_with(&unit_from) && fs::exists(&image_from)?;
        if image_moved {
            fs::move_path(&image_from, &self.image_path(parent, new_id))?;
        }

        if let Err(err) = fs::move_path(&unit_from, &unit_to) {
            if image_moved {
                error!(
                    "{} {old_id} left inconsistent: image moved to {new_id} but descriptor was not: {err}",
                    E::KIND
                );
            }
            return Err(err);
        }

        info!("renamed {} {old_id} -> {new_id}", E::KIND);
        Ok(())
    }

    /// Remove an entity together with its image.
    pub fn delete_by_id(&self, parent: &E::Parent, id: &str) -> StorageResult<()> {
        self.get_by_id(parent, id)?;

        fs::remove(&self.storage_unit(parent, id))?;
        let image = self.image_path(parent, id);
        if fs::exists(&image)? {
            fs::remove(&image)?;
        }

        info!("deleted {} {id}", E::KIND);
        Ok(())
    }

    /// Read back and re-validate an entity's stored image.
    pub fn get_image(&self, parent: &E::Parent, id: &str) -> StorageResult<StoredImage> {
        self.get_by_id(parent, id)?;

        let path = self.image_path(parent, id);
        if !fs::exists(&path)? {
            return Err(StorageError::ImageNotExists(E::KIND));
        }
        let bytes = fs::read_bytes(&path)?;
        let format = validate_image(&bytes)?;
        Ok(StoredImage { bytes, format })
    }

    /// Fetch an image from `url`, validate it and store it as the entity's image.
    pub fn create_image(&self, parent: &E::Parent, id: &str, url: &str) -> StorageResult<()> {
        self.get_by_id(parent, id)?;

        let bytes = self.store.fetcher.download(url)?;
        let format = validate_image(&bytes)?;
        fs::write_bytes(&self.image_path(parent, id), &bytes)?;
        info!("stored {format} image for {} {id}", E::KIND);
        Ok(())
    }
}

// Ids become path components, so anything that could escape the parent is refused.
fn is_storable_id(id: &str) -> bool {
    !id.is_empty() && id != "." && id != ".." && !id.contains(['/', '\\'])
}
