//! Views spanning several repositories.

use std::collections::HashSet;

use crate::{
    error::StorageResult,
    models::DeckInfo,
    paths::{InCollection, InGame},
    repository::Repository,
};

impl Repository<DeckInfo> {
    /// Distinct deck variants across every collection of a game.
    ///
    /// Decks are unique by `(type, backside_image)`; the first occurrence in
    /// collection order wins. Unlike [`get_all`](Self::get_all), any failure to
    /// resolve the game or one of its collections aborts the whole view.
    pub fn get_all_decks_in_game(&self, game_id: &str) -> StorageResult<Vec<DeckInfo>> {
        let collections = self.store().collections().get_all(&InGame::new(game_id))?;

        let mut seen = HashSet::new();
        let mut decks = Vec::new();
        for collection in collections {
            let chain = InCollection::new(game_id, collection.id);
            for deck in self.get_all(&chain)? {
                if seen.insert((deck.deck_type.clone(), deck.backside_image.clone())) {
                    decks.push(deck);
                }
            }
        }
        Ok(decks)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::Result;
    use tempfile::tempdir;

    use super::*;
    use crate::{
        error::EntityKind,
        images::testing::StubFetcher,
        models::{CollectionInfo, GameInfo},
        paths::Layout,
        repository::Store,
    };

    fn seeded() -> Result<(tempfile::TempDir, Store)> {
        let dir = tempdir()?;
        let store = Store::new(Layout::new(dir.path()), Arc::new(StubFetcher::default()));
        store.games().create(&(), GameInfo::new("My Game", "", ""))?;
        for name in ["Box 1", "Box 2"] {
            store
                .collections()
                .create(&InGame::new("my-game"), CollectionInfo::new(name, "", ""))?;
        }
        Ok((dir, store))
    }

    #[test]
    fn duplicates_across_collections_collapse() -> Result<()> {
        let (_dir, store) = seeded()?;
        let decks = store.decks();
        let box1 = InCollection::new("my-game", "box-1");
        let box2 = InCollection::new("my-game", "box-2");
        decks.create(&box1, DeckInfo::new("Heroes", ""))?;
        decks.create(&box1, DeckInfo::new("Villains", ""))?;
        decks.create(&box2, DeckInfo::new("Heroes", ""))?;

        let all = decks.get_all_decks_in_game("my-game")?;
        let types: Vec<_> = all.iter().map(|deck| deck.deck_type.as_str()).collect();
        assert_eq!(types, vec!["Heroes", "Villains"]);
        Ok(())
    }

    #[test]
    fn same_type_with_different_back_is_distinct() -> Result<()> {
        let (dir, store) = seeded()?;
        let decks = store.decks();
        decks.create(&InCollection::new("my-game", "box-1"), DeckInfo::new("Heroes", ""))?;
        // Written directly: an image URL would trigger a fetch.
        let other = DeckInfo::new("Heroes", "https://img.example/alt.png");
        std::fs::write(
            dir.path().join("my-game/box-2/heroes.json"),
            serde_json::to_vec(&other)?,
        )?;

        assert_eq!(decks.get_all_decks_in_game("my-game")?.len(), 2);
        Ok(())
    }

    #[test]
    fn missing_game_aborts_the_view() -> Result<()> {
        let (_dir, store) = seeded()?;
        let err = store.decks().get_all_decks_in_game("nope").unwrap_err();
        assert!(err.is_not_exists(EntityKind::Game));
        Ok(())
    }

    #[test]
    fn broken_collection_aborts_the_view() -> Result<()> {
        let (dir, store) = seeded()?;
        let decks = store.decks();
        decks.create(&InCollection::new("my-game", "box-1"), DeckInfo::new("Heroes", ""))?;
        // Readable descriptor, but its id points at a collection that is not there.
        let mut moved = CollectionInfo::new("Box 2", "", "");
        moved.id = "box-9".to_string();
        std::fs::write(
            dir.path().join("my-game/box-2/info.json"),
            serde_json::to_vec(&moved)?,
        )?;

        let err = decks.get_all_decks_in_game("my-game").unwrap_err();
        assert!(err.is_not_exists(EntityKind::Collection));
        Ok(())
    }

    #[test]
    fn empty_game_has_no_decks() -> Result<()> {
        let (_dir, store) = seeded()?;
        assert!(store.decks().get_all_decks_in_game("my-game")?.is_empty());
        Ok(())
    }
}
