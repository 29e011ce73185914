//! Pure path computation for descriptors and sidecar images.

use std::path::{Path, PathBuf};

/// Default descriptor filename for games and collections.
pub const DEFAULT_INFO_FILENAME: &str = "info.json";
/// Default sidecar image filename for games and collections.
pub const DEFAULT_IMAGE_FILENAME: &str = "image.bin";
/// Default extension of deck sidecar images.
pub const DEFAULT_IMAGE_EXTENSION: &str = "bin";

/// On-disk arrangement of the Game -> Collection -> Deck tree.
///
/// ```text
/// <root>/<game>/info.json
/// <root>/<game>/image.bin
/// <root>/<game>/<collection>/info.json
/// <root>/<game>/<collection>/image.bin
/// <root>/<game>/<collection>/<deck>.json
/// <root>/<game>/<collection>/<deck>.bin
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
    info_filename: String,
    image_filename: String,
    image_extension: String,
}

impl Layout {
    /// Layout rooted at `root` with the default filenames.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            info_filename: DEFAULT_INFO_FILENAME.to_string(),
            image_filename: DEFAULT_IMAGE_FILENAME.to_string(),
            image_extension: DEFAULT_IMAGE_EXTENSION.to_string(),
        }
    }

    /// Override the descriptor and image filenames.
    pub fn with_filenames(
        mut self,
        info_filename: impl Into<String>,
        image_filename: impl Into<String>,
        image_extension: impl Into<String>,
    ) -> Self {
        self.info_filename = info_filename.into();
        self.image_filename = image_filename.into();
        self.image_extension = image_extension.into();
        self
    }

    /// Directory holding every game.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Descriptor filename used inside game and collection directories.
    pub fn info_filename(&self) -> &str {
        &self.info_filename
    }

    /// Directory of a game; moved as a unit on rename.
    pub fn game_dir(&self, game_id: &str) -> PathBuf {
        self.root.join(game_id)
    }

    /// Game descriptor.
    pub fn game_info(&self, game_id: &str) -> PathBuf {
        self.game_dir(game_id).join(&self.info_filename)
    }

    /// Game sidecar image.
    pub fn game_image(&self, game_id: &str) -> PathBuf {
        self.game_dir(game_id).join(&self.image_filename)
    }

    /// Directory of a collection; holds its deck descriptors.
    pub fn collection_dir(&self, game_id: &str, collection_id: &str) -> PathBuf {
        self.game_dir(game_id).join(collection_id)
    }

    /// Collection descriptor.
    pub fn collection_info(&self, game_id: &str, collection_id: &str) -> PathBuf {
        self.collection_dir(game_id, collection_id)
            .join(&self.info_filename)
    }

    /// Collection sidecar image.
    pub fn collection_image(&self, game_id: &str, collection_id: &str) -> PathBuf {
        self.collection_dir(game_id, collection_id)
            .join(&self.image_filename)
    }

    /// Deck descriptor, a sibling of the collection descriptor.
    pub fn deck_info(&self, game_id: &str, collection_id: &str, deck_id: &str) -> PathBuf {
        self.collection_dir(game_id, collection_id)
            .join(format!("{deck_id}.json"))
    }

    /// Deck sidecar image, next to the deck descriptor.
    pub fn deck_image(&self, game_id: &str, collection_id: &str, deck_id: &str) -> PathBuf {
        self.collection_dir(game_id, collection_id)
            .join(format!("{deck_id}.{}", self.image_extension))
    }

    /// Whether the files of deck `deck_id` would coincide with the
    /// collection's own descriptor or image.
    pub fn deck_shadows_collection(&self, deck_id: &str) -> bool {
        format!("{deck_id}.json") == self.info_filename
            || format!("{deck_id}.{}", self.image_extension) == self.image_filename
    }
}

/// Ancestor chain of a collection: the owning game.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InGame {
    /// Owning game id.
    pub game_id: String,
}

impl InGame {
    /// Chain for collections of `game_id`.
    pub fn new(game_id: impl Into<String>) -> Self {
        Self {
            game_id: game_id.into(),
        }
    }
}

/// Ancestor chain of a deck: game then collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InCollection {
    /// Owning game id.
    pub game_id: String,
    /// Owning collection id.
    pub collection_id: String,
}

impl InCollection {
    /// Chain for decks of `collection_id` inside `game_id`.
    pub fn new(game_id: impl Into<String>, collection_id: impl Into<String>) -> Self {
        Self {
            game_id: game_id.into(),
            collection_id: collection_id.into(),
        }
    }

    /// The collection's own ancestor chain.
    pub fn game(&self) -> InGame {
        InGame::new(self.game_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nests_entities_under_root() {
        let layout = Layout::new("/data");
        assert_eq!(layout.game_info("g"), PathBuf::from("/data/g/info.json"));
        assert_eq!(layout.game_image("g"), PathBuf::from("/data/g/image.bin"));
        assert_eq!(
            layout.collection_info("g", "c"),
            PathBuf::from("/data/g/c/info.json")
        );
        assert_eq!(
            layout.deck_info("g", "c", "d"),
            PathBuf::from("/data/g/c/d.json")
        );
        assert_eq!(
            layout.deck_image("g", "c", "d"),
            PathBuf::from("/data/g/c/d.bin")
        );
    }

    #[test]
    fn filenames_are_configurable() {
        let layout = Layout::new("/data").with_filenames("meta.json", "cover.img", "img");
        assert_eq!(layout.info_filename(), "meta.json");
        assert_eq!(
            layout.collection_image("g", "c"),
            PathBuf::from("/data/g/c/cover.img")
        );
        assert_eq!(
            layout.deck_image("g", "c", "d"),
            PathBuf::from("/data/g/c/d.img")
        );
    }

    #[test]
    fn decks_cannot_take_collection_filenames() {
        let layout = Layout::new("/data");
        assert!(layout.deck_shadows_collection("info"));
        assert!(layout.deck_shadows_collection("image"));
        assert!(!layout.deck_shadows_collection("heroes"));

        let layout = layout.with_filenames("meta.json", "cover.img", "img");
        assert!(layout.deck_shadows_collection("meta"));
        assert!(layout.deck_shadows_collection("cover"));
        assert!(!layout.deck_shadows_collection("info"));
        assert!(!layout.deck_shadows_collection("image"));
    }
}
