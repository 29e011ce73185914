//! Shared domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::name_to_id;

/// Top-level game descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameInfo {
    /// Slug derived from `name`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Source URL of the sidecar image; empty when there is none.
    pub image: String,
    /// Set at creation, preserved across updates and renames.
    pub created_at: DateTime<Utc>,
    /// Last content-changing update.
    pub updated_at: Option<DateTime<Utc>>,
}

impl GameInfo {
    /// New game with an id derived from `name`.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            id: name_to_id(&name),
            name,
            description: description.into(),
            image: image.into(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Equality on id and user fields, ignoring timestamps.
    pub fn same_content(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.description == other.description
            && self.image == other.image
    }
}

/// Collection descriptor, owned by one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionInfo {
    /// Slug derived from `name`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Source URL of the sidecar image; empty when there is none.
    pub image: String,
    /// Set at creation, preserved across updates and renames.
    pub created_at: DateTime<Utc>,
    /// Last content-changing update.
    pub updated_at: Option<DateTime<Utc>>,
}

impl CollectionInfo {
    /// New collection with an id derived from `name`.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            id: name_to_id(&name),
            name,
            description: description.into(),
            image: image.into(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Equality on id and user fields, ignoring timestamps.
    pub fn same_content(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.description == other.description
            && self.image == other.image
    }
}

/// Deck descriptor, owned by one collection. Identified by its type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckInfo {
    /// Slug derived from `deck_type`.
    pub id: String,
    /// Category of the deck; doubles as its display name.
    #[serde(rename = "type")]
    pub deck_type: String,
    /// Source URL of the card back image; empty when there is none.
    pub backside_image: String,
    /// Set at creation, preserved across updates and renames.
    pub created_at: DateTime<Utc>,
    /// Last content-changing update.
    pub updated_at: Option<DateTime<Utc>>,
}

impl DeckInfo {
    /// New deck with an id derived from `deck_type`.
    pub fn new(deck_type: impl Into<String>, backside_image: impl Into<String>) -> Self {
        let deck_type = deck_type.into();
        Self {
            id: name_to_id(&deck_type),
            deck_type,
            backside_image: backside_image.into(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Equality on id and user fields, ignoring timestamps.
    pub fn same_content(&self, other: &Self) -> bool {
        self.id == other.id
            && self.deck_type == other.deck_type
            && self.backside_image == other.backside_image
    }
}

/// Replacement fields for a game or collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateInfo {
    /// New display name; may rename the entity.
    pub name: String,
    /// New description.
    pub description: String,
    /// New image URL; empty removes the image.
    pub image: String,
}

/// Replacement fields for a game.
pub type UpdateGame = UpdateInfo;
/// Replacement fields for a collection.
pub type UpdateCollection = UpdateInfo;
/// Input for creating a game.
pub type CreateGame = UpdateInfo;
/// Input for creating a collection.
pub type CreateCollection = UpdateInfo;

/// Replacement fields for a deck.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDeck {
    /// New deck type; may rename the deck.
    #[serde(rename = "type")]
    pub deck_type: String,
    /// New card back URL; empty removes the image.
    pub backside_image: String,
}

/// Input for creating a deck.
pub type CreateDeck = UpdateDeck;

impl From<UpdateInfo> for GameInfo {
    fn from(dto: UpdateInfo) -> Self {
        GameInfo::new(dto.name, dto.description, dto.image)
    }
}

impl From<UpdateInfo> for CollectionInfo {
    fn from(dto: UpdateInfo) -> Self {
        CollectionInfo::new(dto.name, dto.description, dto.image)
    }
}

impl From<&GameInfo> for UpdateInfo {
    fn from(game: &GameInfo) -> Self {
        Self {
            name: game.name.clone(),
            description: game.description.clone(),
            image: game.image.clone(),
        }
    }
}

impl From<&CollectionInfo> for UpdateInfo {
    fn from(collection: &CollectionInfo) -> Self {
        Self {
            name: collection.name.clone(),
            description: collection.description.clone(),
            image: collection.image.clone(),
        }
    }
}

impl From<UpdateDeck> for DeckInfo {
    fn from(dto: UpdateDeck) -> Self {
        DeckInfo::new(dto.deck_type, dto.backside_image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ids_follow_names() {
        let game = GameInfo::new("My Game", "desc", "");
        assert_eq!(game.id, "my-game");
        assert!(game.updated_at.is_none());

        let deck = DeckInfo::new("Heroes", "");
        assert_eq!(deck.id, "heroes");
    }

    #[test]
    fn comparison_ignores_timestamps() {
        let a = CollectionInfo::new("Box 1", "first box", "");
        let mut b = a.clone();
        b.created_at = a.created_at - chrono::Duration::days(3);
        b.updated_at = Some(Utc::now());
        assert!(a.same_content(&b));

        b.description = "changed".into();
        assert!(!a.same_content(&b));
    }

    #[test]
    fn deck_descriptor_uses_camel_case_fields() -> anyhow::Result<()> {
        let deck = DeckInfo::new("Heroes", "https://img.example/back.png");
        let value = serde_json::to_value(&deck)?;
        assert_eq!(value["type"], json!("Heroes"));
        assert_eq!(value["backsideImage"], json!("https://img.example/back.png"));
        assert_eq!(value["updatedAt"], serde_json::Value::Null);
        assert!(value["createdAt"].is_string());

        let parsed: DeckInfo = serde_json::from_value(value)?;
        assert_eq!(parsed, deck);
        Ok(())
    }
}
