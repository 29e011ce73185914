//! deckbuild CLI
//!
//! Command-line access to the game / collection / deck store.

use std::{
    fs::{self, OpenOptions},
    path::PathBuf,
    process::ExitCode,
    sync::Mutex,
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{prelude::*, EnvFilter};

use deckbuild_core::{
    config::{self, AppConfig},
    DeckInfo, Entity, InCollection, InGame, Repository, SortOrder, StorageError, UpdateDeck,
    UpdateInfo,
};

#[derive(Parser)]
#[command(name = "deckbuild")]
#[command(about = "Manage games, collections and decks stored on disk", long_about = None)]
struct Cli {
    /// Directory holding the games (overrides the configured data_root)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Work with games
    Games {
        #[command(subcommand)]
        action: InfoAction,
    },
    /// Work with the collections of a game
    Collections {
        /// Owning game id
        #[arg(long)]
        game: String,

        #[command(subcommand)]
        action: InfoAction,
    },
    /// Work with the decks of a collection
    Decks {
        /// Owning game id
        #[arg(long)]
        game: String,

        /// Owning collection id
        #[arg(long)]
        collection: String,

        #[command(subcommand)]
        action: DeckAction,
    },
    /// List the distinct decks across every collection of a game
    AllDecks {
        /// Game id
        #[arg(long)]
        game: String,
    },
}

/// Operations shared by every entity kind.
#[derive(Subcommand)]
enum CommonAction {
    /// List entities
    List {
        /// id, name, name-desc, created or created-desc
        #[arg(long, default_value = "id")]
        sort: SortOrder,
    },
    /// Print one entity
    Show { id: String },
    /// Delete an entity and its image
    Delete { id: String },
    /// Write an entity's image to a file
    Image {
        id: String,

        /// Destination file
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Download and attach an image
    SetImage { id: String, url: String },
}

#[derive(Subcommand)]
enum InfoAction {
    #[command(flatten)]
    Common(CommonAction),
    /// Create a new entity
    Create(InfoFields),
    /// Change fields; omitted flags keep their current value
    Update {
        id: String,

        #[command(flatten)]
        patch: InfoPatch,
    },
}

#[derive(Args)]
struct InfoFields {
    /// Display name (the id is derived from it)
    #[arg(long)]
    name: String,

    #[arg(long, default_value = "")]
    description: String,

    /// Image URL
    #[arg(long, default_value = "")]
    image: String,
}

#[derive(Args)]
struct InfoPatch {
    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    description: Option<String>,

    /// Image URL; pass an empty string to remove the image
    #[arg(long)]
    image: Option<String>,
}

#[derive(Subcommand)]
enum DeckAction {
    #[command(flatten)]
    Common(CommonAction),
    /// Create a new deck
    Create {
        /// Deck type (the id is derived from it)
        #[arg(long = "type")]
        deck_type: String,

        /// Card back image URL
        #[arg(long, default_value = "")]
        backside_image: String,
    },
    /// Change fields; omitted flags keep their current value
    Update {
        id: String,

        #[arg(long = "type")]
        deck_type: Option<String>,

        #[arg(long)]
        backside_image: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging() {
        eprintln!("failed to initialise logging: {err:#}");
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<StorageError>() {
                Some(storage) => eprintln!("error [{}]: {storage}", storage.status().code()),
                None => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    config::ensure_default_config()?;
    let mut config = AppConfig::load()?;
    if let Some(root) = cli.root {
        config.data_root = root;
    }
    tracing::debug!("using data root {}", config.data_root.display());
    let store = config.store()?;

    match cli.command {
        Commands::Games { action } => run_info(&store.games(), &(), action),
        Commands::Collections { game, action } => {
            run_info(&store.collections(), &InGame::new(game), action)
        }
        Commands::Decks {
            game,
            collection,
            action,
        } => run_deck(&store.decks(), &InCollection::new(game, collection), action),
        Commands::AllDecks { game } => print_json(&store.decks().get_all_decks_in_game(&game)?),
    }
}

fn run_info<E>(repo: &Repository<E>, parent: &E::Parent, action: InfoAction) -> Result<()>
where
    E: Entity<Update = UpdateInfo>,
    UpdateInfo: for<'a> From<&'a E>,
{
    match action {
        InfoAction::Common(common) => run_common(repo, parent, common),
        InfoAction::Create(fields) => {
            let entity = E::from_update(UpdateInfo {
                name: fields.name,
                description: fields.description,
                image: fields.image,
            });
            print_json(&repo.create(parent, entity)?)
        }
        InfoAction::Update { id, patch } => {
            let current = UpdateInfo::from(&repo.get_by_id(parent, &id)?);
            let update = UpdateInfo {
                name: patch.name.unwrap_or(current.name),
                description: patch.description.unwrap_or(current.description),
                image: patch.image.unwrap_or(current.image),
            };
            print_json(&repo.update(parent, &id, update)?)
        }
    }
}

fn run_deck(repo: &Repository<DeckInfo>, parent: &InCollection, action: DeckAction) -> Result<()> {
    match action {
        DeckAction::Common(common) => run_common(repo, parent, common),
        DeckAction::Create {
            deck_type,
            backside_image,
        } => print_json(&repo.create(parent, DeckInfo::new(deck_type, backside_image))?),
        DeckAction::Update {
            id,
            deck_type,
            backside_image,
        } => {
            let current = repo.get_by_id(parent, &id)?;
            let update = UpdateDeck {
                deck_type: deck_type.unwrap_or(current.deck_type),
                backside_image: backside_image.unwrap_or(current.backside_image),
            };
            print_json(&repo.update(parent, &id, update)?)
        }
    }
}

fn run_common<E: Entity>(
    repo: &Repository<E>,
    parent: &E::Parent,
    action: CommonAction,
) -> Result<()> {
    match action {
        CommonAction::List { sort } => print_json(&repo.list(parent, sort)?),
        CommonAction::Show { id } => print_json(&repo.get_by_id(parent, &id)?),
        CommonAction::Delete { id } => {
            repo.delete_by_id(parent, &id)?;
            Ok(())
        }
        CommonAction::Image { id, out } => {
            let image = repo.get_image(parent, &id)?;
            fs::write(&out, &image.bytes)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("{} ({} bytes)", image.format.mime_type(), image.bytes.len());
            Ok(())
        }
        CommonAction::SetImage { id, url } => {
            repo.create_image(parent, &id, &url)?;
            Ok(())
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("deckbuild.log"))
        .context("failed to open log file")?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_nested_deck_commands() {
        let cli = Cli::try_parse_from([
            "deckbuild",
            "decks",
            "--game",
            "my-game",
            "--collection",
            "box-1",
            "create",
            "--type",
            "Heroes",
        ])
        .unwrap();
        match cli.command {
            Commands::Decks {
                game,
                collection,
                action: DeckAction::Create { deck_type, backside_image },
            } => {
                assert_eq!(game, "my-game");
                assert_eq!(collection, "box-1");
                assert_eq!(deck_type, "Heroes");
                assert_eq!(backside_image, "");
            }
            _ => panic!("unexpected command"),
        }
    }

    #[test]
    fn parses_sort_order() {
        let cli = Cli::try_parse_from(["deckbuild", "games", "list", "--sort", "created-desc"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Games {
                action: InfoAction::Common(CommonAction::List {
                    sort: SortOrder::CreatedDesc
                })
            }
        ));
    }
}
