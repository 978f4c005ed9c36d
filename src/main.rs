//! Group Games - Unified CLI
//!
//! Every command loads the group, applies one operation as the acting user,
//! and saves the result.

#![warn(missing_docs)]

mod cli;

use anyhow::{Result, bail};
use clap::Parser;
use cli::{Cli, Command, MemberAction};
use group_games::{
    AppConfig, FileStore, GameKind, GameMove, Group, GroupStore, KeyValueStore, LudoMove,
    Position, Refusal, Rejection, ludo,
};
use tracing::{debug, instrument, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.data_dir {
        config = config.with_data_dir(dir);
    }
    if let Some(group) = &cli.group {
        config = config.with_group_id(group);
    }

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_filter())),
        )
        .init();

    let backend = FileStore::open(config.data_dir())?;
    let mut store = GroupStore::new(backend, config.group_id());
    run(cli, &config, &mut store)
}

/// Dispatches one command.
#[instrument(skip_all, fields(user = %cli.user))]
fn run(cli: Cli, config: &AppConfig, store: &mut GroupStore<FileStore>) -> Result<()> {
    let user = cli.user.as_str();

    if let Command::Init { name, allow_guests } = &cli.command {
        let name = name.as_deref().unwrap_or(config.group_name());
        let mut group = store.load_or_init(config.group_id(), name)?;
        if *allow_guests && !group.settings().allow_guest_joins() {
            group = group.with_settings(group.settings().with_allow_guest_joins(true));
            store.save(&group)?;
        }
        println!(
            "group {} \"{}\": {} members, {} games",
            group.id(),
            group.name(),
            group.members().len(),
            group.games().len()
        );
        return Ok(());
    }

    let group = store.load_or_init(config.group_id(), config.group_name())?;
    debug!(games = group.games().len(), "Group loaded");

    match cli.command {
        Command::Init { .. } => Ok(()),
        Command::Member { action } => match action {
            MemberAction::Add { id, display_name } => {
                let display_name = display_name.unwrap_or_else(|| id.clone());
                commit(store, group.add_member(&id, display_name).map_err(Refusal::from))?;
                println!("added {}", id);
                Ok(())
            }
            MemberAction::List => {
                for member in group.members() {
                    println!("{} ({})", member.id(), member.display_name());
                }
                Ok(())
            }
        },
        Command::Say { text } => {
            commit(store, group.post_message(user, text).map_err(Refusal::from))?;
            Ok(())
        }
        Command::Feed { limit } => {
            let messages = group.messages();
            for message in &messages[messages.len().saturating_sub(limit)..] {
                println!("{}", message);
            }
            Ok(())
        }
        Command::New { game_type } => {
            let Ok(kind) = game_type.parse::<GameKind>() else {
                bail!("rejected [UNKNOWN_GAME_TYPE]: no game named {}", game_type);
            };
            let (group, game_id) = match group.open_game(user, kind) {
                Ok(opened) => opened,
                Err(rejection) => return Err(reject(rejection)),
            };
            commit(store, Ok(group))?;
            println!("{}", game_id);
            Ok(())
        }
        Command::Join { game_id } => {
            commit(store, group.request_join(&game_id, user).map_err(Refusal::from))?;
            println!("requested to join {}", game_id);
            Ok(())
        }
        Command::Approve { game_id, user: who } => {
            let group = commit(store, group.approve_join(&game_id, user, &who))?;
            show(&group, &game_id)
        }
        Command::Dismiss { game_id, user: who } => {
            commit(store, group.dismiss_request(&game_id, user, &who).map_err(Refusal::from))?;
            println!("dismissed {}", who);
            Ok(())
        }
        Command::Leave { game_id } => {
            commit(store, group.leave_game(&game_id, user).map_err(Refusal::from))?;
            println!("left {}", game_id);
            Ok(())
        }
        Command::Start { game_id } => {
            let group = commit(store, group.start_game(&game_id, user).map_err(Refusal::from))?;
            show(&group, &game_id)
        }
        Command::Move { game_id, notation } => {
            let next = group
                .game(&game_id)
                .and_then(|g| parse_move(*g.kind(), &notation))
                .and_then(|mv| group.play_move(&game_id, user, &mv));
            let group = commit(store, next.map_err(Refusal::from))?;
            show(&group, &game_id)
        }
        Command::Roll { game_id, face } => {
            let face = face.unwrap_or_else(|| ludo::roll_die(&mut rand::thread_rng()));
            println!("rolled {}", face);
            let mv = GameMove::Ludo(LudoMove::Roll { face });
            let group = commit(store, group.play_move(&game_id, user, &mv).map_err(Refusal::from))?;
            show(&group, &game_id)
        }
        Command::Show { game_id } => show(&group, &game_id),
        Command::List { mine } => {
            let games = if mine {
                group.games_for(user)
            } else {
                group.games().iter().collect()
            };
            for game in games {
                println!(
                    "{}  {:<18} {:<9} {}",
                    game.id(),
                    game.kind().to_string(),
                    game.status().to_string(),
                    game.players().join(", ")
                );
            }
            Ok(())
        }
    }
}

/// Saves the successor group, or the amended group a refusal carries.
fn commit<S: KeyValueStore>(
    store: &mut GroupStore<S>,
    result: Result<Group, Refusal<Group>>,
) -> Result<Group> {
    store.commit(result)?.map_err(reject)
}

fn reject(reason: Rejection) -> anyhow::Error {
    warn!(code = reason.code(), %reason, "Operation rejected");
    anyhow::anyhow!("rejected [{}]: {}", reason.code(), reason)
}

/// Reads move notation for the given game kind.
fn parse_move(kind: GameKind, notation: &str) -> Result<GameMove, Rejection> {
    let notation = notation.trim();
    match kind {
        GameKind::TicTacToe => Position::from_label_or_number(notation)
            .map(GameMove::TicTacToe)
            .ok_or_else(|| Rejection::illegal(format!("{} is not a cell", notation))),
        GameKind::ConnectFour => notation
            .parse()
            .map(GameMove::ConnectFour)
            .map_err(|_| Rejection::illegal(format!("{} is not a column", notation))),
        GameKind::Ludo => notation
            .parse()
            .map(|piece| GameMove::Ludo(LudoMove::Advance { piece }))
            .map_err(|_| Rejection::illegal(format!("{} is not a piece number", notation))),
        GameKind::Chess | GameKind::Checkers | GameKind::SnakesAndLadders => {
            Err(Rejection::UnknownGameType(kind))
        }
    }
}

fn show(group: &Group, game_id: &str) -> Result<()> {
    match group.game(game_id) {
        Ok(game) => {
            print!("{}", game);
            Ok(())
        }
        Err(rejection) => Err(reject(rejection)),
    }
}
