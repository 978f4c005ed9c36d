//! Command-line interface for group_games.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Group Games - turn-based mini-games inside a chat group
#[derive(Parser, Debug)]
#[command(name = "group_games")]
#[command(about = "Play tic-tac-toe, connect-four and ludo in a chat group", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory for stored groups (overrides config and environment)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Group to operate on (overrides config)
    #[arg(long, global = true)]
    pub group: Option<String>,

    /// User performing the action
    #[arg(long = "as", global = true, env = "GROUP_GAMES_USER", default_value = "guest")]
    pub user: String,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the group if it does not exist yet
    Init {
        /// Group name
        #[arg(long)]
        name: Option<String>,

        /// Let non-members open and join games
        #[arg(long)]
        allow_guests: bool,
    },

    /// Manage group members
    Member {
        /// Member action
        #[command(subcommand)]
        action: MemberAction,
    },

    /// Post a message to the group feed
    Say {
        /// Message text
        text: String,
    },

    /// Show the most recent feed messages
    Feed {
        /// Number of messages to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Open a new game (tic-tac-toe, connect-four, ludo)
    New {
        /// Game type
        game_type: String,
    },

    /// Ask to join a game
    Join {
        /// Game id
        game_id: String,
    },

    /// Approve a join request (creator only)
    Approve {
        /// Game id
        game_id: String,
        /// User whose request to approve
        user: String,
    },

    /// Dismiss a join request (creator, or the requester themself)
    Dismiss {
        /// Game id
        game_id: String,
        /// User whose request to dismiss
        user: String,
    },

    /// Leave a pending game or withdraw a request
    Leave {
        /// Game id
        game_id: String,
    },

    /// Start a game (creator only)
    Start {
        /// Game id
        game_id: String,
    },

    /// Play a move: a cell 0-8 or label for tic-tac-toe, a column 0-6 for
    /// connect-four, or a piece 0-3 for ludo
    Move {
        /// Game id
        game_id: String,
        /// Move notation
        notation: String,
    },

    /// Roll the die in a ludo game
    Roll {
        /// Game id
        game_id: String,

        /// Use this face instead of rolling
        #[arg(long)]
        face: Option<u8>,
    },

    /// Show one game
    Show {
        /// Game id
        game_id: String,
    },

    /// List games
    List {
        /// Only games involving the acting user
        #[arg(long)]
        mine: bool,
    },
}

/// Member subcommands
#[derive(Subcommand, Debug)]
pub enum MemberAction {
    /// Add a member
    Add {
        /// User id
        id: String,

        /// Display name (defaults to the id)
        #[arg(long)]
        display_name: Option<String>,
    },

    /// List members
    List,
}
