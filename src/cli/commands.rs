use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "postit")]
#[command(version, about = "A persisted sticky-note board")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding the notes (defaults to the nearest .postit/)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the store controller over stdin/stdout, one JSON message per line
    Serve {
        /// Approve delete confirmations without prompting
        #[arg(long)]
        yes: bool,
    },

    /// List notes in board order
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Append a new note
    Add {
        /// Note text
        text: String,

        /// Note color (cyan, yellow, red, green)
        #[arg(long, short = 'c', default_value = "yellow")]
        color: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replace the text of a note
    Edit {
        /// Note index (0-based)
        index: usize,

        /// New text
        text: String,

        /// New color; the current one is kept if omitted
        #[arg(long, short = 'c')]
        color: Option<String>,
    },

    /// Change the color of a note
    Color {
        /// Note index (0-based)
        index: usize,

        /// Note color (cyan, yellow, red, green)
        color: String,
    },

    /// Delete a note
    Delete {
        /// Note index (0-based)
        index: usize,

        /// Skip the confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Move a note to another position
    Move {
        /// Current index
        from: usize,

        /// Target index
        to: usize,
    },
}
