//! CLI Module
//!
//! Command-line interface for inspecting and editing stack projects.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Stackwise - architecture stack editor and cost explorer
#[derive(Parser, Debug)]
#[command(name = "stackwise")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON file overriding layout and cost settings
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new project file from a template
    #[command(name = "init")]
    Init {
        /// Path for the new project file
        path: PathBuf,

        /// blank, sample, microservices, three-tier or serverless
        #[arg(short, long, default_value = "sample")]
        template: String,
    },

    /// Show stack overview and the cost banner
    #[command(name = "summary")]
    Summary {
        /// Path to the project
        path: PathBuf,
    },

    /// Show per-layer cost badges and breakdowns
    #[command(name = "costs")]
    Costs {
        /// Path to the project
        path: PathBuf,

        /// Only show this layer
        #[arg(short, long)]
        layer: Option<String>,
    },

    /// Show dependency levels
    #[command(name = "levels")]
    Levels {
        /// Path to the project
        path: PathBuf,
    },

    /// Compute diagram positions
    #[command(name = "layout")]
    Layout {
        /// Path to the project
        path: PathBuf,

        /// Print positions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check references and cost data
    #[command(name = "validate")]
    Validate {
        /// Path to the project
        path: PathBuf,

        /// Remove dangling references and save
        #[arg(long)]
        repair: bool,
    },

    /// Compare the cost of use paths
    #[command(name = "actions")]
    Actions {
        /// Path to the project
        path: PathBuf,

        /// variable-desc, variable-asc, monthly-desc, monthly-asc, steps-desc or name-asc
        #[arg(short, long, default_value = "variable-desc")]
        sort: String,

        /// Only show the first N actions
        #[arg(short = 'n', long)]
        top: Option<usize>,
    },

    /// Project monthly cost under growth scenarios
    #[command(name = "forecast")]
    Forecast {
        /// Path to the project
        path: PathBuf,
    },

    /// Suggest cost optimizations
    #[command(name = "recommend")]
    Recommend {
        /// Path to the project
        path: PathBuf,
    },

    /// Add a layer, or a substack with --parent
    #[command(name = "add-layer")]
    AddLayer {
        /// Path to the project
        path: PathBuf,

        /// Name of the new layer
        name: String,

        /// Id of the main layer to add a substack to
        #[arg(short, long)]
        parent: Option<String>,
    },

    /// Toggle a connection between two layers
    #[command(name = "connect")]
    Connect {
        /// Path to the project
        path: PathBuf,

        /// Source layer id
        from: String,

        /// Target layer id
        to: String,

        /// HTTP, gRPC, Event, Database, Cache, Message, Sync or Async
        #[arg(short = 't', long = "type", default_value = "HTTP")]
        connection_type: String,
    },

    /// Undo the last action
    #[command(name = "undo")]
    Undo {
        /// Path to the project
        path: PathBuf,
    },

    /// Redo the last undone action
    #[command(name = "redo")]
    Redo {
        /// Path to the project
        path: PathBuf,
    },

    /// Show action history
    #[command(name = "history")]
    History {
        /// Path to the project
        path: PathBuf,
    },
}
