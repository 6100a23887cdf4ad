use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::config::ConfigOverrides;
use crate::remote::ExportFormat;

/// binderdex - trading-card binders from the terminal
#[derive(Parser, Debug)]
#[command(name = "binderdex")]
#[command(version)]
#[command(about = "Browse cards and arrange them in paginated binders")]
pub struct Cli {
  /// Increase verbosity (-v, -vv, -vvv)
  #[arg(short, long, action = ArgAction::Count, global = true)]
  pub verbose: u8,

  /// Binder service base URL (default: stored value or http://127.0.0.1:8000)
  #[arg(long, global = true)]
  pub api_base: Option<String>,

  /// Local data directory for preferences and caches
  #[arg(long, global = true)]
  pub data_dir: Option<PathBuf>,

  /// Card language for this invocation
  #[arg(long, global = true)]
  pub lang: Option<String>,

  /// Per-request timeout in seconds (default: none)
  #[arg(long, global = true)]
  pub timeout_secs: Option<u64>,

  #[command(subcommand)]
  pub command: Command,
}

impl Cli {
  pub fn overrides(&self) -> ConfigOverrides {
    ConfigOverrides {
      api_base: self.api_base.clone(),
      data_dir: self.data_dir.clone(),
      lang: self.lang.clone(),
      timeout_secs: self.timeout_secs,
    }
  }
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Show a page of the active binder
  Show {
    /// 1-based page number (default: current page)
    #[arg(long)]
    page: Option<usize>,
  },

  /// Go to the next page
  Next,

  /// Go to the previous page
  Prev,

  /// Toggle layout-edit mode
  Edit,

  /// Tap a slot (1-9) on the current page
  Tap { slot: usize },

  /// Drag the card at one global slot index onto another (layout-edit mode)
  Drag { from: usize, to: usize },

  /// Move the card at a global slot index to the start of a page
  MoveToPage { from: usize, page: String },

  /// Empty the slot at a global index
  Remove { index: usize },

  /// Add a card to the active binder
  Add { card_id: String },

  /// List the card ids owned by the active binder
  Ids,

  /// Binder management
  Binder {
    #[command(subcommand)]
    action: BinderAction,
  },

  /// Browse every binder with a preview of its first page
  Shelf {
    #[command(subcommand)]
    action: Option<ShelfStep>,
  },

  /// Card sets
  Sets {
    #[command(subcommand)]
    action: SetAction,
  },

  /// Search cards by name, or list the selected set
  Search {
    query: Option<String>,

    /// List this set instead of the stored selection
    #[arg(long)]
    set: Option<String>,
  },

  /// Show card details
  Card { card_id: String },

  /// Show or change the stored card language
  Lang { lang: Option<String> },

  /// Show or change the stored binder service URL
  Remote { url: Option<String> },
}

#[derive(Subcommand, Debug)]
pub enum BinderAction {
  /// List binders
  List,

  /// Make a binder active
  Select { binder_id: String },

  /// Create a binder and make it active
  Create { name: String },

  /// Rename a binder (default: the active one)
  Rename {
    name: String,
    #[arg(long)]
    id: Option<String>,
  },

  /// Duplicate a binder into a new, editable one
  Duplicate {
    #[arg(long)]
    id: Option<String>,
    #[arg(long)]
    name: Option<String>,
  },

  /// Toggle read-only
  Lock {
    #[arg(long)]
    id: Option<String>,
  },

  /// Mark a binder as the favorite
  Favorite {
    #[arg(long)]
    id: Option<String>,
  },

  /// Delete a binder
  Delete { binder_id: String },

  /// Show a binder's first cards
  Snapshot {
    #[arg(long)]
    id: Option<String>,
    #[arg(long, default_value_t = crate::session::DEFAULT_SNAPSHOT_LIMIT)]
    limit: usize,
  },

  /// Download a binder export
  Export {
    #[arg(long)]
    id: Option<String>,
    #[arg(long, value_enum, default_value_t = ExportKind::Json)]
    format: ExportKind,
    #[arg(short, long)]
    output: Option<PathBuf>,
  },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShelfStep {
  /// List the shelf (default)
  Show,

  /// Focus the next binder
  Next,

  /// Focus the previous binder
  Prev,

  /// Open the binder at a 1-based position; opening it again enters it
  Open { position: usize },

  /// Close the opened binder
  Close,
}

#[derive(Subcommand, Debug)]
pub enum SetAction {
  /// List sets for the current language
  List,

  /// Remember a set for searches (omit to clear)
  Select { set_id: Option<String> },

  /// Show a set's logo URL
  Logo { set_id: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportKind {
  Json,
  Pdf,
}

impl From<ExportKind> for ExportFormat {
  fn from(kind: ExportKind) -> Self {
    match kind {
      ExportKind::Json => ExportFormat::Json,
      ExportKind::Pdf => ExportFormat::Pdf,
    }
  }
}
