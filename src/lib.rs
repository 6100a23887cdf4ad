pub mod cache;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod layout;
pub mod model;
pub mod remote;
pub mod session;
pub mod shelf;
pub mod store;
pub mod view;

use clap::Parser;
use log::LevelFilter;

pub use error::{BinderError, Result};
pub use layout::{MoveIntent, PAGE_SIZE};
pub use remote::{BinderRemote, ExportFormat, HttpRemote};
pub use session::BinderSession;

fn init_logging(verbose: u8) {
  let base = if cfg!(debug_assertions) {
    LevelFilter::Info
  } else {
    LevelFilter::Warn
  };
  let level = match verbose {
    0 => base,
    1 => base.max(LevelFilter::Info),
    2 => base.max(LevelFilter::Debug),
    _ => LevelFilter::Trace,
  };

  env_logger::Builder::new()
    .filter_level(level)
    .parse_default_env()
    .format_timestamp(None)
    .init();
}

pub fn run() {
  let cli = cli::Cli::parse();
  init_logging(cli.verbose);

  match commands::dispatch(cli) {
    Ok(output) if output.ends_with('\n') => print!("{}", output),
    Ok(output) => println!("{}", output),
    Err(message) => {
      eprintln!("error: {}", message);
      std::process::exit(1);
    }
  }
}
