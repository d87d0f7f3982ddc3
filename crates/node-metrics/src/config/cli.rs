use clap::{Parser, Subcommand};
use utils::version;

use crate::config::daemon::DaemonArgs;

#[derive(Parser)]
#[command(about, long_about, version = &**version::VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Watch cluster nodes and emit their health and capacity metrics
    Daemon(Box<DaemonArgs>),
}
