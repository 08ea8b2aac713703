use std::{path::PathBuf, time::Duration};

use clap::{ArgAction, Args};
use concolor_clap::ColorChoice;
use humantime::parse_duration;

use crate::path::GcsPath;

#[derive(Args, Debug)]
pub struct ExistsArgs {
    /// Object to look for (e.g. 'gs://<bucket>/<key>')
    pub path: GcsPath,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Args, Debug)]
pub struct CatArgs {
    /// Object to print
    pub path: GcsPath,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Args, Debug)]
pub struct PutArgs {
    /// Destination object; its extension decides the content type
    pub path: GcsPath,

    /// Read from this file instead of stdin
    #[arg(short, long, value_name = "FILE")]
    pub from: Option<PathBuf>,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Args, Debug)]
pub struct RmArgs {
    /// Object or directory to remove
    pub path: GcsPath,

    /// Remove everything under a directory
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Args, Debug)]
pub struct LsArgs {
    /// Directory to list
    pub path: GcsPath,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Config file (defaults to `$GCSTARGET_CONFIG` or /etc/gcstarget/gcstarget.yaml)
    #[arg(long, value_name = "FILE", conflicts_with = "local")]
    pub config: Option<PathBuf>,

    /// Use a local directory instead of GCS
    #[arg(long, value_name = "DIR")]
    pub local: Option<PathBuf>,

    /// Add latency when using local storage
    #[arg(short = 'L', long, value_parser = parse_duration, requires = "local")]
    pub latency: Option<Duration>,

    /// Print stats after completion
    #[arg(long, default_value_t = false)]
    pub stats: bool,

    #[command(flatten)]
    pub logger: LoggerArgs,
}

#[derive(Args, Debug)]
pub struct LoggerArgs {
    /// When to use color in output
    #[arg(short, long, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Print more output
    #[arg(short, long, action = ArgAction::Count, group = "verbosity")]
    pub verbose: u8,

    /// Print less output
    #[arg(short, long, action = ArgAction::Count, group = "verbosity")]
    pub quiet: u8,
}
