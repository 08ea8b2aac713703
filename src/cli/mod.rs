mod args;
mod format;
mod ops;
mod store;

use std::process::ExitCode;

use clap::{
    builder::{styling::AnsiColor, Styles},
    Parser, Subcommand,
};
use log::error;

use crate::logger;

use self::args::{CatArgs, ExistsArgs, GlobalArgs, LsArgs, PutArgs, RmArgs};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None, propagate_version = true, styles = cli_styles())]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check whether an object exists
    Exists(ExistsArgs),
    /// Print an object to stdout
    Cat(CatArgs),
    /// Atomically write stdin (or a file) to an object
    Put(PutArgs),
    /// Remove an object or directory
    Rm(RmArgs),
    /// List objects under a directory
    Ls(LsArgs),
}

impl Command {
    fn global(&self) -> &GlobalArgs {
        match self {
            Command::Exists(args) => &args.global,
            Command::Cat(args) => &args.global,
            Command::Put(args) => &args.global,
            Command::Rm(args) => &args.global,
            Command::Ls(args) => &args.global,
        }
    }
}

pub async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.command.global());

    let result = match cli.command {
        Command::Exists(args) => ops::exists(args).await,
        Command::Cat(args) => ops::cat(args).await,
        Command::Put(args) => ops::put(args).await,
        Command::Rm(args) => ops::rm(args).await,
        Command::Ls(args) => ops::ls(args).await,
    };

    if let Err(err) = result {
        error!("{err}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn init_logger(args: &GlobalArgs) {
    let logger = &args.logger;
    logger::init(logger.verbose, logger.quiet, logger.color);
}

fn cli_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::BrightMagenta.on_default())
        .usage(AnsiColor::BrightMagenta.on_default())
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightCyan.on_default())
}
