use clap::builder::styling::AnsiColor;
use log::info;
use tokio::{
    fs::File,
    io::{self, AsyncWriteExt},
};

use crate::{error::Result, storage::ObjectStore};

use super::{
    args::{CatArgs, ExistsArgs, LsArgs, PutArgs, RmArgs},
    format::{format_elapsed, format_size, print_stat},
    store::{create_session, Session},
};

pub async fn exists(args: ExistsArgs) -> Result<()> {
    let session = create_session(&args.global).await?;
    let exists = session.target(args.path.clone()).exists().await?;
    println!("{exists}");

    finish(&session, args.global.stats);
    Ok(())
}

pub async fn cat(args: CatArgs) -> Result<()> {
    let session = create_session(&args.global).await?;
    let mut reader = session.target(args.path).open_read().await?;
    let mut stdout = io::stdout();
    io::copy(&mut reader, &mut stdout).await?;
    stdout.flush().await?;

    finish(&session, args.global.stats);
    Ok(())
}

pub async fn put(args: PutArgs) -> Result<()> {
    let session = create_session(&args.global).await?;
    let target = session.target(args.path);
    let mut writer = target.open_write().await?;

    if let Some(path) = &args.from {
        let mut file = File::open(path).await?;
        io::copy(&mut file, &mut writer).await?;
    } else {
        io::copy(&mut io::stdin(), &mut writer).await?;
    }

    let size = writer.bytes_written();
    writer.commit().await?;

    let style = AnsiColor::Green.on_default();
    info!("{style}wrote{style:#} {} ({})", target.path(), format_size(size));

    finish(&session, args.global.stats);
    Ok(())
}

pub async fn rm(args: RmArgs) -> Result<()> {
    let session = create_session(&args.global).await?;
    let removed = session
        .filesystem()
        .remove(&args.path, args.recursive)
        .await?;

    let style = AnsiColor::Yellow.on_default();
    if removed {
        info!("{style}removed{style:#} {}", args.path);
    } else {
        info!("{style}nothing to remove{style:#} at {}", args.path);
    }

    finish(&session, args.global.stats);
    Ok(())
}

pub async fn ls(args: LsArgs) -> Result<()> {
    let session = create_session(&args.global).await?;
    let keys = session.filesystem().list_dir(&args.path).await?;
    for key in keys {
        println!("{}", args.path.join(&key));
    }

    finish(&session, args.global.stats);
    Ok(())
}

fn finish(session: &Session, show_stats: bool) {
    if !show_stats {
        return;
    }

    let stats = session.store.stats();
    print_stat("requests", stats.total_requests());
    print_stat("bytes downloaded", format_size(stats.bytes_downloaded()));
    print_stat("bytes uploaded", format_size(stats.bytes_uploaded()));
    print_stat("elapsed time", format_elapsed(session.start_time.elapsed()));
}
