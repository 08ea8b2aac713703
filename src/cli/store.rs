use std::{
    env::{self, VarError},
    path::PathBuf,
    sync::Arc,
    time::Instant,
};

use log::debug;

use crate::{
    config::Config,
    error::{Error, Result},
    filesystem::GcsFileSystem,
    path::GcsPath,
    storage::{GcsStore, LocalStore, SharedStore},
    target::AtomicTarget,
};

use super::args::GlobalArgs;

const ENV_VAR_LOCAL: &str = "GCSTARGET_LOCAL";

pub struct Session {
    pub store: SharedStore,
    pub staging_dir: Option<PathBuf>,
    pub start_time: Instant,
}

impl Session {
    pub fn target(&self, path: GcsPath) -> AtomicTarget {
        AtomicTarget::new(path, self.store.clone()).with_staging_dir(self.staging_dir.clone())
    }

    pub fn filesystem(&self) -> GcsFileSystem {
        GcsFileSystem::new(self.store.clone())
    }
}

pub async fn create_session(args: &GlobalArgs) -> Result<Session> {
    let start_time = Instant::now();
    let local = match &args.local {
        Some(path) => Some(path.clone()),
        None if args.config.is_none() => get_env_var(ENV_VAR_LOCAL)?.map(PathBuf::from),
        None => None,
    };

    if let Some(path) = local {
        debug!("using local store at {}", path.display());
        let store = LocalStore::new(path, args.latency);
        return Ok(Session {
            store: Arc::new(store),
            staging_dir: None,
            start_time,
        });
    }

    let config = match &args.config {
        Some(path) => Config::load(path).await?,
        None => Config::load_default().await?,
    };

    let store = GcsStore::new(&config).await?;
    Ok(Session {
        store: Arc::new(store),
        staging_dir: config.gcs.staging_dir,
        start_time,
    })
}

fn get_env_var(name: &str) -> Result<Option<String>> {
    match env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(err) => Err(Error::InvalidConfig(format!("`{name}`: {err}"))),
    }
}
