use std::{
    env, io,
    path::{Path, PathBuf},
    time::Duration,
};

use humantime::parse_duration;
use log::debug;
use serde::{Deserialize, Deserializer};
use tokio::fs;

use crate::error::{Error, Result};

pub const DEFAULT_CONFIG_PATH: &str = "/etc/gcstarget/gcstarget.yaml";
pub const ENV_VAR_CONFIG: &str = "GCSTARGET_CONFIG";

pub const DEFAULT_ENDPOINT: &str = "https://storage.googleapis.com";
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    pub auth: AuthConfig,

    #[serde(default)]
    pub gcs: GcsConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthConfig {
    pub root: Account,
}

/// Service account identity plus a reference to its HMAC secret.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Account {
    pub email: String,
    pub access_id: String,

    /// File holding the HMAC secret.
    #[serde(default)]
    pub cert: Option<PathBuf>,

    /// Inline HMAC secret; takes precedence over `cert`.
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GcsConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default, deserialize_with = "deserialize_duration")]
    pub timeout: Option<Duration>,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default)]
    pub staging_dir: Option<PathBuf>,
}

/// Credentials ready to hand to the transport.
#[derive(Clone, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub access_id: String,
    pub secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("access_id", &self.access_id)
            .finish_non_exhaustive()
    }
}

impl Default for GcsConfig {
    fn default() -> Self {
        GcsConfig {
            endpoint: default_endpoint(),
            timeout: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            staging_dir: None,
        }
    }
}

impl Config {
    pub fn new(account: Account) -> Self {
        Config {
            auth: AuthConfig { root: account },
            gcs: GcsConfig::default(),
        }
    }

    pub fn from_yaml(s: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub async fn load(path: &Path) -> Result<Self> {
        debug!("loading config from {}", path.display());
        let contents = fs::read_to_string(path).await.map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                Error::MissingConfig(path.to_owned())
            } else {
                err.into()
            }
        })?;

        Config::from_yaml(&contents)
    }

    /// Loads from `$GCSTARGET_CONFIG`, falling back to [`DEFAULT_CONFIG_PATH`].
    pub async fn load_default() -> Result<Self> {
        let path = env::var_os(ENV_VAR_CONFIG)
            .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
        Config::load(&path).await
    }

    pub fn validate(&self) -> Result<()> {
        let account = &self.auth.root;
        if account.email.is_empty() || account.access_id.is_empty() {
            return Err(Error::MissingCredentials);
        }

        if account.cert.is_none() && account.password.is_none() {
            return Err(Error::MissingCredentials);
        }

        if self.gcs.endpoint.is_empty() {
            return Err(Error::InvalidConfig("endpoint is empty".to_owned()));
        }

        if self.gcs.max_attempts == 0 {
            return Err(Error::InvalidConfig(
                "max_attempts must be at least 1".to_owned(),
            ));
        }

        Ok(())
    }

    pub async fn credentials(&self) -> Result<Credentials> {
        let account = &self.auth.root;
        let secret = match (&account.password, &account.cert) {
            (Some(password), _) => password.clone(),
            (None, Some(cert)) => fs::read_to_string(cert).await?.trim().to_owned(),
            (None, None) => return Err(Error::MissingCredentials),
        };

        if secret.is_empty() {
            return Err(Error::MissingCredentials);
        }

        Ok(Credentials {
            email: account.email.clone(),
            access_id: account.access_id.clone(),
            secret,
        })
    }
}

impl Account {
    pub fn new<E: Into<String>, A: Into<String>>(email: E, access_id: A) -> Self {
        Account {
            email: email.into(),
            access_id: access_id.into(),
            cert: None,
            password: None,
        }
    }

    #[must_use]
    pub fn with_cert<P: Into<PathBuf>>(mut self, cert: P) -> Self {
        self.cert = Some(cert.into());
        self
    }

    #[must_use]
    pub fn with_password<S: Into<String>>(mut self, password: S) -> Self {
        self.password = Some(password.into());
        self
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_owned()
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn deserialize_duration<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<Duration>, D::Error> {
    let value: Option<String> = Option::deserialize(deserializer)?;
    value
        .as_deref()
        .map(parse_duration)
        .transpose()
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tempfile::{tempdir, NamedTempFile};

    use crate::error::Error;

    use super::{Account, Config, DEFAULT_ENDPOINT, DEFAULT_MAX_ATTEMPTS};

    const FULL: &str = "
auth:
  root:
    email: pipeline@project.iam.gserviceaccount.com
    access_id: GOOG1EXAMPLE
    cert: /etc/gcstarget/hmac.secret
gcs:
  endpoint: http://localhost:4443
  timeout: 30s
  max_attempts: 3
  staging_dir: /var/tmp
";

    const MINIMAL: &str = "
auth:
  root:
    email: pipeline@project.iam.gserviceaccount.com
    access_id: GOOG1EXAMPLE
    password: hunter2
";

    #[test]
    fn parse_full() {
        let config = Config::from_yaml(FULL).unwrap();
        assert_eq!(
            config.auth.root.email,
            "pipeline@project.iam.gserviceaccount.com"
        );
        assert_eq!(
            config.auth.root.cert.as_deref(),
            Some("/etc/gcstarget/hmac.secret".as_ref())
        );
        assert_eq!(config.gcs.endpoint, "http://localhost:4443");
        assert_eq!(config.gcs.timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.gcs.max_attempts, 3);
    }

    #[test]
    fn parse_minimal_uses_defaults() {
        let config = Config::from_yaml(MINIMAL).unwrap();
        assert_eq!(config.gcs.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.gcs.timeout, None);
        assert_eq!(config.gcs.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(config.gcs.staging_dir, None);
    }

    #[test]
    fn missing_secret_reference() {
        let yaml = "
auth:
  root:
    email: pipeline@project.iam.gserviceaccount.com
    access_id: GOOG1EXAMPLE
";
        assert_eq!(Config::from_yaml(yaml), Err(Error::MissingCredentials));
    }

    #[test]
    fn bad_shape() {
        assert!(matches!(
            Config::from_yaml("auth: 3"),
            Err(Error::InvalidConfig(_))
        ));

        let bad_timeout = format!("{MINIMAL}gcs:\n  timeout: soon\n");
        assert!(matches!(
            Config::from_yaml(&bad_timeout),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope.yaml");
        assert_eq!(Config::load(&path).await, Err(Error::MissingConfig(path)));
    }

    #[tokio::test]
    async fn load_from_file() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), MINIMAL).unwrap();
        let config = Config::load(file.path()).await.unwrap();
        assert_eq!(config.auth.root.access_id, "GOOG1EXAMPLE");
    }

    #[tokio::test]
    async fn password_overrides_cert() {
        let account = Account::new("svc@example.com", "GOOG1")
            .with_cert("/does/not/exist")
            .with_password("inline");
        let credentials = Config::new(account).credentials().await.unwrap();
        assert_eq!(credentials.secret, "inline");
    }

    #[tokio::test]
    async fn secret_from_cert_file() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "s3cr3t\n").unwrap();
        let account = Account::new("svc@example.com", "GOOG1").with_cert(file.path());
        let credentials = Config::new(account).credentials().await.unwrap();
        assert_eq!(credentials.secret, "s3cr3t");
        assert_eq!(credentials.email, "svc@example.com");
        assert!(!format!("{credentials:?}").contains("s3cr3t"));
    }
}
