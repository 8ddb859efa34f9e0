// On-disk JSON cache for temporary credentials
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use anyhow::{
    Context,
    Result,
};
use aws_credential_types::provider::{
    self,
    future,
    ProvideCredentials,
    SharedCredentialsProvider,
};
use aws_credential_types::Credentials;
use chrono::{
    DateTime,
    TimeDelta,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::fs;
use std::io::Write;
use std::path::{
    Path,
    PathBuf,
};
use std::time::SystemTime;
use tracing::debug;

/// Provider name attached to credentials read back from the cache.
const PROVIDER_NAME: &str = "JsonFileCache";

/// Cached credentials this close to expiry are refreshed instead of used.
const EXPIRY_BUFFER_SECS: i64 = 15 * 60;

#[derive(Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
struct CachedCredentials {
    access_key_id:     String,
    secret_access_key: String,
    session_token:     Option<String>,
    expiration:        DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
struct CacheEntry {
    provider_type: String,
    credentials:   CachedCredentials,
}

/// Wraps a credentials provider, keeping its temporary credentials in a JSON
/// file so that later runs can reuse them until they expire.
///
/// Long-lived credentials (those without an expiry) are never written.
/// Problems reading or writing the cache file only cost a fresh lookup from
/// the inner provider.
#[derive(Debug)]
pub struct JsonFileCache {
    inner: SharedCredentialsProvider,
    path:  PathBuf,
}

impl JsonFileCache {
    /// Returns a cache storing credentials for `key` under `dir`.
    pub fn new(
        dir: impl AsRef<Path>,
        key: &str,
        inner: SharedCredentialsProvider,
    ) -> Self {
        let path = dir.as_ref().join(format!("{}.json", cache_key(key)));

        Self {
            inner,
            path,
        }
    }

    /// Path of the cache file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    // Returns cached credentials if they're still fresh at `now`.
    fn read(&self, now: DateTime<Utc>) -> Option<Credentials> {
        let data = fs::read_to_string(&self.path).ok()?;

        let entry: CacheEntry = match serde_json::from_str(&data) {
            Ok(entry) => entry,
            Err(e)    => {
                debug!("read: Ignoring unreadable cache {:?}: {}", self.path, e);

                return None;
            },
        };

        let cached = entry.credentials;

        if cached.expiration - now <= TimeDelta::seconds(EXPIRY_BUFFER_SECS) {
            debug!("read: Cached credentials expire at {}", cached.expiration);

            return None;
        }

        let credentials = Credentials::new(
            cached.access_key_id,
            cached.secret_access_key,
            cached.session_token,
            Some(SystemTime::from(cached.expiration)),
            PROVIDER_NAME,
        );

        Some(credentials)
    }

    // Writes expiring credentials to the cache file.
    fn write(&self, credentials: &Credentials) -> Result<()> {
        let Some(expiry) = credentials.expiry() else {
            debug!("write: Credentials don't expire, not caching");

            return Ok(());
        };

        let entry = CacheEntry {
            provider_type: "assume-role".into(),
            credentials:   CachedCredentials {
                access_key_id:     credentials.access_key_id().into(),
                secret_access_key: credentials.secret_access_key().into(),
                session_token:     credentials.session_token().map(Into::into),
                expiration:        DateTime::<Utc>::from(expiry),
            },
        };

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }

        let data = serde_json::to_string(&entry)?;

        let mut options = fs::OpenOptions::new();
        options.create(true).truncate(true).write(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path)
            .with_context(|| format!("opening {}", self.path.display()))?;

        file.write_all(data.as_bytes())?;

        Ok(())
    }

    async fn load(&self) -> provider::Result {
        if let Some(credentials) = self.read(Utc::now()) {
            debug!("load: Using cached credentials from {:?}", self.path);

            return Ok(credentials);
        }

        let credentials = self.inner.provide_credentials().await?;

        if let Err(e) = self.write(&credentials) {
            debug!("load: Failed to write credential cache: {:#}", e);
        }

        Ok(credentials)
    }
}

impl ProvideCredentials for JsonFileCache {
    fn provide_credentials<'a>(&'a self) -> future::ProvideCredentials<'a>
    where
        Self: 'a,
    {
        future::ProvideCredentials::new(self.load())
    }
}

// Keeps the key usable as a file name.
fn cache_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            }
            else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use tempfile::TempDir;

    fn temporary_credentials(key: &str, valid_for: Duration) -> Credentials {
        Credentials::new(
            key,
            "atestsecretkey",
            Some("atestsessiontoken".to_string()),
            Some(SystemTime::now() + valid_for),
            "test",
        )
    }

    fn cache(dir: &TempDir, inner: Credentials) -> JsonFileCache {
        JsonFileCache::new(
            dir.path().join("sso").join("cache"),
            "dev",
            SharedCredentialsProvider::new(inner),
        )
    }

    #[tokio::test]
    async fn test_cache_miss_writes_file() {
        let dir = TempDir::new().unwrap();
        let one_hour = Duration::from_secs(3600);
        let cache = cache(&dir, temporary_credentials("AKIAFIRST", one_hour));

        let ret = cache.provide_credentials().await.unwrap();

        assert_eq!(ret.access_key_id(), "AKIAFIRST");
        assert!(cache.path().ends_with("sso/cache/dev.json"));

        let data = fs::read_to_string(cache.path()).unwrap();
        let entry: CacheEntry = serde_json::from_str(&data).unwrap();

        assert_eq!(entry.provider_type, "assume-role");
        assert_eq!(entry.credentials.access_key_id, "AKIAFIRST");
        assert_eq!(
            entry.credentials.session_token.as_deref(),
            Some("atestsessiontoken"),
        );
    }

    #[tokio::test]
    async fn test_cache_hit_skips_inner_provider() {
        let dir = TempDir::new().unwrap();
        let one_hour = Duration::from_secs(3600);

        let first = cache(&dir, temporary_credentials("AKIAFIRST", one_hour));
        first.provide_credentials().await.unwrap();

        let second = cache(&dir, temporary_credentials("AKIASECOND", one_hour));
        let ret = second.provide_credentials().await.unwrap();

        assert_eq!(ret.access_key_id(), "AKIAFIRST");
        assert_eq!(ret.session_token(), Some("atestsessiontoken"));
    }

    #[tokio::test]
    async fn test_cache_near_expiry_is_refreshed() {
        let dir = TempDir::new().unwrap();
        let five_minutes = Duration::from_secs(300);
        let one_hour = Duration::from_secs(3600);

        let first = cache(&dir, temporary_credentials("AKIAFIRST", five_minutes));
        first.provide_credentials().await.unwrap();

        let second = cache(&dir, temporary_credentials("AKIASECOND", one_hour));
        let ret = second.provide_credentials().await.unwrap();

        assert_eq!(ret.access_key_id(), "AKIASECOND");
    }

    #[tokio::test]
    async fn test_long_lived_credentials_not_cached() {
        let dir = TempDir::new().unwrap();
        let static_creds = Credentials::new(
            "AKIASTATIC",
            "atestsecretkey",
            None,
            None,
            "test",
        );
        let cache = cache(&dir, static_creds);

        let ret = cache.provide_credentials().await.unwrap();

        assert_eq!(ret.access_key_id(), "AKIASTATIC");
        assert!(!cache.path().exists());
    }

    #[tokio::test]
    async fn test_corrupt_cache_is_ignored() {
        let dir = TempDir::new().unwrap();
        let one_hour = Duration::from_secs(3600);
        let cache = cache(&dir, temporary_credentials("AKIAFRESH", one_hour));

        fs::create_dir_all(cache.path().parent().unwrap()).unwrap();
        fs::write(cache.path(), "{not json").unwrap();

        let ret = cache.provide_credentials().await.unwrap();

        assert_eq!(ret.access_key_id(), "AKIAFRESH");
    }

    #[test]
    fn test_cache_key() {
        let tests = vec![
            ("dev",              "dev"),
            ("my-profile_1",     "my-profile_1"),
            ("../../etc/passwd", "______etc_passwd"),
            ("team prod",        "team_prod"),
        ];

        for (input, expected) in tests {
            assert_eq!(cache_key(input), expected);
        }
    }
}
