// Authenticated AWS session shared by the S3 and CloudWatch clients
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use aws_config::default_provider::credentials::DefaultCredentialsChain;
use aws_config::profile::{
    Profile,
    ProfileFileCredentialsProvider,
    ProfileFileLoadError,
};
use aws_config::provider_config::ProviderConfig;
use aws_config::{
    BehaviorVersion,
    SdkConfig,
};
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_runtime::env_config::file::EnvConfigFiles;
use aws_types::os_shim_internal::{
    Env,
    Fs,
};
use crate::common::{
    AuthMode,
    ClientConfig,
    Region,
};
use sha2::{
    Digest,
    Sha256,
};
use std::fmt::Write;
use std::path::{
    Path,
    PathBuf,
};
use thiserror::Error;
use tracing::{
    debug,
    info_span,
    Instrument,
    Span,
};

/// On-disk JSON cache for temporary credentials.
mod credential_cache;

pub use credential_cache::JsonFileCache;

/// Cache key used when no profile is selected.
const DEFAULT_CHAIN_CACHE_KEY: &str = "default-chain";

// Profile properties that decide which credentials a profile resolves to.
const CREDENTIAL_PROPERTIES: &[&str] = &[
    "credential_process",
    "credential_source",
    "duration_seconds",
    "external_id",
    "mfa_serial",
    "role_arn",
    "role_session_name",
    "source_profile",
    "sso_account_id",
    "sso_region",
    "sso_role_name",
    "sso_session",
    "sso_start_url",
    "web_identity_token_file",
];

/// Errors that stop a `Session` from being created.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The named profile isn't in the shared config or credentials files.
    #[error("The config profile ({0}) could not be found")]
    ProfileNotFound(String),

    /// The shared config or credentials files couldn't be loaded.
    #[error("Failed to load the shared AWS config files")]
    ProfileFile(#[source] ProfileFileLoadError),
}

/// An authenticated AWS session.
///
/// Created once at startup and lent to the service clients.
pub struct Session {
    sdk_config: SdkConfig,
    profile:    Option<String>,
    region:     Region,
    auth_mode:  AuthMode,
    span:       Span,
}

impl Session {
    /// Return a new `Session` for the profile, region and auth mode in the
    /// given `ClientConfig`.
    pub async fn new(config: &ClientConfig) -> Result<Self, SessionError> {
        let span = info_span!(
            "session",
            profile = config.profile.as_deref().unwrap_or("default"),
            region  = config.region.name(),
            auth    = %config.auth_mode,
        );

        Self::build(config, &Fs::real(), &Env::real(), dirs::home_dir(), span.clone())
            .instrument(span)
            .await
    }

    async fn build(
        config: &ClientConfig,
        fs: &Fs,
        env: &Env,
        home: Option<PathBuf>,
        span: Span,
    ) -> Result<Self, SessionError> {
        let cache_key = match &config.profile {
            Some(profile) => check_profile(fs, env, profile).await?,
            None          => DEFAULT_CHAIN_CACHE_KEY.to_string(),
        };

        let provider_config = provider_config(&config.region);
        let base = base_provider(
            config,
            &provider_config,
            EnvConfigFiles::default(),
        ).await;

        let provider = match home {
            Some(home) => {
                let cache = JsonFileCache::new(
                    cache_dir(&home, config.auth_mode),
                    &cache_key,
                    base,
                );

                debug!("build: Caching credentials in {:?}", cache.path());

                SharedCredentialsProvider::new(cache)
            },
            None => {
                debug!("build: No home directory, credentials won't be cached");

                base
            },
        };

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(config.region.clone())
            .credentials_provider(provider);

        if let Some(profile) = &config.profile {
            loader = loader.profile_name(profile);
        }

        let sdk_config = loader.load().await;

        debug!("build: Session ready");

        Ok(Self {
            sdk_config: sdk_config,
            profile:    config.profile.clone(),
            region:     config.region.clone(),
            auth_mode:  config.auth_mode,
            span:       span,
        })
    }

    /// The SDK configuration that service clients are built from.
    pub fn sdk_config(&self) -> &SdkConfig {
        &self.sdk_config
    }

    /// The span that service clients parent their own spans to.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// The selected profile, if any.
    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    /// The region the session was created in.
    pub fn region(&self) -> &Region {
        &self.region
    }

    /// The authentication mode the session was created with.
    pub fn auth_mode(&self) -> AuthMode {
        self.auth_mode
    }
}

// Provider settings for credential lookups, STS calls made while assuming
// roles need the session region.
fn provider_config(region: &Region) -> ProviderConfig {
    ProviderConfig::default().with_region(Some(region.into()))
}

// Credentials for the named profile, or the default chain without one.
async fn base_provider(
    config: &ClientConfig,
    provider_config: &ProviderConfig,
    profile_files: EnvConfigFiles,
) -> SharedCredentialsProvider {
    match &config.profile {
        Some(profile) => {
            let provider = ProfileFileCredentialsProvider::builder()
                .configure(provider_config)
                .profile_files(profile_files)
                .profile_name(profile)
                .build();

            SharedCredentialsProvider::new(provider)
        },
        None => {
            let provider = DefaultCredentialsChain::builder()
                .configure(provider_config.clone())
                .region(config.region.clone())
                .build()
                .await;

            SharedCredentialsProvider::new(provider)
        },
    }
}

// Profile name plus a digest of its credential settings, so editing the
// profile (a new role_arn, say) stops reusing the old credentials.
fn profile_cache_key(name: &str, profile: &Profile) -> String {
    let mut hasher = Sha256::new();

    for property in CREDENTIAL_PROPERTIES {
        if let Some(value) = profile.get(property) {
            hasher.update(property.as_bytes());
            hasher.update(b"=");
            hasher.update(value.as_bytes());
            hasher.update(b"\n");
        }
    }

    let mut key = format!("{name}-");

    for byte in &hasher.finalize()[..8] {
        let _ = write!(&mut key, "{:02x}", byte);
    }

    key
}

/// Returns the credential cache directory for `auth_mode`,
/// `<home>/.aws/<mode>/cache`.
pub fn cache_dir(home: &Path, auth_mode: AuthMode) -> PathBuf {
    home.join(".aws").join(auth_mode.as_str()).join("cache")
}

/// Ensures that `profile` is defined in the shared config or credentials
/// files, returning the key its credentials are cached under.
pub async fn check_profile(
    fs: &Fs,
    env: &Env,
    profile: &str,
) -> Result<String, SessionError> {
    let profiles = aws_config::profile::load(fs, env, &Default::default(), None)
        .await
        .map_err(SessionError::ProfileFile)?;

    match profiles.get_profile(profile) {
        Some(found) => Ok(profile_cache_key(profile, found)),
        None        => Err(SessionError::ProfileNotFound(profile.to_string())),
    }
}
