// ClientConfig
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use super::{
    AuthMode,
    ConfigError,
    Region,
};
use std::str::FromStr;

/// Environment variable selecting the `AuthMode`.
pub const AUTH_MODE_ENV: &str = "S3_BUCKET_METRICS_AUTH";

/// Client configuration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClientConfig {
    /// The bucket name that should be reported on.
    ///
    /// If this isn't given, all buckets in the account are reported.
    pub bucket_name: Option<String>,

    /// Named profile from the shared AWS config files.
    ///
    /// `None` leaves credential resolution to the SDK's default chain.
    pub profile: Option<String>,

    /// The region that our AWS clients should be created in.
    pub region: Region,

    /// How credentials for `profile` are obtained.
    pub auth_mode: AuthMode,
}

impl ClientConfig {
    /// Returns a new `ClientConfig`.
    ///
    /// Empty `profile` and `bucket_name` values are treated as not given.
    /// An `auth_mode` other than `sso` or `cli` is rejected.
    pub fn new(
        profile: Option<String>,
        bucket_name: Option<String>,
        auth_mode: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let auth_mode = match auth_mode {
            Some(mode) => AuthMode::from_str(mode)?,
            None       => AuthMode::default(),
        };

        Ok(Self {
            bucket_name: bucket_name.filter(|b| !b.is_empty()),
            profile:     profile.filter(|p| !p.is_empty()),
            region:      Region::new(),
            auth_mode:   auth_mode,
        })
    }
}
