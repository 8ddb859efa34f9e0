// Authentication modes
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while building the client configuration.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// The authentication mode wasn't one of the values we understand.
    #[error("Allowed values for authentication mode are sso or cli, got '{0}'")]
    InvalidAuthMode(String),
}

/// How credentials for the selected profile are obtained.
///
/// The mode also names the on-disk credential cache directory,
/// `~/.aws/<mode>/cache`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum AuthMode {
    /// Interactive federated login (IAM Identity Center / SSO).
    #[default]
    Sso,

    /// Credentials configured directly for the AWS CLI.
    Cli,
}

impl AuthMode {
    /// Return the string form of the mode, as used on disk.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sso => "sso",
            Self::Cli => "cli",
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sso" => Ok(Self::Sso),
            "cli" => Ok(Self::Cli),
            _     => Err(ConfigError::InvalidAuthMode(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_auth_mode_from_str() {
        let tests = vec![
            ("sso", Ok(AuthMode::Sso)),
            ("cli", Ok(AuthMode::Cli)),
            ("SSO", Err(ConfigError::InvalidAuthMode("SSO".into()))),
            ("",    Err(ConfigError::InvalidAuthMode("".into()))),
            ("iam", Err(ConfigError::InvalidAuthMode("iam".into()))),
        ];

        for (input, expected) in tests {
            assert_eq!(AuthMode::from_str(input), expected);
        }
    }

    #[test]
    fn test_auth_mode_cache_name() {
        assert_eq!(AuthMode::default().to_string(), "sso");
        assert_eq!(AuthMode::Cli.as_str(), "cli");
    }
}
