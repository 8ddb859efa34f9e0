// s3-bucket-metrics: Report the size and object count of AWS S3 buckets.
#![forbid(unsafe_code)]
use anyhow::{
    Context,
    Result,
};
use clap::ArgMatches;
use std::env;
use std::process::ExitCode;
use tracing::{
    debug,
    error,
};
use tracing_subscriber::EnvFilter;

mod cli;
mod cloudwatch;
mod common;
mod report;
mod s3;
mod session;

use common::{
    select_buckets,
    with_spinner,
    ClientConfig,
    AUTH_MODE_ENV,
};
use report::Report;
use session::Session;

// Environment variable holding the tracing filter.
const LOG_ENV: &str = "S3_BUCKET_METRICS_LOG";

// Exit code for fatal errors, -1 as seen by the shell.
const EXIT_FAILURE: u8 = 255;

const SPINNER_MESSAGE: &str = "Processing your query";

// Logs go to stderr so they don't interleave with the report.
fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// Build the client config from the command line and the auth mode taken
// from the environment.
fn client_config(
    matches: &ArgMatches,
    auth_mode: Option<&str>,
) -> Result<ClientConfig> {
    let profile     = matches.get_one::<String>("PROFILE").cloned();
    let bucket_name = matches.get_one::<String>("BUCKET").cloned();

    let config = ClientConfig::new(profile, bucket_name, auth_mode)?;

    debug!("client_config: {:?}", config);

    Ok(config)
}

// Collect metrics for the selected buckets.
async fn build_report(config: &ClientConfig) -> Result<Report> {
    let session = Session::new(config).await?;

    debug!(
        "build_report: Using profile {:?} with {} authentication",
        session.profile(),
        session.auth_mode(),
    );

    let s3_client = s3::Client::new(&session);

    let bucket_names = select_buckets(&s3_client, config.bucket_name.as_deref())
        .await
        .context("Failed to list buckets")?;

    let cloudwatch_client = cloudwatch::Client::new(&session);

    let report = Report::build(&cloudwatch_client, &bucket_names).await;

    Ok(report)
}

async fn run(matches: &ArgMatches, auth_mode: Option<&str>) -> Result<()> {
    let config = client_config(matches, auth_mode)?;

    let report = with_spinner(SPINNER_MESSAGE, build_report(&config)).await?;

    println!("\n");
    print!("{}", report.render());

    Ok(())
}

// Process exit status for the outcome of `run`, logging any error.
fn exit_status(result: &Result<()>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            error!("{:#}", e);

            EXIT_FAILURE
        },
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_logging();

    let matches   = cli::parse_args();
    let auth_mode = env::var(AUTH_MODE_ENV).ok();

    let result = run(&matches, auth_mode.as_deref()).await;

    ExitCode::from(exit_status(&result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::ConfigError;
    use pretty_assertions::assert_eq;
    use session::SessionError;

    fn matches(args: &[&str]) -> ArgMatches {
        let mut argv = vec!["s3-bucket-metrics"];
        argv.extend_from_slice(args);

        cli::create_app().try_get_matches_from(argv).unwrap()
    }

    #[tokio::test]
    async fn test_run_invalid_auth_mode() {
        let matches = matches(&["--bucket", "a-bucket"]);

        let ret = run(&matches, Some("saml")).await;

        match ret.as_ref().map_err(|e| e.downcast_ref::<ConfigError>()) {
            Err(Some(ConfigError::InvalidAuthMode(mode))) => {
                assert_eq!(mode, "saml");
            },
            other => panic!("unexpected result: {other:?}"),
        }

        assert_eq!(exit_status(&ret), EXIT_FAILURE);
    }

    #[tokio::test]
    async fn test_run_unknown_profile() {
        let profile = "s3-bucket-metrics-missing-profile";
        let matches = matches(&["--profile", profile, "--bucket", "a-bucket"]);

        let ret = run(&matches, Some("cli")).await;

        let err = ret.as_ref().unwrap_err();

        assert!(matches!(
            err.downcast_ref::<SessionError>(),
            Some(SessionError::ProfileNotFound(_)),
        ));
        assert_eq!(exit_status(&ret), 255);
    }

    #[test]
    fn test_exit_status_success() {
        assert_eq!(exit_status(&Ok(())), 0);
    }
}
