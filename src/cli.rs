// Command line interface parsing
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use clap::{
    crate_authors,
    crate_description,
    crate_name,
    crate_version,
    Arg,
    ArgAction,
    ArgMatches,
    Command,
};
use tracing::debug;

// Create clap app
pub(crate) fn create_app() -> Command {
    debug!("Creating CLI app");

    Command::new(crate_name!())
        .version(crate_version!())
        .author(crate_authors!())
        .about(crate_description!())
        .arg(
            Arg::new("PROFILE")
                .env("AWS_PROFILE")
                .hide_env_values(true)
                .long("profile")
                .short('p')
                .value_name("PROFILE")
                .help("AWS cli profile set in ~/.aws/config file.")
                .action(ArgAction::Set)
        )
        .arg(
            Arg::new("BUCKET")
                .long("bucket")
                .short('b')
                .value_name("BUCKET")
                .help(
                    "Select a specific S3 bucket, if this is not set all \
                     buckets in the AWS account are queried."
                )
                .action(ArgAction::Set)
        )
}

/// Parse the process arguments, exiting with usage on error or `--help`.
pub fn parse_args() -> ArgMatches {
    debug!("Parsing command line arguments");

    create_app().get_matches()
}
