// Implements the S3 Client
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use anyhow::{
    Context,
    Result,
};
use aws_sdk_s3::client::Client as S3Client;
use crate::common::BucketNames;
use crate::session::Session;
use tracing::{
    debug,
    debug_span,
    Instrument,
    Span,
};

/// The S3 `Client`.
pub struct Client {
    /// The AWS SDK `S3Client`.
    pub client: S3Client,

    /// Span that this client's calls are logged under.
    pub span: Span,
}

impl Client {
    /// Return a new S3 `Client` using the given `Session`.
    pub fn new(session: &Session) -> Self {
        let span = debug_span!(parent: session.span(), "s3");

        span.in_scope(|| {
            debug!(
                "new: Creating S3Client in region '{}'",
                session.region().name(),
            );
        });

        let client = S3Client::new(session.sdk_config());

        Self {
            client,
            span,
        }
    }

    /// Returns the bucket names in the order the `ListBuckets` API returned
    /// them.
    ///
    /// Only a single page of results is requested.
    pub async fn list_buckets(&self) -> Result<BucketNames> {
        self.fetch_bucket_names()
            .instrument(self.span.clone())
            .await
    }

    async fn fetch_bucket_names(&self) -> Result<BucketNames> {
        debug!("list_buckets: Listing...");

        let output = self.client.list_buckets()
            .send()
            .await
            .context("ListBuckets")?;

        debug!("list_buckets: API returned: {:#?}", output);

        let bucket_names = output.buckets()
            .iter()
            .filter_map(|b| b.name().map(ToOwned::to_owned))
            .collect();

        Ok(bucket_names)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use aws_sdk_s3::config::{
        Config as S3Config,
        Credentials,
        Region,
    };
    use aws_smithy_http_client::test_util::{
        ReplayEvent,
        StaticReplayClient,
    };
    use aws_smithy_types::body::SdkBody;
    use pretty_assertions::assert_eq;

    // Create a mock S3 client, returning `body` with the given `status` for
    // a single request.
    pub fn mock_client(status: u16, body: &str) -> Client {
        let http_client = StaticReplayClient::new(vec![
            ReplayEvent::new(
                http::Request::builder()
                    .body(SdkBody::empty())
                    .unwrap(),

                http::Response::builder()
                    .status(status)
                    .body(SdkBody::from(body.to_string()))
                    .unwrap(),
            ),
        ]);

        let creds = Credentials::new(
            "ATESTCLIENT",
            "atestsecretkey",
            Some("atestsecrettoken".to_string()),
            None,
            "test",
        );

        let conf = S3Config::builder()
            .behavior_version_latest()
            .credentials_provider(creds)
            .http_client(http_client)
            .region(Region::new("ap-southeast-2"))
            .build();

        Client {
            client: S3Client::from_conf(conf),
            span:   Span::none(),
        }
    }

    // S3 tests in other modules import this too.
    pub fn s3_list_buckets() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ListAllMyBucketsResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Owner>
    <ID>1936a5d8a2b189cda450d1d1d514f3861b3adc2df515</ID>
    <DisplayName>aws</DisplayName>
  </Owner>
  <Buckets>
    <Bucket>
      <Name>zebra-bucket</Name>
      <CreationDate>2020-03-12T14:45:00.000Z</CreationDate>
    </Bucket>
    <Bucket>
      <Name>a-bucket-name</Name>
      <CreationDate>2020-03-11T14:45:00.000Z</CreationDate>
    </Bucket>
    <Bucket>
      <Name>another-bucket-name</Name>
      <CreationDate>2020-03-10T14:45:00.000Z</CreationDate>
    </Bucket>
  </Buckets>
</ListAllMyBucketsResult>"#
    }

    #[tokio::test]
    async fn test_list_buckets_keeps_api_order() {
        let client = mock_client(200, s3_list_buckets());

        let ret = client.list_buckets().await.unwrap();

        let expected = vec![
            "zebra-bucket",
            "a-bucket-name",
            "another-bucket-name",
        ];

        assert_eq!(ret, expected);
    }

    #[tokio::test]
    async fn test_list_buckets_access_denied() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<Error>
  <Code>AccessDenied</Code>
  <Message>Access Denied</Message>
</Error>"#;

        let client = mock_client(403, body);

        let ret = client.list_buckets().await;

        assert!(ret.is_err());
    }
}
