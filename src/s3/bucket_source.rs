// Implement the BucketSource trait for the s3::Client
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use anyhow::Result;
use async_trait::async_trait;
use crate::common::{
    BucketNames,
    BucketSource,
};
use super::client::Client;

#[async_trait]
impl BucketSource for Client {
    /// Return every bucket in the account, as listed by S3.
    async fn list_buckets(&self) -> Result<BucketNames> {
        Client::list_buckets(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::select_buckets;
    use crate::s3::client::tests::{
        mock_client,
        s3_list_buckets,
    };
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_select_buckets_from_s3() {
        let client = mock_client(200, s3_list_buckets());

        let ret = select_buckets(&client, None).await.unwrap();

        let expected = vec![
            "zebra-bucket",
            "a-bucket-name",
            "another-bucket-name",
        ];

        assert_eq!(ret, expected);
    }

    #[tokio::test]
    async fn test_select_buckets_explicit_with_s3() {
        // A failing response proves the selected bucket isn't looked up.
        let client = mock_client(500, "");

        let ret = select_buckets(&client, Some("not-a-real-bucket"))
            .await
            .unwrap();

        assert_eq!(ret, vec!["not-a-real-bucket"]);
    }
}
