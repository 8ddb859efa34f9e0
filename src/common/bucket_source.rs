// BucketSource trait
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use anyhow::Result;
use async_trait::async_trait;
use super::BucketNames;
use tracing::debug;

/// `BucketSource` represents something that can list the S3 buckets in an
/// account.
#[async_trait]
pub trait BucketSource {
    /// Returns the bucket names in the order the service returned them.
    async fn list_buckets(&self) -> Result<BucketNames>;
}

/// Returns the working set of buckets to report on.
///
/// An explicitly selected bucket is returned as-is without asking `source`
/// whether it exists. Otherwise every bucket from `source` is returned in
/// listing order.
pub async fn select_buckets<S>(
    source: &S,
    bucket_name: Option<&str>,
) -> Result<BucketNames>
where
    S: BucketSource + Sync + ?Sized,
{
    if let Some(bucket_name) = bucket_name {
        debug!("select_buckets: Using selected bucket '{}'", bucket_name);

        return Ok(vec![bucket_name.to_string()]);
    }

    let bucket_names = source.list_buckets().await?;

    debug!("select_buckets: Found {} buckets", bucket_names.len());

    Ok(bucket_names)
}
