// MetricSource trait and the metric types it deals in
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

/// A CloudWatch S3 storage metric and the `StorageType` dimension it is
/// queried with.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct S3Metric {
    /// CloudWatch metric name.
    pub name: &'static str,

    /// Value of the `StorageType` dimension.
    pub storage_type: &'static str,
}

impl S3Metric {
    /// Bytes stored in the STANDARD storage class.
    pub const BUCKET_SIZE_BYTES: Self = Self {
        name:         "BucketSizeBytes",
        storage_type: "StandardStorage",
    };

    /// Number of objects across all storage classes.
    pub const NUMBER_OF_OBJECTS: Self = Self {
        name:         "NumberOfObjects",
        storage_type: "AllStorageTypes",
    };
}

/// Aggregation applied to the datapoints in the query window.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Statistic {
    /// Total of all datapoint values.
    #[default]
    Sum,
}

impl Statistic {
    /// CloudWatch name of the statistic.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sum => "Sum",
        }
    }
}

/// A single metric value and its unit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetricSample {
    /// Non-negative metric value.
    pub value: f64,

    /// Unit label as reported by CloudWatch, if any.
    pub unit: Option<String>,
}

impl MetricSample {
    /// The sample reported when no datapoint could be obtained.
    pub const ZERO: Self = Self {
        value: 0.0,
        unit:  None,
    };

    /// Returns the value truncated to a whole number.
    pub fn as_u64(&self) -> u64 {
        // Float to int casts saturate, negatives and NaN become 0.
        self.value as u64
    }
}

/// Outcome of a successful metric query.
#[derive(Clone, Debug, PartialEq)]
pub enum MetricReading {
    /// A datapoint was found in the query window.
    Sample(MetricSample),

    /// The query window held no usable datapoint.
    NoData,
}

impl MetricReading {
    /// Normalizes the reading into a sample, `NoData` becoming
    /// `MetricSample::ZERO`.
    pub fn into_sample(self) -> MetricSample {
        match self {
            Self::Sample(sample) => sample,
            Self::NoData         => MetricSample::ZERO,
        }
    }
}

/// Collapses a metric fetch into a sample.
///
/// This is deliberately lossy: a failed query and an empty query window
/// both produce `MetricSample::ZERO`, so callers can't tell the two apart.
pub fn degrade_to_zero(reading: Result<MetricReading>) -> MetricSample {
    match reading {
        Ok(reading) => reading.into_sample(),
        Err(e)      => {
            debug!("degrade_to_zero: Metric fetch failed: {:#}", e);

            MetricSample::ZERO
        },
    }
}

/// `MetricSource` represents something that can answer S3 storage metric
/// queries for a bucket.
#[async_trait]
pub trait MetricSource {
    /// Returns `metric` for `bucket` aggregated by `statistic`.
    ///
    /// This never fails, see `degrade_to_zero`.
    async fn get_metric(
        &self,
        bucket: &str,
        metric: S3Metric,
        statistic: Statistic,
    ) -> MetricSample;

    /// Returns the STANDARD storage size of `bucket` in bytes.
    async fn bucket_size(&self, bucket: &str) -> MetricSample {
        self.get_metric(bucket, S3Metric::BUCKET_SIZE_BYTES, Statistic::Sum)
            .await
    }

    /// Returns the number of objects in `bucket`.
    async fn object_count(&self, bucket: &str) -> MetricSample {
        self.get_metric(bucket, S3Metric::NUMBER_OF_OBJECTS, Statistic::Sum)
            .await
    }
}
