// Implement the CloudWatch Client
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use anyhow::{
    Context,
    Result,
};
use aws_sdk_cloudwatch::client::Client as CloudWatchClient;
use aws_sdk_cloudwatch::operation::get_metric_statistics::GetMetricStatisticsOutput;
use aws_sdk_cloudwatch::primitives::DateTime;
use aws_sdk_cloudwatch::types::{
    Datapoint,
    Dimension,
    Statistic as CloudWatchStatistic,
};
use crate::common::{
    MetricReading,
    MetricSample,
    S3Metric,
    Statistic,
};
use crate::session::Session;
use std::time::{
    Duration,
    SystemTime,
};
use tracing::{
    debug,
    debug_span,
    Instrument,
    Span,
};

const ONE_DAY: Duration = Duration::from_secs(86_400);

// Number of days of datapoints requested, ending now.
const LOOKBACK_DAYS: u32 = 2;

const S3_NAMESPACE: &str = "AWS/S3";

/// A `CloudWatch` `Client`
pub struct Client {
    /// The AWS SDK `CloudWatchClient`.
    pub client: CloudWatchClient,

    /// Span that this client's calls are logged under.
    pub span: Span,
}

impl Client {
    /// Return a new `Client` using the given `Session`.
    pub fn new(session: &Session) -> Self {
        let span = debug_span!(parent: session.span(), "cloudwatch");

        span.in_scope(|| {
            debug!(
                "new: Creating CloudWatchClient in region '{}'",
                session.region().name(),
            );
        });

        let client = CloudWatchClient::new(session.sdk_config());

        Self {
            client,
            span,
        }
    }

    /// Queries `metric` for `bucket` over the last two days with a one day
    /// period.
    ///
    /// Every call takes its own "now", so consecutive queries can cover
    /// slightly different windows.
    pub async fn get_metric_statistics(
        &self,
        bucket: &str,
        metric: S3Metric,
        statistic: Statistic,
    ) -> Result<GetMetricStatisticsOutput> {
        self.fetch_metric_statistics(bucket, metric, statistic)
            .instrument(self.span.clone())
            .await
    }

    async fn fetch_metric_statistics(
        &self,
        bucket: &str,
        metric: S3Metric,
        statistic: Statistic,
    ) -> Result<GetMetricStatisticsOutput> {
        debug!(
            "get_metric_statistics: {} ({}) for '{}'",
            metric.name,
            metric.storage_type,
            bucket,
        );

        let now = SystemTime::now();
        let start_time = DateTime::from(now - (ONE_DAY * LOOKBACK_DAYS));

        let period = i32::try_from(ONE_DAY.as_secs())
            .context("period")?;

        let dimensions = vec![
            Dimension::builder()
                .name("BucketName")
                .value(bucket)
                .build(),
            Dimension::builder()
                .name("StorageType")
                .value(metric.storage_type)
                .build(),
        ];

        let input = self.client.get_metric_statistics()
            .end_time(DateTime::from(now))
            .metric_name(metric.name)
            .namespace(S3_NAMESPACE)
            .period(period)
            .set_dimensions(Some(dimensions))
            .start_time(start_time)
            .statistics(CloudWatchStatistic::from(statistic.as_str()));

        debug!("{:?}", input);

        let output = input
            .send()
            .await
            .with_context(|| format!("GetMetricStatistics for '{bucket}'"))?;

        debug!("get_metric_statistics: API returned: {:#?}", output);

        Ok(output)
    }

    /// Returns the reading for `metric` on `bucket`, see
    /// `reading_from_output`.
    pub async fn get_metric_reading(
        &self,
        bucket: &str,
        metric: S3Metric,
        statistic: Statistic,
    ) -> Result<MetricReading> {
        let output = self.get_metric_statistics(bucket, metric, statistic)
            .await?;

        Ok(reading_from_output(&output, statistic))
    }
}

// Picks the field of the datapoint holding `statistic`.
fn datapoint_value(datapoint: &Datapoint, statistic: Statistic) -> Option<f64> {
    match statistic {
        Statistic::Sum => datapoint.sum(),
    }
}

/// Turns the first datapoint of `output` into a `MetricReading`.
///
/// No datapoints, or a first datapoint without a value for `statistic`,
/// is `MetricReading::NoData`.
pub fn reading_from_output(
    output: &GetMetricStatisticsOutput,
    statistic: Statistic,
) -> MetricReading {
    let Some(datapoint) = output.datapoints().first() else {
        return MetricReading::NoData;
    };

    match datapoint_value(datapoint, statistic) {
        Some(value) => {
            let sample = MetricSample {
                value: value,
                unit:  datapoint.unit().map(|u| u.as_str().to_string()),
            };

            MetricReading::Sample(sample)
        },
        None => MetricReading::NoData,
    }
}
