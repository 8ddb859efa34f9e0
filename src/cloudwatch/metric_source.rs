// Implements the MetricSource trait for CloudWatch Client
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use async_trait::async_trait;
use crate::common::{
    degrade_to_zero,
    MetricSample,
    MetricSource,
    S3Metric,
    Statistic,
};
use super::client::Client;

#[async_trait]
impl MetricSource for Client {
    /// Query CloudWatch for `metric`, reporting `MetricSample::ZERO` when
    /// there's no datapoint or the query fails.
    async fn get_metric(
        &self,
        bucket: &str,
        metric: S3Metric,
        statistic: Statistic,
    ) -> MetricSample {
        let reading = self.get_metric_reading(bucket, metric, statistic).await;

        degrade_to_zero(reading)
    }
}
