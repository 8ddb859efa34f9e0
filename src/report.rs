// Bucket metrics report
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use crate::common::MetricSource;
use prettytable::format::{
    FormatBuilder,
    LinePosition,
    LineSeparator,
    TableFormat,
};
use prettytable::{
    row,
    Table,
};
use tracing::debug;

const TITLE: &str = "S3 bucket metrics";

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// One line of the report.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReportRow {
    /// Name of the bucket.
    pub bucket: String,

    /// Bytes in STANDARD storage.
    pub size_bytes: u64,

    /// Number of objects.
    pub object_count: u64,
}

/// Running sums over all report rows.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Totals {
    /// Sum of `ReportRow::size_bytes`.
    pub size_bytes: u64,

    /// Sum of `ReportRow::object_count`.
    pub object_count: u64,
}

impl Totals {
    fn add(&mut self, row: &ReportRow) {
        self.size_bytes   = self.size_bytes.saturating_add(row.size_bytes);
        self.object_count = self.object_count.saturating_add(row.object_count);
    }

    /// Total size in gibibytes.
    pub fn size_gib(&self) -> f64 {
        self.size_bytes as f64 / BYTES_PER_GIB
    }
}

/// Size and object count for a list of buckets.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Report {
    rows:   Vec<ReportRow>,
    totals: Totals,
}

impl Report {
    /// Builds the report by querying `metrics` for each of `buckets`, one
    /// bucket at a time.
    ///
    /// Rows keep the order of `buckets`.
    pub async fn build<M>(metrics: &M, buckets: &[String]) -> Self
    where
        M: MetricSource + Sync + ?Sized,
    {
        let mut report = Self::default();

        for bucket in buckets {
            let size  = metrics.bucket_size(bucket).await;
            let count = metrics.object_count(bucket).await;

            debug!(
                "build: '{}' size {:?}, count {:?}",
                bucket,
                size,
                count,
            );

            report.push(ReportRow {
                bucket:       bucket.to_owned(),
                size_bytes:   size.as_u64(),
                object_count: count.as_u64(),
            });
        }

        report
    }

    /// Appends `row` and adds it to the totals.
    pub fn push(&mut self, row: ReportRow) {
        self.totals.add(&row);
        self.rows.push(row);
    }

    /// Rows in the order they were added.
    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// Totals over all rows.
    pub fn totals(&self) -> Totals {
        self.totals
    }

    // Column table with separators only around the header row.
    fn table_format() -> TableFormat {
        let separator = LineSeparator::new('-', '+', '+', '+');

        FormatBuilder::new()
            .column_separator('|')
            .borders('|')
            .separators(
                &[LinePosition::Top, LinePosition::Title, LinePosition::Bottom],
                separator,
            )
            .padding(1, 1)
            .build()
    }

    fn render_table(&self) -> String {
        let mut table = Table::new();
        table.set_format(Self::table_format());

        table.set_titles(row![c => "Bucket name", "Size [Bytes]", "Object count"]);

        for row in self.rows() {
            table.add_row(row![
                row.bucket,
                r -> row.size_bytes,
                r -> row.object_count
            ]);
        }

        let table = table.to_string();

        // Title box spanning the full width of the table.
        let width = table.lines()
            .next()
            .map(|line| line.chars().count())
            .unwrap_or(0)
            .max(TITLE.len() + 4);
        let inner = width - 2;

        format!(
            "+{border}+\n|{TITLE:^inner$}|\n{table}",
            border = "-".repeat(inner),
        )
    }

    /// Renders the titled table followed by the grand totals.
    pub fn render(&self) -> String {
        let totals = self.totals();

        let mut out = self.render_table();

        if !out.ends_with('\n') {
            out.push('\n');
        }

        out.push_str("\nGrand total:\n\n");
        out.push_str(&format!(
            "Storage space used (GB).: {:.2}\n",
            totals.size_gib(),
        ));
        out.push_str(&format!(
            "Objects count...........: {}\n",
            totals.object_count,
        ));

        out
    }
}
