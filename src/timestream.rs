//! Amazon Timestream wrapper: batch writes to one table and single-value queries.

use crate::api::Error;
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region};
use std::time::Duration;

pub use aws_sdk_timestreamwrite::types::Record;

const MAX_ATTEMPTS: u32 = 10;
const ATTEMPT_TIMEOUT: Duration = Duration::from_secs(20);

fn store_err(error: impl std::fmt::Display) -> Error {
    Error::Store(error.to_string())
}

pub struct Timestream {
    database: String,
    table: String,
    write: aws_sdk_timestreamwrite::Client,
    query: aws_sdk_timestreamquery::Client,
}

impl Timestream {
    /// Connect to Timestream in `region`, credentials come from the default AWS chain.
    ///
    /// Both services need endpoint discovery; the endpoint reload tasks are spawned on
    /// the current tokio runtime.
    pub async fn new(
        database: impl Into<String>,
        table: impl Into<String>,
        region: impl Into<String>,
    ) -> Result<Self, Error> {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.into()))
            .retry_config(RetryConfig::standard().with_max_attempts(MAX_ATTEMPTS))
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_attempt_timeout(ATTEMPT_TIMEOUT)
                    .build(),
            )
            .load()
            .await;

        let (write, write_reload) = aws_sdk_timestreamwrite::Client::new(&sdk_config)
            .with_endpoint_discovery_enabled()
            .await
            .map_err(store_err)?;
        tokio::spawn(write_reload.reload_task());

        let (query, query_reload) = aws_sdk_timestreamquery::Client::new(&sdk_config)
            .with_endpoint_discovery_enabled()
            .await
            .map_err(store_err)?;
        tokio::spawn(query_reload.reload_task());

        Ok(Timestream {
            database: database.into(),
            table: table.into(),
            write,
            query,
        })
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Write `records` in one batch.
    pub async fn save(&self, records: Vec<Record>) -> Result<(), Error> {
        if records.is_empty() {
            log::debug!("nothing to write to {}.{}", self.database, self.table);
            return Ok(());
        }

        log::debug!(
            "writing {} record(s) to {}.{}",
            records.len(),
            self.database,
            self.table
        );

        self.write
            .write_records()
            .database_name(&self.database)
            .table_name(&self.table)
            .set_records(Some(records))
            .send()
            .await
            .map_err(|e| store_err(aws_sdk_timestreamwrite::error::DisplayErrorContext(e)))?;

        Ok(())
    }

    /// Run `query` and return the first column of the first row, `""` if there are no rows.
    pub async fn run_query(&self, query: &str) -> Result<String, Error> {
        log::trace!("query: {}", query);

        let output = self
            .query
            .query()
            .query_string(query)
            .send()
            .await
            .map_err(|e| store_err(aws_sdk_timestreamquery::error::DisplayErrorContext(e)))?;

        Ok(first_scalar(output.rows().iter().map(|row| {
            row.data().iter().map(|datum| datum.scalar_value())
        })))
    }
}

fn first_scalar<'a, R, C>(rows: R) -> String
where
    R: IntoIterator<Item = C>,
    C: IntoIterator<Item = Option<&'a str>>,
{
    rows.into_iter()
        .next()
        .and_then(|row| row.into_iter().next())
        .flatten()
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod test {
    use super::first_scalar;

    #[test]
    fn first_cell_of_first_row() {
        let rows = vec![
            vec![Some("21.5"), Some("2021-01-01 00:00:00")],
            vec![Some("19.0"), Some("2021-01-01 00:05:00")],
        ];
        assert_eq!("21.5", first_scalar(rows));
    }

    #[test]
    fn no_rows_is_empty_string() {
        let rows: Vec<Vec<Option<&str>>> = Vec::new();
        assert_eq!("", first_scalar(rows));
    }

    #[test]
    fn row_without_cells_is_empty_string() {
        assert_eq!("", first_scalar(vec![Vec::<Option<&str>>::new()]));
    }

    #[test]
    fn non_scalar_cell_is_empty_string() {
        assert_eq!("", first_scalar(vec![vec![None, Some("ignored")]]));
    }
}
