//! Sequential batch geocoding over tabular input.

mod io;
mod table;

pub use io::{read_csv, read_table, write_csv, write_table};
pub use table::{BatchRow, Table, RESULT_COLUMNS};

use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::{CountryScope, Credentials};
use crate::resolver::Resolver;

/// Pause between consecutive rows, sized for Nominatim's one request per
/// second policy
pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

/// Row-level progress of a running batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
}

impl BatchProgress {
    /// Completed share in `0.0..=1.0`
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

/// Outcome counts of a batch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub skipped: usize,
}

/// Applies a [`Resolver`] to every row of a [`Table`], one row at a time.
pub struct BatchRunner {
    resolver: Resolver,
    delay: Duration,
}

impl BatchRunner {
    pub fn new(resolver: Resolver) -> Self {
        Self {
            resolver,
            delay: DEFAULT_DELAY,
        }
    }

    /// Override the inter-row pacing delay
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Geocode every row in place.
    ///
    /// Rows with a blank address are skipped without a provider call. Progress
    /// is reported after every row, and the pacing delay is applied between
    /// rows whether or not the previous row was skipped. Only an unknown
    /// `address_field` fails the run.
    pub async fn run<F>(
        &self,
        table: &mut Table,
        address_field: &str,
        scope: &CountryScope,
        credentials: Option<&Credentials>,
        mut on_progress: F,
    ) -> Result<BatchSummary>
    where
        F: FnMut(BatchProgress),
    {
        let column = table
            .column_index(address_field)
            .ok_or_else(|| Error::MissingColumn(address_field.to_string()))?;

        let total = table.len();
        let mut summary = BatchSummary {
            total,
            ..Default::default()
        };

        info!(
            "Starting batch of {} rows (column '{}', scope {})",
            total,
            address_field,
            scope.code()
        );

        for (index, row) in table.rows_mut().iter_mut().enumerate() {
            if index > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            row.set_result(None);

            match row.get(column).filter(|value| !value.trim().is_empty()) {
                None => {
                    debug!("Row {}/{}: blank address, skipping", index + 1, total);
                    summary.skipped += 1;
                }
                Some(address) => {
                    let address = address.to_string();
                    let result = self.resolver.resolve(&address, scope, credentials).await;
                    if result.is_some() {
                        summary.matched += 1;
                    } else {
                        debug!("Row {}/{}: no match for '{}'", index + 1, total, address);
                        summary.unmatched += 1;
                    }
                    row.set_result(result);
                }
            }

            on_progress(BatchProgress {
                completed: index + 1,
                total,
            });
        }

        info!(
            "Batch complete: {} matched, {} unmatched, {} skipped",
            summary.matched, summary.unmatched, summary.skipped
        );

        Ok(summary)
    }
}
