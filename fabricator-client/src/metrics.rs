//! The six record counts shown on the landing view.
//!
//! Every count is fetched on its own and published as soon as it lands. A
//! failed or pending count renders as unknown and never holds back the
//! others, and no relation between the counts is assumed.

use std::sync::Arc;

use futures::{StreamExt, stream::FuturesUnordered};
use shared::models::{AuthToken, CountMetric, CountScope, EntityKind};
use tokio::sync::watch;
use tracing::debug;

use crate::api::Backend;

/// Fetch status of a single count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountStatus {
    /// The fetch has not finished.
    Pending,
    /// The backend answered with this count.
    Ready(u64),
    /// The fetch failed; rendered as unknown.
    Unavailable,
}

impl CountStatus {
    /// The count, if it loaded.
    #[must_use]
    pub const fn value(self) -> Option<u64> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Pending | Self::Unavailable => None,
        }
    }
}

/// One row of the records table: generated, defined, all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountRow {
    /// Entity the row counts.
    pub entity: EntityKind,
    /// Records created by initialize.
    pub generated: CountStatus,
    /// Records created by users.
    pub defined: CountStatus,
    /// All records.
    pub all: CountStatus,
}

/// Latest status of every count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsBoard {
    entries: Vec<(CountMetric, CountStatus)>,
}

impl Default for MetricsBoard {
    fn default() -> Self {
        Self {
            entries: CountMetric::all()
                .map(|metric| (metric, CountStatus::Pending))
                .collect(),
        }
    }
}

impl MetricsBoard {
    /// Status of one count.
    #[must_use]
    pub fn status(&self, metric: CountMetric) -> CountStatus {
        self.entries
            .iter()
            .find(|(candidate, _)| *candidate == metric)
            .map_or(CountStatus::Pending, |(_, status)| *status)
    }

    /// Loaded value of one count.
    #[must_use]
    pub fn get(&self, entity: EntityKind, scope: CountScope) -> Option<u64> {
        self.status(CountMetric::new(entity, scope)).value()
    }

    /// Replaces the status of one count.
    pub fn set(&mut self, metric: CountMetric, status: CountStatus) {
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|(candidate, _)| *candidate == metric)
        {
            entry.1 = status;
        }
    }

    /// Users row first, then items.
    #[must_use]
    pub fn rows(&self) -> Vec<CountRow> {
        [EntityKind::User, EntityKind::Item]
            .into_iter()
            .map(|entity| CountRow {
                entity,
                generated: self.status(CountMetric::new(entity, CountScope::Generated)),
                defined: self.status(CountMetric::new(entity, CountScope::Defined)),
                all: self.status(CountMetric::new(entity, CountScope::All)),
            })
            .collect()
    }

    /// Whether no count is still pending.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.entries
            .iter()
            .all(|(_, status)| *status != CountStatus::Pending)
    }

    /// Fetches all six counts concurrently and writes each into `board` as
    /// it completes.
    pub async fn fetch_into(
        backend: &Arc<dyn Backend>,
        token: Option<&AuthToken>,
        board: &watch::Sender<Self>,
    ) {
        let mut fetches: FuturesUnordered<_> = CountMetric::all()
            .map(|metric| async move {
                let status = match backend.count(token, metric).await {
                    Ok(value) => CountStatus::Ready(value),
                    Err(err) => {
                        debug!(metric = %metric.label(), error = %err, "count unavailable");
                        CountStatus::Unavailable
                    }
                };
                (metric, status)
            })
            .collect();

        while let Some((metric, status)) = fetches.next().await {
            board.send_modify(|board| board.set(metric, status));
        }
    }
}
