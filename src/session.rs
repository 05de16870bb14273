//! Search session: one query, one results container, ordered submissions.
//!
//! Every submission takes a ticket from a monotonically increasing sequence.
//! When its response arrives, results are appended only if no newer
//! submission has started since; otherwise they are dropped. Overlapping
//! requests therefore never leave older results on screen after newer ones.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::client::ImageSearch;
use crate::error::Result;
use crate::query::{FormState, SearchQuery};
use crate::render::{render, AssetResolver, ResultsContainer};
use crate::share::build_share_link;

/// Sequence number of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestTicket(u64);

/// What happened to a submission's response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Results were rendered into the container.
    Applied { records: usize, appended: usize },
    /// A newer submission started first; the response was discarded.
    Stale,
}

struct SessionState {
    query: SearchQuery,
    results: ResultsContainer,
}

pub struct SearchSession {
    state: Mutex<SessionState>,
    sequence: AtomicU64,
    assets: AssetResolver,
}

impl SearchSession {
    pub fn new(query: SearchQuery, assets: AssetResolver) -> Self {
        Self {
            state: Mutex::new(SessionState {
                query,
                results: ResultsContainer::new(),
            }),
            sequence: AtomicU64::new(0),
            assets,
        }
    }

    /// Issue the next ticket. It supersedes every earlier one.
    pub fn begin(&self) -> RequestTicket {
        RequestTicket(self.sequence.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.sequence.load(Ordering::SeqCst) == ticket.0
    }

    /// Snapshot of the current query.
    pub async fn query(&self) -> SearchQuery {
        self.state.lock().await.query.clone()
    }

    /// Update the query from `form`, run it against `backend` and append the
    /// results if this is still the latest submission.
    ///
    /// Errors from a superseded request are logged and reported as stale.
    pub async fn submit<S>(&self, backend: &S, form: &FormState) -> Result<SubmitOutcome>
    where
        S: ImageSearch + ?Sized,
    {
        let (query, ticket) = {
            let mut state = self.state.lock().await;
            state.query.update(form);
            (state.query.clone(), self.begin())
        };
        self.run(backend, query, ticket).await
    }

    /// Run the query as it stands, without reading a form.
    pub async fn submit_current<S>(&self, backend: &S) -> Result<SubmitOutcome>
    where
        S: ImageSearch + ?Sized,
    {
        let (query, ticket) = {
            let state = self.state.lock().await;
            (state.query.clone(), self.begin())
        };
        self.run(backend, query, ticket).await
    }

    async fn run<S>(&self, backend: &S, query: SearchQuery, ticket: RequestTicket) -> Result<SubmitOutcome>
    where
        S: ImageSearch + ?Sized,
    {
        debug!("Submitting search {:?}", ticket);

        let records = match backend.search(&query).await {
            Ok(records) => records,
            Err(e) if !self.is_current(ticket) => {
                warn!("Superseded search {:?} failed: {}", ticket, e);
                return Ok(SubmitOutcome::Stale);
            }
            Err(e) => return Err(e),
        };

        let mut state = self.state.lock().await;
        if !self.is_current(ticket) {
            debug!(
                "Discarding {} records from stale search {:?}",
                records.len(),
                ticket
            );
            return Ok(SubmitOutcome::Stale);
        }

        let appended = render(&mut state.results, &records, &self.assets);
        Ok(SubmitOutcome::Applied {
            records: records.len(),
            appended,
        })
    }

    /// Refresh the query from `form` and build its deep link.
    pub async fn share_link(&self, origin: &str, form: &FormState) -> Result<String> {
        let mut state = self.state.lock().await;
        state.query.update(form);
        build_share_link(origin, &state.query)
    }

    pub async fn results_html(&self) -> String {
        self.state.lock().await.results.to_html()
    }

    pub async fn result_count(&self) -> usize {
        self.state.lock().await.results.len()
    }

    /// Drop rendered results; the next submission starts from empty.
    pub async fn clear_results(&self) {
        self.state.lock().await.results.clear();
    }
}
