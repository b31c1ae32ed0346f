use anyhow::Result;
use directory::DirectoryStore;
use rand::{rngs::StdRng, Rng, SeedableRng};
use reqwest::Client;
use shared::{
    domain::{FilterCategory, FilterFacet, TechnologistEntry},
    error::{ApiError, ApiException, ErrorCode},
    protocol::{JoinSubmission, JoinSubmissionReceipt},
};
use thiserror::Error;
use tracing::{info, warn};

pub mod wizard;

pub use wizard::{
    DraftPersistence, JoinDraft, JoinWizard, MemoryDraftStore, ValidationError, WizardError,
    WizardStep,
};

#[derive(Debug, Error)]
pub enum JoinSubmitError {
    #[error("failed to reach the directory server: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("the directory server rejected the submission: {0}")]
    Rejected(ApiException),
}

#[derive(Debug, Error)]
pub enum JoinFlowError {
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error(transparent)]
    Submit(#[from] JoinSubmitError),
}

/// Client-side entry point: fetches the roster once per session and owns the
/// directory store the presentation layer reads from.
pub struct DirectoryClient<R: Rng> {
    http: Client,
    server_url: String,
    store: DirectoryStore<R>,
}

impl DirectoryClient<StdRng> {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self::with_rng(server_url, StdRng::from_entropy())
    }
}

impl<R: Rng> DirectoryClient<R> {
    pub fn with_rng(server_url: impl Into<String>, rng: R) -> Self {
        Self {
            http: Client::new(),
            server_url: server_url.into(),
            store: DirectoryStore::with_rng(rng),
        }
    }

    pub fn store(&self) -> &DirectoryStore<R> {
        &self.store
    }

    /// The one-time roster fetch. A transport or decode failure initializes
    /// the store with an empty roster instead of propagating; the directory
    /// renders as loaded-empty rather than crashing. Returns the number of
    /// entries loaded.
    pub async fn load_directory(&mut self) -> usize {
        match self.fetch_roster().await {
            Ok(roster) => {
                let count = roster.len();
                info!(count, "directory roster loaded");
                self.store.initialize(roster);
                count
            }
            Err(error) => {
                warn!(%error, "roster fetch failed; starting with an empty directory");
                self.store.initialize(Vec::new());
                0
            }
        }
    }

    async fn fetch_roster(&self) -> Result<Vec<TechnologistEntry>> {
        let response = self
            .http
            .get(format!("{}/api/technologists", self.server_url))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    pub async fn submit_join(
        &self,
        submission: &JoinSubmission,
    ) -> Result<JoinSubmissionReceipt, JoinSubmitError> {
        let response = self
            .http
            .post(format!("{}/api/join", self.server_url))
            .json(submission)
            .send()
            .await?;

        if !response.status().is_success() {
            let error = match response.json::<ApiError>().await {
                Ok(error) => error,
                Err(_) => ApiError::new(ErrorCode::Internal, "unrecognized error response"),
            };
            return Err(JoinSubmitError::Rejected(error.into()));
        }
        Ok(response.json().await?)
    }

    /// The wizard's final step: build the submission from the stored draft,
    /// post it, and clear the draft once the server accepts. A rejected or
    /// failed post leaves the draft intact for another try.
    pub async fn submit_wizard<P: wizard::DraftPersistence>(
        &self,
        wizard: &mut JoinWizard<P>,
    ) -> Result<JoinSubmissionReceipt, JoinFlowError> {
        let submission = wizard.build_submission().await?;
        let receipt = self.submit_join(&submission).await?;
        wizard.clear_all_fields().await?;
        Ok(receipt)
    }

    pub fn toggle_facet(&mut self, category: FilterCategory, label: &str) {
        self.store.toggle_facet(category, label);
    }

    pub fn clear_filters(&mut self) {
        self.store.clear_filters();
    }

    pub fn open_filter_panel(&mut self, category: FilterCategory) {
        self.store.open_filter_panel(category);
    }

    pub fn close_filter_panel(&mut self) {
        self.store.close_filter_panel();
    }

    pub fn visible(&self) -> Option<&[TechnologistEntry]> {
        self.store.visible()
    }

    pub fn panel_facets(&self) -> Vec<&FilterFacet> {
        self.store.panel_facets()
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
