use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use shared::protocol::{JoinSubmission, MAX_FOCUSES, YEARS_EXPERIENCE_OPTIONS};
use thiserror::Error;
use url::Url;

pub const FIELD_NAME: &str = "jf_name";
pub const FIELD_LOCATION: &str = "jf_location";
pub const FIELD_WEBSITE: &str = "jf_website";
pub const FIELD_FOCUSES: &str = "jf_focuses";
pub const FIELD_FOCUS_SUGGESTED: &str = "jf_focus_suggested";
pub const FIELD_TITLE: &str = "jf_title";
pub const FIELD_YEARS_EXPERIENCE: &str = "jf_years_experience";

/// Every field the wizard may persist. `clear_all_fields` removes exactly
/// these keys and nothing else.
pub const ALL_STORED_FIELDS: [&str; 7] = [
    FIELD_NAME,
    FIELD_LOCATION,
    FIELD_WEBSITE,
    FIELD_FOCUSES,
    FIELD_FOCUS_SUGGESTED,
    FIELD_TITLE,
    FIELD_YEARS_EXPERIENCE,
];

/// Where in-progress answers live between visits. The sqlite-backed
/// `storage::DraftStore` is the production implementation.
#[async_trait]
pub trait DraftPersistence: Send + Sync {
    async fn get_item(&self, field: &str) -> Result<Option<String>>;
    async fn set_item(&self, field: &str, value: &str) -> Result<()>;
    async fn remove_item(&self, field: &str) -> Result<()>;
}

#[async_trait]
impl<P: DraftPersistence + ?Sized> DraftPersistence for &P {
    async fn get_item(&self, field: &str) -> Result<Option<String>> {
        (**self).get_item(field).await
    }

    async fn set_item(&self, field: &str, value: &str) -> Result<()> {
        (**self).set_item(field, value).await
    }

    async fn remove_item(&self, field: &str) -> Result<()> {
        (**self).remove_item(field).await
    }
}

#[async_trait]
impl DraftPersistence for storage::DraftStore {
    async fn get_item(&self, field: &str) -> Result<Option<String>> {
        storage::DraftStore::get_item(self, field).await
    }

    async fn set_item(&self, field: &str, value: &str) -> Result<()> {
        storage::DraftStore::set_item(self, field, value).await
    }

    async fn remove_item(&self, field: &str) -> Result<()> {
        storage::DraftStore::remove_item(self, field).await
    }
}

/// In-memory drafts for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryDraftStore {
    items: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl DraftPersistence for MemoryDraftStore {
    async fn get_item(&self, field: &str) -> Result<Option<String>> {
        Ok(self.items.lock().expect("draft lock").get(field).cloned())
    }

    async fn set_item(&self, field: &str, value: &str) -> Result<()> {
        self.items
            .lock()
            .expect("draft lock")
            .insert(field.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, field: &str) -> Result<()> {
        self.items.lock().expect("draft lock").remove(field);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    You,
    Work,
    Background,
    Review,
}

impl WizardStep {
    pub const TOTAL: usize = 4;

    pub fn number(self) -> usize {
        match self {
            WizardStep::You => 1,
            WizardStep::Work => 2,
            WizardStep::Background => 3,
            WizardStep::Review => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WizardStep::You => "Who You Are",
            WizardStep::Work => "What You Do",
            WizardStep::Background => "Your Background",
            WizardStep::Review => "Review & Submit",
        }
    }

    pub fn next(self) -> Option<WizardStep> {
        match self {
            WizardStep::You => Some(WizardStep::Work),
            WizardStep::Work => Some(WizardStep::Background),
            WizardStep::Background => Some(WizardStep::Review),
            WizardStep::Review => None,
        }
    }

    pub fn back(self) -> Option<WizardStep> {
        match self {
            WizardStep::You => None,
            WizardStep::Work => Some(WizardStep::You),
            WizardStep::Background => Some(WizardStep::Work),
            WizardStep::Review => Some(WizardStep::Background),
        }
    }
}

/// Everything persisted so far, in one readable snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinDraft {
    pub name: String,
    pub location: String,
    pub website: String,
    pub focuses: Vec<String>,
    pub focus_suggested: Option<String>,
    pub title: Option<String>,
    pub years_experience: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("We need to know what to call you. Name is required.")]
    NameRequired,
    #[error("A location, imprecise or not, is required.")]
    LocationRequired,
    #[error("A website is required; think about a place where people can learn more about you.")]
    WebsiteRequired,
    #[error("That URL looks funny. Please try again.")]
    WebsiteInvalid,
    #[error("Pick at least one focus area.")]
    FocusRequired,
    #[error("Pick at most {0} focus areas.")]
    TooManyFocuses(usize),
    #[error("Years of experience must be one of the offered ranges.")]
    YearsExperienceInvalid,
}

#[derive(Debug, Error)]
pub enum WizardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("draft persistence failed: {0}")]
    Draft(#[from] anyhow::Error),
}

pub fn validate_you(name: &str, location: &str, website: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::NameRequired);
    }
    if location.trim().is_empty() {
        return Err(ValidationError::LocationRequired);
    }
    let website = website.trim();
    if website.is_empty() {
        return Err(ValidationError::WebsiteRequired);
    }
    if !website_looks_valid(website) {
        return Err(ValidationError::WebsiteInvalid);
    }
    Ok(())
}

pub fn validate_work(focuses: &[String]) -> Result<(), ValidationError> {
    let chosen = focuses.iter().filter(|f| !f.trim().is_empty()).count();
    if chosen == 0 {
        return Err(ValidationError::FocusRequired);
    }
    if chosen > MAX_FOCUSES {
        return Err(ValidationError::TooManyFocuses(MAX_FOCUSES));
    }
    Ok(())
}

pub fn validate_background(years_experience: &str) -> Result<(), ValidationError> {
    if !YEARS_EXPERIENCE_OPTIONS.contains(&years_experience.trim()) {
        return Err(ValidationError::YearsExperienceInvalid);
    }
    Ok(())
}

fn website_looks_valid(raw: &str) -> bool {
    match Url::parse(raw) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some(),
        Err(_) => false,
    }
}

/// The guided join flow: four steps, answers persisted after each one so a
/// returning applicant resumes where they left off.
pub struct JoinWizard<P: DraftPersistence> {
    drafts: P,
    step: WizardStep,
}

impl<P: DraftPersistence> JoinWizard<P> {
    pub fn new(drafts: P) -> Self {
        Self {
            drafts,
            step: WizardStep::You,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn back(&mut self) {
        if let Some(previous) = self.step.back() {
            self.step = previous;
        }
    }

    pub async fn load_draft(&self) -> Result<JoinDraft, WizardError> {
        let focuses = match self.drafts.get_item(FIELD_FOCUSES).await? {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_default(),
            None => Vec::new(),
        };
        Ok(JoinDraft {
            name: self.drafts.get_item(FIELD_NAME).await?.unwrap_or_default(),
            location: self
                .drafts
                .get_item(FIELD_LOCATION)
                .await?
                .unwrap_or_default(),
            website: self
                .drafts
                .get_item(FIELD_WEBSITE)
                .await?
                .unwrap_or_default(),
            focuses,
            focus_suggested: self.drafts.get_item(FIELD_FOCUS_SUGGESTED).await?,
            title: self.drafts.get_item(FIELD_TITLE).await?,
            years_experience: self.drafts.get_item(FIELD_YEARS_EXPERIENCE).await?,
        })
    }

    pub async fn save_you(
        &mut self,
        name: &str,
        location: &str,
        website: &str,
    ) -> Result<(), WizardError> {
        validate_you(name, location, website)?;
        self.drafts.set_item(FIELD_NAME, name.trim()).await?;
        self.drafts.set_item(FIELD_LOCATION, location.trim()).await?;
        self.drafts.set_item(FIELD_WEBSITE, website.trim()).await?;
        self.step = WizardStep::Work;
        Ok(())
    }

    pub async fn save_work(
        &mut self,
        focuses: &[String],
        focus_suggested: Option<&str>,
    ) -> Result<(), WizardError> {
        validate_work(focuses)?;
        let kept: Vec<&str> = focuses
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .collect();
        let encoded = serde_json::to_string(&kept).map_err(anyhow::Error::from)?;
        self.drafts.set_item(FIELD_FOCUSES, &encoded).await?;

        match focus_suggested.map(str::trim).filter(|s| !s.is_empty()) {
            Some(suggested) => {
                self.drafts
                    .set_item(FIELD_FOCUS_SUGGESTED, suggested)
                    .await?
            }
            None => self.drafts.remove_item(FIELD_FOCUS_SUGGESTED).await?,
        }
        self.step = WizardStep::Background;
        Ok(())
    }

    pub async fn save_background(
        &mut self,
        title: Option<&str>,
        years_experience: &str,
    ) -> Result<(), WizardError> {
        validate_background(years_experience)?;
        match title.map(str::trim).filter(|s| !s.is_empty()) {
            Some(title) => self.drafts.set_item(FIELD_TITLE, title).await?,
            None => self.drafts.remove_item(FIELD_TITLE).await?,
        }
        self.drafts
            .set_item(FIELD_YEARS_EXPERIENCE, years_experience.trim())
            .await?;
        self.step = WizardStep::Review;
        Ok(())
    }

    /// Assembles the final submission from the stored draft, re-validating
    /// every step so a hand-edited or partial draft cannot slip through.
    pub async fn build_submission(&self) -> Result<JoinSubmission, WizardError> {
        let draft = self.load_draft().await?;
        validate_you(&draft.name, &draft.location, &draft.website)?;
        validate_work(&draft.focuses)?;
        let years_experience = draft
            .years_experience
            .ok_or(ValidationError::YearsExperienceInvalid)?;
        validate_background(&years_experience)?;

        Ok(JoinSubmission {
            name: draft.name,
            location: draft.location,
            website: draft.website,
            focuses: draft.focuses,
            focus_suggested: draft.focus_suggested,
            title: draft.title,
            years_experience,
        })
    }

    pub async fn clear_all_fields(&mut self) -> Result<(), WizardError> {
        for field in ALL_STORED_FIELDS {
            self.drafts.remove_item(field).await?;
        }
        self.step = WizardStep::You;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/wizard_tests.rs"]
mod tests;
