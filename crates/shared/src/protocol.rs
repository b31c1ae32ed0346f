use serde::{Deserialize, Serialize};

/// Most focus areas a single submission may claim.
pub const MAX_FOCUSES: usize = 5;

/// Experience ranges offered by the join wizard. Submissions must pick one.
pub const YEARS_EXPERIENCE_OPTIONS: &[&str] = &[
    "Less than a year",
    "1 – 4 years",
    "5 – 9 years",
    "10 – 19 years",
    "More than 20 years",
];

/// Everything the four-step join wizard collects, posted in one piece once
/// the applicant reaches the review step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinSubmission {
    pub name: String,
    pub location: String,
    pub website: String,
    pub focuses: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_suggested: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub years_experience: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct JoinSubmissionReceipt {
    pub submission_id: i64,
}
