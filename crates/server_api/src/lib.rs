use shared::{
    domain::TechnologistEntry,
    error::{ApiError, ErrorCode},
    protocol::{JoinSubmission, MAX_FOCUSES, YEARS_EXPERIENCE_OPTIONS},
};
use storage::Storage;
use tracing::{info, warn};
use url::Url;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

const MAX_TEXT_FIELD_BYTES: usize = 120;
const MAX_WEBSITE_BYTES: usize = 500;

pub async fn list_technologists(ctx: &ApiContext) -> Result<Vec<TechnologistEntry>, ApiError> {
    let members = ctx.storage.list_members().await.map_err(internal)?;

    let mut entries = Vec::with_capacity(members.len());
    for member in members {
        let link = match Url::parse(&member.link) {
            Ok(link) => link,
            Err(error) => {
                warn!(
                    member_id = member.member_id,
                    %error,
                    "skipping member with unparseable link"
                );
                continue;
            }
        };
        entries.push(TechnologistEntry {
            name: member.name,
            role: member.role,
            region: member.region,
            location: member.location,
            link,
            order: member.sort_order,
            featured: member.featured,
        });
    }
    Ok(entries)
}

pub async fn submit_join(ctx: &ApiContext, submission: &JoinSubmission) -> Result<i64, ApiError> {
    validate_submission(submission)?;
    let submission_id = ctx
        .storage
        .insert_join_submission(submission)
        .await
        .map_err(internal)?;
    info!(submission_id, name = %submission.name, "join submission accepted");
    Ok(submission_id)
}

pub fn validate_submission(submission: &JoinSubmission) -> Result<(), ApiError> {
    let name = submission.name.trim();
    if name.is_empty() {
        return Err(validation(
            "We need to know what to call you. Name is required.",
        ));
    }
    if name.len() > MAX_TEXT_FIELD_BYTES {
        return Err(validation("Name is too long."));
    }

    let location = submission.location.trim();
    if location.is_empty() {
        return Err(validation("A location, imprecise or not, is required."));
    }
    if location.len() > MAX_TEXT_FIELD_BYTES {
        return Err(validation("Location is too long."));
    }

    let website = submission.website.trim();
    if website.is_empty() {
        return Err(validation(
            "A website is required; think about a place where people can learn more about you.",
        ));
    }
    if website.len() > MAX_WEBSITE_BYTES {
        return Err(validation("Website address is too long."));
    }
    parse_website(website)?;

    if submission.focuses.is_empty() {
        return Err(validation("Pick at least one focus area."));
    }
    if submission.focuses.len() > MAX_FOCUSES {
        return Err(validation(format!(
            "Pick at most {MAX_FOCUSES} focus areas."
        )));
    }
    if submission.focuses.iter().any(|focus| focus.trim().is_empty()) {
        return Err(validation("Focus areas cannot be blank."));
    }

    if let Some(title) = submission.title.as_deref() {
        if title.len() > MAX_TEXT_FIELD_BYTES {
            return Err(validation("Title is too long."));
        }
    }

    if !YEARS_EXPERIENCE_OPTIONS.contains(&submission.years_experience.as_str()) {
        return Err(validation(
            "Years of experience must be one of the offered ranges.",
        ));
    }

    Ok(())
}

pub fn parse_website(raw: &str) -> Result<Url, ApiError> {
    let parsed = Url::parse(raw.trim())
        .map_err(|_| validation("That URL looks funny. Please try again."))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(validation("That URL looks funny. Please try again."));
    }
    Ok(parsed)
}

fn validation(message: impl Into<String>) -> ApiError {
    ApiError::new(ErrorCode::Validation, message)
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, err.to_string())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
