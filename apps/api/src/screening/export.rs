//! Profile export: the structured record of a screening session, optional
//! anonymization, and the on-disk store for completed interviews.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::screening::driver::{QuestionResponse, Session, TranscriptMessage};
use crate::screening::profile::CandidateProfile;
use crate::screening::question_selector::QuestionOrigin;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileExport {
    pub session_id: Uuid,
    pub candidate_info: CandidateProfile,
    pub tech_stack: Vec<String>,
    pub questions: Vec<String>,
    pub question_origin: Option<QuestionOrigin>,
    pub responses: Vec<QuestionResponse>,
    pub answered_questions: usize,
    pub skipped_questions: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transcript: Vec<TranscriptMessage>,
    pub session_date: DateTime<Utc>,
    pub duration_seconds: i64,
}

impl ProfileExport {
    pub fn from_session(session: &Session, now: DateTime<Utc>) -> Self {
        Self {
            session_id: session.id,
            candidate_info: session.profile.clone(),
            tech_stack: session.tech_stack.clone(),
            questions: session.questions.clone(),
            question_origin: session.question_origin,
            responses: session.responses.clone(),
            answered_questions: session.answered_questions,
            skipped_questions: session.skipped_questions,
            transcript: session.transcript.clone(),
            session_date: now,
            duration_seconds: (now - session.started_at).num_seconds().max(0),
        }
    }

    /// Masks name, email and phone. The transcript is dropped since it
    /// repeats those fields verbatim.
    pub fn anonymize(mut self) -> Self {
        let info = &mut self.candidate_info;
        info.name = info.name.as_deref().map(mask_name);
        info.email = info.email.as_deref().map(mask_email);
        info.phone = info.phone.as_deref().map(mask_phone);
        self.transcript.clear();
        self
    }
}

/// "Jane Doe" → "JD****"
fn mask_name(name: &str) -> String {
    let initials: String = name
        .split_whitespace()
        .filter_map(|part| part.chars().next())
        .collect();
    format!("{initials}****")
}

/// "jane@x.co" → "j**e@x.co"; local parts of two characters or fewer are kept.
fn mask_email(email: &str) -> String {
    let Some((local, domain)) = email.split_once('@') else {
        return email.to_string();
    };
    let chars: Vec<char> = local.chars().collect();
    if chars.len() <= 2 {
        return email.to_string();
    }
    let masked: String = std::iter::once(chars[0])
        .chain(std::iter::repeat('*').take(chars.len() - 2))
        .chain(std::iter::once(chars[chars.len() - 1]))
        .collect();
    format!("{masked}@{domain}")
}

/// Keeps the last four characters.
fn mask_phone(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    if chars.len() <= 4 {
        return phone.to_string();
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{visible}", "*".repeat(chars.len() - 4))
}

/// File-name-safe slug of the candidate name.
fn name_slug(name: Option<&str>) -> String {
    let slug: String = name
        .unwrap_or("anonymous")
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    if slug.chars().all(|c| c == '_') {
        "anonymous".to_string()
    } else {
        slug
    }
}

/// JSON files of completed interviews, one per session.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    data_dir: PathBuf,
}

impl ProfileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Writes `<name>_<timestamp>_<session>.json` and returns its path.
    pub async fn save(&self, export: &ProfileExport) -> Result<PathBuf, AppError> {
        tokio::fs::create_dir_all(&self.data_dir).await?;

        let session = export.session_id.simple().to_string();
        let file_name = format!(
            "{}_{}_{}.json",
            name_slug(export.candidate_info.name.as_deref()),
            export.session_date.format("%Y%m%d_%H%M%S"),
            &session[..8]
        );
        let path = self.data_dir.join(file_name);

        let body = serde_json::to_string_pretty(export).context("Failed to serialize export")?;
        tokio::fs::write(&path, body).await?;

        info!("Saved profile for session {} to {}", export.session_id, path.display());
        Ok(path)
    }

    pub async fn load(&self, path: &Path) -> Result<ProfileExport, AppError> {
        let body = tokio::fs::read_to_string(path).await?;
        let export = serde_json::from_str(&body)
            .with_context(|| format!("Malformed profile export {}", path.display()))?;
        Ok(export)
    }

    /// Every readable export in the data directory, oldest first.
    /// Unreadable files are skipped with a warning.
    pub async fn list(&self) -> Result<Vec<ProfileExport>, AppError> {
        let mut entries = match tokio::fs::read_dir(&self.data_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut exports = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match self.load(&path).await {
                Ok(export) => exports.push(export),
                Err(e) => warn!("Skipping {}: {e}", path.display()),
            }
        }

        exports.sort_by_key(|e| e.session_date);
        Ok(exports)
    }
}
