//! Stage Driver: the screening state machine.
//!
//! `advance` consumes a `Session`, applies one candidate input, and returns the
//! updated session together with the reply to show. Transitions are linear:
//!
//!   greeting → name → email ⟲ → phone ⟲ → experience → position → location
//!            → tech stack → generate_questions (answer | skip)* → interview_complete
//!
//! Ending keywords jump to `interview_complete` from any stage, keeping the
//! collected profile. Discarding a session is an explicit `Session::reset`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::screening::messages::{
    completion_summary, format_question, APP_NAME, CLOSING, EMAIL_PROMPT, EXPERIENCE_PROMPT,
    GREETING, INVALID_EMAIL, INVALID_PHONE, LOCATION_PROMPT, NAME_PROMPT, NO_MORE_QUESTIONS,
    PHONE_PROMPT, POSITION_PROMPT, QUESTIONS_INTRO, TECH_STACK_PROMPT,
};
use crate::screening::profile::CandidateProfile;
use crate::screening::question_selector::{QuestionOrigin, QuestionSelector};
use crate::screening::stage::Stage;
use crate::screening::validators::{
    is_conversation_ending, parse_tech_stack, validate_email, validate_phone,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum QuestionOutcome {
    Answered { answer: String },
    Skipped,
}

/// What happened to one technical question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionResponse {
    pub index: usize,
    pub question: String,
    #[serde(flatten)]
    pub outcome: QuestionOutcome,
}

/// Cursor and tallies over the question list, for API views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionProgress {
    pub total: usize,
    pub answered: usize,
    pub skipped: usize,
    /// 1-based number of the question awaiting an answer, if any.
    pub current_number: Option<usize>,
    pub current_question: Option<String>,
}

/// Everything one screening conversation owns.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub stage: Stage,
    pub profile: CandidateProfile,
    pub tech_stack: Vec<String>,
    pub questions: Vec<String>,
    pub question_origin: Option<QuestionOrigin>,
    pub current_question_index: usize,
    pub answered_questions: usize,
    pub skipped_questions: usize,
    pub responses: Vec<QuestionResponse>,
    pub transcript: Vec<TranscriptMessage>,
    pub started_at: DateTime<Utc>,
}

/// Result of one `advance` call.
#[derive(Debug, Clone)]
pub struct Turn {
    pub session: Session,
    pub reply: String,
}

impl Session {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    fn with_id(id: Uuid) -> Self {
        let mut session = Self {
            id,
            stage: Stage::Greeting,
            profile: CandidateProfile::default(),
            tech_stack: Vec::new(),
            questions: Vec::new(),
            question_origin: None,
            current_question_index: 0,
            answered_questions: 0,
            skipped_questions: 0,
            responses: Vec::new(),
            transcript: Vec::new(),
            started_at: Utc::now(),
        };
        session.record(Role::Assistant, GREETING);
        session
    }

    /// Discards everything except the id and starts over at the greeting.
    pub fn reset(&mut self) {
        *self = Self::with_id(self.id);
    }

    pub fn greeting(&self) -> &'static str {
        GREETING
    }

    /// `None` once the cursor has moved past the last question.
    pub fn current_question(&self) -> Option<&str> {
        self.questions
            .get(self.current_question_index)
            .map(String::as_str)
    }

    pub fn question_progress(&self) -> Option<QuestionProgress> {
        if self.questions.is_empty() {
            return None;
        }
        let current = self
            .current_question()
            .filter(|_| !self.stage.is_terminal());
        Some(QuestionProgress {
            total: self.questions.len(),
            answered: self.answered_questions,
            skipped: self.skipped_questions,
            current_number: current.map(|_| self.current_question_index + 1),
            current_question: current.map(str::to_string),
        })
    }

    /// Read-only profile and progress report.
    pub fn summary_report(&self, now: DateTime<Utc>) -> String {
        let minutes = (now - self.started_at).num_minutes().max(0);
        let tech_stack = if self.tech_stack.is_empty() {
            "(none)".to_string()
        } else {
            self.tech_stack.join(", ")
        };
        let origin = match self.question_origin {
            Some(QuestionOrigin::Generated) => "tailored",
            Some(QuestionOrigin::Templates) | None => "standard",
        };
        let remaining = self
            .questions
            .len()
            .saturating_sub(self.answered_questions + self.skipped_questions);

        format!(
            "📊 **{APP_NAME}: Your Profile**\n\n{}**Tech Stack:** {tech_stack}\n\n\
             **Questions:** {} ({origin})\n\
             **Answered:** {}\n\
             **Skipped:** {}\n\
             **Remaining:** {remaining}\n\
             **Session Duration:** {minutes} minutes",
            self.profile.format(),
            self.questions.len(),
            self.answered_questions,
            self.skipped_questions,
        )
    }

    fn record(&mut self, role: Role, content: &str) {
        self.transcript.push(TranscriptMessage {
            role,
            content: content.to_string(),
            timestamp: Utc::now(),
        });
    }

    /// What to say again when the candidate sends nothing.
    fn stage_prompt(&self) -> String {
        match self.stage {
            Stage::Greeting => GREETING.to_string(),
            Stage::CollectName => NAME_PROMPT.to_string(),
            Stage::CollectEmail => EMAIL_PROMPT.to_string(),
            Stage::CollectPhone => PHONE_PROMPT.to_string(),
            Stage::CollectExperience => EXPERIENCE_PROMPT.to_string(),
            Stage::CollectPosition => POSITION_PROMPT.to_string(),
            Stage::CollectLocation => LOCATION_PROMPT.to_string(),
            Stage::CollectTechStack => TECH_STACK_PROMPT.to_string(),
            Stage::GenerateQuestions => self.current_question_prompt(),
            Stage::InterviewComplete => CLOSING.to_string(),
        }
    }

    fn current_question_prompt(&self) -> String {
        match self.current_question() {
            Some(question) => {
                format_question(question, self.current_question_index, self.questions.len())
            }
            None => self.completion_text(),
        }
    }

    fn completion_text(&self) -> String {
        completion_summary(
            self.questions.len(),
            self.answered_questions,
            self.skipped_questions,
        )
    }

    fn finish(&mut self) -> String {
        self.stage = Stage::InterviewComplete;
        self.completion_text()
    }

    /// Records the outcome for the current question and moves the cursor.
    /// Past the last question the interview completes.
    fn close_current_question(&mut self, outcome: QuestionOutcome) -> String {
        let Some(question) = self.current_question().map(str::to_string) else {
            return self.finish();
        };

        match outcome {
            QuestionOutcome::Answered { .. } => self.answered_questions += 1,
            QuestionOutcome::Skipped => self.skipped_questions += 1,
        }
        self.responses.push(QuestionResponse {
            index: self.current_question_index,
            question,
            outcome,
        });
        self.current_question_index += 1;

        if self.current_question().is_some() {
            self.current_question_prompt()
        } else {
            self.finish()
        }
    }

    fn handle_question_input(&mut self, input: &str) -> String {
        match input.to_lowercase().as_str() {
            "summary" | "profile" | "info" => self.summary_report(Utc::now()),
            "next" | "more" | "continue" => NO_MORE_QUESTIONS.to_string(),
            "done" => self.finish(),
            "skip" => self.close_current_question(QuestionOutcome::Skipped),
            _ => self.close_current_question(QuestionOutcome::Answered {
                answer: input.to_string(),
            }),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies one raw candidate input to the session.
///
/// Blank input is not a submission: the current prompt is repeated and the
/// session is returned untouched.
pub async fn advance(mut session: Session, raw_input: &str, selector: &QuestionSelector) -> Turn {
    let input = raw_input.trim();
    if input.is_empty() {
        let reply = session.stage_prompt();
        return Turn { session, reply };
    }

    let from = session.stage;
    session.record(Role::User, input);

    let reply = if is_conversation_ending(input) {
        match session.stage {
            Stage::GenerateQuestions => session.finish(),
            _ => {
                session.stage = Stage::InterviewComplete;
                CLOSING.to_string()
            }
        }
    } else {
        apply_stage(&mut session, input, selector).await
    };

    session.record(Role::Assistant, &reply);
    debug!(session_id = %session.id, %from, to = %session.stage, "stage advanced");

    Turn { session, reply }
}

async fn apply_stage(session: &mut Session, input: &str, selector: &QuestionSelector) -> String {
    match session.stage {
        Stage::Greeting => {
            session.stage = Stage::CollectName;
            NAME_PROMPT.to_string()
        }
        Stage::CollectName => {
            session.profile.name = Some(input.to_string());
            session.stage = Stage::CollectEmail;
            EMAIL_PROMPT.to_string()
        }
        Stage::CollectEmail => {
            if !validate_email(input) {
                return INVALID_EMAIL.to_string();
            }
            session.profile.email = Some(input.to_string());
            session.stage = Stage::CollectPhone;
            PHONE_PROMPT.to_string()
        }
        Stage::CollectPhone => {
            if !validate_phone(input) {
                return INVALID_PHONE.to_string();
            }
            session.profile.phone = Some(input.to_string());
            session.stage = Stage::CollectExperience;
            EXPERIENCE_PROMPT.to_string()
        }
        Stage::CollectExperience => {
            session.profile.experience = Some(input.to_string());
            session.stage = Stage::CollectPosition;
            POSITION_PROMPT.to_string()
        }
        Stage::CollectPosition => {
            session.profile.position = Some(input.to_string());
            session.stage = Stage::CollectLocation;
            LOCATION_PROMPT.to_string()
        }
        Stage::CollectLocation => {
            session.profile.location = Some(input.to_string());
            session.stage = Stage::CollectTechStack;
            TECH_STACK_PROMPT.to_string()
        }
        Stage::CollectTechStack => {
            let tech_stack = parse_tech_stack(input);
            let experience = session.profile.experience.as_deref().unwrap_or_default();
            let selected = selector.select_questions(&tech_stack, experience).await;

            session.tech_stack = tech_stack;
            session.questions = selected.questions;
            session.question_origin = Some(selected.origin);
            session.current_question_index = 0;
            session.stage = Stage::GenerateQuestions;

            format!("{QUESTIONS_INTRO}\n\n{}", session.current_question_prompt())
        }
        Stage::GenerateQuestions => session.handle_question_input(input),
        Stage::InterviewComplete => CLOSING.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &[&str] = &[
        "hi",
        "Jane Doe",
        "jane@x.co",
        "+12345678901",
        "5 years",
        "Backend Engineer",
        "Berlin, Germany",
        "Python, Docker, and Rust",
    ];

    fn selector() -> QuestionSelector {
        QuestionSelector::templates_only(Some(17))
    }

    async fn feed(mut session: Session, inputs: &[&str]) -> Session {
        let selector = selector();
        for input in inputs {
            session = advance(session, input, &selector).await.session;
        }
        session
    }

    async fn at_questions() -> Session {
        feed(Session::new(), SCRIPT).await
    }

    #[tokio::test]
    async fn test_collection_scenario_with_retries() {
        let selector = selector();
        let session = Session::new();
        assert_eq!(session.stage, Stage::Greeting);

        let turn = advance(session, "hi", &selector).await;
        assert_eq!(turn.session.stage, Stage::CollectName);
        assert_eq!(turn.reply, NAME_PROMPT);

        let turn = advance(turn.session, "Jane Doe", &selector).await;
        assert_eq!(turn.session.stage, Stage::CollectEmail);
        assert_eq!(turn.session.profile.name.as_deref(), Some("Jane Doe"));

        let turn = advance(turn.session, "not-an-email", &selector).await;
        assert_eq!(turn.session.stage, Stage::CollectEmail);
        assert_eq!(turn.reply, INVALID_EMAIL);
        assert!(turn.session.profile.email.is_none());

        let turn = advance(turn.session, "jane@x.co", &selector).await;
        assert_eq!(turn.session.stage, Stage::CollectPhone);

        let turn = advance(turn.session, "12345", &selector).await;
        assert_eq!(turn.session.stage, Stage::CollectPhone);
        assert_eq!(turn.reply, INVALID_PHONE);

        let turn = advance(turn.session, "+12345678901", &selector).await;
        assert_eq!(turn.session.stage, Stage::CollectExperience);
        assert_eq!(turn.session.profile.phone.as_deref(), Some("+12345678901"));
    }

    #[tokio::test]
    async fn test_profile_values_are_trimmed() {
        let session = feed(Session::new(), &["hi", "  Jane Doe  ", " jane@x.co "]).await;
        assert_eq!(session.profile.name.as_deref(), Some("Jane Doe"));
        assert_eq!(session.profile.email.as_deref(), Some("jane@x.co"));
    }

    #[tokio::test]
    async fn test_tech_stack_entry_materializes_question_list() {
        let session = at_questions().await;
        assert_eq!(session.stage, Stage::GenerateQuestions);
        assert_eq!(session.tech_stack, vec!["Python", "Docker", "Rust"]);
        assert_eq!(session.questions.len(), 4);
        assert_eq!(session.question_origin, Some(QuestionOrigin::Templates));
        assert_eq!(session.current_question_index, 0);
        assert_eq!(session.profile.location.as_deref(), Some("Berlin, Germany"));
    }

    #[tokio::test]
    async fn test_entering_questions_shows_first_question() {
        let session = feed(Session::new(), &SCRIPT[..7]).await;
        let turn = advance(session, SCRIPT[7], &selector()).await;
        assert!(turn.reply.starts_with(QUESTIONS_INTRO));
        assert!(turn.reply.contains("**Question 1 of 4**"));
        assert!(turn.reply.contains(&turn.session.questions[0]));
    }

    #[tokio::test]
    async fn test_empty_tech_stack_still_gets_questions() {
        let mut script = SCRIPT[..7].to_vec();
        script[4] = "1 year";
        let session = feed(Session::new(), &script).await;
        let turn = advance(session, ", ;", &selector()).await;
        assert_eq!(turn.session.stage, Stage::GenerateQuestions);
        assert!(turn.session.tech_stack.is_empty());
        assert_eq!(turn.session.questions.len(), 3);
    }

    #[tokio::test]
    async fn test_answer_and_skip_advance_cursor() {
        let selector = selector();
        let session = at_questions().await;

        let turn = advance(session, "Decorators wrap functions.", &selector).await;
        assert_eq!(turn.session.answered_questions, 1);
        assert_eq!(turn.session.current_question_index, 1);
        assert!(turn.reply.contains("**Question 2 of 4**"));

        let turn = advance(turn.session, "SKIP", &selector).await;
        assert_eq!(turn.session.skipped_questions, 1);
        assert_eq!(turn.session.current_question_index, 2);
        assert_eq!(turn.session.responses.len(), 2);
        assert_eq!(
            turn.session.responses[0].outcome,
            QuestionOutcome::Answered {
                answer: "Decorators wrap functions.".to_string()
            }
        );
        assert_eq!(turn.session.responses[1].outcome, QuestionOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_skip_on_last_question_completes_interview() {
        let selector = selector();
        let mut session = at_questions().await;
        session = feed(session, &["a1", "a2", "a3"]).await;
        assert_eq!(session.current_question_index, 3);

        let turn = advance(session, "skip", &selector).await;
        assert_eq!(turn.session.stage, Stage::InterviewComplete);
        assert_eq!(turn.session.skipped_questions, 1);
        assert_eq!(turn.session.answered_questions, 3);
        assert_eq!(turn.reply, completion_summary(4, 3, 1));
        assert!(!turn.reply.contains("**Question"));
    }

    #[tokio::test]
    async fn test_summary_and_next_do_not_mutate_counters() {
        let selector = selector();
        let session = feed(at_questions().await, &["an answer"]).await;

        let turn = advance(session, "summary", &selector).await;
        assert!(turn.reply.contains("**Name:** Jane Doe"));
        assert!(turn.reply.contains("**Tech Stack:** Python, Docker, Rust"));
        assert!(turn.reply.contains("**Answered:** 1"));
        assert!(turn.reply.contains("**Remaining:** 3"));
        assert_eq!(turn.session.current_question_index, 1);

        let turn = advance(turn.session, "Next", &selector).await;
        assert_eq!(turn.reply, NO_MORE_QUESTIONS);
        assert_eq!(turn.session.current_question_index, 1);
        assert_eq!(turn.session.answered_questions, 1);
        assert_eq!(turn.session.skipped_questions, 0);
        assert_eq!(turn.session.stage, Stage::GenerateQuestions);
    }

    #[tokio::test]
    async fn test_done_ends_early_with_tallies() {
        let session = feed(at_questions().await, &["first answer"]).await;
        let turn = advance(session, "done", &selector()).await;
        assert_eq!(turn.session.stage, Stage::InterviewComplete);
        assert_eq!(turn.reply, completion_summary(4, 1, 0));
    }

    #[tokio::test]
    async fn test_ending_keyword_moves_to_complete_and_keeps_profile() {
        let session = feed(Session::new(), &["hi", "Jane Doe"]).await;
        let turn = advance(session, "I want to quit", &selector()).await;
        assert_eq!(turn.session.stage, Stage::InterviewComplete);
        assert_eq!(turn.reply, CLOSING);
        assert_eq!(turn.session.profile.name.as_deref(), Some("Jane Doe"));
    }

    #[tokio::test]
    async fn test_ending_keyword_during_questions_reports_tallies() {
        let session = feed(at_questions().await, &["skip"]).await;
        let turn = advance(session, "bye", &selector()).await;
        assert_eq!(turn.session.stage, Stage::InterviewComplete);
        assert_eq!(turn.reply, completion_summary(4, 0, 1));
    }

    #[tokio::test]
    async fn test_interview_complete_is_terminal() {
        let selector = selector();
        let session = feed(at_questions().await, &["done"]).await;
        for input in ["hello", "skip", "summary", "restart please"] {
            let turn = advance(session.clone(), input, &selector).await;
            assert_eq!(turn.session.stage, Stage::InterviewComplete);
            assert_eq!(turn.reply, CLOSING);
            assert_eq!(turn.session.answered_questions, session.answered_questions);
        }
    }

    #[tokio::test]
    async fn test_blank_input_repeats_prompt_without_mutation() {
        let selector = selector();
        let session = feed(Session::new(), &["hi"]).await;
        let transcript_len = session.transcript.len();

        let turn = advance(session, "   ", &selector).await;
        assert_eq!(turn.session.stage, Stage::CollectName);
        assert_eq!(turn.reply, NAME_PROMPT);
        assert!(turn.session.profile.name.is_none());
        assert_eq!(turn.session.transcript.len(), transcript_len);
    }

    #[tokio::test]
    async fn test_every_stage_handles_every_input() {
        let selector = selector();
        let inputs = [
            "", " ", "hello", "skip", "done", "summary", "next", "bye", "jane@x.co",
            "+12345678901", "Python, Go",
        ];

        let mut snapshots = vec![Session::new()];
        let mut session = Session::new();
        for step in SCRIPT.iter().chain(["done"].iter()) {
            session = advance(session, step, &selector).await.session;
            snapshots.push(session.clone());
        }
        let covered: Vec<Stage> = snapshots.iter().map(|s| s.stage).collect();
        for stage in Stage::ALL {
            assert!(covered.contains(&stage), "no snapshot at {stage}");
        }

        for snapshot in &snapshots {
            for input in inputs {
                let turn = advance(snapshot.clone(), input, &selector).await;
                assert!(!turn.reply.is_empty(), "{} / {input:?}", snapshot.stage);
                let done = turn.session.answered_questions + turn.session.skipped_questions;
                assert!(done <= turn.session.questions.len());
                assert!(turn.session.current_question_index >= snapshot.current_question_index);

                if input == "bye" {
                    assert_eq!(turn.session.stage, Stage::InterviewComplete, "{}", snapshot.stage);
                    assert_eq!(turn.session.profile, snapshot.profile, "{}", snapshot.stage);
                }
            }
        }
    }

    #[tokio::test]
    async fn test_transcript_records_both_sides() {
        let session = feed(Session::new(), &["hi"]).await;
        let roles: Vec<Role> = session.transcript.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::Assistant, Role::User, Role::Assistant]);
        assert_eq!(session.transcript[0].content, GREETING);
    }

    #[tokio::test]
    async fn test_reset_discards_everything_but_id() {
        let mut session = feed(at_questions().await, &["answer"]).await;
        let id = session.id;
        session.reset();
        assert_eq!(session.id, id);
        assert_eq!(session.stage, Stage::Greeting);
        assert_eq!(session.profile, CandidateProfile::default());
        assert!(session.tech_stack.is_empty());
        assert!(session.questions.is_empty());
        assert_eq!(session.current_question_index, 0);
        assert_eq!(session.answered_questions, 0);
        assert!(session.responses.is_empty());
        assert_eq!(session.transcript.len(), 1);
    }

    #[tokio::test]
    async fn test_question_progress_tracks_cursor() {
        let session = Session::new();
        assert!(session.question_progress().is_none());

        let session = feed(at_questions().await, &["skip"]).await;
        let progress = session.question_progress().unwrap();
        assert_eq!(progress.total, 4);
        assert_eq!(progress.skipped, 1);
        assert_eq!(progress.current_number, Some(2));
        assert_eq!(progress.current_question.as_deref(), session.current_question());

        let session = feed(session, &["done"]).await;
        let progress = session.question_progress().unwrap();
        assert_eq!(progress.current_number, None);
        assert!(progress.current_question.is_none());
    }
}
