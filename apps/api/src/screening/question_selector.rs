//! Question Selector: decides how many technical questions a candidate gets and
//! where they come from.
//!
//! Flow: question_count → external generation attempt → (on any failure)
//!       template fallback with shuffle → fixed-length list.
//!
//! The external attempt is a single call with a timeout. Retries are the
//! generator's business; this module only distinguishes "usable list" from
//! "anything else".

use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::llm_client::{strip_json_fences, Generated, LlmError, TextGenerator};
use crate::screening::prompts::QUESTION_GENERATION_PROMPT_TEMPLATE;
use crate::screening::question_bank::{questions_for, GENERIC_QUESTIONS, TEMPLATE_QUESTIONS_PER_TECH};

/// Question count for candidates with up to `JUNIOR_MAX_YEARS` years, or no number at all.
pub const JUNIOR_QUESTION_COUNT: usize = 3;
pub const SENIOR_QUESTION_COUNT: usize = 4;
const JUNIOR_MAX_YEARS: u64 = 2;

/// Any run of Unicode decimal digits (`Nd`), not only ASCII.
static YEARS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid years regex"));

static DECIMAL_DIGIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d$").expect("valid decimal digit regex"));

/// Which path produced a question list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionOrigin {
    Generated,
    Templates,
}

#[derive(Debug, Clone)]
pub struct SelectedQuestions {
    pub questions: Vec<String>,
    pub origin: QuestionOrigin,
}

/// Why the external attempt was not used. Logged, never shown to the candidate.
#[derive(Debug, Error)]
pub enum GenerationFailure {
    #[error("no text generator configured")]
    Unavailable,

    #[error("generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("generator error: {0}")]
    Llm(#[from] LlmError),

    #[error("unexpected response shape: {0}")]
    Shape(String),

    #[error("generator returned {got} usable questions, needed {want}")]
    TooFew { got: usize, want: usize },
}

/// Number of questions for a free-text experience answer: the first run of
/// digits decides; no digits means junior.
pub fn question_count(experience: &str) -> usize {
    let years = YEARS_RE.find(experience).map(|m| parse_years(m.as_str()));

    match years {
        Some(years) if years > JUNIOR_MAX_YEARS => SENIOR_QUESTION_COUNT,
        _ => JUNIOR_QUESTION_COUNT,
    }
}

/// Value of a digit run matched by `YEARS_RE`. Saturates on overflow.
fn parse_years(digits: &str) -> u64 {
    digits
        .chars()
        .filter_map(decimal_value)
        .try_fold(0u64, |acc, d| acc.checked_mul(10)?.checked_add(u64::from(d)))
        .unwrap_or(u64::MAX)
}

fn is_decimal_digit(c: char) -> bool {
    let mut buf = [0u8; 4];
    DECIMAL_DIGIT_RE.is_match(c.encode_utf8(&mut buf))
}

/// Digit value of a `Nd` character. Unicode encodes every decimal digit set
/// as contiguous 0..=9 runs, so a maximal run of digit code points is a whole
/// number of sets and the offset from its start gives the value.
fn decimal_value(c: char) -> Option<u32> {
    if let Some(d) = c.to_digit(10) {
        return Some(d);
    }
    if !is_decimal_digit(c) {
        return None;
    }
    let mut start = u32::from(c);
    while let Some(prev) = start.checked_sub(1).and_then(char::from_u32) {
        if !is_decimal_digit(prev) {
            break;
        }
        start -= 1;
    }
    Some((u32::from(c) - start) % 10)
}

/// Builds the fallback list: up to two templates per technology, shuffled,
/// cut to `target`, then topped up from the generic pool.
pub fn template_questions<R: Rng + ?Sized>(
    tech_stack: &[String],
    target: usize,
    rng: &mut R,
) -> Vec<String> {
    let mut pool: Vec<String> = tech_stack
        .iter()
        .flat_map(|tech| questions_for(tech, TEMPLATE_QUESTIONS_PER_TECH))
        .collect();

    pool.shuffle(rng);
    pool.truncate(target);

    let missing = target - pool.len();
    pool.extend(
        GENERIC_QUESTIONS
            .iter()
            .cycle()
            .take(missing)
            .map(|q| q.to_string()),
    );

    pool
}

/// Produces the fixed question list for a session.
#[derive(Clone)]
pub struct QuestionSelector {
    generator: Option<Arc<dyn TextGenerator>>,
    timeout: Duration,
    seed: Option<u64>,
}

impl QuestionSelector {
    pub fn new(
        generator: Option<Arc<dyn TextGenerator>>,
        timeout: Duration,
        seed: Option<u64>,
    ) -> Self {
        Self {
            generator,
            timeout,
            seed,
        }
    }

    /// Selector that never calls out; every list comes from the question bank.
    pub fn templates_only(seed: Option<u64>) -> Self {
        Self::new(None, Duration::ZERO, seed)
    }

    pub async fn select_questions(&self, tech_stack: &[String], experience: &str) -> SelectedQuestions {
        let target = question_count(experience);

        match self.generate(tech_stack, experience, target).await {
            Ok(questions) => {
                info!("Generated {} questions for {} technologies", questions.len(), tech_stack.len());
                SelectedQuestions {
                    questions,
                    origin: QuestionOrigin::Generated,
                }
            }
            Err(failure) => {
                if matches!(failure, GenerationFailure::Unavailable) {
                    debug!("No text generator configured, using templates");
                } else {
                    warn!("Question generation failed, using templates: {failure}");
                }
                let mut rng = self.rng();
                SelectedQuestions {
                    questions: template_questions(tech_stack, target, &mut rng),
                    origin: QuestionOrigin::Templates,
                }
            }
        }
    }

    async fn generate(
        &self,
        tech_stack: &[String],
        experience: &str,
        target: usize,
    ) -> Result<Vec<String>, GenerationFailure> {
        let generator = self.generator.as_ref().ok_or(GenerationFailure::Unavailable)?;
        let prompt = build_generation_prompt(tech_stack, experience, target);

        let generated = tokio::time::timeout(self.timeout, generator.generate(&prompt, true))
            .await
            .map_err(|_| GenerationFailure::Timeout(self.timeout))??;

        let mut questions = extract_questions(generated)?;
        if questions.len() < target {
            return Err(GenerationFailure::TooFew {
                got: questions.len(),
                want: target,
            });
        }
        questions.truncate(target);
        Ok(questions)
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

fn build_generation_prompt(tech_stack: &[String], experience: &str, target: usize) -> String {
    let tech = if tech_stack.is_empty() {
        "general software engineering".to_string()
    } else {
        tech_stack.join(", ")
    };

    QUESTION_GENERATION_PROMPT_TEMPLATE
        .replace("{question_count}", &target.to_string())
        .replace("{tech_stack}", &tech)
        .replace("{experience}", experience.trim())
}

/// Accepts a JSON array of strings, or an object carrying one under `questions`.
/// Non-string and blank entries are dropped.
fn extract_questions(generated: Generated) -> Result<Vec<String>, GenerationFailure> {
    let value = match generated {
        Generated::Json(value) => value,
        Generated::Text(text) => serde_json::from_str::<Value>(strip_json_fences(&text))
            .map_err(|e| GenerationFailure::Shape(format!("text is not JSON: {e}")))?,
    };

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("questions") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(GenerationFailure::Shape(
                    "object without a `questions` array".to_string(),
                ))
            }
        },
        other => {
            return Err(GenerationFailure::Shape(format!(
                "expected a JSON array, got {other}"
            )))
        }
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Behaviour {
        Reply(Generated),
        Fail,
        Hang,
    }

    struct StubGenerator {
        behaviour: Behaviour,
        calls: AtomicUsize,
    }

    impl StubGenerator {
        fn new(behaviour: Behaviour) -> Arc<Self> {
            Arc::new(Self {
                behaviour,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for StubGenerator {
        async fn generate(&self, _prompt: &str, want_json: bool) -> Result<Generated, LlmError> {
            assert!(want_json);
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behaviour {
                Behaviour::Reply(generated) => Ok(generated.clone()),
                Behaviour::Fail => Err(LlmError::EmptyContent),
                Behaviour::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Err(LlmError::EmptyContent)
                }
            }
        }
    }

    fn selector_with(generator: Arc<StubGenerator>) -> QuestionSelector {
        QuestionSelector::new(Some(generator), Duration::from_secs(5), Some(7))
    }

    fn stack(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_question_count_from_experience_text() {
        assert_eq!(question_count("5 years"), 4);
        assert_eq!(question_count("1"), 3);
        assert_eq!(question_count("2 years"), 3);
        assert_eq!(question_count("3"), 4);
        assert_eq!(question_count("no experience"), 3);
        assert_eq!(question_count(""), 3);
    }

    #[test]
    fn test_question_count_uses_first_number() {
        assert_eq!(question_count("1 year, 10 months"), 3);
        assert_eq!(question_count("about 12 years, 2 at startups"), 4);
    }

    #[test]
    fn test_question_count_huge_number_is_senior() {
        assert_eq!(question_count("99999999999999999999999 years"), 4);
    }

    #[test]
    fn test_question_count_reads_non_ascii_digits() {
        // Arabic-Indic
        assert_eq!(question_count("١ year"), 3);
        assert_eq!(question_count("٥ years"), 4);
        assert_eq!(question_count("١٢ years"), 4);
        // Devanagari
        assert_eq!(question_count("२ साल"), 3);
        // Fullwidth
        assert_eq!(question_count("２ years"), 3);
        // Mathematical bold and double-struck sit in one run of five sets
        assert_eq!(question_count("\u{1D7D0} years"), 3);
        assert_eq!(question_count("\u{1D7DD} years"), 4);
    }

    #[test]
    fn test_decimal_value_of_digit_sets() {
        assert_eq!(decimal_value('7'), Some(7));
        assert_eq!(decimal_value('٠'), Some(0));
        assert_eq!(decimal_value('٩'), Some(9));
        assert_eq!(decimal_value('\u{1D7E1}'), Some(9));
        assert_eq!(decimal_value('x'), None);
        assert_eq!(parse_years("٣٠"), 30);
    }

    #[test]
    fn test_template_length_always_matches_target() {
        let stacks = [
            stack(&[]),
            stack(&["Python"]),
            stack(&["Python", "Rust", "Docker", "Elixir", "k8s"]),
        ];
        for tech_stack in &stacks {
            for target in [JUNIOR_QUESTION_COUNT, SENIOR_QUESTION_COUNT] {
                let mut rng = StdRng::seed_from_u64(42);
                let questions = template_questions(tech_stack, target, &mut rng);
                assert_eq!(questions.len(), target, "stack {tech_stack:?}");
            }
        }
    }

    #[test]
    fn test_template_same_seed_same_list() {
        let tech_stack = stack(&["Python", "JavaScript", "React", "MongoDB"]);
        let first = template_questions(&tech_stack, 4, &mut StdRng::seed_from_u64(1));
        let second = template_questions(&tech_stack, 4, &mut StdRng::seed_from_u64(1));
        assert_eq!(first, second);
    }

    #[test]
    fn test_template_questions_come_from_the_stack_pool() {
        let tech_stack = stack(&["Python", "Docker"]);
        let allowed: Vec<String> = tech_stack
            .iter()
            .flat_map(|t| questions_for(t, TEMPLATE_QUESTIONS_PER_TECH))
            .collect();
        let questions = template_questions(&tech_stack, 3, &mut StdRng::seed_from_u64(9));
        assert!(questions.iter().all(|q| allowed.contains(q)));
    }

    #[test]
    fn test_empty_stack_uses_generic_pool() {
        let questions = template_questions(&[], 3, &mut StdRng::seed_from_u64(0));
        assert_eq!(questions, &GENERIC_QUESTIONS[..3]);
    }

    #[test]
    fn test_short_pool_is_topped_up_after_tech_questions() {
        // One known tech yields two templates; the third slot is generic.
        let questions = template_questions(&stack(&["Docker"]), 3, &mut StdRng::seed_from_u64(3));
        assert_eq!(questions.len(), 3);
        assert!(questions[..2].iter().all(|q| q.contains("Docker")));
        assert_eq!(questions[2], GENERIC_QUESTIONS[0]);
    }

    #[tokio::test]
    async fn test_no_generator_uses_templates() {
        let selector = QuestionSelector::templates_only(Some(5));
        let selected = selector.select_questions(&stack(&["Rust"]), "5 years").await;
        assert_eq!(selected.origin, QuestionOrigin::Templates);
        assert_eq!(selected.questions.len(), 4);
    }

    #[tokio::test]
    async fn test_templates_only_is_repeatable_with_seed() {
        let selector = QuestionSelector::templates_only(Some(11));
        let tech_stack = stack(&["Python", "Java", "SQL", "AWS", "Vue"]);
        let first = selector.select_questions(&tech_stack, "10").await;
        let second = selector.select_questions(&tech_stack, "10").await;
        assert_eq!(first.questions, second.questions);
    }

    #[tokio::test]
    async fn test_generated_list_is_truncated_to_target() {
        let generator = StubGenerator::new(Behaviour::Reply(Generated::Json(json!([
            "Q1", "Q2", "Q3", "Q4", "Q5"
        ]))));
        let selected = selector_with(generator.clone())
            .select_questions(&stack(&["Rust"]), "1 year")
            .await;
        assert_eq!(selected.origin, QuestionOrigin::Generated);
        assert_eq!(selected.questions, vec!["Q1", "Q2", "Q3"]);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_generated_object_with_questions_key_is_accepted() {
        let generator = StubGenerator::new(Behaviour::Reply(Generated::Json(json!({
            "questions": ["A", "B", "C", "D"]
        }))));
        let selected = selector_with(generator)
            .select_questions(&stack(&["Go"]), "7 years")
            .await;
        assert_eq!(selected.origin, QuestionOrigin::Generated);
        assert_eq!(selected.questions, vec!["A", "B", "C", "D"]);
    }

    #[tokio::test]
    async fn test_generated_fenced_text_is_parsed() {
        let text = "```json\n[\"A\", \"B\", \"C\"]\n```".to_string();
        let generator = StubGenerator::new(Behaviour::Reply(Generated::Text(text)));
        let selected = selector_with(generator)
            .select_questions(&stack(&["Go"]), "junior")
            .await;
        assert_eq!(selected.origin, QuestionOrigin::Generated);
        assert_eq!(selected.questions.len(), 3);
    }

    #[tokio::test]
    async fn test_too_few_generated_falls_back() {
        let generator = StubGenerator::new(Behaviour::Reply(Generated::Json(json!(["Only one"]))));
        let selected = selector_with(generator)
            .select_questions(&stack(&["Python"]), "4 years")
            .await;
        assert_eq!(selected.origin, QuestionOrigin::Templates);
        assert_eq!(selected.questions.len(), 4);
        assert!(!selected.questions.contains(&"Only one".to_string()));
    }

    #[tokio::test]
    async fn test_non_string_items_do_not_count() {
        let generator = StubGenerator::new(Behaviour::Reply(Generated::Json(json!([
            "Q1", 2, null, "  ", "Q2"
        ]))));
        let selected = selector_with(generator)
            .select_questions(&stack(&["Python"]), "1")
            .await;
        assert_eq!(selected.origin, QuestionOrigin::Templates);
    }

    #[tokio::test]
    async fn test_non_list_response_falls_back() {
        let generator = StubGenerator::new(Behaviour::Reply(Generated::Json(json!({"q": "nope"}))));
        let selected = selector_with(generator)
            .select_questions(&stack(&["Python"]), "1")
            .await;
        assert_eq!(selected.origin, QuestionOrigin::Templates);
        assert_eq!(selected.questions.len(), 3);
    }

    #[tokio::test]
    async fn test_plain_text_response_falls_back() {
        let generator = StubGenerator::new(Behaviour::Reply(Generated::Text(
            "Here are some questions: ...".to_string(),
        )));
        let selected = selector_with(generator)
            .select_questions(&stack(&["Python"]), "1")
            .await;
        assert_eq!(selected.origin, QuestionOrigin::Templates);
    }

    #[tokio::test]
    async fn test_generator_error_falls_back_without_retry() {
        let generator = StubGenerator::new(Behaviour::Fail);
        let selected = selector_with(generator.clone())
            .select_questions(&stack(&["Python", "Django"]), "3 years")
            .await;
        assert_eq!(selected.origin, QuestionOrigin::Templates);
        assert_eq!(selected.questions.len(), 4);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_generator_timeout_falls_back() {
        let generator = StubGenerator::new(Behaviour::Hang);
        let selected = selector_with(generator)
            .select_questions(&stack(&["Python"]), "1")
            .await;
        assert_eq!(selected.origin, QuestionOrigin::Templates);
        assert_eq!(selected.questions.len(), 3);
    }

    #[test]
    fn test_prompt_mentions_stack_count_and_experience() {
        let prompt = build_generation_prompt(&stack(&["Rust", "Docker"]), " 5 years ", 4);
        assert!(prompt.contains("Generate 4 technical interview questions"));
        assert!(prompt.contains("Rust, Docker"));
        assert!(prompt.contains("\"5 years\""));
        assert!(!prompt.contains("{tech_stack}"));
        assert!(!prompt.contains("{question_count}"));
        assert!(!prompt.contains("{experience}"));
    }
}
