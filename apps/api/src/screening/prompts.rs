// LLM prompt templates for the Screening module.
// System prompts live in llm_client::prompts.

/// Technical question generation prompt.
/// Replace: {question_count}, {tech_stack}, {experience}
pub const QUESTION_GENERATION_PROMPT_TEMPLATE: &str = r#"You are a technical interviewer for a tech recruitment agency. Generate {question_count} technical interview questions that cover the following technologies: {tech_stack}.

The questions should:
1. Be challenging but appropriate for a candidate whose stated experience is "{experience}"
2. Test both theoretical knowledge and practical application
3. Reveal the depth of the candidate's understanding
4. Cover multiple technologies in a single question when possible
5. Be clear and concise
6. Focus on real-world scenarios and problem-solving

Return a JSON array of exactly {question_count} question strings:
["Question 1", "Question 2", "Question 3"]"#;
