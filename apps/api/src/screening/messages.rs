// Fixed texts the assistant sends during a screening session.

pub const APP_NAME: &str = "TalentScout Hiring Assistant";

pub const GREETING: &str = "👋 Hello! I'm the TalentScout Hiring Assistant. I'm here to help with \
    your initial screening for tech positions. I'll ask you a few questions about your background \
    and technical skills, then provide some technical questions based on your expertise. \
    Let's get started! Say hello when you're ready.";

pub const NAME_PROMPT: &str = "First, could you please tell me your full name?";

pub const EMAIL_PROMPT: &str =
    "Great! Now, could you please provide your email address where we can contact you?";

pub const PHONE_PROMPT: &str = "Thank you. Could you please share your phone number?";

pub const EXPERIENCE_PROMPT: &str =
    "How many years of professional experience do you have in the tech industry?";

pub const POSITION_PROMPT: &str =
    "What position(s) are you interested in applying for at TalentScout?";

pub const LOCATION_PROMPT: &str = "What is your current location? (City and Country)";

pub const TECH_STACK_PROMPT: &str = "Please list your tech stack, including programming languages, \
    frameworks, databases, and tools you are proficient in. \
    For example: 'Python, Django, React, PostgreSQL, Docker'";

pub const INVALID_EMAIL: &str = "⚠️ Please provide a valid email address (e.g., john@example.com)";

pub const INVALID_PHONE: &str = "⚠️ Please provide a valid phone number (10-15 digits)";

pub const QUESTIONS_INTRO: &str =
    "Thanks! Based on your tech stack, I've prepared a few technical questions for you.";

pub const NO_MORE_QUESTIONS: &str = "I can't generate more questions at this moment. You can \
    answer the current question, type 'skip' to move on, or type 'done' to finish.";

pub const CLOSING: &str = "Thank you for taking the time to chat with me today! Your information \
    has been recorded. A recruiter will review your responses and get back to you soon if \
    there's a potential match. If you have any questions in the meantime, please feel free to \
    reach out. Have a great day!";

/// "Question i of n" block with the answer/skip/done options.
pub fn format_question(question: &str, index: usize, total: usize) -> String {
    format!(
        "**Question {} of {}**\n\n{}\n\n**Options:**\n\
         • Answer the question\n\
         • Type 'skip' to move to the next question\n\
         • Type 'done' to finish the interview",
        index + 1,
        total,
        question
    )
}

/// Final tallies shown when the question list is exhausted or ended early.
pub fn completion_summary(total: usize, answered: usize, skipped: usize) -> String {
    format!(
        "🎉 Interview complete!\n\n\
         **Total Questions:** {total}\n\
         **Answered:** {answered}\n\
         **Skipped:** {skipped}\n\n{CLOSING}"
    )
}
