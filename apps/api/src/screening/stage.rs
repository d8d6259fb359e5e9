use serde::{Deserialize, Serialize};

/// One step of the fixed screening sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Greeting,
    CollectName,
    CollectEmail,
    CollectPhone,
    CollectExperience,
    CollectPosition,
    CollectLocation,
    CollectTechStack,
    GenerateQuestions,
    InterviewComplete,
}

impl Stage {
    pub const ALL: [Stage; 10] = [
        Stage::Greeting,
        Stage::CollectName,
        Stage::CollectEmail,
        Stage::CollectPhone,
        Stage::CollectExperience,
        Stage::CollectPosition,
        Stage::CollectLocation,
        Stage::CollectTechStack,
        Stage::GenerateQuestions,
        Stage::InterviewComplete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Greeting => "greeting",
            Stage::CollectName => "collect_name",
            Stage::CollectEmail => "collect_email",
            Stage::CollectPhone => "collect_phone",
            Stage::CollectExperience => "collect_experience",
            Stage::CollectPosition => "collect_position",
            Stage::CollectLocation => "collect_location",
            Stage::CollectTechStack => "collect_tech_stack",
            Stage::GenerateQuestions => "generate_questions",
            Stage::InterviewComplete => "interview_complete",
        }
    }

    /// Percentage of the screening flow reached at this stage.
    pub fn progress(self) -> u8 {
        match self {
            Stage::Greeting => 10,
            Stage::CollectName => 20,
            Stage::CollectEmail => 30,
            Stage::CollectPhone => 40,
            Stage::CollectExperience => 50,
            Stage::CollectPosition => 60,
            Stage::CollectLocation => 70,
            Stage::CollectTechStack => 80,
            Stage::GenerateQuestions => 90,
            Stage::InterviewComplete => 100,
        }
    }

    /// Short status label shown next to the progress bar.
    pub fn status_label(self) -> &'static str {
        match self {
            Stage::Greeting => "Getting Started",
            Stage::CollectName
            | Stage::CollectEmail
            | Stage::CollectPhone
            | Stage::CollectExperience
            | Stage::CollectPosition
            | Stage::CollectLocation => "Collecting Information",
            Stage::CollectTechStack => "Tech Stack Analysis",
            Stage::GenerateQuestions => "Interview Ready",
            Stage::InterviewComplete => "Complete",
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Stage::InterviewComplete
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
