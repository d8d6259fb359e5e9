use serde::{Deserialize, Serialize};

/// Free-text profile fields collected during the screening stages.
/// A field is `Some` only once its stage has completed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl CandidateProfile {
    /// Collected fields as (label, value) pairs in collection order.
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("Name", &self.name),
            ("Email", &self.email),
            ("Phone", &self.phone),
            ("Experience", &self.experience),
            ("Desired Position", &self.position),
            ("Location", &self.location),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.as_deref().map(|v| (label, v)))
        .collect()
    }

    /// Markdown block listing every collected field.
    pub fn format(&self) -> String {
        let mut out = String::from("**Candidate Information**\n\n");
        for (label, value) in self.fields() {
            out.push_str(&format!("**{label}:** {value}\n"));
        }
        out
    }
}
