// src/models/question.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A single-choice question as delivered in an exam payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[validate(length(min = 1, max = 64))]
    pub id: String,

    /// The text content of the question.
    #[validate(length(min = 1, max = 1000))]
    pub text: String,

    /// Ordered list of options (e.g., ["Option A", "Option B"]).
    #[validate(custom(function = validate_options))]
    pub options: Vec<String>,

    /// The answer key, if the backend chose to send it.
    /// Nothing in the session reads this field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
}

impl Question {
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }

    /// Strips the answer key before the question leaves the backend.
    pub fn to_public(&self) -> PublicQuestion {
        PublicQuestion {
            id: self.id.clone(),
            text: self.text.clone(),
            options: self.options.clone(),
        }
    }
}

/// DTO for sending a question to the client (excludes the answer key).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuestion {
    pub id: String,
    pub text: String,
    pub options: Vec<String>,
}

impl From<PublicQuestion> for Question {
    fn from(q: PublicQuestion) -> Self {
        Question {
            id: q.id,
            text: q.text,
            options: q.options,
            correct_answer: None,
        }
    }
}

fn validate_options(options: &[String]) -> Result<(), validator::ValidationError> {
    if options.is_empty() {
        return Err(validator::ValidationError::new("options_cannot_be_empty"));
    }
    for opt in options {
        if opt.is_empty() || opt.len() > 500 {
            return Err(validator::ValidationError::new("option_length_out_of_range"));
        }
    }
    Ok(())
}
