//! Feedback requests and the prompts built from them.

use serde::{Deserialize, Serialize};

use crate::error::QuizError;

/// The user's answer to a question, as sent to the feedback service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub term: String,
    pub selected_theory: String,
    pub correct_theory: String,
}

impl FeedbackRequest {
    pub fn new(
        term: impl Into<String>,
        selected_theory: impl Into<String>,
        correct_theory: impl Into<String>,
    ) -> Self {
        Self {
            term: term.into(),
            selected_theory: selected_theory.into(),
            correct_theory: correct_theory.into(),
        }
    }

    pub fn is_correct(&self) -> bool {
        self.selected_theory == self.correct_theory
    }

    /// Reject requests with blank fields.
    pub fn validate(&self) -> Result<(), QuizError> {
        let fields = [
            ("term", &self.term),
            ("selectedTheory", &self.selected_theory),
            ("correctTheory", &self.correct_theory),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(QuizError::MissingField(name));
            }
        }
        Ok(())
    }
}

/// Build the prompt sent to the text-generation service.
pub fn build_prompt(request: &FeedbackRequest) -> String {
    if request.is_correct() {
        format!(
            "Explain why the term \"{}\" is associated with {}. Keep it short, friendly, and helpful.",
            request.term, request.correct_theory
        )
    } else {
        format!(
            "The term \"{}\" is NOT related to {}, but it is associated with {}. Briefly explain why, in a supportive and encouraging tone.",
            request.term, request.selected_theory, request.correct_theory
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_answer_prompt() {
        let request = FeedbackRequest::new(
            "Aaron Beck",
            "Cognitive Behavioral Therapy (CBT)",
            "Cognitive Behavioral Therapy (CBT)",
        );
        assert_eq!(
            build_prompt(&request),
            "Explain why the term \"Aaron Beck\" is associated with Cognitive Behavioral Therapy (CBT). Keep it short, friendly, and helpful."
        );
    }

    #[test]
    fn incorrect_answer_prompt() {
        let request =
            FeedbackRequest::new("John Bowlby", "Psychoanalytic Theory", "Attachment Theory");
        let prompt = build_prompt(&request);
        assert_eq!(
            prompt,
            "The term \"John Bowlby\" is NOT related to Psychoanalytic Theory, but it is associated with Attachment Theory. Briefly explain why, in a supportive and encouraging tone."
        );
        assert!(prompt.contains("NOT related to Psychoanalytic Theory"));
    }

    #[test]
    fn prompt_is_deterministic() {
        let request = FeedbackRequest::new("genograms", "Attachment Theory", "Family Systems Theory");
        assert_eq!(build_prompt(&request), build_prompt(&request.clone()));
    }

    #[test]
    fn validate_rejects_blank_fields() {
        let request = FeedbackRequest::new("schemas", " ", "Cognitive Behavioral Therapy (CBT)");
        assert_eq!(
            request.validate().unwrap_err(),
            QuizError::MissingField("selectedTheory")
        );
        assert_eq!(
            FeedbackRequest::new("", "A", "B").validate().unwrap_err(),
            QuizError::MissingField("term")
        );
        assert!(FeedbackRequest::new("t", "A", "B").validate().is_ok());
    }

    #[test]
    fn deserializes_camel_case_body() {
        let request: FeedbackRequest = serde_json::from_str(
            r#"{"term":"Freud","selectedTheory":"Psychoanalytic Theory","correctTheory":"Psychoanalytic Theory"}"#,
        )
        .unwrap();
        assert!(request.is_correct());
        assert_eq!(request.term, "Freud");
    }

    #[test]
    fn missing_field_fails_to_deserialize() {
        let result: Result<FeedbackRequest, _> =
            serde_json::from_str(r#"{"term":"Freud","selectedTheory":"Psychoanalytic Theory"}"#);
        assert!(result.is_err());
    }
}
