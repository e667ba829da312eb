// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 10;

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Question {
    #[sqlx(rename = "question_id")]
    pub id: i64,
    pub quiz_id: i64,

    /// Display order within the quiz, starting at 0.
    pub position: i64,

    /// The text content of the question.
    pub statement: String,

    /// Explanation of the correct answer, shown during review.
    pub explanation: Option<String>,
}

/// A selectable answer, stored in the 'question_options' table.
///
/// Named `Choice` so that it does not shadow `std::option::Option`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Choice {
    #[sqlx(rename = "option_id")]
    pub id: i64,
    pub question_id: i64,
    pub position: i64,
    #[sqlx(rename = "option_text")]
    pub text: String,
    pub is_correct: bool,
}

/// DTO for creating a new question together with its options.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewQuestion {
    #[validate(length(min = 1, max = 1000))]
    pub statement: String,
    #[validate(length(max = 2000))]
    pub explanation: Option<String>,
    #[validate(custom(function = validate_choices))]
    pub options: Vec<NewChoice>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewChoice {
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

/// DTO for editing the text of an option.
#[derive(Debug, Deserialize, Validate)]
pub struct ChoiceTextUpdate {
    #[validate(length(min = 1, max = 500))]
    pub text: String,
}

/// DTO for moving the correct mark to another option of the same question.
#[derive(Debug, Deserialize)]
pub struct CorrectChoiceRequest {
    pub option_id: i64,
}

fn validate_choices(options: &[NewChoice]) -> Result<(), validator::ValidationError> {
    if options.len() < MIN_OPTIONS {
        return Err(validator::ValidationError::new("too_few_options"));
    }
    if options.len() > MAX_OPTIONS {
        return Err(validator::ValidationError::new("too_many_options"));
    }
    for opt in options {
        if opt.text.is_empty() || opt.text.chars().count() > 500 {
            return Err(validator::ValidationError::new("invalid_option_text"));
        }
    }
    if options.iter().filter(|opt| opt.is_correct).count() != 1 {
        return Err(validator::ValidationError::new("exactly_one_correct_option"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choice(text: &str, is_correct: bool) -> NewChoice {
        NewChoice {
            text: text.to_string(),
            is_correct,
        }
    }

    fn question(options: Vec<NewChoice>) -> NewQuestion {
        NewQuestion {
            statement: "What is 2 + 2?".to_string(),
            explanation: None,
            options,
        }
    }

    #[test]
    fn test_valid_question() {
        let q = question(vec![choice("3", false), choice("4", true)]);
        assert!(q.validate().is_ok());
    }

    #[test]
    fn test_rejects_single_option() {
        let q = question(vec![choice("4", true)]);
        assert!(q.validate().is_err());
    }

    #[test]
    fn test_rejects_no_correct_option() {
        let q = question(vec![choice("3", false), choice("5", false)]);
        assert!(q.validate().is_err());
    }

    #[test]
    fn test_rejects_two_correct_options() {
        let q = question(vec![choice("4", true), choice("four", true)]);
        assert!(q.validate().is_err());
    }

    #[test]
    fn test_choice_errors_are_reported_on_options() {
        let q = question(vec![choice("3", false), choice("5", false)]);
        let errors = q.validate().unwrap_err();
        let field = errors.field_errors();
        let options = field.get("options").expect("options should be rejected");
        assert_eq!(options[0].code, "exactly_one_correct_option");
    }

    #[test]
    fn test_rejects_empty_statement() {
        let mut q = question(vec![choice("3", false), choice("4", true)]);
        q.statement.clear();
        assert!(q.validate().is_err());
    }
}
