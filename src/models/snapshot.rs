// src/models/snapshot.rs

use std::collections::HashSet;

use serde::Serialize;

use crate::{
    error::CoreError,
    models::{
        question::{Choice, Question},
        quiz::Quiz,
        response::{NewResponse, Selection},
    },
};

/// A quiz with all of its questions and options, as loaded when it was
/// presented to a student. Answers are graded against this copy so that
/// catalog edits made while the student works do not affect the score.
#[derive(Debug, Clone)]
pub struct QuizSnapshot {
    pub quiz: Quiz,
    pub questions: Vec<SnapshotQuestion>,
}

#[derive(Debug, Clone)]
pub struct SnapshotQuestion {
    pub question: Question,
    pub options: Vec<Choice>,
}

/// DTO for presenting a quiz to a student (excludes correctness and explanations).
#[derive(Debug, Serialize)]
pub struct Paper {
    pub quiz_id: i64,
    pub title: String,
    pub description: String,
    pub author_name: Option<String>,
    pub questions: Vec<PaperQuestion>,
}

#[derive(Debug, Serialize)]
pub struct PaperQuestion {
    pub question_id: i64,
    pub statement: String,
    pub options: Vec<PaperOption>,
}

#[derive(Debug, Serialize)]
pub struct PaperOption {
    pub option_id: i64,
    pub text: String,
}

impl QuizSnapshot {
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// Grades the student's selections.
    ///
    /// Every selection must name a question of this quiz and one of that
    /// question's options, and each question may be answered at most once.
    /// Questions without a selection produce no response.
    pub fn grade(&self, selections: &[Selection]) -> Result<Vec<NewResponse>, CoreError> {
        let mut seen = HashSet::with_capacity(selections.len());
        let mut graded = Vec::with_capacity(selections.len());

        for selection in selections {
            if !seen.insert(selection.question_id) {
                return Err(CoreError::InvalidSelection(format!(
                    "question {} answered more than once",
                    selection.question_id
                )));
            }

            let question = self
                .questions
                .iter()
                .find(|q| q.question.id == selection.question_id)
                .ok_or_else(|| {
                    CoreError::InvalidSelection(format!(
                        "question {} is not part of quiz {}",
                        selection.question_id, self.quiz.id
                    ))
                })?;

            let option = question
                .options
                .iter()
                .find(|o| o.id == selection.option_id)
                .ok_or_else(|| {
                    CoreError::InvalidSelection(format!(
                        "option {} does not belong to question {}",
                        selection.option_id, selection.question_id
                    ))
                })?;

            graded.push(NewResponse {
                question_id: selection.question_id,
                option_id: option.id,
                is_correct: option.is_correct,
            });
        }

        Ok(graded)
    }

    pub fn to_paper(&self) -> Paper {
        Paper {
            quiz_id: self.quiz.id,
            title: self.quiz.title.clone(),
            description: self.quiz.description.clone(),
            author_name: self.quiz.author_name.clone(),
            questions: self
                .questions
                .iter()
                .map(|q| PaperQuestion {
                    question_id: q.question.id,
                    statement: q.question.statement.clone(),
                    options: q
                        .options
                        .iter()
                        .map(|o| PaperOption {
                            option_id: o.id,
                            text: o.text.clone(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> QuizSnapshot {
        let quiz = Quiz {
            id: 1,
            title: "Algebra".to_string(),
            description: String::new(),
            created_by: 7,
            author_name: None,
            is_hidden: false,
            created_at: chrono::Utc::now(),
        };

        let questions = (0..3)
            .map(|q| {
                let question_id = 10 + q;
                SnapshotQuestion {
                    question: Question {
                        id: question_id,
                        quiz_id: 1,
                        position: q,
                        statement: format!("Question {}", q),
                        explanation: None,
                    },
                    options: (0..4)
                        .map(|o| Choice {
                            id: question_id * 100 + o,
                            question_id,
                            position: o,
                            text: format!("Option {}", o),
                            is_correct: o == 0,
                        })
                        .collect(),
                }
            })
            .collect();

        QuizSnapshot { quiz, questions }
    }

    #[test]
    fn test_grade_mixed() {
        let snap = snapshot();
        let graded = snap
            .grade(&[
                Selection { question_id: 10, option_id: 1000 },
                Selection { question_id: 11, option_id: 1102 },
            ])
            .unwrap();

        assert_eq!(graded.len(), 2);
        assert!(graded[0].is_correct);
        assert!(!graded[1].is_correct);
        assert_eq!(graded[1].option_id, 1102);
    }

    #[test]
    fn test_grade_uses_snapshot_not_later_edits() {
        let mut snap = snapshot();
        let frozen = snap.clone();
        // Flip the correct option after the quiz was presented.
        for o in &mut snap.questions[0].options {
            o.is_correct = o.id == 1003;
        }

        let selection = [Selection { question_id: 10, option_id: 1000 }];
        assert!(frozen.grade(&selection).unwrap()[0].is_correct);
        assert!(!snap.grade(&selection).unwrap()[0].is_correct);
    }

    #[test]
    fn test_grade_rejects_foreign_option() {
        let snap = snapshot();
        let err = snap
            .grade(&[Selection { question_id: 10, option_id: 1100 }])
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidSelection(_)));
    }

    #[test]
    fn test_grade_rejects_unknown_question() {
        let snap = snapshot();
        let err = snap
            .grade(&[Selection { question_id: 99, option_id: 1000 }])
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidSelection(_)));
    }

    #[test]
    fn test_grade_rejects_duplicate_question() {
        let snap = snapshot();
        let err = snap
            .grade(&[
                Selection { question_id: 10, option_id: 1000 },
                Selection { question_id: 10, option_id: 1001 },
            ])
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidSelection(_)));
    }

    #[test]
    fn test_paper_hides_correctness() {
        let paper = snapshot().to_paper();
        let json = serde_json::to_value(&paper).unwrap();
        assert_eq!(paper.questions.len(), 3);
        assert!(!json.to_string().contains("is_correct"));
    }
}
