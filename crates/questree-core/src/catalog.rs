//! Existing-questions catalog: pre-authored questions that can be linked
//! into the tree.
//!
//! The catalog is read-only from the engine's point of view. Linking or
//! navigating to a catalog entry copies it into the store, and from then on
//! only the store copy is edited.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{QuizError, QuizResult};
use crate::question::{Answer, Question};
use crate::text::MultilingualText;
use crate::types::{AnswerId, Correctness, Origin, QuestionId, QuestionType};

/// Read-only source of existing questions.
pub trait QuestionCatalog {
    /// Look up an entry by id.
    fn get(&self, id: &QuestionId) -> Option<&Question>;

    /// Entries whose text (in `language`), category, or tags contain `text`,
    /// case-insensitively. An empty query matches everything.
    fn search(&self, text: &str, language: &str) -> Vec<&Question>;
}

/// Catalog held in memory, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    entries: BTreeMap<QuestionId, Question>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        InMemoryCatalog::default()
    }

    /// Add an entry. The entry's id is set to `id` and its origin to catalog.
    pub fn insert(&mut self, id: QuestionId, mut question: Question) {
        question.id = id.clone();
        question.origin = Origin::Catalog;
        self.entries.insert(id, question);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a JSON object mapping ids to questions.
    pub fn from_json_str(json: &str) -> QuizResult<Self> {
        let entries: BTreeMap<QuestionId, Question> = serde_json::from_str(json)
            .map_err(|e| QuizError::config(format!("failed to parse catalog: {}", e)))?;
        let mut catalog = InMemoryCatalog::new();
        for (id, question) in entries {
            catalog.insert(id, question);
        }
        Ok(catalog)
    }

    /// Load a catalog from a JSON file.
    pub fn from_json_file(path: &Path) -> QuizResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            QuizError::config(format!(
                "failed to read catalog file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&content)
    }

    /// A one-entry catalog (`existing-1`, the capital of France).
    pub fn sample() -> Self {
        let text = |en: &str, fr: &str, is: &str| -> MultilingualText {
            [("en", en), ("fr", fr), ("is", is)].into_iter().collect()
        };

        let mut tags = std::collections::BTreeSet::new();
        tags.insert("geography".to_string());
        tags.insert("europe".to_string());

        let question = Question {
            id: QuestionId::new("existing-1"),
            declared_type: QuestionType::MultipleChoice,
            written_answer_format: None,
            text: text(
                "What is the capital of France?",
                "Quelle est la capitale de la France?",
                "Hvað er höfuðborg Frakklands?",
            ),
            hint: text(
                "Think about the City of Light",
                "Pensez à la Ville Lumière",
                "Hugsaðu um ljósaborgarinn",
            ),
            incorrect_feedback: text("", "", ""),
            answers: vec![
                Answer {
                    id: AnswerId::new(1),
                    text: text("Paris", "Paris", "París"),
                    explanation: text(
                        "Correct! Paris is the capital of France.",
                        "Correct! Paris est la capitale de la France.",
                        "Rétt! París er höfuðborg Frakklands.",
                    ),
                    order: 1,
                    correctness: Correctness::Correct,
                    branch_target: None,
                },
                Answer {
                    id: AnswerId::new(2),
                    text: text("London", "Londres", "London"),
                    explanation: text(
                        "Incorrect. London is the capital of England.",
                        "Incorrect. Londres est la capitale de l'Angleterre.",
                        "Rangt. London er höfuðborg Englands.",
                    ),
                    order: 2,
                    correctness: Correctness::Incorrect,
                    branch_target: None,
                },
            ],
            category: "Geography".to_string(),
            tags,
            parent_id: None,
            parent_answer_id: None,
            origin: Origin::Catalog,
        };

        let mut catalog = InMemoryCatalog::new();
        catalog.insert(question.id.clone(), question);
        catalog
    }
}

impl QuestionCatalog for InMemoryCatalog {
    fn get(&self, id: &QuestionId) -> Option<&Question> {
        self.entries.get(id)
    }

    fn search(&self, text: &str, language: &str) -> Vec<&Question> {
        let needle = text.trim().to_lowercase();
        self.entries
            .values()
            .filter(|question| needle.is_empty() || matches_query(question, &needle, language))
            .collect()
    }
}

fn matches_query(question: &Question, needle: &str, language: &str) -> bool {
    question.text.get(language).to_lowercase().contains(needle)
        || question.category.to_lowercase().contains(needle)
        || question
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn sample_catalog_has_existing_one() {
        let catalog = InMemoryCatalog::sample();
        let entry = catalog.get(&QuestionId::new("existing-1")).unwrap();
        assert_eq!(entry.text.get("en"), "What is the capital of France?");
        assert_eq!(entry.answers.len(), 2);
        assert_eq!(entry.origin, Origin::Catalog);
    }

    #[test]
    fn search_matches_text_category_and_tags() {
        let catalog = InMemoryCatalog::sample();
        assert_eq!(catalog.search("capital", "en").len(), 1);
        assert_eq!(catalog.search("CAPITALE", "fr").len(), 1);
        assert_eq!(catalog.search("geog", "en").len(), 1);
        assert_eq!(catalog.search("europe", "en").len(), 1);
        assert!(catalog.search("chemistry", "en").is_empty());
        assert_eq!(catalog.search("  ", "en").len(), 1);
    }

    #[test]
    fn search_is_language_specific_for_text() {
        let catalog = InMemoryCatalog::sample();
        assert!(catalog.search("capitale", "en").is_empty());
    }

    #[test]
    fn from_json_file_normalizes_entries() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"science-1": {{"id": "7", "text": {{"en": "What is H2O?"}}, "answers": []}}}}"#
        )
        .unwrap();

        let catalog = InMemoryCatalog::from_json_file(file.path()).unwrap();
        let entry = catalog.get(&QuestionId::new("science-1")).unwrap();
        assert_eq!(entry.id, QuestionId::new("science-1"));
        assert_eq!(entry.origin, Origin::Catalog);
        assert_eq!(entry.category, "Other");
    }

    #[test]
    fn malformed_catalog_is_a_config_error() {
        let err = InMemoryCatalog::from_json_str("[1, 2").unwrap_err();
        assert!(matches!(err, QuizError::Config { .. }));
    }
}
