//! Sample questions shown next to a recommendation.
//!
//! Lookup is an explicit table: an item's `category` is tried first, then its
//! exact product name. Keys compare case-insensitively after trimming.

use crate::error::{CatalogError, Result};
use ahash::AHashMap;
use serde::Serialize;
use skillmatch_core::CatalogItem;
use std::collections::HashMap;
use std::path::Path;

/// What a UI should render for an item's sample questions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "questions", rename_all = "snake_case")]
pub enum SampleView {
    /// The user has not asked to see the questions
    Hidden,
    Questions(Vec<String>),
    /// Requested, but no question set exists for this item
    Unavailable,
}

#[derive(Debug, Clone, Default)]
pub struct SampleQuestionBook {
    entries: AHashMap<String, Vec<String>>,
}

impl SampleQuestionBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock question sets for the standard assessment families
    pub fn builtin() -> Self {
        let mut book = Self::new();
        book.insert(
            "Cognitive Ability Test",
            [
                "What is the next number in the sequence: 2, 4, 8, 16, ?",
                "If John is older than Mary, and Mary is older than Alice, who is the oldest?",
            ],
        );
        book.insert(
            "Numerical Reasoning",
            [
                "What is 25% of 240?",
                "A stock price increases by 15% then drops by 10%. What is the net change?",
            ],
        );
        book.insert(
            "Verbal Reasoning",
            [
                "Choose the word most similar to 'elated': (a) sad (b) thrilled (c) bored",
                "Which word completes the sentence: She has a _____ for classical music.",
            ],
        );
        book.insert(
            "Situational Judgement Test",
            [
                "You see a teammate struggling. What do you do?",
                "Your manager asks you to stay late, but you have a prior commitment. What do you do?",
            ],
        );
        book.insert(
            "Leadership Potential Assessment",
            [
                "Describe a time you led a team through a difficult situation.",
                "How do you handle team conflict?",
            ],
        );
        book
    }

    /// Load `{"<category or product name>": ["question", ...]}` from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let raw: HashMap<String, Vec<String>> = serde_json::from_str(&content)?;

        let mut book = Self::new();
        for (key, questions) in raw {
            book.insert(&key, questions);
        }
        Ok(book)
    }

    pub fn insert<I, S>(&mut self, key: &str, questions: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries
            .insert(normalize_key(key), questions.into_iter().map(Into::into).collect());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn questions_for(&self, item: &CatalogItem) -> Option<&[String]> {
        item.category
            .as_deref()
            .and_then(|category| self.entries.get(&normalize_key(category)))
            .or_else(|| self.entries.get(&normalize_key(&item.name)))
            .filter(|questions| !questions.is_empty())
            .map(Vec::as_slice)
    }

    /// Pure function of (item, toggle state) to what should be displayed
    pub fn view(&self, item: &CatalogItem, show: bool) -> SampleView {
        if !show {
            return SampleView::Hidden;
        }
        match self.questions_for(item) {
            Some(questions) => SampleView::Questions(questions.to_vec()),
            None => SampleView::Unavailable,
        }
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}
