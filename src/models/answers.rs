// src/models/answers.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A student's selections, keyed by question id.
///
/// Each question holds at most one selected option; answering again replaces
/// the previous selection. Questions without an entry are unanswered.
/// Serialized as a plain JSON object (`{"q1": "A"}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerMap(BTreeMap<String, String>);

impl AnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `option` for `question_id`, returning the option it replaced.
    pub fn select(
        &mut self,
        question_id: impl Into<String>,
        option: impl Into<String>,
    ) -> Option<String> {
        self.0.insert(question_id.into(), option.into())
    }

    pub fn get(&self, question_id: &str) -> Option<&str> {
        self.0.get(question_id).map(String::as_str)
    }

    pub fn is_answered(&self, question_id: &str) -> bool {
        self.0.contains_key(question_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(q, a)| (q.as_str(), a.as_str()))
    }
}

impl<Q, A> FromIterator<(Q, A)> for AnswerMap
where
    Q: Into<String>,
    A: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (Q, A)>>(iter: I) -> Self {
        let mut answers = AnswerMap::new();
        for (q, a) in iter {
            answers.select(q, a);
        }
        answers
    }
}
