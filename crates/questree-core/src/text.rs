//! Multilingual text: a language code → string mapping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Text keyed by language code (e.g. `"en"`).
///
/// Missing languages read as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MultilingualText(BTreeMap<String, String>);

impl MultilingualText {
    pub fn new() -> Self {
        MultilingualText::default()
    }

    /// Text with an empty entry for each of `languages`.
    pub fn blank<S: AsRef<str>>(languages: &[S]) -> Self {
        MultilingualText(
            languages
                .iter()
                .map(|lang| (lang.as_ref().to_string(), String::new()))
                .collect(),
        )
    }

    /// Look up `lang`, falling back to `""`.
    pub fn get(&self, lang: &str) -> &str {
        self.0.get(lang).map(String::as_str).unwrap_or("")
    }

    /// Look up `lang`, returning `None` when missing or empty.
    pub fn non_empty(&self, lang: &str) -> Option<&str> {
        self.0
            .get(lang)
            .map(String::as_str)
            .filter(|text| !text.is_empty())
    }

    pub fn set(&mut self, lang: impl Into<String>, value: impl Into<String>) {
        self.0.insert(lang.into(), value.into());
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, lang: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(lang, value);
        self
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MultilingualText {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        MultilingualText(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
