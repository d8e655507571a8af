use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Lower-cased phrase list used for substring matching against titles and
/// comment bodies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhraseSet {
    phrases: Vec<String>,
}

impl PhraseSet {
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for phrase in phrases {
            let phrase = phrase.as_ref().trim().to_lowercase();
            if !phrase.is_empty() && !normalized.contains(&phrase) {
                normalized.push(phrase);
            }
        }
        Self { phrases: normalized }
    }

    /// Parses a comma-separated list, as used by environment overrides.
    pub fn from_csv(value: &str) -> Self {
        Self::new(value.split(','))
    }

    /// `text` must already be lower-cased.
    pub fn first_match_in_lowercase(&self, text: &str) -> Option<&str> {
        self.phrases
            .iter()
            .find(|phrase| text.contains(phrase.as_str()))
            .map(String::as_str)
    }

    pub fn first_match(&self, text: &str) -> Option<&str> {
        self.first_match_in_lowercase(&text.to_lowercase())
    }

    pub fn matches(&self, text: &str) -> bool {
        self.first_match(text).is_some()
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.phrases.iter().map(String::as_str)
    }
}

impl Serialize for PhraseSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.phrases.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PhraseSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Vec::<String>::deserialize(deserializer)?;
        Ok(Self::new(raw))
    }
}
