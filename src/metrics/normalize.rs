use std::fmt;

/// Text after canonicalization: lowercase ASCII letters, digits and single
/// spaces, with no leading or trailing space.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn new(raw: &str) -> Self {
        Self(normalize_text(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn tokens(&self) -> Vec<&str> {
        self.0.split_whitespace().collect()
    }

    pub fn chars(&self) -> Vec<char> {
        self.0.chars().collect()
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub fn normalize_text(raw: &str) -> String {
    let lowered = raw.to_lowercase().replace('\n', " ");
    let scrubbed: String = lowered
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();
    scrubbed.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Missing text normalizes to the empty string.
pub fn normalize_opt(raw: Option<&str>) -> NormalizedText {
    NormalizedText::new(raw.unwrap_or_default())
}
