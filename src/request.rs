//! User supplied generation parameters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GuideError;

/// How deep the generated guide should go.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Depth {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Depth {
    /// All depths in the order they are offered to the user.
    pub const ALL: [Depth; 3] = [Depth::Beginner, Depth::Intermediate, Depth::Advanced];

    /// Returns the label used in prompts and selection widgets.
    pub fn as_str(self) -> &'static str {
        match self {
            Depth::Beginner => "Beginner",
            Depth::Intermediate => "Intermediate",
            Depth::Advanced => "Advanced",
        }
    }
}

/// Writing register of the generated guide.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tone {
    #[default]
    Academic,
    Simple,
    Conversational,
}

impl Tone {
    /// All tones in the order they are offered to the user.
    pub const ALL: [Tone; 3] = [Tone::Academic, Tone::Simple, Tone::Conversational];

    /// Returns the label used in prompts and selection widgets.
    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Academic => "Academic",
            Tone::Simple => "Simple",
            Tone::Conversational => "Conversational",
        }
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a depth or tone label is not recognised.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

fn parse_label<T: Copy>(
    kind: &'static str,
    value: &str,
    options: &[T],
    label: fn(T) -> &'static str,
) -> Result<T, UnknownVariant> {
    let trimmed = value.trim();
    options
        .iter()
        .copied()
        .find(|option| label(*option).eq_ignore_ascii_case(trimmed))
        .ok_or_else(|| UnknownVariant {
            kind,
            value: value.to_owned(),
        })
}

impl FromStr for Depth {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label("depth", s, &Depth::ALL, Depth::as_str)
    }
}

impl FromStr for Tone {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label("tone", s, &Tone::ALL, Tone::as_str)
    }
}

/// The validated inputs of a single generation.
///
/// The topic is a comma separated keyword list and is guaranteed to contain at
/// least one non-blank character.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationRequest {
    topic: String,
    depth: Depth,
    tone: Tone,
}

impl GenerationRequest {
    /// Validates the topic and builds a request.
    pub fn new(topic: impl Into<String>, depth: Depth, tone: Tone) -> Result<Self, GuideError> {
        let topic = topic.into();
        if topic.trim().is_empty() {
            return Err(GuideError::InputInvalid("Please enter a topic first!".to_owned()));
        }

        Ok(Self {
            topic: topic.trim().to_owned(),
            depth,
            tone,
        })
    }

    /// Returns the topic exactly as entered, minus surrounding whitespace.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Returns the individual keywords of the topic, skipping empty entries.
    pub fn keywords(&self) -> Vec<&str> {
        self.topic
            .split(',')
            .map(str::trim)
            .filter(|keyword| !keyword.is_empty())
            .collect()
    }

    pub fn depth(&self) -> Depth {
        self.depth
    }

    pub fn tone(&self) -> Tone {
        self.tone
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_topic_is_rejected() {
        let err = GenerationRequest::new("   ", Depth::Beginner, Tone::Simple).unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn keywords_are_split_and_trimmed() {
        let request =
            GenerationRequest::new(" Solar System, ,Python Basics ", Depth::Advanced, Tone::Academic)
                .unwrap();
        assert_eq!(request.topic(), "Solar System, ,Python Basics");
        assert_eq!(request.keywords(), vec!["Solar System", "Python Basics"]);
    }

    #[test]
    fn labels_parse_case_insensitively() {
        assert_eq!("intermediate".parse::<Depth>().unwrap(), Depth::Intermediate);
        assert_eq!(" Conversational ".parse::<Tone>().unwrap(), Tone::Conversational);
        assert!("Expert".parse::<Depth>().is_err());
    }
}
