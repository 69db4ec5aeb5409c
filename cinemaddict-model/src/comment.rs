use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ModelError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(String);

impl CommentId {
    /// Fresh random id for a comment authored locally.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CommentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CommentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for CommentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Smile,
    Sleeping,
    Puke,
    Angry,
}

impl Emotion {
    pub const ALL: [Emotion; 4] = [
        Emotion::Smile,
        Emotion::Sleeping,
        Emotion::Puke,
        Emotion::Angry,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Smile => "smile",
            Self::Sleeping => "sleeping",
            Self::Puke => "puke",
            Self::Angry => "angry",
        }
    }

    pub fn image(&self) -> String {
        format!("./images/emoji/{}.png", self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|emotion| emotion.as_str() == s)
            .ok_or_else(|| ModelError::UnknownEmotion(s.to_string()))
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single viewer comment. `message` holds already-escaped markup text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub author: String,
    pub date: DateTime<Utc>,
    pub emotion: Emotion,
    pub message: String,
}

impl Comment {
    pub fn new(author: &str, date: DateTime<Utc>, emotion: Emotion, message: &str) -> Self {
        Self {
            id: CommentId::generate(),
            author: author.to_string(),
            date,
            emotion,
            message: message.to_string(),
        }
    }

    pub fn with_id<T>(mut self, id: T) -> Self
    where
        T: Into<CommentId>,
    {
        self.id = id.into();
        self
    }

    pub fn is_valid(&self) -> bool {
        !self.message.trim().is_empty() && !self.id.as_str().is_empty()
    }
}
