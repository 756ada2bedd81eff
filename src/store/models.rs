// Store data model
// Rows for the two trivia tables and the insert payload for questions

use serde::{Deserialize, Deserializer, Serialize};

/// A category row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

/// A question row
///
/// Every column except `id` is nullable: the create endpoint stores
/// whatever subset of fields the client sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub category: Option<i64>,
    #[serde(default)]
    pub difficulty: Option<i64>,
}

/// Fields accepted when creating a question
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewQuestion {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub category: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub difficulty: Option<i64>,
}

impl NewQuestion {
    pub(super) fn into_row(self, id: i64) -> Question {
        Question {
            id,
            question: self.question,
            answer: self.answer,
            category: self.category,
            difficulty: self.difficulty,
        }
    }
}

/// Integer that may arrive as a JSON number or a numeric string.
///
/// The web client posts `<select>` values, which are strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrString {
    Int(i64),
    Str(String),
}

/// Parse an optional integer from a number or numeric string
pub fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<IntOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(IntOrString::Int(n)) => Ok(Some(n)),
        Some(IntOrString::Str(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("expected an integer, got \"{s}\""))),
    }
}
