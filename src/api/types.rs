// API type definitions
// Request payload parsing and response bodies for the trivia endpoints

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};

use super::error::{ApiError, ApiResult};
use crate::store::{Category, Question};

/// A non-empty JSON object body
pub type JsonObject = Map<String, Value>;

/// Category id → label; serializes with string keys
pub type CategoryMap = BTreeMap<i64, String>;

pub fn category_map(categories: Vec<Category>) -> CategoryMap {
    categories.into_iter().map(|c| (c.id, c.kind)).collect()
}

// ============== Responses ==============

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub success: bool,
    pub categories: CategoryMap,
}

/// `GET /questions`
#[derive(Debug, Serialize)]
pub struct QuestionPage<'a> {
    pub success: bool,
    pub questions: &'a [Question],
    pub total_questions: usize,
    pub categories: CategoryMap,
    /// Label of the configured default category, `null` when it does not exist
    pub current_category: Option<String>,
}

/// `GET /categories/{id}/questions`
#[derive(Debug, Serialize)]
pub struct CategoryQuestionPage<'a> {
    pub success: bool,
    pub questions: &'a [Question],
    pub total_questions: usize,
    pub current_category: i64,
}

/// `POST /questions/find`; `current_category` is always `null`
#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub success: bool,
    pub total_questions: usize,
    pub questions: Vec<Question>,
    pub current_category: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub success: bool,
    pub deleted: i64,
}

#[derive(Debug, Serialize)]
pub struct Created {
    pub success: bool,
    pub created: i64,
}

/// `POST /quizzes`; `question` is `null` once the pool is exhausted
#[derive(Debug, Serialize)]
pub struct QuizDraw {
    pub success: bool,
    pub question: Option<Question>,
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub success: bool,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions: Option<usize>,
}

// ============== Requests ==============

/// Parse a request body that must be a non-empty JSON object
pub fn parse_json_object(bytes: &[u8]) -> ApiResult<JsonObject> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::Unprocessable("missing JSON body".to_string()));
    }
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) if !map.is_empty() => Ok(map),
        Ok(Value::Object(_)) => Err(ApiError::Unprocessable("empty JSON object".to_string())),
        Ok(other) => Err(ApiError::Unprocessable(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(ApiError::Unprocessable(format!("invalid JSON: {e}"))),
    }
}

/// `searchTerm` lower-cased; `None` when absent, null or empty
pub fn search_term(body: &JsonObject) -> ApiResult<Option<String>> {
    match body.get("searchTerm") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(term)) => {
            let term = term.to_lowercase();
            Ok((!term.is_empty()).then_some(term))
        }
        Some(other) => Err(ApiError::Unprocessable(format!(
            "searchTerm must be a string, got {}",
            json_kind(other)
        ))),
    }
}

/// Parsed `POST /quizzes` body
#[derive(Debug, PartialEq, Eq)]
pub struct QuizRequest {
    /// `None` means any category (client sends id 0)
    pub category: Option<i64>,
    pub previous_questions: HashSet<i64>,
}

impl QuizRequest {
    pub fn from_body(body: &JsonObject) -> ApiResult<Self> {
        let quiz_category = match body.get("quiz_category") {
            None | Some(Value::Null) => {
                return Err(ApiError::BadRequest("quiz_category is required".to_string()))
            }
            Some(value) => value,
        };
        let previous = match body.get("previous_questions") {
            None | Some(Value::Null) => {
                return Err(ApiError::BadRequest(
                    "previous_questions is required".to_string(),
                ))
            }
            Some(value) => value,
        };

        let category_id = quiz_category
            .get("id")
            .and_then(int_like)
            .ok_or_else(|| ApiError::BadRequest("quiz_category.id must be an integer".to_string()))?;

        let previous_questions = previous
            .as_array()
            .ok_or_else(|| {
                ApiError::BadRequest("previous_questions must be a list of ids".to_string())
            })?
            .iter()
            .map(|id| {
                id.as_i64().ok_or_else(|| {
                    ApiError::BadRequest(format!("previous_questions contains non-id {id}"))
                })
            })
            .collect::<ApiResult<HashSet<i64>>>()?;

        Ok(Self {
            category: (category_id != 0).then_some(category_id),
            previous_questions,
        })
    }
}

/// Integer from a JSON number or numeric string
fn int_like(value: &Value) -> Option<i64> {
    crate::store::lenient_int(value).ok().flatten()
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> JsonObject {
        match value {
            Value::Object(map) => map,
            _ => panic!("test body must be an object"),
        }
    }

    #[test]
    fn test_parse_json_object_rejects_non_bodies() {
        for raw in ["", "  \n", "{}", "[]", "null", "42", "{\"question\":", "\"text\""] {
            let err = parse_json_object(raw.as_bytes()).unwrap_err();
            assert!(matches!(err, ApiError::Unprocessable(_)), "{raw:?}");
        }
        assert_eq!(
            parse_json_object(br#"{"searchTerm":"title"}"#).unwrap()["searchTerm"],
            "title"
        );
    }

    #[test]
    fn test_search_term() {
        assert_eq!(
            search_term(&object(json!({"searchTerm": "TiTle"}))).unwrap(),
            Some("title".to_string())
        );
        assert_eq!(search_term(&object(json!({"searchTerm": ""}))).unwrap(), None);
        assert_eq!(search_term(&object(json!({"searchTerm": null}))).unwrap(), None);
        assert_eq!(search_term(&object(json!({"other": 1}))).unwrap(), None);
        assert!(search_term(&object(json!({"searchTerm": 3}))).is_err());
    }

    #[test]
    fn test_quiz_request_any_category() {
        let req = QuizRequest::from_body(&object(json!({
            "quiz_category": {"type": "click", "id": 0},
            "previous_questions": []
        })))
        .unwrap();
        assert_eq!(req.category, None);
        assert!(req.previous_questions.is_empty());
    }

    #[test]
    fn test_quiz_request_string_category_id() {
        let req = QuizRequest::from_body(&object(json!({
            "quiz_category": {"type": "Science", "id": "1"},
            "previous_questions": [20, 21]
        })))
        .unwrap();
        assert_eq!(req.category, Some(1));
        assert_eq!(req.previous_questions, [20, 21].into_iter().collect());
    }

    #[test]
    fn test_quiz_request_missing_keys_are_bad_requests() {
        let bodies = [
            json!({"previous_questions": []}),
            json!({"quiz_category": {"id": 1}}),
            json!({"quiz_category": null, "previous_questions": []}),
            json!({"quiz_category": {"id": 1}, "previous_questions": null}),
            json!({"quiz_category": {"type": "Art"}, "previous_questions": []}),
            json!({"quiz_category": {"id": "art"}, "previous_questions": []}),
            json!({"quiz_category": {"id": 1}, "previous_questions": "1,2"}),
            json!({"quiz_category": {"id": 1}, "previous_questions": ["a"]}),
        ];
        for body in bodies {
            let err = QuizRequest::from_body(&object(body.clone())).unwrap_err();
            assert!(matches!(err, ApiError::BadRequest(_)), "{body}");
        }
    }

    #[test]
    fn test_category_map_serializes_string_keys() {
        let map = category_map(vec![
            Category {
                id: 2,
                kind: "Art".to_string(),
            },
            Category {
                id: 1,
                kind: "Science".to_string(),
            },
        ]);
        assert_eq!(
            serde_json::to_string(&map).unwrap(),
            r#"{"1":"Science","2":"Art"}"#
        );
    }
}
