// Trivia endpoint handlers
// Each handler performs one store operation and renders a fixed JSON shape

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use rand::seq::SliceRandom;

use super::error::{ApiError, ApiResult};
use super::pagination::page_slice;
use super::response::json_response;
use super::types::{
    category_map, search_term, CategoriesResponse, CategoryQuestionPage, Created, Deleted, Health,
    JsonObject, QuestionPage, QuizDraw, QuizRequest, SearchResults,
};
use crate::config::AppState;
use crate::logger;
use crate::store::{NewQuestion, Question};

type HandlerResult = ApiResult<Response<Full<Bytes>>>;

/// `GET /categories`
pub async fn list_categories(state: &AppState) -> HandlerResult {
    let categories = state.store.categories().await;
    if categories.is_empty() {
        return Err(ApiError::NotFound("no categories".to_string()));
    }

    Ok(json_response(
        StatusCode::OK,
        &CategoriesResponse {
            success: true,
            categories: category_map(categories),
        },
    ))
}

/// `GET /questions?page=N`
pub async fn list_questions(state: &AppState, page: i64) -> HandlerResult {
    let questions = state.store.questions().await;
    let current = page_slice(&questions, page);
    if current.is_empty() {
        return Err(ApiError::NotFound(format!(
            "page {page} of {} questions",
            questions.len()
        )));
    }

    let categories = category_map(state.store.categories().await);
    let current_category = state
        .config
        .trivia
        .default_category
        .and_then(|id| categories.get(&id).cloned());

    Ok(json_response(
        StatusCode::OK,
        &QuestionPage {
            success: true,
            questions: current,
            total_questions: questions.len(),
            categories,
            current_category,
        },
    ))
}

/// `DELETE /questions/{id}`
pub async fn delete_question(state: &AppState, id: i64) -> HandlerResult {
    if !state.store.delete(id).await? {
        return Err(ApiError::NotFound(format!("question {id}")));
    }
    logger::log_debug(&format!("Deleted question {id}"));

    Ok(json_response(
        StatusCode::OK,
        &Deleted {
            success: true,
            deleted: id,
        },
    ))
}

/// `POST /questions`
pub async fn create_question(state: &AppState, body: JsonObject) -> HandlerResult {
    let new: NewQuestion = serde_json::from_value(body.into())
        .map_err(|e| ApiError::Unprocessable(format!("invalid question fields: {e}")))?;

    let id = state.store.insert(new).await?;
    logger::log_debug(&format!("Created question {id}"));

    Ok(json_response(
        StatusCode::OK,
        &Created {
            success: true,
            created: id,
        },
    ))
}

/// `POST /questions/find`
///
/// The term is lower-cased, then matched as a case-sensitive substring of
/// the stored question text. Results are not paginated.
pub async fn search_questions(state: &AppState, body: &JsonObject) -> HandlerResult {
    let Some(term) = search_term(body)? else {
        return Err(ApiError::NotFound("empty search term".to_string()));
    };

    let questions = state.store.search(&term).await;
    Ok(json_response(
        StatusCode::OK,
        &SearchResults {
            success: true,
            total_questions: questions.len(),
            questions,
            current_category: None,
        },
    ))
}

/// `GET /categories/{id}/questions?page=N`
///
/// An unknown category or an empty page is a 404, like `GET /questions`.
pub async fn category_questions(state: &AppState, category: i64, page: i64) -> HandlerResult {
    if state.store.category(category).await.is_none() {
        return Err(ApiError::NotFound(format!("category {category}")));
    }

    let questions = state.store.questions_in_category(category).await;
    let current = page_slice(&questions, page);
    if current.is_empty() {
        return Err(ApiError::NotFound(format!(
            "page {page} of {} questions in category {category}",
            questions.len()
        )));
    }

    Ok(json_response(
        StatusCode::OK,
        &CategoryQuestionPage {
            success: true,
            questions: current,
            total_questions: questions.len(),
            current_category: category,
        },
    ))
}

/// `POST /quizzes`
pub async fn quiz_draw(state: &AppState, body: &JsonObject) -> HandlerResult {
    let request = QuizRequest::from_body(body)?;

    let candidates = state
        .store
        .quiz_candidates(request.category, &request.previous_questions)
        .await;
    let question = pick_random(&candidates);

    logger::log_debug(&format!(
        "Quiz draw: category {:?}, {} seen, {} candidates, picked {:?}",
        request.category,
        request.previous_questions.len(),
        candidates.len(),
        question.as_ref().map(|q| q.id)
    ));

    Ok(json_response(
        StatusCode::OK,
        &QuizDraw {
            success: true,
            question,
        },
    ))
}

/// Uniform pick; `None` for an empty pool
fn pick_random(candidates: &[Question]) -> Option<Question> {
    candidates.choose(&mut rand::thread_rng()).cloned()
}

/// Liveness probe
pub fn liveness() -> Response<Full<Bytes>> {
    json_response(
        StatusCode::OK,
        &Health {
            success: true,
            status: "ok",
            questions: None,
        },
    )
}

/// Readiness probe, reports the store size
pub async fn readiness(state: &AppState) -> HandlerResult {
    Ok(json_response(
        StatusCode::OK,
        &Health {
            success: true,
            status: "ok",
            questions: Some(state.store.question_count().await),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn question(id: i64) -> Question {
        Question {
            id,
            question: None,
            answer: None,
            category: Some(1),
            difficulty: None,
        }
    }

    #[test]
    fn test_pick_random_empty() {
        assert!(pick_random(&[]).is_none());
    }

    #[test]
    fn test_pick_random_covers_pool() {
        let pool: Vec<Question> = (1..=4).map(question).collect();
        let mut seen = HashSet::new();
        for _ in 0..500 {
            let picked = pick_random(&pool).unwrap();
            assert!((1..=4).contains(&picked.id));
            seen.insert(picked.id);
        }
        assert_eq!(seen.len(), 4);
    }
}
