use std::collections::HashMap;

use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::common::{provided, ApiError};
use crate::domains::quiz::{QuizCategory, QuizOption, QuizQuestion};
use crate::server::app::AppState;

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct CategoriesResponse {
    categories: Vec<QuizCategory>,
}

/// Public quiz payload: option texts only, the correct answer travels as
/// an index
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryQuestionsResponse {
    key: String,
    title: String,
    description: String,
    questions: Vec<PublicQuestion>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PublicQuestion {
    id: i64,
    question: String,
    explanation: String,
    options: Vec<String>,
    correct_index: usize,
}

#[derive(Serialize)]
struct CategoryRef {
    key: String,
    title: String,
}

#[derive(Serialize)]
pub struct AdminQuestion {
    #[serde(flatten)]
    question: QuizQuestion,
    options: Vec<QuizOption>,
}

#[derive(Serialize)]
pub struct AdminQuestionWithCategory {
    #[serde(flatten)]
    question: QuizQuestion,
    category: CategoryRef,
    options: Vec<QuizOption>,
}

#[derive(Serialize)]
pub struct AdminQuestionsResponse {
    questions: Vec<AdminQuestionWithCategory>,
}

#[derive(Serialize)]
pub struct MessageBody {
    message: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertCategoryInput {
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionInput {
    #[serde(default)]
    category_key: Option<String>,
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    options: Option<Vec<String>>,
    #[serde(default)]
    correct_index: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuestionInput {
    #[serde(default)]
    category_key: Option<String>,
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    options: Option<Vec<String>>,
    #[serde(default)]
    correct_index: Option<i64>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub async fn list_categories_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<CategoriesResponse>, ApiError> {
    let categories = QuizCategory::list_all(&state.db_pool).await?;
    Ok(Json(CategoriesResponse { categories }))
}

pub async fn category_questions_handler(
    Extension(state): Extension<AppState>,
    Path(key): Path<String>,
) -> Result<Json<CategoryQuestionsResponse>, ApiError> {
    let category = QuizCategory::find_by_key(&key, &state.db_pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    let questions = QuizQuestion::list_for_category(category.id, &state.db_pool).await?;
    let mut options_by_question =
        grouped_options(&questions.iter().map(|q| q.id).collect::<Vec<_>>(), &state).await?;

    let questions = questions
        .into_iter()
        .map(|q| {
            let options = options_by_question.remove(&q.id).unwrap_or_default();
            // A question with no flagged option still needs an index the
            // quiz runner can render
            let correct_index = options.iter().position(|o| o.is_correct).unwrap_or(0);
            PublicQuestion {
                id: q.id,
                question: q.question,
                explanation: q.explanation.unwrap_or_default(),
                options: options.into_iter().map(|o| o.text).collect(),
                correct_index,
            }
        })
        .collect();

    Ok(Json(CategoryQuestionsResponse {
        key: category.key,
        title: category.title,
        description: category.description.unwrap_or_default(),
        questions,
    }))
}

pub async fn admin_upsert_category_handler(
    Extension(state): Extension<AppState>,
    input: Option<Json<UpsertCategoryInput>>,
) -> Result<(StatusCode, Json<QuizCategory>), ApiError> {
    let input = input.map(|Json(i)| i).unwrap_or_default();

    let (key, title) = match (provided(&input.key), provided(&input.title)) {
        (Some(k), Some(t)) => (k, t),
        _ => {
            return Err(ApiError::Validation(
                "key and title are required".to_string(),
            ))
        }
    };

    let category =
        QuizCategory::upsert(key, title, input.description.as_deref(), &state.db_pool).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn admin_create_question_handler(
    Extension(state): Extension<AppState>,
    input: Option<Json<CreateQuestionInput>>,
) -> Result<(StatusCode, Json<AdminQuestion>), ApiError> {
    let input = input.map(|Json(i)| i).unwrap_or_default();

    let (category_key, question, option_texts) = match (
        provided(&input.category_key),
        provided(&input.question),
        input.options.as_deref().filter(|o| o.len() >= 2),
    ) {
        (Some(k), Some(q), Some(o)) => (k, q, o),
        _ => {
            return Err(ApiError::Validation(
                "categoryKey, question and at least 2 options required".to_string(),
            ))
        }
    };
    let correct_index = valid_correct_index(input.correct_index, option_texts.len())?;

    let category = QuizCategory::find_by_key(category_key, &state.db_pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    let options = flag_correct_option(option_texts, correct_index);
    let (created, options) = QuizQuestion::create_with_options(
        category.id,
        question,
        provided(&input.explanation),
        &options,
        &state.db_pool,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(AdminQuestion {
            question: created,
            options,
        }),
    ))
}

pub async fn admin_list_questions_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<AdminQuestionsResponse>, ApiError> {
    let rows = QuizQuestion::list_all_with_category(&state.db_pool).await?;
    let mut options_by_question =
        grouped_options(&rows.iter().map(|r| r.id).collect::<Vec<_>>(), &state).await?;

    let questions = rows
        .into_iter()
        .map(|row| AdminQuestionWithCategory {
            question: QuizQuestion {
                id: row.id,
                category_id: row.category_id,
                question: row.question,
                explanation: row.explanation,
            },
            category: CategoryRef {
                key: row.category_key,
                title: row.category_title,
            },
            options: options_by_question.remove(&row.id).unwrap_or_default(),
        })
        .collect();

    Ok(Json(AdminQuestionsResponse { questions }))
}

pub async fn admin_update_question_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
    input: Option<Json<UpdateQuestionInput>>,
) -> Result<Json<AdminQuestionWithCategory>, ApiError> {
    let question_id = parse_question_id(&id)?;
    let input = input.map(|Json(i)| i).unwrap_or_default();

    let (question, option_texts) = match (
        provided(&input.question),
        input.options.as_deref().filter(|o| o.len() >= 2),
    ) {
        (Some(q), Some(o)) => (q, o),
        _ => {
            return Err(ApiError::Validation(
                "question and at least 2 options required".to_string(),
            ))
        }
    };
    let correct_index = valid_correct_index(input.correct_index, option_texts.len())?;

    let category_id = match provided(&input.category_key) {
        Some(key) => Some(
            QuizCategory::find_by_key(key, &state.db_pool)
                .await?
                .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?
                .id,
        ),
        None => None,
    };

    let options = flag_correct_option(option_texts, correct_index);
    let (updated, options) = QuizQuestion::update_with_options(
        question_id,
        category_id,
        question,
        provided(&input.explanation),
        &options,
        &state.db_pool,
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Question not found".to_string()))?;

    let category = QuizCategory::find_by_id(updated.category_id, &state.db_pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    Ok(Json(AdminQuestionWithCategory {
        question: updated,
        category: CategoryRef {
            key: category.key,
            title: category.title,
        },
        options,
    }))
}

pub async fn admin_delete_question_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageBody>, ApiError> {
    let question_id = parse_question_id(&id)?;

    if !QuizQuestion::delete_with_options(question_id, &state.db_pool).await? {
        return Err(ApiError::NotFound("Question not found".to_string()));
    }

    Ok(Json(MessageBody {
        message: "Question deleted successfully".to_string(),
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_question_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::Validation("Invalid question ID".to_string()))
}

fn valid_correct_index(correct_index: Option<i64>, option_count: usize) -> Result<usize, ApiError> {
    match correct_index {
        Some(i) if i >= 0 && (i as usize) < option_count => Ok(i as usize),
        _ => Err(ApiError::Validation(
            "valid correctIndex required".to_string(),
        )),
    }
}

fn flag_correct_option(texts: &[String], correct_index: usize) -> Vec<(String, bool)> {
    texts
        .iter()
        .enumerate()
        .map(|(idx, text)| (text.clone(), idx == correct_index))
        .collect()
}

async fn grouped_options(
    question_ids: &[i64],
    state: &AppState,
) -> Result<HashMap<i64, Vec<QuizOption>>, ApiError> {
    let mut grouped: HashMap<i64, Vec<QuizOption>> = HashMap::new();
    if question_ids.is_empty() {
        return Ok(grouped);
    }
    for option in QuizOption::list_for_questions(question_ids, &state.db_pool).await? {
        grouped.entry(option.question_id).or_default().push(option);
    }
    Ok(grouped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_index_must_land_inside_the_options() {
        assert_eq!(valid_correct_index(Some(0), 4).unwrap(), 0);
        assert_eq!(valid_correct_index(Some(3), 4).unwrap(), 3);
        assert!(valid_correct_index(Some(4), 4).is_err());
        assert!(valid_correct_index(Some(-1), 4).is_err());
        assert!(valid_correct_index(None, 4).is_err());
    }

    #[test]
    fn exactly_one_option_is_flagged_correct() {
        let options = flag_correct_option(
            &["a".to_string(), "b".to_string(), "c".to_string()],
            1,
        );
        assert_eq!(
            options.iter().map(|(_, correct)| *correct).collect::<Vec<_>>(),
            vec![false, true, false]
        );
    }

    #[test]
    fn invalid_question_id_is_a_validation_error() {
        assert!(parse_question_id("17").is_ok());
        assert!(matches!(
            parse_question_id("seventeen"),
            Err(ApiError::Validation(message)) if message == "Invalid question ID"
        ));
    }
}
