//! Review handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::resolve_caller;
use crate::AppState;
use peerforge_common::{
    auth::CallerId,
    errors::{AppError, Result},
    models::{PaperId, Review, ReviewId, UserId},
};

/// Request to submit a review
///
/// Out-of-range ratings are clamped to [1, 5], not rejected.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitReviewRequest {
    pub rating: i64,

    #[validate(length(max = 50000))]
    pub comments: String,
}

#[derive(Serialize)]
pub struct RatingResponse {
    pub paper_id: String,
    pub average_rating: f64,
    pub review_count: usize,
}

/// Submit a review with the caller as reviewer
pub async fn submit_review(
    State(state): State<AppState>,
    caller: CallerId,
    Path(paper_id): Path<String>,
    Json(request): Json<SubmitReviewRequest>,
) -> Result<(StatusCode, Json<Review>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let review = state.services.reviews.submit_review(
        &PaperId::from(paper_id),
        &caller.0,
        request.rating,
        &request.comments,
    )?;

    Ok((StatusCode::CREATED, Json(review)))
}

/// List reviews for a paper, blinded unless the caller is an admin
pub async fn list_reviews(
    State(state): State<AppState>,
    caller: CallerId,
    Path(paper_id): Path<String>,
) -> Result<Json<Vec<Review>>> {
    let role = resolve_caller(&state, &caller)?.role();

    let paper_id = PaperId::from(paper_id);
    state.services.papers.find_by_id(&paper_id)?;

    Ok(Json(state.services.reviews.reviews_for_paper(&paper_id, role)))
}

/// Average rating for a paper; 0.0 when it has no reviews
pub async fn average_rating(
    State(state): State<AppState>,
    Path(paper_id): Path<String>,
) -> Result<Json<RatingResponse>> {
    let paper_id = PaperId::from(paper_id);
    state.services.papers.find_by_id(&paper_id)?;

    let reviews = &state.services.reviews;
    let count = reviews
        .all_reviews()
        .iter()
        .filter(|r| r.paper_id == paper_id)
        .count();

    Ok(Json(RatingResponse {
        average_rating: reviews.average_rating(&paper_id),
        paper_id: paper_id.to_string(),
        review_count: count,
    }))
}

/// Reviews filed by a reviewer; visible to that reviewer and admins
pub async fn reviews_by_reviewer(
    State(state): State<AppState>,
    caller: CallerId,
    Path(reviewer_id): Path<String>,
) -> Result<Json<Vec<Review>>> {
    let reviewer_id = UserId::from(reviewer_id);

    let caller_user = resolve_caller(&state, &caller)?;
    if !caller_user.is_admin() && caller_user.id != reviewer_id {
        return Err(AppError::Forbidden {
            message: "Reviews are only visible to their author and admins".to_string(),
        });
    }

    Ok(Json(state.services.reviews.reviews_by_reviewer(&reviewer_id)))
}

/// Delete a review; admin-only
pub async fn delete_review(
    State(state): State<AppState>,
    caller: CallerId,
    Path(review_id): Path<String>,
) -> Result<StatusCode> {
    resolve_caller(&state, &caller)?.require_admin()?;

    state.services.reviews.delete_review(&ReviewId::from(review_id))?;
    Ok(StatusCode::NO_CONTENT)
}
