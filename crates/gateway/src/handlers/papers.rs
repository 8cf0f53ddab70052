//! Paper management handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use validator::Validate;

use super::resolve_caller;
use crate::AppState;
use peerforge_common::{
    auth::CallerId,
    errors::{AppError, Result},
    models::{Paper, PaperId, PaperStatus, User, UserId},
};

/// Request to submit a new paper
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitPaperRequest {
    #[validate(length(min = 1, max = 1000))]
    pub title: String,

    #[validate(length(min = 1, max = 50000))]
    #[serde(rename = "abstract")]
    pub abstract_text: String,

    #[validate(length(min = 1))]
    pub content: String,

    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListPapersQuery {
    /// Papers submitted by this author
    pub author: Option<String>,

    /// Blinded papers assigned to this reviewer
    pub reviewer: Option<String>,

    /// Papers in this status; legacy aliases accepted
    pub status: Option<String>,

    /// Papers with a keyword containing this term
    pub keyword: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct AssignReviewerRequest {
    pub reviewer_id: String,
}

/// Author identity is visible only to admins and the author; everyone
/// else gets a blinded copy
fn redact_for(caller: &User, paper: Paper) -> Paper {
    if caller.is_admin() || caller.id == paper.author_id {
        paper
    } else {
        paper.blinded()
    }
}

/// Submit a new paper with the caller as author
pub async fn submit_paper(
    State(state): State<AppState>,
    caller: CallerId,
    Json(request): Json<SubmitPaperRequest>,
) -> Result<(StatusCode, Json<Paper>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let paper = state.services.papers.submit_paper(
        &request.title,
        &request.abstract_text,
        &request.content,
        &caller.0,
        request.keywords,
    )?;

    Ok((StatusCode::CREATED, Json(paper)))
}

/// List papers, with optional author/reviewer/status/keyword filters
///
/// Filters are mutually exclusive, checked in this order. Every listed
/// paper goes through the same redaction as `get_paper` so a filtered
/// listing never shows an author the caller may not see.
pub async fn list_papers(
    State(state): State<AppState>,
    caller: CallerId,
    Query(query): Query<ListPapersQuery>,
) -> Result<Json<Vec<Paper>>> {
    let caller = resolve_caller(&state, &caller)?;
    let papers = &state.services.papers;

    let listed = if let Some(reviewer) = query.reviewer {
        papers.papers_for_reviewer(&UserId::from(reviewer))
    } else if let Some(author) = query.author {
        papers.papers_by_author(&UserId::from(author))
    } else if let Some(status) = query.status {
        let status: PaperStatus = status
            .parse()
            .map_err(|e: String| AppError::InvalidFormat { message: e })?;
        papers.papers_by_status(status)
    } else if let Some(keyword) = query.keyword {
        papers.search_by_keyword(&keyword)
    } else {
        papers.all_papers()
    };

    Ok(Json(
        listed
            .into_iter()
            .map(|p| redact_for(&caller, p))
            .collect(),
    ))
}

/// Get a paper by ID; blinded unless the caller is the author or an admin
pub async fn get_paper(
    State(state): State<AppState>,
    caller: CallerId,
    Path(paper_id): Path<String>,
) -> Result<Json<Paper>> {
    let caller = resolve_caller(&state, &caller)?;
    let paper = state.services.papers.find_by_id(&PaperId::from(paper_id))?;
    Ok(Json(redact_for(&caller, paper)))
}

/// Delete a paper; admin-only. Its reviews are left behind.
pub async fn delete_paper(
    State(state): State<AppState>,
    caller: CallerId,
    Path(paper_id): Path<String>,
) -> Result<StatusCode> {
    resolve_caller(&state, &caller)?.require_admin()?;

    state.services.papers.delete_paper(&PaperId::from(paper_id))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Override a paper's status; admin-only
pub async fn update_status(
    State(state): State<AppState>,
    caller: CallerId,
    Path(paper_id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Paper>> {
    resolve_caller(&state, &caller)?.require_admin()?;

    let status: PaperStatus = request
        .status
        .parse()
        .map_err(|e: String| AppError::InvalidFormat { message: e })?;

    let paper = state
        .services
        .papers
        .update_status(&PaperId::from(paper_id), status)?;
    Ok(Json(paper))
}

/// List the reviewer IDs assigned to a paper; admin-only
///
/// Reviewer identities are the other half of the blind; exposing them
/// to authors would defeat it.
pub async fn list_reviewers(
    State(state): State<AppState>,
    caller: CallerId,
    Path(paper_id): Path<String>,
) -> Result<Json<Vec<UserId>>> {
    resolve_caller(&state, &caller)?.require_admin()?;

    let paper_id = PaperId::from(paper_id);
    // distinguish a missing paper from one with no reviewers
    state.services.papers.find_by_id(&paper_id)?;
    Ok(Json(state.services.papers.reviewers_for_paper(&paper_id)))
}

/// Assign a reviewer to a paper; admin-only
pub async fn assign_reviewer(
    State(state): State<AppState>,
    caller: CallerId,
    Path(paper_id): Path<String>,
    Json(request): Json<AssignReviewerRequest>,
) -> Result<Json<Paper>> {
    resolve_caller(&state, &caller)?.require_admin()?;

    let paper = state.services.papers.assign_reviewer(
        &PaperId::from(paper_id),
        &UserId::from(request.reviewer_id),
    )?;
    Ok(Json(paper))
}

/// Remove a reviewer from a paper; admin-only
pub async fn remove_reviewer(
    State(state): State<AppState>,
    caller: CallerId,
    Path((paper_id, reviewer_id)): Path<(String, String)>,
) -> Result<Json<Paper>> {
    resolve_caller(&state, &caller)?.require_admin()?;

    let paper = state
        .services
        .papers
        .remove_reviewer(&PaperId::from(paper_id), &UserId::from(reviewer_id))?;
    Ok(Json(paper))
}
