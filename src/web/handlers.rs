//! Route handlers
//!
//! Every handler runs a short synchronous computation over the in-memory
//! repositories and returns JSON (or the PDF bytes).

use std::collections::HashMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ConvenioError;
use crate::models::AgreementId;
use crate::reports::report_pdf::render as render_pdf;
use crate::reports::{AgreementFilter, AgreementReport, Dashboard, REPORT_FILENAME};
use crate::services::{AgreementDetail, AgreementInput, AgreementService, AgreementSummary};

use super::error::ApiResult;
use super::AppState;

/// Header naming the user behind a request
pub const USER_HEADER: &str = "x-user";

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ConvenioError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ConvenioError::Validation(rejection.body_text()))
}

fn flag(value: Option<&String>) -> Option<bool> {
    match value.map(|v| v.trim().to_lowercase()).as_deref() {
        Some("1") | Some("true") => Some(true),
        Some("0") | Some("false") => Some(false),
        _ => None,
    }
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn list_agreements(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Vec<AgreementSummary>>> {
    let service = AgreementService::new(&state.storage);
    let agreements = service.list(flag(params.get("repasse_recebido")))?;
    Ok(Json(service.summarize(agreements, state.today())?))
}

pub async fn create_agreement(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AgreementInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AgreementSummary>)> {
    let input = body(payload)?;
    let created_by = headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let service = AgreementService::new(&state.storage);
    let agreement = service.create(input, created_by)?;
    let summary = service.summary(agreement, state.today())?;
    Ok((StatusCode::CREATED, Json(summary)))
}

pub async fn agreement_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<AgreementDetail>> {
    let service = AgreementService::new(&state.storage);
    let agreement = service.resolve(&id)?;
    Ok(Json(service.detail(agreement.id, state.today())?))
}

pub async fn update_agreement(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<AgreementInput>, JsonRejection>,
) -> ApiResult<Json<AgreementSummary>> {
    let service = AgreementService::new(&state.storage);
    let existing = service.resolve(&id)?;
    let input = body(payload)?;
    let agreement = service.update(existing.id, input)?;
    Ok(Json(service.summary(agreement, state.today())?))
}

pub async fn delete_agreement(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let service = AgreementService::new(&state.storage);
    let agreement = service.resolve(&id)?;
    service.delete(agreement.id)?;
    Ok(Json(json!({ "deleted": 1, "id": agreement.id })))
}

#[derive(Debug, Deserialize)]
pub struct SelectedIds {
    #[serde(default)]
    pub ids: Vec<String>,
}

/// Ids that do not parse or do not exist are skipped
pub async fn delete_selected(
    State(state): State<AppState>,
    payload: Result<Json<SelectedIds>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let selected = body(payload)?;
    let ids: Vec<AgreementId> = selected
        .ids
        .iter()
        .filter_map(|id| id.parse().ok())
        .collect();

    let deleted = AgreementService::new(&state.storage).delete_many(&ids)?;
    Ok(Json(json!({ "deleted": deleted })))
}

pub async fn dashboard(State(state): State<AppState>) -> ApiResult<Json<Dashboard>> {
    Ok(Json(Dashboard::generate(&state.storage, state.today())?))
}

#[derive(Serialize)]
struct ReportData {
    ok: bool,
    #[serde(flatten)]
    report: AgreementReport,
}

fn build_report(state: &AppState, params: Vec<(String, String)>) -> Result<AgreementReport, ConvenioError> {
    AgreementReport::generate(
        &state.storage,
        AgreementFilter::from_pairs(params),
        state.today(),
        state.settings.reports.list_limit,
    )
}

/// Report JSON; failures come back as `{"ok": false, "error": ...}`
pub async fn report_data(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    match build_report(&state, params) {
        Ok(report) => Json(ReportData { ok: true, report }).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "report generation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "ok": false, "error": err.to_string() })),
            )
                .into_response()
        }
    }
}

pub async fn report_pdf(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<Response> {
    let report = build_report(&state, params)?;
    let bytes = render_pdf(&report, chrono::Local::now().naive_local());

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", REPORT_FILENAME),
            ),
        ],
        bytes,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_parsing() {
        assert_eq!(flag(Some(&"1".to_string())), Some(true));
        assert_eq!(flag(Some(&"true".to_string())), Some(true));
        assert_eq!(flag(Some(&"0".to_string())), Some(false));
        assert_eq!(flag(Some(&"talvez".to_string())), None);
        assert_eq!(flag(None), None);
    }
}
