use crate::dashboard::{Section, SectionRequest, SectionResponse, load_section};
use crate::errors::AppError;
use crate::state::AppState;
use crate::ui::render_index;
use crate::window::RangePreset;
use axum::{
    extract::{Path, Query, State},
    response::Html,
    Json,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct SectionQuery {
    pub range: Option<String>,
    pub clinic: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionInfo {
    pub id: Section,
    pub dashboard: &'static str,
}

pub async fn index() -> Html<String> {
    Html(render_index(today()))
}

pub async fn list_sections() -> Json<Vec<SectionInfo>> {
    Json(
        Section::ALL
            .into_iter()
            .map(|id| SectionInfo {
                id,
                dashboard: if id.uses_tracked_window() {
                    "analytics"
                } else {
                    "clinics"
                },
            })
            .collect(),
    )
}

pub async fn get_section(
    State(state): State<AppState>,
    Path(section): Path<String>,
    Query(query): Query<SectionQuery>,
) -> Result<Json<SectionResponse>, AppError> {
    let section: Section = section.parse().map_err(AppError::not_found)?;
    let request = parse_request(&query)?;

    let response = load_section(
        &state.client,
        state.config.doctor_id,
        section,
        request,
        today(),
    )
    .await?;
    Ok(Json(response))
}

fn parse_request(query: &SectionQuery) -> Result<SectionRequest, AppError> {
    let range = match non_blank(query.range.as_deref()) {
        Some(value) => value
            .parse::<RangePreset>()
            .map_err(|err| AppError::bad_request(err.to_string()))?,
        None => RangePreset::default(),
    };

    // "all" and an empty value both mean every clinic.
    let clinic = match non_blank(query.clinic.as_deref()) {
        Some(value) if value.eq_ignore_ascii_case("all") => None,
        Some(value) => Some(
            Uuid::parse_str(value)
                .map_err(|_| AppError::bad_request(format!("invalid clinic id '{value}'")))?,
        ),
        None => None,
    };

    Ok(SectionRequest { range, clinic })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
