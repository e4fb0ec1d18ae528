//! Playbook helper routes: composition stats and premier standing.

use axum::response::Json;
use playbook::composition::{AttributeCount, CompStats, Composition};
use playbook::premier::{self, PremierConfig, PremierMatch, Schedule, SeasonEvent, Standing, Week};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::ApiError;
use crate::services::ceremony::SessionError;

#[derive(Debug, Deserialize)]
pub struct CompositionBody {
    pub agents: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompositionReport {
    pub composition: Composition,
    pub stats: CompStats,
    pub attributes: Vec<AttributeCount>,
}

/// `POST /api/compositions/stats`
pub async fn composition_stats(Json(body): Json<CompositionBody>) -> Result<Json<CompositionReport>, ApiError> {
    let composition =
        Composition::from_agents(&body.agents).map_err(|e| ApiError(SessionError::Validation(e.to_string())))?;
    Ok(Json(CompositionReport {
        stats: composition.stats(),
        attributes: composition.attributes(),
        composition,
    }))
}

#[derive(Debug, Deserialize)]
pub struct StandingBody {
    #[serde(default)]
    pub matches: Vec<PremierMatch>,
    #[serde(default)]
    pub config: Option<PremierConfig>,
    /// Provider season events; the built-in schedule is used when absent.
    #[serde(default)]
    pub events: Vec<SeasonEvent>,
    /// `YYYY-MM-DD`; defaults to today (UTC).
    #[serde(default)]
    pub today: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StandingReport {
    pub standing: Standing,
    pub current_week: Option<Week>,
    pub playoff: bool,
    pub schedule: Schedule,
}

/// `POST /api/premier/standing`
pub async fn premier_standing(Json(body): Json<StandingBody>) -> Result<Json<StandingReport>, ApiError> {
    let today = match body.today.as_deref() {
        Some(raw) => premier::parse_day(raw)
            .ok_or_else(|| ApiError(SessionError::Validation(format!("invalid date: {raw}"))))?,
        None => OffsetDateTime::now_utc().date(),
    };
    let config = body.config.unwrap_or_default();
    let schedule = Schedule::from_events(&body.events);

    Ok(Json(StandingReport {
        standing: premier::standing(&config, &schedule, &body.matches),
        current_week: schedule.current_week(today).cloned(),
        playoff: schedule.is_playoff(today),
        schedule,
    }))
}
