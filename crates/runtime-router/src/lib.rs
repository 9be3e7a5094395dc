//! Command routing surface over the ranking engine.
//!
//! Adapters (the CLI, the stdio loop) normalise input into a [`RouterCommand`]
//! and hand it to a [`CommandRouter`]; payloads and responses are JSON.

use std::sync::Arc;

use ranking_engine::{RankedResult, RankingEngine, RankingError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use storage_corpus::{Profile, ProfileId};
use thiserror::Error;

pub const SEARCH: &str = "search";
pub const FEEDBACK_SUBMIT: &str = "feedback.submit";
pub const STATUS: &str = "status";

/// Normalized command forwarded from an adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterCommand {
    /// Logical command name (e.g., `search`, `feedback.submit`).
    pub name: String,
    #[serde(default)]
    pub payload: Value,
}

impl RouterCommand {
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }
}

/// Successful response emitted by the router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterResponse {
    /// Status code aligned with HTTP semantics.
    pub status_code: u16,
    pub payload: Value,
    /// Optional notes for the operator.
    pub diagnostics: Vec<String>,
}

impl RouterResponse {
    #[must_use]
    pub const fn ok(payload: Value) -> Self {
        Self {
            status_code: 200,
            payload,
            diagnostics: Vec::new(),
        }
    }
}

/// Router errors mapped back to adapters.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouterError {
    /// The request payload failed validation.
    #[error("invalid request: {detail}")]
    InvalidRequest { detail: String },
    /// The command or a referenced profile does not exist.
    #[error("not found: {detail}")]
    NotFound { detail: String },
    /// Any other failure, including embedding and storage errors.
    #[error("internal error: {detail}")]
    Internal { detail: String },
}

impl RouterError {
    /// Map the error into an HTTP-like status code for adapter usage.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest { .. } => 400,
            Self::NotFound { .. } => 404,
            Self::Internal { .. } => 500,
        }
    }

    fn invalid(detail: impl Into<String>) -> Self {
        Self::InvalidRequest {
            detail: detail.into(),
        }
    }
}

impl From<RankingError> for RouterError {
    fn from(err: RankingError) -> Self {
        Self::Internal {
            detail: err.to_string(),
        }
    }
}

/// Command router abstraction used by every adapter.
pub trait CommandRouter: Send + Sync {
    fn dispatch(&self, command: RouterCommand) -> Result<RouterResponse, RouterError>;
}

pub type SharedRouter = Arc<dyn CommandRouter>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SearchRequest {
    query: String,
    #[serde(default)]
    top_n: Option<usize>,
    #[serde(default)]
    base_threshold: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FeedbackRequest {
    query: String,
    /// Profile ids, or names for callers that only know names.
    selected: Vec<String>,
}

/// Routes search and feedback commands to a [`RankingEngine`].
pub struct SearchRouter {
    engine: Arc<RankingEngine>,
}

impl SearchRouter {
    pub fn new(engine: Arc<RankingEngine>) -> Self {
        Self { engine }
    }

    fn search(&self, payload: Value) -> Result<RouterResponse, RouterError> {
        let request: SearchRequest = parse(payload)?;
        let config = self.engine.config();
        let top_n = request.top_n.unwrap_or(config.top_n);
        if top_n == 0 {
            return Err(RouterError::invalid("top_n must be positive"));
        }
        let base_threshold = request.base_threshold.unwrap_or(config.base_threshold);
        if !base_threshold.is_finite() {
            return Err(RouterError::invalid("base_threshold must be finite"));
        }
        let results = self.engine.rank(&request.query, top_n, base_threshold)?;
        tracing::info!(query = %request.query, results = results.len(), "search served");
        Ok(RouterResponse::ok(json!({
            "results": results.iter().map(result_json).collect::<Vec<_>>(),
        })))
    }

    fn submit_feedback(&self, payload: Value) -> Result<RouterResponse, RouterError> {
        let request: FeedbackRequest = parse(payload)?;
        if request.selected.is_empty() {
            return Err(RouterError::invalid("selected must name at least one profile"));
        }
        let selected = request
            .selected
            .iter()
            .map(|key| self.resolve(key))
            .collect::<Result<Vec<_>, _>>()?;
        let entry = self.engine.submit_feedback(&request.query, &selected)?;
        Ok(RouterResponse::ok(json!({
            "entry_id": entry.entry_id,
            "selected": selected.iter().map(|profile| profile.id.as_str()).collect::<Vec<_>>(),
        })))
    }

    fn status(&self) -> RouterResponse {
        let context = self.engine.context();
        RouterResponse::ok(json!({
            "profiles": context.corpus().len(),
            "feedback_entries": self.engine.feedback_entries().len(),
            "encoder_id": context.embedder().encoder_id(),
            "dimensions": context.embedder().dimensions(),
        }))
    }

    /// Exact id first, then a unique `name` match.
    fn resolve(&self, key: &str) -> Result<Profile, RouterError> {
        let corpus = self.engine.context().corpus();
        if let Some(profile) = corpus.get(&ProfileId::from(key)) {
            return Ok(profile.clone());
        }
        let mut by_name = corpus.find_by_name(key);
        match (by_name.next(), by_name.next()) {
            (Some(profile), None) => Ok(profile.clone()),
            (Some(_), Some(_)) => Err(RouterError::invalid(format!(
                "name {key:?} matches several profiles; select by profile id"
            ))),
            (None, _) => Err(RouterError::NotFound {
                detail: format!("no profile with id or name {key:?}"),
            }),
        }
    }
}

impl CommandRouter for SearchRouter {
    fn dispatch(&self, command: RouterCommand) -> Result<RouterResponse, RouterError> {
        match command.name.as_str() {
            SEARCH => self.search(command.payload),
            FEEDBACK_SUBMIT => self.submit_feedback(command.payload),
            STATUS => Ok(self.status()),
            other => Err(RouterError::NotFound {
                detail: format!("unknown command '{other}'"),
            }),
        }
    }
}

fn parse<T: serde::de::DeserializeOwned>(payload: Value) -> Result<T, RouterError> {
    serde_json::from_value(payload).map_err(|err| RouterError::invalid(err.to_string()))
}

fn result_json(result: &RankedResult) -> Value {
    json!({
        "profile_id": result.profile.id,
        "profile": result.profile.attributes,
        "similarity": result.similarity,
        "boost": result.boost,
        "explanation": result.explanation,
    })
}
