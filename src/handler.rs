//! The `/find_config` pipeline.

use crate::command::build_command;
use crate::error::GatewayError;
use crate::optimizer::check_outcome;
use crate::request::ConfigPayload;
use crate::result::parse_result;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde_json::Value;
use tracing::{debug, info};

/// Validate, build the command, run the optimizer and parse its answer.
pub async fn find_config(state: &AppState, payload: ConfigPayload) -> Result<Value, GatewayError> {
    debug!(?payload, "Validating request");
    let request = payload.validate()?;

    let command = build_command(state.optimizer_path(), &request);
    info!(command = %command, "Running optimizer");

    let outcome = state.optimizer.invoke(&command, state.timeout()).await?;
    let stdout = check_outcome(outcome, state.timeout())?;

    debug!("Parsing optimizer result");
    let result = parse_result(&stdout)?;
    debug!("Optimizer result parsed");
    Ok(result)
}

/// `POST /find_config`
pub async fn find_config_handler(
    State(state): State<AppState>,
    payload: Result<Json<ConfigPayload>, JsonRejection>,
) -> Result<Json<Value>, GatewayError> {
    let Json(payload) = payload?;
    find_config(&state, payload).await.map(Json)
}
