// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request routing and error mapping.

use wf_adapters::{CatalogAdapter, FuzzerAdapter, PostProcessAdapter, TeardownAdapter};
use wf_core::PluginSlug;
use wf_engine::SupervisorError;

use super::{status, ListenCtx};
use crate::protocol::{ErrorBody, HistoryBody, HttpRequest, HttpResponse, StartedBody};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Route<'a> {
    Start(&'a str),
    State,
    Results(&'a str),
    History,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum RouteError {
    NotFound,
    MethodNotAllowed,
}

/// Match a method and path against the API.
///
/// `POST /fuzz_plugin/{target}` shares its prefix with the fixed GET paths, so
/// `POST /fuzz_plugin/state` starts a run for a plugin named `state`.
pub(super) fn route<'a>(method: &str, path: &'a str) -> Result<Route<'a>, RouteError> {
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    let get = method == "GET";
    let post = method == "POST";

    match segments.as_slice() {
        ["fuzz_plugin", "state"] if get => Ok(Route::State),
        ["fuzz_plugin", "history"] if get => Ok(Route::History),
        ["fuzz_plugin", target] if post => Ok(Route::Start(*target)),
        ["fuzz_plugin", _] => Err(RouteError::MethodNotAllowed),
        ["fuzz_plugin", "results", target] if get => Ok(Route::Results(*target)),
        ["fuzz_plugin", "results", _] => Err(RouteError::MethodNotAllowed),
        ["status"] | ["status", ""] if get => Ok(Route::Status),
        ["status"] | ["status", ""] => Err(RouteError::MethodNotAllowed),
        _ => Err(RouteError::NotFound),
    }
}

/// Produce the response for one request
pub async fn handle_request<C, F, P, T>(
    ctx: &ListenCtx<C, F, P, T>,
    request: &HttpRequest,
) -> HttpResponse
where
    C: CatalogAdapter,
    F: FuzzerAdapter,
    P: PostProcessAdapter,
    T: TeardownAdapter,
{
    let route = match route(&request.method, &request.path) {
        Ok(route) => route,
        Err(RouteError::NotFound) => {
            return HttpResponse::json(
                404,
                &ErrorBody::new("not_found", format!("no route for {}", request.path)),
            )
        }
        Err(RouteError::MethodNotAllowed) => {
            return HttpResponse::json(
                405,
                &ErrorBody::new(
                    "method_not_allowed",
                    format!("{} not allowed on {}", request.method, request.path),
                ),
            )
        }
    };

    match route {
        Route::Start(raw) => match start(ctx, raw).await {
            Ok(response) => response,
            Err(e) => error_response(&e),
        },
        Route::State => HttpResponse::json(200, &ctx.supervisor.state()),
        Route::Results(raw) => match results(ctx, raw).await {
            Ok(response) => response,
            Err(e) => error_response(&e),
        },
        Route::History => {
            HttpResponse::json(200, &HistoryBody { data: ctx.supervisor.history() })
        }
        Route::Status => HttpResponse::json(200, &status::report(ctx).await),
    }
}

async fn start<C, F, P, T>(
    ctx: &ListenCtx<C, F, P, T>,
    raw: &str,
) -> Result<HttpResponse, SupervisorError>
where
    C: CatalogAdapter,
    F: FuzzerAdapter,
    P: PostProcessAdapter,
    T: TeardownAdapter,
{
    let target = PluginSlug::parse(raw)?;
    let accepted = ctx.supervisor.start(target).await?;
    let body = StartedBody {
        message: format!("Fuzzer started with plugin {}", accepted.run.target),
        run_id: accepted.run.id.to_string(),
        target: accepted.run.target,
    };
    Ok(HttpResponse::json(202, &body))
}

async fn results<C, F, P, T>(
    ctx: &ListenCtx<C, F, P, T>,
    raw: &str,
) -> Result<HttpResponse, SupervisorError>
where
    C: CatalogAdapter,
    F: FuzzerAdapter,
    P: PostProcessAdapter,
    T: TeardownAdapter,
{
    let target = PluginSlug::parse(raw)?;
    let value = ctx.supervisor.result(&target).await?;
    Ok(HttpResponse::json(200, &value))
}

/// HTTP status and error kind for a supervisor error
pub(super) fn error_status(e: &SupervisorError) -> (u16, &'static str) {
    match e {
        SupervisorError::Conflict { .. } => (409, "conflict"),
        SupervisorError::AlreadyProcessed(_) => (403, "already_processed"),
        SupervisorError::NotFound(_) => (404, "not_found"),
        SupervisorError::UpstreamUnavailable(_) => (502, "upstream_unavailable"),
        SupervisorError::InvalidTarget(_) => (400, "invalid_target"),
        SupervisorError::Spawn(_) => (500, "spawn_failed"),
        SupervisorError::Artifact { .. } => (500, "artifact_unreadable"),
        SupervisorError::Io(_) => (500, "io_error"),
    }
}

fn error_response(e: &SupervisorError) -> HttpResponse {
    let (status, kind) = error_status(e);
    if status >= 500 {
        tracing::error!(error = %e, "request failed");
    }
    HttpResponse::json(status, &ErrorBody::new(kind, e.to_string()))
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
