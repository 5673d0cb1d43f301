// HTTP request handlers
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::stream::Stream;
use std::sync::Arc;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::StreamExt;

use crate::application::filter::FilterCriteria;
use crate::presentation::app_state::AppState;
use crate::presentation::dto::{
    ErrorBody, FiltersDto, LatestDto, PageAction, PageDto, PageRequest, StatusDto,
};

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusDto> {
    let view = state.view.lock().await;
    Json(StatusDto::from(view.feed()))
}

/// Latest reading with its banner classification, 204 when there is none
pub async fn latest(State(state): State<Arc<AppState>>) -> Response {
    let view = state.view.lock().await;
    match view.latest() {
        Some(latest) => Json(LatestDto::from(latest)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

pub async fn readings(State(state): State<Arc<AppState>>) -> Json<PageDto> {
    let view = state.view.lock().await;
    Json(PageDto::from(view.current_page()))
}

pub async fn get_filters(State(state): State<Arc<AppState>>) -> Json<FiltersDto> {
    let view = state.view.lock().await;
    Json(FiltersDto::from(view.criteria()))
}

/// Replace the active criteria; the view goes back to page 1
pub async fn put_filters(
    State(state): State<Arc<AppState>>,
    Json(criteria): Json<FilterCriteria>,
) -> Json<PageDto> {
    let mut view = state.view.lock().await;
    view.set_criteria(criteria);
    Json(PageDto::from(view.current_page()))
}

pub async fn clear_filters(State(state): State<Arc<AppState>>) -> Json<PageDto> {
    let mut view = state.view.lock().await;
    view.clear_filters();
    Json(PageDto::from(view.current_page()))
}

pub async fn navigate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PageRequest>,
) -> Response {
    let mut view = state.view.lock().await;
    match (request.action, request.page) {
        (PageAction::First, _) => view.first_page(),
        (PageAction::Previous, _) => view.previous_page(),
        (PageAction::Next, _) => view.next_page(),
        (PageAction::Last, _) => view.last_page(),
        (PageAction::Goto, Some(page)) => view.go_to_page(page),
        (PageAction::Goto, None) => {
            return error_response(StatusCode::BAD_REQUEST, "goto requires a page number");
        }
    }
    Json(PageDto::from(view.current_page())).into_response()
}

pub async fn connect(State(state): State<Arc<AppState>>) -> Response {
    let result = state.session.connect();
    state.refresh_view().await;
    match result {
        Ok(()) => {
            let view = state.view.lock().await;
            (StatusCode::ACCEPTED, Json(StatusDto::from(view.feed()))).into_response()
        }
        Err(err) => {
            tracing::error!("Cannot connect: {}", err);
            error_response(StatusCode::SERVICE_UNAVAILABLE, &err.to_string())
        }
    }
}

pub async fn disconnect(State(state): State<Arc<AppState>>) -> Json<StatusDto> {
    state.session.disconnect();
    state.refresh_view().await;
    let view = state.view.lock().await;
    Json(StatusDto::from(view.feed()))
}

/// One `status` event per published feed snapshot
pub async fn events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let stream = WatchStream::new(state.session.subscribe()).map(|snapshot| {
        Event::default()
            .event("status")
            .json_data(StatusDto::from(&snapshot))
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}
