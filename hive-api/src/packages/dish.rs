//! Monitored sockets and their live status stream.
//!
//! Routes under `/dish/sockets`:
//!
//! - the standard CRUD shape over the socket collection
//! - `POST /results` ingests `{results: {id: healthy}}` from a checker and
//!   publishes one `sockets changed` message listing the ids whose health
//!   flipped (nothing is published when none did)
//! - `GET /status` streams every dispatcher message as server-sent events

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::State,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use hive_core::{Message, Timestamp};
use hive_events::Dispatcher;
use hive_storage::{Cache, CacheSlot};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ApiResult;
use crate::extractors::JsonBody;
use crate::package::PackageDescriptor;
use crate::resource::{require_field, Resource};
use crate::routes::generic::crud_routes;
use crate::sse::sse_response;
use crate::telemetry::METRICS;

pub const PACKAGE: &str = "dish";

/// Content of the message published when socket health changes.
pub const SOCKETS_CHANGED: &str = "sockets changed";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Socket {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub host: String,
    pub port: u16,
    /// Expected HTTP status for HTTP checks, if any
    #[serde(default)]
    pub expected_status: Option<u16>,
    #[serde(default)]
    pub healthy: bool,
    #[serde(default)]
    pub last_checked: Option<Timestamp>,
}

impl Resource for Socket {
    const KIND: &'static str = "Socket";

    fn validate(&self) -> ApiResult<()> {
        require_field("id", &self.id)?;
        require_field("host", &self.host)
    }
}

/// Body of `POST /dish/sockets/results`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultsRequest {
    pub results: HashMap<String, bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultsResponse {
    /// Known sockets whose result was recorded
    pub updated: usize,
    /// Ids whose health state flipped, sorted
    pub changed: Vec<String>,
    /// Ids with no stored socket
    pub unknown: usize,
}

// ============================================================================
// PACKAGE
// ============================================================================

#[derive(Debug, Clone)]
pub struct DishPackage {
    sockets: Arc<CacheSlot<Socket>>,
    dispatcher: Dispatcher,
}

#[derive(Clone)]
struct DishState {
    sockets: Arc<Cache<Socket>>,
    dispatcher: Dispatcher,
}

impl DishPackage {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            sockets: Arc::new(CacheSlot::new("sockets")),
            dispatcher,
        }
    }

    pub fn sockets(&self) -> Arc<Cache<Socket>> {
        self.sockets.cache()
    }

    pub fn descriptor(&self) -> PackageDescriptor {
        let slot = Arc::clone(&self.sockets);
        let dispatcher = self.dispatcher.clone();
        PackageDescriptor::new(PACKAGE)
            .with_cache(self.sockets.clone())
            .with_routes(move |router| {
                let state = DishState {
                    sockets: slot.cache(),
                    dispatcher,
                };
                let live = Router::new()
                    .route("/results", post(results_route))
                    .route("/status", get(status_route))
                    .with_state(state.clone());
                router.nest(
                    "/sockets",
                    live.merge(crud_routes(state.sockets)),
                )
            })
    }
}

// ============================================================================
// RESULTS INGESTION
// ============================================================================

/// Record check results and publish the ids whose health changed.
pub fn apply_results(
    sockets: &Cache<Socket>,
    dispatcher: &Dispatcher,
    results: HashMap<String, bool>,
) -> ResultsResponse {
    let now = Utc::now().timestamp();
    let mut updated = 0;
    let mut unknown = 0;
    let mut changed = Vec::new();

    // Sorted so the published key order does not depend on hashing.
    let ordered: BTreeMap<String, bool> = results.into_iter().collect();
    for (id, healthy) in ordered {
        let flipped = sockets.update(&id, |socket| {
            socket.last_checked = Some(now);
            let flipped = socket.healthy != healthy;
            socket.healthy = healthy;
            flipped
        });
        match flipped {
            Some(true) => {
                updated += 1;
                changed.push(id);
            }
            Some(false) => updated += 1,
            None => {
                debug!(socket = %id, "Result for unknown socket");
                unknown += 1;
            }
        }
    }

    if !changed.is_empty() {
        info!(changed = changed.len(), "Socket health changed");
        if dispatcher.publish(Message::new(SOCKETS_CHANGED, changed.clone())) {
            if let Ok(metrics) = METRICS.as_ref() {
                metrics.record_change_published();
            }
        }
    }

    ResultsResponse {
        updated,
        changed,
        unknown,
    }
}

async fn results_route(
    State(state): State<DishState>,
    JsonBody(request): JsonBody<ResultsRequest>,
) -> Json<ResultsResponse> {
    Json(apply_results(&state.sockets, &state.dispatcher, request.results))
}

async fn status_route(State(state): State<DishState>) -> ApiResult<Response> {
    sse_response(&state.dispatcher)
}
