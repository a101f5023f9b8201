//! Admin API (component E): `GET /rep`, `POST /add`, `DELETE /rm`.
//!
//! Each handler acquires the fleet lock for the duration of its mutation
//! (via the `Fleet` methods it calls) and never across a driver call or
//! upstream request. Spawning and removing containers happens while the
//! handler is not holding any lock.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use fleet::{ContainerDriver, Fleet};
use ringcore::{AddOutcome, BackendId, RemoveOutcome};
use serde::Deserialize;

use crate::response::{AdminResponse, Message};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct MutationRequest {
    pub n: usize,
    #[serde(default)]
    pub hostnames: Vec<String>,
}

fn too_many_hostnames(action: &'static str) -> AdminResponse {
    AdminResponse::failure(
        StatusCode::BAD_REQUEST,
        format!("<Error> Length of hostname list is more than {action} instances"),
    )
}

fn rep_message(state: &Fleet) -> Message {
    let snap = state.snapshot();
    Message::Rep {
        n: snap.n,
        replicas: snap.replicas.iter().map(|id| id.to_string()).collect(),
    }
}

pub async fn get_rep(State(state): State<AppState>) -> AdminResponse {
    AdminResponse::success(rep_message(&state.fleet))
}

/// `POST /add`: spawn up to `n` new backends, using any provided
/// `hostnames` for the first slots and generating fresh random ids for the
/// rest. Partial success (some spawns fail) is not an error; the response
/// reports what actually landed.
pub async fn post_add(
    State(state): State<AppState>,
    Json(req): Json<MutationRequest>,
) -> AdminResponse {
    if req.hostnames.len() > req.n {
        return too_many_hostnames("newly added");
    }

    let mut names: Vec<BackendId> = Vec::with_capacity(req.n);
    for h in &req.hostnames {
        match BackendId::new(h.clone()) {
            Ok(id) => names.push(id),
            Err(_) => continue,
        }
    }
    while names.len() < req.n {
        names.push(fleet::random_backend_id());
    }

    for name in names {
        match state.driver.spawn(name.as_str()).await {
            Ok(()) => match state.fleet.try_insert(name.clone()) {
                AddOutcome::Added(_) => {}
                AddOutcome::AlreadyPresent => {
                    tracing::warn!(%name, "admin add: name already registered, skipping");
                }
                AddOutcome::RingFull => {
                    tracing::warn!(%name, "admin add: ring full, container spawned but not routable");
                }
            },
            Err(err) => {
                tracing::warn!(%name, error = %err, "admin add: spawn failed");
            }
        }
    }

    AdminResponse::success(rep_message(&state.fleet))
}

/// `DELETE /rm`: remove `n` backends, preferring the named `hostnames`
/// that currently exist and filling the remainder with a uniform-random
/// sample of the rest.
pub async fn delete_rm(
    State(state): State<AppState>,
    Json(req): Json<MutationRequest>,
) -> AdminResponse {
    if req.hostnames.len() > req.n {
        return too_many_hostnames("removable");
    }

    let named: Vec<BackendId> = req
        .hostnames
        .iter()
        .filter_map(|h| BackendId::new(h.clone()).ok())
        .collect();

    let victims = state.fleet.select_removal_set(req.n, &named);

    for id in victims {
        let outcome = state.fleet.purge_ring_slots(&id);
        let _ = state.driver.remove(id.as_str()).await;
        if outcome == RemoveOutcome::Removed {
            state.fleet.drop_registry_entry(&id);
        }
    }

    AdminResponse::success(rep_message(&state.fleet))
}
