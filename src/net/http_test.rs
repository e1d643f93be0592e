use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use futures::FutureExt;
use futures::channel::oneshot;
use futures::executor::LocalPool;
use futures::task::LocalSpawnExt;

use super::*;

fn expired() -> ApiError {
    ApiError::Status { status: 500, message: "jwt expired".to_owned() }
}

// =============================================================
// Expiry signature
// =============================================================

#[test]
fn expiry_signature_requires_exact_status_and_message() {
    assert!(expired().is_session_expired());

    let wrong_status = ApiError::Status { status: 401, message: "jwt expired".to_owned() };
    assert!(!wrong_status.is_session_expired());

    let wrong_message = ApiError::Status { status: 500, message: "internal error".to_owned() };
    assert!(!wrong_message.is_session_expired());

    assert!(!ApiError::Network("jwt expired".to_owned()).is_session_expired());
}

// =============================================================
// SessionGate — sequential behavior
// =============================================================

#[test]
fn success_passes_through_without_refresh() {
    let mut pool = LocalPool::new();
    let gate = SessionGate::new();
    let refreshes = Cell::new(0u32);

    let out = pool.run_until(gate.run(
        || async { Ok::<_, ApiError>(7u32) },
        || {
            refreshes.set(refreshes.get() + 1);
            async { Ok(()) }
        },
    ));

    assert_eq!(out, Ok(7));
    assert_eq!(refreshes.get(), 0);
}

#[test]
fn non_expiry_error_passes_through_untouched() {
    let mut pool = LocalPool::new();
    let gate = SessionGate::new();
    let refreshes = Cell::new(0u32);
    let not_found = ApiError::Status { status: 404, message: "ride not found".to_owned() };

    let err = not_found.clone();
    let out: Result<u32, ApiError> = pool.run_until(gate.run(
        move || {
            let err = err.clone();
            async move { Err(err) }
        },
        || {
            refreshes.set(refreshes.get() + 1);
            async { Ok(()) }
        },
    ));

    assert_eq!(out, Err(not_found));
    assert_eq!(refreshes.get(), 0);
}

#[test]
fn expiry_triggers_refresh_and_replays_once() {
    let mut pool = LocalPool::new();
    let gate = SessionGate::new();
    let refreshes = Cell::new(0u32);
    let attempts = Cell::new(0u32);

    let out = pool.run_until(gate.run(
        || {
            let n = attempts.get();
            attempts.set(n + 1);
            async move { if n == 0 { Err(expired()) } else { Ok("replayed") } }
        },
        || {
            refreshes.set(refreshes.get() + 1);
            async { Ok(()) }
        },
    ));

    assert_eq!(out, Ok("replayed"));
    assert_eq!(attempts.get(), 2);
    assert_eq!(refreshes.get(), 1);
}

#[test]
fn replay_that_expires_again_is_not_retried() {
    let mut pool = LocalPool::new();
    let gate = SessionGate::new();
    let refreshes = Cell::new(0u32);
    let attempts = Cell::new(0u32);

    let out: Result<u32, ApiError> = pool.run_until(gate.run(
        || {
            attempts.set(attempts.get() + 1);
            async { Err(expired()) }
        },
        || {
            refreshes.set(refreshes.get() + 1);
            async { Ok(()) }
        },
    ));

    assert_eq!(out, Err(expired()));
    assert_eq!(attempts.get(), 2);
    assert_eq!(refreshes.get(), 1);
}

#[test]
fn failed_refresh_propagates_and_clears_the_flag() {
    let mut pool = LocalPool::new();
    let gate = SessionGate::new();
    let refreshes = Cell::new(0u32);
    let denied = ApiError::Status { status: 403, message: "refresh denied".to_owned() };

    let err = denied.clone();
    let out: Result<u32, ApiError> = pool.run_until(gate.run(
        || async { Err(expired()) },
        || {
            refreshes.set(refreshes.get() + 1);
            let err = err.clone();
            async move { Err(err) }
        },
    ));
    assert_eq!(out, Err(denied));
    assert_eq!(refreshes.get(), 1);

    // The flag must be clear again: a later expiry leads a fresh refresh.
    let attempts = Cell::new(0u32);
    let out = pool.run_until(gate.run(
        || {
            let n = attempts.get();
            attempts.set(n + 1);
            async move { if n == 0 { Err(expired()) } else { Ok(1u32) } }
        },
        || {
            refreshes.set(refreshes.get() + 1);
            async { Ok(()) }
        },
    ));
    assert_eq!(out, Ok(1));
    assert_eq!(refreshes.get(), 2);
}

// =============================================================
// SessionGate — concurrent single-flight
// =============================================================

struct Flight {
    gate: Arc<SessionGate>,
    refreshes: Rc<Cell<u32>>,
    results: Rc<RefCell<Vec<(u32, Result<u32, ApiError>)>>>,
}

/// Spawn `count` callers whose first attempt expires and whose replay
/// succeeds, all sharing one gate and one controllable refresh outcome.
fn spawn_expiring_callers(
    pool: &LocalPool,
    flight: &Flight,
    count: u32,
    outcome: futures::future::Shared<oneshot::Receiver<Result<(), ApiError>>>,
) {
    let spawner = pool.spawner();
    for i in 0..count {
        let gate = Arc::clone(&flight.gate);
        let refreshes = Rc::clone(&flight.refreshes);
        let results = Rc::clone(&flight.results);
        let outcome = outcome.clone();
        spawner
            .spawn_local(async move {
                let attempts = Cell::new(0u32);
                let out = gate
                    .run(
                        || {
                            let n = attempts.get();
                            attempts.set(n + 1);
                            async move { if n == 0 { Err(expired()) } else { Ok(i) } }
                        },
                        move || {
                            refreshes.set(refreshes.get() + 1);
                            async move {
                                outcome.await.unwrap_or_else(|_| {
                                    Err(ApiError::Network("refresh dropped".to_owned()))
                                })
                            }
                        },
                    )
                    .await;
                results.borrow_mut().push((i, out));
            })
            .expect("spawn caller");
    }
}

#[test]
fn concurrent_expiries_share_a_single_refresh() {
    let mut pool = LocalPool::new();
    let flight = Flight {
        gate: Arc::new(SessionGate::new()),
        refreshes: Rc::new(Cell::new(0)),
        results: Rc::new(RefCell::new(Vec::new())),
    };
    let (tx, rx) = oneshot::channel();
    spawn_expiring_callers(&pool, &flight, 5, rx.shared());

    // All five hit the expiry while the refresh is still pending: one
    // leader, four parked waiters, nothing resolved yet.
    pool.run_until_stalled();
    assert_eq!(flight.refreshes.get(), 1);
    assert!(flight.results.borrow().is_empty());

    tx.send(Ok(())).expect("settle refresh");
    pool.run_until_stalled();

    let mut results = flight.results.borrow().clone();
    results.sort_by_key(|(i, _)| *i);
    assert_eq!(results.len(), 5);
    for (i, out) in results {
        assert_eq!(out, Ok(i), "caller {i} should have been replayed");
    }
    assert_eq!(flight.refreshes.get(), 1);
}

#[test]
fn failed_refresh_rejects_every_queued_caller() {
    let mut pool = LocalPool::new();
    let flight = Flight {
        gate: Arc::new(SessionGate::new()),
        refreshes: Rc::new(Cell::new(0)),
        results: Rc::new(RefCell::new(Vec::new())),
    };
    let (tx, rx) = oneshot::channel();
    spawn_expiring_callers(&pool, &flight, 3, rx.shared());

    pool.run_until_stalled();
    assert_eq!(flight.refreshes.get(), 1);

    let denied = ApiError::Status { status: 403, message: "refresh denied".to_owned() };
    tx.send(Err(denied.clone())).expect("settle refresh");
    pool.run_until_stalled();

    let results = flight.results.borrow();
    assert_eq!(results.len(), 3);
    for (i, out) in results.iter() {
        assert_eq!(out, &Err(denied.clone()), "caller {i} should carry the refresh error");
    }
}
