//! Driver dashboard: availability toggle, incoming ride offers, earnings.

use std::sync::Arc;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::components::status_bar::StatusBar;
use crate::net::api::ApiClient;
use crate::net::socket::RideSocket;
use crate::net::types::RideStatus;
use crate::state::auth::AuthState;
use crate::state::ride::RideState;

/// Driver dashboard. Redirects to `/login` when signed out and to the
/// rider dashboard for non-driver accounts.
#[component]
pub fn DrivePage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let ride = expect_context::<RwSignal<RideState>>();
    let client = expect_context::<Arc<ApiClient>>();
    let socket = expect_context::<Arc<RideSocket>>();
    let navigate = use_navigate();

    Effect::new(move || {
        let state = auth.get();
        if state.loading {
            return;
        }
        match state.role() {
            None => navigate("/login", NavigateOptions::default()),
            Some(role) if role != "driver" => navigate("/", NavigateOptions::default()),
            Some(_) => {}
        }
    });

    #[cfg(feature = "hydrate")]
    {
        let socket = Arc::clone(&socket);
        Effect::new(move || {
            if auth.get().is_authenticated() {
                socket.connect(ride);
            }
        });
    }
    #[cfg(not(feature = "hydrate"))]
    let _ = (&socket, ride);

    let earnings = LocalResource::new({
        let client = Arc::clone(&client);
        move || {
            let client = Arc::clone(&client);
            async move { client.driver_earnings().await }
        }
    });

    let available = RwSignal::new(false);
    let toggle = {
        let client = Arc::clone(&client);
        Callback::new(move |_| {
            let next = !available.get();

            #[cfg(feature = "hydrate")]
            {
                let client = Arc::clone(&client);
                leptos::task::spawn_local(async move {
                    match client.update_driver_status(next).await {
                        Ok(()) => available.set(next),
                        Err(e) => leptos::logging::warn!("availability update failed: {e}"),
                    }
                });
            }
            #[cfg(not(feature = "hydrate"))]
            {
                let _ = (&client, next);
            }
        })
    };

    view! {
        <div class="drive-page">
            <header class="drive-page__header">
                <h1>"Drive"</h1>
                <button
                    class=move || {
                        if available.get() { "btn btn--primary" } else { "btn" }
                    }
                    on:click=move |_| toggle.run(())
                >
                    {move || if available.get() { "Go offline" } else { "Go online" }}
                </button>
            </header>

            <RideOfferPanel/>

            <section class="drive-page__earnings">
                <h2>"Earnings"</h2>
                <Suspense fallback=move || view! { <p>"Loading earnings..."</p> }>
                    {move || {
                        earnings.get().map(|res| match res {
                            Ok(e) => view! {
                                <p>{format!("{:.2} across {} rides", e.total, e.rides)}</p>
                            }
                                .into_any(),
                            Err(e) => view! { <p class="drive-page__error">{e.to_string()}</p> }
                                .into_any(),
                        })
                    }}
                </Suspense>
            </section>

            <StatusBar/>
        </div>
    }
}

/// Incoming ride offer with accept/reject actions.
#[component]
fn RideOfferPanel() -> impl IntoView {
    let ride = expect_context::<RwSignal<RideState>>();
    let client = expect_context::<Arc<ApiClient>>();

    let accept = {
        let client = Arc::clone(&client);
        Callback::new(move |_| {
            let Some(id) = ride.get_untracked().ride.map(|r| r.id) else {
                return;
            };

            #[cfg(feature = "hydrate")]
            {
                let client = Arc::clone(&client);
                leptos::task::spawn_local(async move {
                    match client.accept_ride(&id).await {
                        Ok(updated) => ride.update(|r| r.set_active_ride(Some(updated))),
                        Err(e) => leptos::logging::warn!("accept failed: {e}"),
                    }
                });
            }
            #[cfg(not(feature = "hydrate"))]
            {
                let _ = (&client, id);
            }
        })
    };

    let reject = {
        let client = Arc::clone(&client);
        Callback::new(move |_| {
            let Some(id) = ride.get_untracked().ride.map(|r| r.id) else {
                return;
            };

            #[cfg(feature = "hydrate")]
            {
                let client = Arc::clone(&client);
                leptos::task::spawn_local(async move {
                    match client.reject_ride(&id).await {
                        // The offer moves on to another driver.
                        Ok(_) => ride.update(|r| r.set_active_ride(None)),
                        Err(e) => leptos::logging::warn!("reject failed: {e}"),
                    }
                });
            }
            #[cfg(not(feature = "hydrate"))]
            {
                let _ = (&client, id);
            }
        })
    };

    let has_offer = move || {
        ride.get().ride.is_some_and(|r| r.status == RideStatus::Requested)
    };

    view! {
        <Show when=has_offer>
            <section class="offer-panel">
                <h2>"New ride request"</h2>
                <p class="offer-panel__fare">
                    {move || {
                        ride.get().ride.map(|r| format!("{:.2}", r.fare)).unwrap_or_default()
                    }}
                </p>
                <div class="offer-panel__actions">
                    <button class="btn btn--primary" on:click=move |_| accept.run(())>
                        "Accept"
                    </button>
                    <button class="btn" on:click=move |_| reject.run(())>
                        "Reject"
                    </button>
                </div>
            </section>
        </Show>
    }
}
