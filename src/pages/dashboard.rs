//! Rider dashboard: request a ride, follow the active ride, review history.

use std::sync::Arc;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::components::ride_card::RideCard;
use crate::components::status_bar::StatusBar;
use crate::net::api::ApiClient;
use crate::net::socket::RideSocket;
use crate::net::types::GeoPoint;
use crate::state::auth::AuthState;
use crate::state::ride::RideState;

/// Rider dashboard. Redirects to `/login` if the user is not authenticated.
#[component]
pub fn DashboardPage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let ride = expect_context::<RwSignal<RideState>>();
    let client = expect_context::<Arc<ApiClient>>();
    let socket = expect_context::<Arc<RideSocket>>();
    let navigate = use_navigate();

    // Redirect to login once the session check has settled.
    Effect::new(move || {
        let state = auth.get();
        if !state.loading && state.user.is_none() {
            navigate("/login", NavigateOptions::default());
        }
    });

    // Bring the push channel up once signed in; repeated runs are no-ops.
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

    let history = LocalResource::new({
        let client = Arc::clone(&client);
        move || {
            let client = Arc::clone(&client);
            async move { client.ride_history().await.unwrap_or_default() }
        }
    });

    let pickup = RwSignal::new(String::new());
    let dropoff = RwSignal::new(String::new());
    let form_error = RwSignal::new(Option::<String>::None);

    let request = {
        let client = Arc::clone(&client);
        Callback::new(move |_| {
            let Some(pickup_point) = GeoPoint::parse_lng_lat(&pickup.get()) else {
                form_error.set(Some("pickup must be lng,lat".to_owned()));
                return;
            };
            let Some(dropoff_point) = GeoPoint::parse_lng_lat(&dropoff.get()) else {
                form_error.set(Some("dropoff must be lng,lat".to_owned()));
                return;
            };
            form_error.set(None);

            #[cfg(feature = "hydrate")]
            {
                let client = Arc::clone(&client);
                leptos::task::spawn_local(async move {
                    match client.request_ride(&pickup_point, &dropoff_point).await {
                        Ok(requested) => ride.update(|r| r.set_active_ride(Some(requested))),
                        Err(e) => form_error.set(Some(e.to_string())),
                    }
                });
            }
            #[cfg(not(feature = "hydrate"))]
            {
                let _ = (&client, pickup_point, dropoff_point);
            }
        })
    };

    view! {
        <div class="dashboard-page">
            <header class="dashboard-page__header">
                <h1>"Where to?"</h1>
            </header>

            <section class="dashboard-page__request">
                <label class="dashboard-page__label">
                    "Pickup (lng,lat)"
                    <input
                        class="dashboard-page__input"
                        type="text"
                        prop:value=move || pickup.get()
                        on:input=move |ev| pickup.set(event_target_value(&ev))
                    />
                </label>
                <label class="dashboard-page__label">
                    "Dropoff (lng,lat)"
                    <input
                        class="dashboard-page__input"
                        type="text"
                        prop:value=move || dropoff.get()
                        on:input=move |ev| dropoff.set(event_target_value(&ev))
                    />
                </label>
                <Show when=move || form_error.get().is_some()>
                    <p class="dashboard-page__error">
                        {move || form_error.get().unwrap_or_default()}
                    </p>
                </Show>
                <button class="btn btn--primary" on:click=move |_| request.run(())>
                    "Request ride"
                </button>
            </section>

            <ActiveRidePanel/>

            <section class="dashboard-page__history">
                <h2>"Past rides"</h2>
                <Suspense fallback=move || view! { <p>"Loading rides..."</p> }>
                    {move || {
                        history.get().map(|list| {
                            if list.is_empty() {
                                view! { <p>"No rides yet."</p> }.into_any()
                            } else {
                                view! {
                                    <div class="dashboard-page__cards">
                                        {list
                                            .into_iter()
                                            .map(|r| view! { <RideCard ride=r/> })
                                            .collect::<Vec<_>>()}
                                    </div>
                                }
                                    .into_any()
                            }
                        })
                    }}
                </Suspense>
            </section>

            <StatusBar/>
        </div>
    }
}

/// Live panel for the ride currently in progress.
#[component]
fn ActiveRidePanel() -> impl IntoView {
    let ride = expect_context::<RwSignal<RideState>>();
    let client = expect_context::<Arc<ApiClient>>();

    let cancel = {
        let client = Arc::clone(&client);
        Callback::new(move |_| {
            let Some(id) = ride.get_untracked().ride.map(|r| r.id) else {
                return;
            };

            #[cfg(feature = "hydrate")]
            {
                let client = Arc::clone(&client);
                leptos::task::spawn_local(async move {
                    match client.cancel_ride(&id, "cancelled by rider").await {
                        Ok(_) => ride.update(|r| r.set_active_ride(None)),
                        Err(e) => leptos::logging::warn!("cancel failed: {e}"),
                    }
                });
            }
            #[cfg(not(feature = "hydrate"))]
            {
                let _ = (&client, id);
            }
        })
    };

    view! {
        <Show when=move || ride.get().ride.is_some()>
            <section class="ride-panel">
                <h2>"Current ride"</h2>
                <p class="ride-panel__status">
                    {move || ride.get().ride.map(|r| r.status.label()).unwrap_or_default()}
                </p>
                <p class="ride-panel__driver">
                    {move || {
                        ride.get()
                            .ride
                            .and_then(|r| r.driver)
                            .map_or("Finding a driver...".to_owned(), |d| d.name)
                    }}
                </p>
                <p class="ride-panel__fare">
                    {move || ride.get().ride.map(|r| format!("{:.2}", r.fare)).unwrap_or_default()}
                </p>
                <ul class="ride-panel__timeline">
                    {move || {
                        ride.get().ride.map(|r| {
                            r.status_history
                                .into_iter()
                                .map(|entry| {
                                    view! {
                                        <li>{format!("{} by {}", entry.status.label(), entry.by)}</li>
                                    }
                                })
                                .collect::<Vec<_>>()
                        })
                    }}
                </ul>
                <button class="btn" on:click=move |_| cancel.run(())>
                    "Cancel ride"
                </button>
            </section>
        </Show>
    }
}
