//! Admin page with a platform-wide summary.

use std::sync::Arc;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::net::api::ApiClient;
use crate::state::auth::AuthState;

/// Admin dashboard. Only reachable by admin accounts.
#[component]
pub fn AdminPage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let client = expect_context::<Arc<ApiClient>>();
    let navigate = use_navigate();

    Effect::new(move || {
        let state = auth.get();
        if state.loading {
            return;
        }
        match state.role() {
            None => navigate("/login", NavigateOptions::default()),
            Some(role) if role != "admin" => navigate("/", NavigateOptions::default()),
            Some(_) => {}
        }
    });

    let summary = LocalResource::new({
        let client = Arc::clone(&client);
        move || {
            let client = Arc::clone(&client);
            async move { client.admin_summary().await }
        }
    });

    view! {
        <div class="admin-page">
            <header class="admin-page__header">
                <h1>"Overview"</h1>
            </header>

            <Suspense fallback=move || view! { <p>"Loading summary..."</p> }>
                {move || {
                    summary.get().map(|res| match res {
                        Ok(s) => view! {
                            <div class="admin-page__stats">
                                <div class="stat-card">
                                    <span class="stat-card__value">{s.total_rides}</span>
                                    <span class="stat-card__label">"Total rides"</span>
                                </div>
                                <div class="stat-card">
                                    <span class="stat-card__value">{s.active_rides}</span>
                                    <span class="stat-card__label">"Active now"</span>
                                </div>
                                <div class="stat-card">
                                    <span class="stat-card__value">{s.total_drivers}</span>
                                    <span class="stat-card__label">"Drivers"</span>
                                </div>
                                <div class="stat-card">
                                    <span class="stat-card__value">{s.total_riders}</span>
                                    <span class="stat-card__label">"Riders"</span>
                                </div>
                                <div class="stat-card">
                                    <span class="stat-card__value">
                                        {format!("{:.2}", s.revenue)}
                                    </span>
                                    <span class="stat-card__label">"Revenue"</span>
                                </div>
                            </div>
                        }
                            .into_any(),
                        Err(e) => view! { <p class="admin-page__error">{e.to_string()}</p> }
                            .into_any(),
                    })
                }}
            </Suspense>
        </div>
    }
}
