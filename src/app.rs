//! Root application component with routing and context providers.

use std::sync::Arc;

use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::{
    StaticSegment,
    components::{Route, Router, Routes},
};

use crate::net::api::ApiClient;
use crate::net::http::ApiConfig;
use crate::net::socket::RideSocket;
use crate::pages::{admin::AdminPage, dashboard::DashboardPage, drive::DrivePage, login::LoginPage};
use crate::state::{auth::AuthState, ride::RideState};

/// HTML shell rendered on the server for SSR + hydration.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

/// Root application component.
///
/// Provides the shared state signals and the context-scoped services
/// (REST client, ride socket), then sets up client-side routing.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let config = ApiConfig::default();
    let client = Arc::new(ApiClient::new(config.clone()));
    let socket = Arc::new(RideSocket::new(config));

    let auth = RwSignal::new(AuthState { user: None, loading: true });
    let ride = RwSignal::new(RideState::default());

    provide_context(auth);
    provide_context(ride);
    provide_context(Arc::clone(&client));
    provide_context(Arc::clone(&socket));

    // Resolve the session on startup; pages hold off on redirects until
    // `loading` clears.
    #[cfg(feature = "hydrate")]
    {
        let client = Arc::clone(&client);
        leptos::task::spawn_local(async move {
            let user = client.current_user().await;
            auth.update(|a| {
                a.user = user;
                a.loading = false;
            });
        });
    }

    view! {
        <Stylesheet id="leptos" href="/pkg/rideline.css"/>
        <Title text="Rideline"/>

        <Router>
            <Routes fallback=|| "Page not found.".into_view()>
                <Route path=StaticSegment("login") view=LoginPage/>
                <Route path=StaticSegment("") view=DashboardPage/>
                <Route path=StaticSegment("drive") view=DrivePage/>
                <Route path=StaticSegment("admin") view=AdminPage/>
            </Routes>
        </Router>
    }
}
