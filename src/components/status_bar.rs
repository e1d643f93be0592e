//! Bottom status bar showing push-channel connectivity and ride status.

use leptos::prelude::*;

use crate::state::ride::RideState;

/// Status bar at the bottom of the rider and driver dashboards.
#[component]
pub fn StatusBar() -> impl IntoView {
    let ride = expect_context::<RwSignal<RideState>>();

    let status_class = move || {
        if ride.get().connected {
            "status-bar__dot status-bar__dot--connected"
        } else {
            "status-bar__dot status-bar__dot--disconnected"
        }
    };

    let status_label = move || {
        if ride.get().connected { "Live" } else { "Offline" }
    };

    let ride_label = move || {
        ride.get()
            .ride
            .map_or("No active ride".to_owned(), |r| r.status.label().to_owned())
    };

    view! {
        <div class="status-bar">
            <span class="status-bar__connection">
                <span class=status_class></span>
                {status_label}
            </span>
            <span class="status-bar__divider">"|"</span>
            <span class="status-bar__ride">{ride_label}</span>
        </div>
    }
}
