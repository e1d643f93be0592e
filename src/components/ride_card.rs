//! Card summarizing one past ride.

use leptos::prelude::*;

use crate::net::types::Ride;

/// A single entry in the ride-history list.
#[component]
pub fn RideCard(ride: Ride) -> impl IntoView {
    let driver = ride
        .driver
        .as_ref()
        .map_or("Unassigned".to_owned(), |d| d.name.clone());

    view! {
        <div class="ride-card">
            <div class="ride-card__row">
                <span class="ride-card__status">{ride.status.label()}</span>
                <span class="ride-card__fare">{format!("{:.2}", ride.fare)}</span>
            </div>
            <div class="ride-card__row">
                <span class="ride-card__driver">{driver}</span>
                <span class="ride-card__rating">
                    {ride.rating.map_or(String::new(), |r| format!("{r}/5"))}
                </span>
            </div>
            {ride
                .cancellation_reason
                .map(|reason| view! { <p class="ride-card__reason">{reason}</p> })}
        </div>
    }
}
