//! Inventory and reservation consistency rules.
//!
//! Every mutation runs in a single transaction together with the
//! notifications it emits, so callers either see all of its effects or none.

mod availability;
mod notifications;
mod offers;
mod reservations;

pub use availability::Availability;
pub use notifications::NotificationEmitter;
pub use offers::OfferStore;
pub use reservations::ReservationLedger;
