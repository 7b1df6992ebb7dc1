mod notification;
mod offer;
mod reservation;

pub use notification::{NewNotification, Notification, NotificationKind};
pub use offer::{NewOffer, Offer, OfferFilter, OfferListing};
pub use reservation::{NewReservation, Reservation, ReservationView};
