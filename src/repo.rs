mod notifications;
mod offers;
mod reservations;

pub use notifications::NotificationsRepo;
pub use offers::OffersRepo;
pub use reservations::ReservationsRepo;
