mod actor;
mod description;
mod price;
mod role;
mod spot_count;
mod status;

pub use actor::Actor;
pub use description::{Location, OfferDescription};
pub use price::Price;
pub use role::Role;
pub use spot_count::SpotCount;
pub use status::{Status, Transition, TransitionError};
