mod helpers;
mod offers;
