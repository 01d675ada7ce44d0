pub mod event_listing;
pub mod ticket;
