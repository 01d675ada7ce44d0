// Core services
pub mod catalog;
pub mod purchases;
pub mod tickets;

pub use catalog::CatalogService;
pub use purchases::PurchaseService;
pub use tickets::TicketService;
