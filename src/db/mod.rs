pub mod connection;
pub mod schema;
pub mod branches;
pub mod customers;
pub mod buildings;
pub mod reports;
pub mod offers;
pub mod notifications;

pub use connection::Database;
pub use reports::ReportFilter;
