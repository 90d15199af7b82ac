pub mod geo;
pub mod issue;
pub mod action;
pub mod report;
pub mod form;
pub mod customer;
pub mod offer;
pub mod branch;
pub mod notification;

pub use geo::*;
pub use issue::*;
pub use action::*;
pub use report::*;
pub use form::*;
pub use customer::*;
pub use offer::*;
pub use branch::*;
pub use notification::*;
