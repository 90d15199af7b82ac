pub mod health;
pub mod branch;
pub mod customers;
pub mod buildings;
pub mod reports;
pub mod uploads;
pub mod offers;
pub mod drafts;
pub mod validation;
pub mod geometry;
pub mod geocode;
pub mod notifications;
