pub mod pricing;
pub mod lifecycle;

pub use lifecycle::{create_offer, report_status_for, respond_to_offer, with_effective_status};
pub use pricing::{derive_offer, round_currency};
