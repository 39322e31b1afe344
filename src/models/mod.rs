pub mod ids;
pub mod plan;

pub use ids::{BankCode, ProductId, ProviderId};
pub use plan::{CheckoutFields, InstallmentPlan};
