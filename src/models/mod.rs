mod eligibility;
mod instance;
mod invoice;
mod plan;
mod user;

pub use eligibility::*;
pub use instance::*;
pub use invoice::*;
pub use plan::*;
pub use user::*;
