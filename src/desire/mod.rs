//! Domain model for recurring expenses ("desires"): the closed label enums, the
//! record itself, the in-memory store and the view filter.

pub mod category;
pub mod filter;
pub mod frequency;
pub mod priority;
pub mod record;
pub mod store;

pub use category::Category;
pub use filter::DesireFilter;
pub use frequency::{monthly_equivalent, Frequency};
pub use priority::Priority;
pub use record::{BudgetGoal, Desire, DesireId, NewDesire};
pub use store::DesireStore;
