pub mod discount;
pub mod growth;
pub mod valuation;

pub use discount::*;
pub use growth::*;
pub use valuation::*;
