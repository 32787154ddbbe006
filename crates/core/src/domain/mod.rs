pub mod claim;
pub mod identity;
