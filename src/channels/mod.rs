//! Channel/account configuration trees: identity resolution, in-place
//! editing helpers and advanced-field projection.

pub mod advanced;
pub mod identity;
pub mod tree;
