//! Path-addressed config patches: building them from two channel trees and
//! replaying them against a store.

pub mod apply;
pub mod diff;
pub mod types;
pub mod value;
