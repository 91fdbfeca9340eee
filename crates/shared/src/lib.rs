//! Wire contracts and static domain data shared between the classifier client and its adapters.

pub mod domain;
pub mod error;
pub mod protocol;
