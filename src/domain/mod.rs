// Domain records (as stored) and response models

pub mod company;
pub mod gerrit;
pub mod github;
pub mod metrics;
pub mod project;
pub mod signature;
pub mod user;

pub use company::*;
pub use gerrit::*;
pub use github::*;
pub use metrics::*;
pub use project::*;
pub use signature::*;
pub use user::*;
