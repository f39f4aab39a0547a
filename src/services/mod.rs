pub mod classifier;
pub mod link_store;
pub mod reconciler;

pub use classifier::{classify, link_independent_skip, Decision, Precondition, SkipReason};
pub use link_store::LinkStore;
pub use reconciler::{needs_update, Outcome, Reconciler};
