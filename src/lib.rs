//! lbrule - Load balancer listener rule synchronizer
//!
//! Keeps declared listener rules in sync with a load balancer control plane:
//! translates between the declared rule shape and the control plane's
//! shape, allocates free priorities under concurrent writers, and reports
//! only the drift that matters for the active action variants.

pub mod allocator;
pub mod cli;
pub mod config;
pub mod logging;
pub mod model;
pub mod reconcile;
pub mod relevance;
pub mod remote;
pub mod translate;
