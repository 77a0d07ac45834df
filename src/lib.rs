//! leaderboot - trust-bootstrap reconciliation for a cluster leader node
//!
//! Turns operator-supplied leader options into a validated effective
//! configuration, deciding for the storage backend and the network-membership
//! service whether to accept operator certificates, generate self-signed
//! material, or bootstrap credentials from a remote service.

pub mod authentication;
pub mod certificate;
pub mod cli;
pub mod observability;
pub mod options;
pub mod reconcile;
pub mod validation;
