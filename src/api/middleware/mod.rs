//! API middleware stack.
//!
//! 1. Access log — request id, method, path, session role, status, latency

pub mod audit;
