//! lbprobe: load balancer distribution tester
//!
//! Issues sequential GET requests against a balancer endpoint, tracks which
//! backend served each one through a response header, and checks that the
//! requests reached at least a minimum number of distinct backends.

pub mod cli;
pub mod config;
pub mod core;
