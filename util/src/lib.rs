//! Shared plumbing for the Code Clash workspace: configuration, the problem
//! catalog and WebSocket topic broadcasting.

pub mod config;
pub mod problem_bank;
pub mod ws;
