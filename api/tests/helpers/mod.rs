#![allow(dead_code)]

pub mod app;
pub mod ws;

pub use app::{call, make_test_app};
pub use ws::{connect_ws, next_event, spawn_server};
