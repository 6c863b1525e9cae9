#![allow(dead_code)]

pub mod scripted_transport;
pub mod strategies;

pub use scripted_transport::*;
pub use strategies::*;
