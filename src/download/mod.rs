pub mod cache;
pub mod client;
pub mod provider;

pub use cache::*;
pub use client::*;
pub use provider::*;
