//! DingTalk open API integration

pub mod auth;
pub mod client;
pub mod errors;
pub mod factory;
pub mod types;

pub use auth::{AccessTokenProvider, AppTokenProvider};
pub use client::{DingTalkClient, DingTalkClientConfig};
pub use errors::{DingTalkError, DingTalkErrorCategory};
pub use factory::DingTalkClientFactory;
