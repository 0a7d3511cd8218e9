//! DingTalk request-client port and the direct-call service built on it

pub mod ports;
pub mod service;

pub use service::DingTalkService;
