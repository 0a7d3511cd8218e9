//! In-process notification delivery

mod bus;

pub use bus::{Notification, NotificationBus};
