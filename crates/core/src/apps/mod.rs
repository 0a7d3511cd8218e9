//! Application records and their audit history

pub mod ports;
