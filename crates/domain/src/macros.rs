//! Macro for implementing Display and FromStr for closed domain enums
//!
//! Parsing is case-insensitive and failures surface as
//! [`DingBridgeError::Validation`](crate::DingBridgeError::Validation), so a
//! caller-supplied string that names no variant is rejected before it reaches
//! any remote call.
//!
//! # Example
//!
//! ```rust
//! use dingbridge_domain::impl_domain_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Channel {
//!     Work,
//!     Robot,
//! }
//!
//! impl_domain_enum_conversions!(Channel {
//!     Work => "work",
//!     Robot => "robot",
//! });
//!
//! assert_eq!("ROBOT".parse::<Channel>().unwrap(), Channel::Robot);
//! ```

/// Implements Display and FromStr for an enum with a fixed string mapping.
#[macro_export]
macro_rules! impl_domain_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Wire representation of the variant.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $enum_name {
            type Err = $crate::DingBridgeError;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err($crate::DingBridgeError::Validation(format!(
                        "Invalid {}: {:?}",
                        stringify!($enum_name),
                        s
                    ))),
                }
            }
        }
    };
}
