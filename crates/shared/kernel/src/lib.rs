//! Shared kernel of the Depot slices.
//!
//! Always available: configuration loading ([`config`]) and short random tokens
//! ([`safe_nanoid!`]). Behind the `server` feature: application state, the system routes, the
//! error body every endpoint returns, and the admin capability.
//!
//! ```rust
//! # use depot_kernel::safe_nanoid;
//! let suffix = safe_nanoid!(6);
//! assert_eq!(suffix.chars().count(), 6);
//! ```
pub mod config;
#[cfg(feature = "server")]
pub mod security;
#[cfg(feature = "server")]
pub mod server;

pub use depot_domain as domain;
pub use nanoid::nanoid;

/// Token alphabet: ASCII letters and digits minus the look-alikes `0 1 I O l`.
///
/// Only characters that are valid in stored file names, so tokens can be spliced into them.
pub const SAFE_ALPHABET: &[char; 55] = &[
    '2', '3', '4', '5', '6', '7', '8', '9', //
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L', 'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U',
    'V', 'W', 'X', 'Y', 'Z', //
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'j', 'k', 'm', 'n', 'p', 'q', 'r', 's', 't', 'u', 'v',
    'w', 'x', 'y', 'z',
];

/// Random token over [`SAFE_ALPHABET`]; 12 characters unless a length is given.
#[macro_export]
macro_rules! safe_nanoid {
    () => {
        $crate::safe_nanoid!(12)
    };
    ($len:expr) => {
        $crate::nanoid!($len, $crate::SAFE_ALPHABET)
    };
}
