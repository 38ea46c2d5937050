/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Logging macros
//!
//! Conversions only report two things, the plan they resolved (`trace`)
//! and why they rejected a format (`warn`).
//! With the `log` feature these forward to the [log](https://docs.rs/log) facade,
//! otherwise they expand to nothing.

#[cfg(feature = "log")]
pub use ::log::{trace, warn};

// #[macro_export] places macros in the crate root,
// `pub use` under a hidden name namespaces them here.
#[cfg(not(feature = "log"))]
pub use crate::{__trace as trace, __warn as warn};

#[cfg(not(feature = "log"))]
#[doc(hidden)]
#[macro_export]
macro_rules! __warn {
    ($($arg:tt)+) => {};
}

#[cfg(not(feature = "log"))]
#[doc(hidden)]
#[macro_export]
macro_rules! __trace {
    ($($arg:tt)+) => {};
}

#[cfg(test)]
mod tests {
    use crate::log::{trace, warn};

    #[test]
    fn test_macros_accept_format_args() {
        trace!("Resolved {:?}", crate::bit_depth::BitDepth::Eight);
        warn!("Rejected {} of {}", 1, 2);
    }
}
