/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Core routines shared by the prism image crates
//!
//! It currently contains
//!
//! - Channel encodings (bit depths) and the registry converting samples between them
//! - Colorspace (channel layout) descriptors and the rules deciding how two layouts convert
//! - Decoder options
//! - Logging macros which forward to the `log` crate when the `log` feature is enabled
//!
//! This library is `#[no_std]` friendly, it only needs `alloc` for error messages.
//!
//! # Features
//!  - `log`: Forward internal diagnostics to the [log](https://docs.rs/log) facade
//!
//!  - `serde`: Enables serializing of some of the data structures
//!     present in the crate
#![cfg_attr(not(test), no_std)]
#![macro_use]
extern crate alloc;

pub mod bit_depth;
pub mod colorspace;
pub mod errors;
pub mod log;
pub mod options;
pub mod sample;
pub mod serde;
