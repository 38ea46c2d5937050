/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Decode raw image samples into typed buffers
//!
//! This crate reads raw samples from an [`ImageSource`](source::ImageSource),
//! picks a buffer format for them at run time and converts the result into
//! a caller owned [`ImageBuffer`](buffer::ImageBuffer) of any supported
//! encoding and colorspace, including CIE Lab.
//!
//! # Features
//! - `log`: Emit trace and warning diagnostics through the `log` crate, enabled by default
//! - `serde-support`: Serialize colorspace and bit depth descriptors
pub use prism_core;

pub mod buffer;
pub mod convert;
pub mod dispatch;
pub mod errors;
pub mod lab;
pub mod source;
pub mod storage;
