/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Image sources
//!
//! A source is whatever produces raw, interleaved, native endian samples
//! for an image, usually an external decoder. The library does not decode
//! file formats itself, it consumes sources through the [`ImageSource`]
//! trait and opens them through a [`SourceAdapter`].
//!
//! [`memory`] contains an adapter over samples already in memory.
use std::ops::{Deref, DerefMut};
use std::path::Path;

use prism_core::bit_depth::BitDepthClass;

use crate::buffer::Strides;
use crate::errors::SourceError;

pub mod memory;

/// Format information a source reports about its samples
///
/// This is only used to pick the buffer types a decode goes through.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FormatMetadata {
    /// The sample format of the raw data
    pub bit_depth_class: BitDepthClass,
    /// Number of interleaved samples per pixel
    pub channel_count:   usize,
    pub width:           usize,
    pub height:          usize
}

impl FormatMetadata {
    pub const fn new(
        bit_depth_class: BitDepthClass, channel_count: usize, width: usize, height: usize
    ) -> FormatMetadata {
        FormatMetadata {
            bit_depth_class,
            channel_count,
            width,
            height
        }
    }

    /// Number of bytes the raw samples of a whole plane occupy, when tightly packed
    ///
    /// Returns `None` on overflow
    pub fn raw_plane_size(&self) -> Option<usize> {
        self.width
            .checked_mul(self.height)?
            .checked_mul(self.channel_count)?
            .checked_mul(self.bit_depth_class.raw_size())
    }

    /// Strides of a tightly packed raw plane
    pub const fn raw_strides(&self) -> Strides {
        Strides::new(
            self.channel_count,
            self.bit_depth_class.raw_size(),
            self.width,
            self.height
        )
    }
}

/// An open image yielding raw samples
pub trait ImageSource {
    /// Path this source was opened from
    fn path(&self) -> &Path;

    /// Format of the samples the source holds
    fn metadata(&self) -> FormatMetadata;

    /// Read every sample of the image into `target`
    ///
    /// The sample at `(x, y, c)` is written at
    /// `y * strides.row + x * strides.pixel + c * sample_size`.
    ///
    /// When `no_conversion` is true the source must deliver samples in the
    /// format reported by [`ImageSource::metadata`].
    fn read_raw_plane(
        &mut self, target: &mut [u8], strides: Strides, no_conversion: bool
    ) -> Result<(), SourceError>;

    /// Release resources held by the source
    ///
    /// Further reads are allowed to fail
    fn close(&mut self);
}

/// Opens image sources from paths
pub trait SourceAdapter {
    type Source: ImageSource;

    /// Open the image at `path`
    fn open(&self, path: &Path) -> Result<Self::Source, SourceError>;
}

/// Closes a borrowed source when dropped
///
/// This makes sure the source is released on every exit path of a decode
pub(crate) struct CloseGuard<'a, S: ImageSource + ?Sized> {
    source: &'a mut S
}

impl<'a, S: ImageSource + ?Sized> CloseGuard<'a, S> {
    pub(crate) fn new(source: &'a mut S) -> CloseGuard<'a, S> {
        CloseGuard { source }
    }
}

impl<S: ImageSource + ?Sized> Deref for CloseGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &Self::Target {
        self.source
    }
}

impl<S: ImageSource + ?Sized> DerefMut for CloseGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.source
    }
}

impl<S: ImageSource + ?Sized> Drop for CloseGuard<'_, S> {
    fn drop(&mut self) {
        self.source.close();
    }
}
