/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Errors possible during image decoding and conversion
use std::fmt::{Debug, Display, Formatter};
use std::path::{Path, PathBuf};

use prism_core::bit_depth::BitDepthClass;
pub use prism_core::errors::ConfigError;

use crate::buffer::BufferFormat;
use crate::storage::BufferErrors;

/// All possible image errors that can occur.
///
/// This is the grandfather of image errors and contains
/// all decoding, processing and source errors possible
pub enum ImageErrors {
    /// An unsupported encoding or layout combination, found when
    /// setting up a conversion
    Configuration(ConfigError),
    /// The image data cannot be handled by this library, fatal
    /// only to the decode call which found it
    ImageFormat(ImageFormatError),
    /// The source failed to open or read
    Source(SourceError),
    /// Buffer storage could not be reinterpreted
    Buffer(BufferErrors)
}

/// Errors describing image data the library cannot handle
#[derive(Clone, Eq, PartialEq)]
pub enum ImageFormatError {
    /// Only 1, 3 and 4 channel images are supported
    UnsupportedChannelCount(usize),
    /// The bit depth class has no strategy
    UnsupportedBitDepth(BitDepthClass),
    /// Source dimensions do not match the destination buffer
    DimensionMismatch {
        expected: (usize, usize),
        found:    (usize, usize)
    },
    /// Too large dimensions for a given dimension
    TooLargeDimensions(&'static str, usize, usize),
    /// Images with a zero width or height
    ZeroDimension(&'static str),
    /// The sample array is of the wrong length
    WrongLength { expected: usize, found: usize },
    /// A buffer's encoding or layout differs from what a converter was built for
    UnexpectedFormat {
        expected: BufferFormat,
        found:    BufferFormat
    }
}

/// What the source was doing when it failed
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SourceErrorKind {
    Open,
    Read
}

/// An error from an image source, carrying the path it originated from
#[derive(Clone, Eq, PartialEq)]
pub struct SourceError {
    kind:   SourceErrorKind,
    path:   PathBuf,
    reason: String
}

impl SourceError {
    /// Opening `path` failed
    pub fn open(path: impl AsRef<Path>, reason: impl Into<String>) -> SourceError {
        SourceError {
            kind:   SourceErrorKind::Open,
            path:   path.as_ref().to_path_buf(),
            reason: reason.into()
        }
    }

    /// Reading samples from `path` failed
    pub fn read(path: impl AsRef<Path>, reason: impl Into<String>) -> SourceError {
        SourceError {
            kind:   SourceErrorKind::Read,
            path:   path.as_ref().to_path_buf(),
            reason: reason.into()
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl Debug for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let action = match self.kind {
            SourceErrorKind::Open => "open",
            SourceErrorKind::Read => "read"
        };
        writeln!(
            f,
            "Unable to {action} {}: {}",
            self.path.display(),
            self.reason
        )
    }
}

impl Debug for ImageFormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedChannelCount(count) => {
                writeln!(
                    f,
                    "Unsupported channel count {count}, expected 1, 3 or 4 channels"
                )
            }
            Self::UnsupportedBitDepth(class) => {
                writeln!(f, "Unsupported bit depth {class:?}")
            }
            Self::DimensionMismatch { expected, found } => {
                writeln!(
                    f,
                    "Dimensions mismatch, expected {}x{} but source is {}x{}",
                    expected.0, expected.1, found.0, found.1
                )
            }
            Self::TooLargeDimensions(dimension, expected, found) => {
                writeln!(
                    f,
                    "Too large dimensions for {dimension} , {found} exceeds {expected}"
                )
            }
            Self::ZeroDimension(dimension) => {
                writeln!(f, "Image {dimension} is zero")
            }
            Self::WrongLength { expected, found } => {
                writeln!(
                    f,
                    "Sample array length {found} doesn't match expected {expected}"
                )
            }
            Self::UnexpectedFormat { expected, found } => {
                writeln!(
                    f,
                    "Expected a {:?} {:?} buffer but found {:?} {:?}",
                    expected.colorspace, expected.depth, found.colorspace, found.depth
                )
            }
        }
    }
}

impl Debug for ImageErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration(err) => writeln!(f, "Configuration error: {err:?}"),
            Self::ImageFormat(err) => writeln!(f, "Image format error: {err:?}"),
            Self::Source(err) => writeln!(f, "Source error: {err:?}"),
            Self::Buffer(err) => writeln!(f, "Buffer error: {err:?}")
        }
    }
}

impl Display for ImageErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{:?}", self)
    }
}

impl Display for ImageFormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{:?}", self)
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{:?}", self)
    }
}

impl std::error::Error for ImageErrors {}

impl std::error::Error for ImageFormatError {}

impl std::error::Error for SourceError {}

impl From<ConfigError> for ImageErrors {
    fn from(value: ConfigError) -> Self {
        ImageErrors::Configuration(value)
    }
}

impl From<ImageFormatError> for ImageErrors {
    fn from(value: ImageFormatError) -> Self {
        ImageErrors::ImageFormat(value)
    }
}

impl From<SourceError> for ImageErrors {
    fn from(value: SourceError) -> Self {
        ImageErrors::Source(value)
    }
}

impl From<BufferErrors> for ImageErrors {
    fn from(value: BufferErrors) -> Self {
        ImageErrors::Buffer(value)
    }
}
