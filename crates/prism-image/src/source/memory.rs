/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! In-memory image sources
//!
//! Useful when samples were decoded elsewhere, and for tests.
//!
//! # Example
//! ```
//! use std::path::Path;
//!
//! use prism_core::bit_depth::BitDepthClass;
//! use prism_image::source::memory::{MemoryAdapter, MemoryImage};
//! use prism_image::source::{ImageSource, SourceAdapter};
//!
//! let image = MemoryImage::from_samples(BitDepthClass::Int8, 1, 2, 1, &[10_u8, 20]).unwrap();
//!
//! let mut adapter = MemoryAdapter::new();
//! adapter.insert("gray.raw", image);
//!
//! let source = adapter.open(Path::new("gray.raw")).unwrap();
//! assert_eq!(source.metadata().width, 2);
//! assert!(adapter.open(Path::new("missing.raw")).is_err());
//! ```
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytemuck::Pod;
use prism_core::bit_depth::BitDepthClass;
use prism_core::log::trace;

use crate::buffer::Strides;
use crate::errors::{ImageFormatError, SourceError};
use crate::source::{FormatMetadata, ImageSource, SourceAdapter};

/// Raw interleaved samples with their format
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MemoryImage {
    metadata: FormatMetadata,
    data:     Vec<u8>
}

impl MemoryImage {
    /// Create an image from native endian bytes
    ///
    /// # Errors
    /// If `data` isn't exactly the size of a tightly packed plane
    pub fn new(metadata: FormatMetadata, data: Vec<u8>) -> Result<MemoryImage, ImageFormatError> {
        let expected = metadata
            .raw_plane_size()
            .ok_or(ImageFormatError::TooLargeDimensions(
                "plane",
                usize::MAX,
                metadata.width
            ))?;

        if data.len() != expected {
            return Err(ImageFormatError::WrongLength {
                expected,
                found: data.len()
            });
        }
        Ok(MemoryImage { metadata, data })
    }

    /// Create an image from typed samples
    ///
    /// The type only matters for its bytes, e.g. [`BitDepthClass::Half16`]
    /// samples can be passed as `half::f16` or as `u16` bits.
    pub fn from_samples<T: Pod>(
        class: BitDepthClass, channels: usize, width: usize, height: usize, samples: &[T]
    ) -> Result<MemoryImage, ImageFormatError> {
        let metadata = FormatMetadata::new(class, channels, width, height);
        MemoryImage::new(metadata, bytemuck::cast_slice(samples).to_vec())
    }

    pub const fn metadata(&self) -> FormatMetadata {
        self.metadata
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Adapter serving [`MemoryImage`]s keyed by path
#[derive(Clone, Debug, Default)]
pub struct MemoryAdapter {
    images: BTreeMap<PathBuf, Arc<MemoryImage>>
}

impl MemoryAdapter {
    pub fn new() -> MemoryAdapter {
        MemoryAdapter::default()
    }

    /// Register an image under `path`, replacing any existing one
    pub fn insert(&mut self, path: impl AsRef<Path>, image: MemoryImage) {
        self.images
            .insert(path.as_ref().to_path_buf(), Arc::new(image));
    }

    /// Return true if an image is registered under `path`
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.images.contains_key(path.as_ref())
    }
}

impl SourceAdapter for MemoryAdapter {
    type Source = MemorySource;

    fn open(&self, path: &Path) -> Result<MemorySource, SourceError> {
        let image = self
            .images
            .get(path)
            .ok_or_else(|| SourceError::open(path, "no image registered under this path"))?;

        trace!("Opened in-memory image {}", path.display());

        Ok(MemorySource {
            path:   path.to_path_buf(),
            image:  Arc::clone(image),
            closed: false
        })
    }
}

/// An open [`MemoryImage`]
#[derive(Clone, Debug)]
pub struct MemorySource {
    path:   PathBuf,
    image:  Arc<MemoryImage>,
    closed: bool
}

impl MemorySource {
    /// Create a source which wasn't opened through an adapter
    pub fn new(path: impl AsRef<Path>, image: MemoryImage) -> MemorySource {
        MemorySource {
            path:   path.as_ref().to_path_buf(),
            image:  Arc::new(image),
            closed: false
        }
    }

    /// Return true once [`ImageSource::close`] has been called
    pub const fn is_closed(&self) -> bool {
        self.closed
    }
}

impl ImageSource for MemorySource {
    fn path(&self) -> &Path {
        &self.path
    }

    fn metadata(&self) -> FormatMetadata {
        self.image.metadata()
    }

    fn read_raw_plane(
        &mut self, target: &mut [u8], strides: Strides, no_conversion: bool
    ) -> Result<(), SourceError> {
        if self.closed {
            return Err(SourceError::read(&self.path, "source is closed"));
        }
        if !no_conversion {
            return Err(SourceError::read(
                &self.path,
                "only the stored sample format can be read"
            ));
        }
        let metadata = self.image.metadata();
        let packed = metadata.raw_strides();

        let overflow = || {
            SourceError::read(
                &self.path,
                format!("strides {strides:?} overflow for {packed:?}")
            )
        };
        let row_bytes = strides
            .pixel
            .checked_mul(metadata.width)
            .ok_or_else(overflow)?;

        // the last row only needs to fit its pixels
        let needed = match metadata.height {
            0 => 0,
            h => strides
                .row
                .checked_mul(h - 1)
                .and_then(|x| x.checked_add(row_bytes))
                .ok_or_else(overflow)?
        };
        if strides.pixel < packed.pixel || strides.row < row_bytes {
            return Err(SourceError::read(
                &self.path,
                format!("strides {strides:?} are too small for {packed:?}")
            ));
        }
        if target.len() < needed {
            return Err(SourceError::read(
                &self.path,
                format!("target holds {} bytes, {needed} are needed", target.len())
            ));
        }

        let data = self.image.data();

        if strides == packed {
            target[..data.len()].copy_from_slice(data);
        } else {
            for (y, row) in data.chunks_exact(packed.row.max(1)).enumerate() {
                for (x, px) in row.chunks_exact(packed.pixel.max(1)).enumerate() {
                    let start = y * strides.row + x * strides.pixel;
                    target[start..start + px.len()].copy_from_slice(px);
                }
            }
        }
        trace!("Read {} bytes from {}", data.len(), self.path.display());
        Ok(())
    }

    fn close(&mut self) {
        if !self.closed {
            trace!("Closing in-memory image {}", self.path.display());
        }
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use prism_core::bit_depth::BitDepthClass;

    use crate::buffer::Strides;
    use crate::errors::SourceErrorKind;
    use crate::source::memory::{MemoryAdapter, MemoryImage, MemorySource};
    use crate::source::{ImageSource, SourceAdapter};

    fn rgb_u16() -> MemoryImage {
        let samples: Vec<u16> = (0..6).collect();
        MemoryImage::from_samples(BitDepthClass::Int16, 3, 2, 1, &samples).unwrap()
    }

    #[test]
    fn test_length_checked() {
        assert!(MemoryImage::from_samples(BitDepthClass::Int16, 3, 2, 2, &[0_u16; 6]).is_err());
    }

    #[test]
    fn test_open_missing() {
        let adapter = MemoryAdapter::new();
        let err = adapter.open(Path::new("nothing")).unwrap_err();

        assert_eq!(err.kind(), SourceErrorKind::Open);
        assert_eq!(err.path(), Path::new("nothing"));
    }

    #[test]
    fn test_packed_read() {
        let mut source = MemorySource::new("a", rgb_u16());
        let strides = source.metadata().raw_strides();
        let mut target = vec![0_u8; strides.plane];

        source.read_raw_plane(&mut target, strides, true).unwrap();
        assert_eq!(target, source.image.data());
    }

    #[test]
    fn test_padded_read() {
        let image = MemoryImage::from_samples(BitDepthClass::Int8, 1, 2, 2, &[1_u8, 2, 3, 4]).unwrap();
        let mut source = MemorySource::new("a", image);
        // two bytes per pixel, 5 bytes per row
        let strides = Strides {
            pixel: 2,
            row:   5,
            plane: 10
        };
        let mut target = vec![0_u8; 10];

        source.read_raw_plane(&mut target, strides, true).unwrap();
        assert_eq!(target, [1, 0, 2, 0, 0, 3, 0, 4, 0, 0]);
    }

    #[test]
    fn test_huge_strides_are_an_error() {
        let image = MemoryImage::from_samples(BitDepthClass::Int8, 1, 2, 2, &[1_u8, 2, 3, 4]).unwrap();
        let mut source = MemorySource::new("a", image);
        let mut target = vec![0_u8; 16];

        for strides in [
            Strides {
                pixel: 1,
                row:   usize::MAX,
                plane: 0
            },
            Strides {
                pixel: usize::MAX,
                row:   usize::MAX,
                plane: 0
            }
        ] {
            let err = source
                .read_raw_plane(&mut target, strides, true)
                .unwrap_err();
            assert_eq!(err.kind(), SourceErrorKind::Read);
        }
        assert_eq!(target, [0; 16]);
    }

    #[test]
    fn test_small_target_is_an_error() {
        let mut source = MemorySource::new("a", rgb_u16());
        let strides = source.metadata().raw_strides();
        let mut target = vec![0_u8; strides.plane - 1];

        assert!(source.read_raw_plane(&mut target, strides, true).is_err());
    }

    #[test]
    fn test_conversion_rejected() {
        let mut source = MemorySource::new("a", rgb_u16());
        let strides = source.metadata().raw_strides();
        let mut target = vec![0_u8; strides.plane];

        assert!(source.read_raw_plane(&mut target, strides, false).is_err());
    }

    #[test]
    fn test_read_after_close() {
        let mut source = MemorySource::new("a", rgb_u16());
        let strides = source.metadata().raw_strides();
        let mut target = vec![0_u8; strides.plane];

        source.close();
        assert!(source.is_closed());
        assert!(source.read_raw_plane(&mut target, strides, true).is_err());
    }
}
