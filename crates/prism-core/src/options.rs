/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Global Decoder options

/// The exponent used by the forward Lab non-linearity
///
/// CIE defines the cube root, older code approximated it with `0.333`.
/// The approximation is kept available for bit compatibility with output
/// produced by such code.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum LabExponent {
    /// Exactly `1/3`
    #[default]
    Exact,
    /// The `0.333` approximation
    Legacy
}

impl LabExponent {
    pub fn value(self) -> f32 {
        match self {
            Self::Exact => 1.0 / 3.0,
            Self::Legacy => 0.333
        }
    }
}

/// Decoder options
///
/// Options influencing how raw samples are decoded
/// and converted
#[derive(Debug, Copy, Clone)]
pub struct DecoderOptions {
    /// Maximum width for which decoders will
    /// not try to decode images larger than
    /// the specified width.
    ///
    /// - Default value: 16384
    max_width:    usize,
    /// Maximum height for which decoders will not
    /// try to decode images larger than the
    /// specified height
    ///
    /// - Default value: 16384
    max_height:   usize,
    /// Exponent used when converting to Lab
    ///
    /// - Default value: [`LabExponent::Exact`]
    lab_exponent: LabExponent
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            max_width:    1 << 14,
            max_height:   1 << 14,
            lab_exponent: LabExponent::Exact
        }
    }
}

impl DecoderOptions {
    /// Create the default decoder options
    pub fn new() -> DecoderOptions {
        DecoderOptions::default()
    }

    /// Get maximum width configured for which the decoder
    /// should not try to decode images greater than this width
    pub const fn max_width(&self) -> usize {
        self.max_width
    }

    /// Get maximum height configured for which the decoder should
    /// not try to decode images greater than this height
    pub const fn max_height(&self) -> usize {
        self.max_height
    }

    /// Get the exponent used by the forward Lab conversion
    pub const fn lab_exponent(&self) -> LabExponent {
        self.lab_exponent
    }

    /// Set maximum width for which the decoder should not try
    /// decoding images greater than that width
    ///
    /// # Arguments
    ///
    /// * `width`:  The maximum width allowed
    ///
    /// returns: DecoderOptions
    pub fn set_max_width(mut self, width: usize) -> Self {
        self.max_width = width;
        self
    }

    /// Set maximum height for which the decoder should not try
    /// decoding images greater than that height
    /// # Arguments
    ///
    /// * `height`: The maximum height allowed
    ///
    /// returns: DecoderOptions
    pub fn set_max_height(mut self, height: usize) -> Self {
        self.max_height = height;
        self
    }

    /// Set the exponent the forward Lab conversion uses
    ///
    /// # Example
    /// ```
    /// use prism_core::options::{DecoderOptions, LabExponent};
    /// let options = DecoderOptions::default().set_lab_exponent(LabExponent::Legacy);
    /// assert_eq!(options.lab_exponent(), LabExponent::Legacy);
    /// ```
    pub fn set_lab_exponent(mut self, exponent: LabExponent) -> Self {
        self.lab_exponent = exponent;
        self
    }
}
