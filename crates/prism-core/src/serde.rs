/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

#![cfg(feature = "serde")]

use alloc::format;

use serde::ser::*;

use crate::bit_depth::{BitDepth, BitDepthClass};
use crate::colorspace::ColorSpace;

impl Serialize for ColorSpace {
    #[allow(clippy::uninlined_format_args)]
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        // colorspace serialization is simply it's debug value
        serializer.serialize_str(&format!("{:?}", self))
    }
}

impl Serialize for BitDepth {
    #[allow(clippy::uninlined_format_args)]
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        serializer.serialize_str(&format!("{:?}", self))
    }
}

impl Serialize for BitDepthClass {
    #[allow(clippy::uninlined_format_args)]
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        serializer.serialize_str(&format!("{:?}", self))
    }
}

#[cfg(test)]
mod tests {
    use core::num::NonZeroU32;

    use crate::bit_depth::{BitDepth, BitDepthClass};
    use crate::colorspace::ColorSpace;

    #[test]
    fn test_serialize_descriptors() {
        assert_eq!(serde_json::to_string(&ColorSpace::LabA).unwrap(), "\"LabA\"");
        assert_eq!(
            serde_json::to_string(&ColorSpace::MultiBand(NonZeroU32::new(5).unwrap())).unwrap(),
            "\"MultiBand(5)\""
        );
        assert_eq!(serde_json::to_string(&BitDepth::Float16).unwrap(), "\"Float16\"");
        assert_eq!(
            serde_json::to_string(&[BitDepthClass::Int8, BitDepthClass::Float64]).unwrap(),
            "[\"Int8\",\"Float64\"]"
        );
    }
}
