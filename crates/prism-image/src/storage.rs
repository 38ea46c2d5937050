/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Aligned sample storage
//!
//! The storage is a bag of bytes which remembers the sample type it was
//! created for, and can be reinterpreted as a slice of that type.
//!
//! Every allocation is aligned to [`MIN_ALIGNMENT`], so reinterpreting
//! the bytes as `u16`, `f16` or `f32` never fails on alignment.
use std::alloc::{alloc_zeroed, dealloc, handle_alloc_error, Layout};
use std::any::TypeId;
use std::fmt::{Debug, Formatter};
use std::mem::{align_of, size_of};
use std::ptr::NonNull;

use bytemuck::Pod;
use half::f16;
use prism_core::bit_depth::{BitDepth, BitType};

/// Minimum alignment for all types allocated in the storage
///
/// 64 is chosen as it allows us to align to the highest
/// register type supported on machines I'm aware of
/// i.e its for AVX-512, and this transitively means all other types
/// become aligned
pub const MIN_ALIGNMENT: usize = 64;

/// Encapsulates errors that can occur
/// when manipulating storage
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum BufferErrors {
    /// The pointer is not aligned for the requested type
    UnalignedPointer { address: usize, alignment: usize },
    /// The length of the type does not evenly divide the storage length
    UnevenLength(usize, usize),
    /// Reinterpreting as a type the storage wasn't created with
    DifferentType(TypeId, TypeId),
    /// The requested size cannot be represented as an allocation
    TooLarge(usize),
    /// No sample type stores this depth
    UnsupportedDepth(BitDepth)
}

impl Debug for BufferErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BufferErrors::UnalignedPointer { address, alignment } => {
                writeln!(f, "Storage pointer {address:#x} is not aligned to {alignment} bytes")
            }
            BufferErrors::UnevenLength(length, size_of_1) => {
                writeln!(
                    f,
                    "Size of {size_of_1} cannot evenly divide length {length}"
                )
            }
            BufferErrors::DifferentType(expected, found) => {
                writeln!(f, "Different type id {:?} from expected {:?}. This indicates you are converting storage
             to a type it wasn't instantiated with", found, expected)
            }
            BufferErrors::TooLarge(size) => {
                writeln!(f, "Cannot allocate {size} bytes")
            }
            BufferErrors::UnsupportedDepth(depth) => {
                writeln!(f, "No sample type can store depth {depth:?}")
            }
        }
    }
}

/// Zero initialized, aligned storage for samples of a single type
pub struct SampleStorage {
    ptr:      NonNull<u8>,
    length:   usize,
    // allocated size, never zero
    capacity: usize,
    // type id for which the storage was created with
    type_id:  TypeId
}

// safety: The storage owns its allocation exclusively, the
// pointer is never shared outside of borrows tied to &self or &mut self
unsafe impl Send for SampleStorage {}

unsafe impl Sync for SampleStorage {}

impl SampleStorage {
    /// Create zeroed storage for `count` samples of `T`
    pub fn new<T: Pod>(count: usize) -> Result<SampleStorage, BufferErrors> {
        let length = count
            .checked_mul(size_of::<T>())
            .ok_or(BufferErrors::TooLarge(usize::MAX))?;

        Self::new_with_type(length, TypeId::of::<T>())
    }

    /// Create zeroed storage for `count` samples of a given bit depth
    ///
    /// # Errors
    /// [`BufferErrors::UnsupportedDepth`] for depths without a sample type,
    /// e.g [`BitDepth::Unknown`]
    ///
    /// # Example
    /// ```
    /// use prism_core::bit_depth::BitDepth;
    /// use prism_image::storage::SampleStorage;
    /// let storage = SampleStorage::new_with_depth(10, BitDepth::Sixteen).unwrap();
    /// assert_eq!(storage.len(), 20);
    /// ```
    pub fn new_with_depth(count: usize, depth: BitDepth) -> Result<SampleStorage, BufferErrors> {
        match depth.bit_type() {
            Some(BitType::U8) => Self::new::<u8>(count),
            Some(BitType::U16) => Self::new::<u16>(count),
            Some(BitType::F16) => Self::new::<f16>(count),
            Some(BitType::F32) => Self::new::<f32>(count),
            _ => Err(BufferErrors::UnsupportedDepth(depth))
        }
    }

    fn new_with_type(length: usize, type_id: TypeId) -> Result<SampleStorage, BufferErrors> {
        // allocating zero bytes is undefined behaviour, so always allocate something
        let capacity = length.max(MIN_ALIGNMENT);
        let layout = Layout::from_size_align(capacity, MIN_ALIGNMENT)
            .map_err(|_| BufferErrors::TooLarge(length))?;

        // Safety
        // - layout has a non-zero size
        // - zeroed memory is a valid bit pattern for every Pod type
        let raw = unsafe { alloc_zeroed(layout) };
        let ptr = match NonNull::new(raw) {
            Some(ptr) => ptr,
            None => handle_alloc_error(layout)
        };

        Ok(SampleStorage {
            ptr,
            length,
            capacity,
            type_id
        })
    }

    /// Return the length of the underlying array in bytes
    ///
    /// Meaning if the storage held 10 u32's, the length would be 40
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Return true whether this storage length is zero
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Return the type id which gives the representation of the bytes
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Return the raw bytes of the storage
    pub fn as_bytes(&self) -> &[u8] {
        // Safety:
        // - ptr is valid for length bytes, and initialized since we zero on allocation
        // - u8 can alias anything
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.length) }
    }

    /// Return the raw bytes of the storage, mutably
    ///
    /// Every stored type is `Pod`, so any byte pattern written
    /// here is a valid value
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        // Safety: as above, and &mut self guarantees exclusivity
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.length) }
    }

    /// Reinterpret the storage as being composed of the following type
    pub fn reinterpret_as<T: Pod>(&self) -> Result<&[T], BufferErrors> {
        self.confirm_suspicions::<T>()?;
        Ok(bytemuck::cast_slice(self.as_bytes()))
    }

    /// Reinterpret the storage as a mutable slice of the following type
    pub fn reinterpret_as_mut<T: Pod>(&mut self) -> Result<&mut [T], BufferErrors> {
        self.confirm_suspicions::<T>()?;
        Ok(bytemuck::cast_slice_mut(self.as_bytes_mut()))
    }

    /// Fill the storage with a specific element
    ///
    /// # Examples
    ///
    /// ```
    /// use prism_image::storage::SampleStorage;
    /// let mut storage = SampleStorage::new::<u16>(50).unwrap();
    /// storage.fill(100_u16).unwrap();
    /// assert_eq!(storage.reinterpret_as::<u16>().unwrap(), &[100; 50]);
    /// ```
    pub fn fill<T: Pod>(&mut self, element: T) -> Result<(), BufferErrors> {
        self.reinterpret_as_mut()?.fill(element);
        Ok(())
    }

    /// Confirm that data is aligned and
    /// the type T can evenly divide length
    fn confirm_suspicions<T: 'static>(&self) -> Result<(), BufferErrors> {
        let converted_type_id = TypeId::of::<T>();

        if converted_type_id != self.type_id {
            return Err(BufferErrors::DifferentType(
                self.type_id,
                converted_type_id
            ));
        }
        let alignment = align_of::<T>();

        if (self.ptr.as_ptr() as usize) % alignment != 0 {
            return Err(BufferErrors::UnalignedPointer {
                address: self.ptr.as_ptr() as usize,
                alignment
            });
        }
        if self.length % size_of::<T>() != 0 {
            return Err(BufferErrors::UnevenLength(self.length, size_of::<T>()));
        }
        Ok(())
    }
}

impl Clone for SampleStorage {
    fn clone(&self) -> Self {
        // Safety: same layout as the original, which was validated on creation
        // and has a non-zero size
        let layout = unsafe { Layout::from_size_align_unchecked(self.capacity, MIN_ALIGNMENT) };
        let raw = unsafe { alloc_zeroed(layout) };
        let ptr = match NonNull::new(raw) {
            Some(ptr) => ptr,
            None => handle_alloc_error(layout)
        };
        let mut new_storage = SampleStorage {
            ptr,
            length: self.length,
            capacity: self.capacity,
            type_id: self.type_id
        };
        new_storage.as_bytes_mut().copy_from_slice(self.as_bytes());
        new_storage
    }
}

impl PartialEq for SampleStorage {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.as_bytes() == other.as_bytes()
    }
}

impl Eq for SampleStorage {}

impl Debug for SampleStorage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "raw_bytes: {:?}", self.as_bytes())
    }
}

impl Drop for SampleStorage {
    fn drop(&mut self) {
        // Safety
        // - The same layout we used for alloc is the same we are using for
        //  dealloc, it was validated on creation
        unsafe {
            let layout = Layout::from_size_align_unchecked(self.capacity, MIN_ALIGNMENT);
            dealloc(self.ptr.as_ptr(), layout);
        }
    }
}

#[cfg(test)]
mod tests {
    use half::f16;
    use prism_core::bit_depth::BitDepth;

    use crate::storage::{BufferErrors, SampleStorage};

    /// check that we cant convert from a type we made
    #[test]
    fn test_wrong_interpretation() {
        let storage = SampleStorage::new::<u8>(10).unwrap();
        assert!(storage.reinterpret_as::<u16>().is_err());
    }

    #[test]
    fn test_correct_interpretation() {
        let mut storage = SampleStorage::new::<f16>(3).unwrap();
        storage.fill(f16::ONE).unwrap();
        assert_eq!(storage.reinterpret_as::<f16>().unwrap(), &[f16::ONE; 3]);
    }

    #[test]
    fn test_zero_sized_storage() {
        let storage = SampleStorage::new::<f32>(0).unwrap();
        assert!(storage.is_empty());
        assert!(storage.reinterpret_as::<f32>().unwrap().is_empty());
    }

    #[test]
    fn test_clone_works() {
        let mut storage = SampleStorage::new::<u16>(100).unwrap();
        storage.fill(9_u16).unwrap();
        let other = storage.clone();

        assert_eq!(storage, other);
    }

    #[test]
    fn test_unknown_depth_is_rejected() {
        let err = SampleStorage::new_with_depth(4, BitDepth::Unknown).unwrap_err();
        assert_eq!(err, BufferErrors::UnsupportedDepth(BitDepth::Unknown));
    }

    #[test]
    fn test_depth_sizes() {
        let storage = SampleStorage::new_with_depth(3, BitDepth::Float32).unwrap();
        assert_eq!(storage.len(), 12);
        assert!(storage.reinterpret_as::<f32>().is_ok());

        let storage = SampleStorage::new_with_depth(3, BitDepth::Float16).unwrap();
        assert_eq!(storage.len(), 6);
        assert!(storage.reinterpret_as::<f16>().is_ok());
    }

    #[test]
    fn test_unaligned_error_message() {
        let err = BufferErrors::UnalignedPointer {
            address:   0x41,
            alignment: 4
        };
        assert_eq!(
            format!("{err:?}"),
            "Storage pointer 0x41 is not aligned to 4 bytes\n"
        );
    }
}
