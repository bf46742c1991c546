//! Native function addresses
//!
//! A [`FunctionAddress`] is what every lookup in this crate produces: an
//! integer-sized address with zero meaning "not found". It is never
//! dereferenced; calling it means converting it to one of the typed
//! `dynbind_sys::*_fn` pointers with [`FunctionAddress::cast`], which picks
//! the calling convention and the argument/return shape.

use std::ffi::c_void;
use std::fmt;

/// Address of a native function, or [`FunctionAddress::NULL`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FunctionAddress(usize);

impl FunctionAddress {
    /// The "not found" sentinel
    pub const NULL: FunctionAddress = FunctionAddress(0);

    /// Wrap a raw address
    pub const fn new(address: usize) -> Self {
        Self(address)
    }

    /// Wrap a pointer returned by a native lookup function
    pub fn from_ptr(ptr: *const c_void) -> Self {
        Self(ptr as usize)
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// `None` for the null sentinel
    pub fn non_null(self) -> Option<Self> {
        if self.is_null() {
            None
        } else {
            Some(self)
        }
    }

    /// Raw integer value
    pub const fn get(self) -> usize {
        self.0
    }

    pub fn as_ptr(self) -> *const c_void {
        self.0 as *const c_void
    }

    /// Reinterpret the address as a typed function pointer.
    ///
    /// Returns `None` for the null sentinel.
    ///
    /// # Safety
    ///
    /// `F` must be a function pointer type whose signature and calling
    /// convention match the native function at this address, and the library
    /// that exported it must still be loaded when the pointer is called.
    pub unsafe fn cast<F: Copy>(self) -> Option<F> {
        assert_eq!(
            std::mem::size_of::<F>(),
            std::mem::size_of::<usize>(),
            "function pointer type must be pointer-sized"
        );
        if self.is_null() {
            None
        } else {
            Some(std::mem::transmute_copy::<usize, F>(&self.0))
        }
    }
}

impl fmt::Debug for FunctionAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("FunctionAddress(NULL)")
        } else {
            write!(f, "FunctionAddress({:#x})", self.0)
        }
    }
}

impl From<*mut c_void> for FunctionAddress {
    fn from(ptr: *mut c_void) -> Self {
        Self::from_ptr(ptr)
    }
}
