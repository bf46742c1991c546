//! Function address providers
//!
//! Everything that hands out native function addresses implements
//! [`FunctionProvider`]: a loaded [`SharedLibrary`](crate::SharedLibrary),
//! the OpenCL ICD resolver, or a custom provider supplied by the application
//! (for example a test double, or a library that was loaded some other way).

use crate::address::FunctionAddress;
use crate::error::{Error, Result};
use crate::opencl::PlatformId;

/// Resolves native function addresses by name.
pub trait FunctionProvider: Send + Sync {
    /// Address of `name`, or [`FunctionAddress::NULL`] if it is unavailable.
    fn function_address(&self, name: &str) -> FunctionAddress;

    /// Release the native resources behind this provider.
    ///
    /// Called exactly once when the owning session shuts down. Addresses
    /// returned earlier must not be called afterwards.
    fn release(&mut self) {}
}

/// A provider that can also resolve addresses for one specific platform.
pub trait FunctionProviderLocal: FunctionProvider {
    /// Address of `name` as exposed by `platform`, or
    /// [`FunctionAddress::NULL`].
    fn function_address_for(&self, platform: PlatformId, name: &str) -> FunctionAddress;
}

impl<T: FunctionProvider + ?Sized> FunctionProvider for Box<T> {
    fn function_address(&self, name: &str) -> FunctionAddress {
        (**self).function_address(name)
    }

    fn release(&mut self) {
        (**self).release()
    }
}

/// Resolve `name`, failing with [`Error::MissingCoreFunction`] when absent.
pub fn require<P>(provider: &P, name: &'static str) -> Result<FunctionAddress>
where
    P: FunctionProvider + ?Sized,
{
    provider
        .function_address(name)
        .non_null()
        .ok_or(Error::MissingCoreFunction(name))
}

/// Resolve `name` as the function pointer type `F`.
///
/// # Safety
///
/// `F` must be the pointer type matching the native signature of `name`.
pub(crate) unsafe fn require_fn<F, P>(provider: &P, name: &'static str) -> Result<F>
where
    F: Copy,
    P: FunctionProvider + ?Sized,
{
    require(provider, name)?
        .cast::<F>()
        .ok_or(Error::MissingCoreFunction(name))
}
