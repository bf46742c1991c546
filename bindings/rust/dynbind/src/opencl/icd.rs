//! Extension function resolution through the OpenCL ICD loader
//!
//! OpenCL has two ways to look up extension functions:
//! `clGetExtensionFunctionAddress` (deprecated in 1.1, platform-agnostic)
//! and `clGetExtensionFunctionAddressForPlatform` (1.2+). With an ICD loader
//! the per-platform variant buys nothing, because the loader dispatches to
//! the vendor anyway, and it can only be used at all if a platform has been
//! chosen. So the generic lookup is preferred, and the per-platform lookup
//! is used only when there is exactly one platform and it supports 1.2.

use std::ffi::CString;

use dynbind_sys as sys;

use crate::address::FunctionAddress;
use crate::error::{Error, Result};
use crate::log::{log_emit, LogLevel};
use crate::provider::{require, FunctionProvider, FunctionProviderLocal};

use super::platform::{self, PlatformId, PlatformInfo};
use super::version::parse_version;

const GET_EXTENSION_FUNCTION_ADDRESS: &str = "clGetExtensionFunctionAddress";
const GET_EXTENSION_FUNCTION_ADDRESS_FOR_PLATFORM: &str = "clGetExtensionFunctionAddressForPlatform";

/// How extension function addresses are resolved for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStrategy {
    /// `clGetExtensionFunctionAddress`; the platform argument is ignored
    Generic,
    /// `clGetExtensionFunctionAddressForPlatform` bound to this platform
    PerPlatform(PlatformId),
}

/// Function provider for an OpenCL library.
///
/// Resolves extension functions with the strategy chosen at construction,
/// falling back to a plain symbol lookup in the library for vendor functions
/// that are exported as ordinary symbols.
pub struct IcdFunctionProvider {
    library: Box<dyn FunctionProvider>,
    get_extension_function_address: Option<sys::clGetExtensionFunctionAddress_fn>,
    get_extension_function_address_for_platform:
        Option<sys::clGetExtensionFunctionAddressForPlatform_fn>,
    strategy: ResolutionStrategy,
    released: bool,
}

impl IcdFunctionProvider {
    /// Inspect `library` and pick the resolution strategy.
    ///
    /// On failure the library is released before the error is returned.
    pub fn new(mut library: Box<dyn FunctionProvider>) -> Result<Self> {
        let generic = library.function_address(GET_EXTENSION_FUNCTION_ADDRESS);
        let per_platform = library.function_address(GET_EXTENSION_FUNCTION_ADDRESS_FOR_PLATFORM);

        let strategy = match select_strategy(&*library, generic, per_platform) {
            Ok(strategy) => strategy,
            Err(e) => {
                library.release();
                return Err(e);
            }
        };

        log_emit(
            LogLevel::Debug,
            &format!("[CL] Extension functions resolved with {:?}", strategy),
        );

        // Safety: both addresses were resolved for the names of these types
        Ok(Self {
            library,
            get_extension_function_address: unsafe { generic.cast() },
            get_extension_function_address_for_platform: unsafe { per_platform.cast() },
            strategy,
            released: false,
        })
    }

    pub fn strategy(&self) -> ResolutionStrategy {
        self.strategy
    }

    fn lookup_extension(&self, name: &CString) -> FunctionAddress {
        let address = match self.strategy {
            ResolutionStrategy::Generic => self
                .get_extension_function_address
                .map(|f| unsafe { f(name.as_ptr()) }),
            ResolutionStrategy::PerPlatform(platform) => self
                .get_extension_function_address_for_platform
                .map(|f| unsafe { f(platform.as_raw(), name.as_ptr()) }),
        };
        address.map(FunctionAddress::from).unwrap_or(FunctionAddress::NULL)
    }
}

/// Decide the strategy from the two lookup entry points.
fn select_strategy(
    library: &dyn FunctionProvider,
    generic: FunctionAddress,
    per_platform: FunctionAddress,
) -> Result<ResolutionStrategy> {
    if generic.is_null() && per_platform.is_null() {
        return Err(Error::MissingCoreFunction(GET_EXTENSION_FUNCTION_ADDRESS));
    }

    let mut selected = None;
    if !per_platform.is_null() {
        let get_platform_ids = require(library, "clGetPlatformIDs")?;

        match platform::platform_count(get_platform_ids) {
            1 => {
                if let Some(&id) = platform::platform_ids(get_platform_ids).first() {
                    if supports_opencl12(library, id)? {
                        selected = Some(id);
                    }
                }
            }
            // Zero or several platforms and nothing to fall back to
            count if generic.is_null() => {
                return Err(Error::AmbiguousPlatformResolution { platforms: count });
            }
            _ => {}
        }
    }

    match selected {
        Some(id) => Ok(ResolutionStrategy::PerPlatform(id)),
        None if generic.is_null() => Err(Error::MissingCoreFunction(GET_EXTENSION_FUNCTION_ADDRESS)),
        None => Ok(ResolutionStrategy::Generic),
    }
}

/// True if `platform` reports OpenCL 1.2 or later.
///
/// A missing `clGetPlatformInfo` or a failed query means "no"; a version
/// string that does not parse is an error.
fn supports_opencl12(library: &dyn FunctionProvider, platform: PlatformId) -> Result<bool> {
    let get_platform_info = library.function_address("clGetPlatformInfo");
    let Some(version) = platform::platform_info_string(get_platform_info, platform, PlatformInfo::Version)
    else {
        return Ok(false);
    };

    Ok(parse_version(&version, "OpenCL")?.at_least(1, 2))
}

impl FunctionProvider for IcdFunctionProvider {
    fn function_address(&self, name: &str) -> FunctionAddress {
        if self.released {
            return FunctionAddress::NULL;
        }
        let Ok(c_name) = CString::new(name) else {
            return FunctionAddress::NULL;
        };

        let address = self.lookup_extension(&c_name);
        if address.is_null() {
            self.library.function_address(name)
        } else {
            address
        }
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.library.release();
        }
    }
}

impl FunctionProviderLocal for IcdFunctionProvider {
    fn function_address_for(&self, platform: PlatformId, name: &str) -> FunctionAddress {
        if self.released {
            return FunctionAddress::NULL;
        }
        let Ok(c_name) = CString::new(name) else {
            return FunctionAddress::NULL;
        };

        self.get_extension_function_address_for_platform
            .map(|f| FunctionAddress::from(unsafe { f(platform.as_raw(), c_name.as_ptr()) }))
            .unwrap_or(FunctionAddress::NULL)
    }
}

impl Drop for IcdFunctionProvider {
    fn drop(&mut self) {
        self.release();
    }
}
