//! In-process fake of an OpenCL ICD loader for unit tests.
//!
//! [`FakeIcd`] builds a [`FakeLibrary`] whose symbols are real
//! `extern "system"` functions defined below, so the resolver and the
//! marshalling casts run exactly as they would against a driver. The
//! functions read their behaviour from thread-local state; every test runs on
//! its own thread, so tests cannot observe each other's configuration.

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::{c_char, c_void, CStr};
use std::ptr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dynbind_sys as sys;

use crate::address::FunctionAddress;
use crate::opencl::capabilities::TABLES;
use crate::opencl::PlatformId;
use crate::provider::FunctionProvider;

/// Only resolvable through `clGetExtensionFunctionAddress`
pub(crate) const FAKE_EXTENSION: &str = "clFakeExtensionKHR";
/// Only resolvable through `clGetExtensionFunctionAddressForPlatform`
pub(crate) const FAKE_PLATFORM_EXTENSION: &str = "clFakePlatformExtensionKHR";

const PLATFORM_BASE: usize = 0x1000;

type EntryPoint = extern "system" fn();

#[derive(Clone)]
struct FakeState {
    platforms: u32,
    version: Option<String>,
    extensions: String,
}

thread_local! {
    static STATE: RefCell<FakeState> = RefCell::new(FakeState {
        platforms: 1,
        version: Some("OpenCL 1.2 Fake".to_string()),
        extensions: String::new(),
    });
}

unsafe extern "system" fn fake_get_platform_ids(
    num_entries: sys::cl_uint,
    platforms: *mut sys::cl_platform_id,
    num_platforms: *mut sys::cl_uint,
) -> sys::cl_int {
    let count = STATE.with(|s| s.borrow().platforms);
    if !num_platforms.is_null() {
        *num_platforms = count;
    }
    if count == 0 {
        return sys::CL_PLATFORM_NOT_FOUND_KHR;
    }
    if !platforms.is_null() {
        for i in 0..num_entries.min(count) {
            *platforms.add(i as usize) = FakeIcd::platform(i).as_raw();
        }
    }
    sys::CL_SUCCESS
}

unsafe extern "system" fn fake_get_platform_info(
    _platform: sys::cl_platform_id,
    param_name: sys::cl_platform_info,
    param_value_size: usize,
    param_value: *mut c_void,
    param_value_size_ret: *mut usize,
) -> sys::cl_int {
    let state = STATE.with(|s| s.borrow().clone());
    let value = match param_name {
        sys::CL_PLATFORM_VERSION => match state.version {
            Some(version) => version,
            None => return sys::CL_INVALID_VALUE,
        },
        sys::CL_PLATFORM_EXTENSIONS => state.extensions,
        sys::CL_PLATFORM_PROFILE => "FULL_PROFILE".to_string(),
        sys::CL_PLATFORM_NAME => "Fake Platform".to_string(),
        sys::CL_PLATFORM_VENDOR => "dynbind".to_string(),
        _ => return sys::CL_INVALID_VALUE,
    };

    let mut bytes = value.into_bytes();
    bytes.push(0);
    if !param_value_size_ret.is_null() {
        *param_value_size_ret = bytes.len();
    }
    if !param_value.is_null() {
        if param_value_size < bytes.len() {
            return sys::CL_INVALID_VALUE;
        }
        ptr::copy_nonoverlapping(bytes.as_ptr(), param_value as *mut u8, bytes.len());
    }
    sys::CL_SUCCESS
}

unsafe extern "system" fn fake_get_extension_function_address(name: *const c_char) -> *mut c_void {
    if CStr::from_ptr(name).to_bytes() == FAKE_EXTENSION.as_bytes() {
        fake_extension as EntryPoint as *mut c_void
    } else {
        ptr::null_mut()
    }
}

unsafe extern "system" fn fake_get_extension_function_address_for_platform(
    platform: sys::cl_platform_id,
    name: *const c_char,
) -> *mut c_void {
    if platform.is_null() {
        return ptr::null_mut();
    }
    let name = CStr::from_ptr(name).to_bytes();
    if name == FAKE_PLATFORM_EXTENSION.as_bytes() || name == b"clGetGLContextInfoKHR" {
        fake_platform_extension as EntryPoint as *mut c_void
    } else {
        ptr::null_mut()
    }
}

extern "system" fn fake_extension() {}

extern "system" fn fake_platform_extension() {}

/// Stand-in address for every exported table function
extern "system" fn fake_entry_point() {}

/// Builder for a fake OpenCL library.
pub(crate) struct FakeIcd {
    state: FakeState,
    missing: Vec<&'static str>,
}

impl FakeIcd {
    /// One OpenCL 1.2 platform with both lookup entry points and every
    /// function of every table exported.
    pub(crate) fn new() -> Self {
        Self {
            state: FakeState {
                platforms: 1,
                version: Some("OpenCL 1.2 Fake".to_string()),
                extensions: String::new(),
            },
            missing: Vec::new(),
        }
    }

    pub(crate) fn platforms(mut self, count: u32) -> Self {
        self.state.platforms = count;
        self
    }

    pub(crate) fn version(mut self, version: &str) -> Self {
        self.state.version = Some(version.to_string());
        self
    }

    pub(crate) fn version_query_fails(mut self) -> Self {
        self.state.version = None;
        self
    }

    pub(crate) fn extensions(mut self, extensions: &str) -> Self {
        self.state.extensions = extensions.to_string();
        self
    }

    /// Do not export `name`
    pub(crate) fn without(mut self, name: &'static str) -> Self {
        self.missing.push(name);
        self
    }

    pub(crate) fn without_generic_lookup(self) -> Self {
        self.without("clGetExtensionFunctionAddress")
    }

    pub(crate) fn without_platform_lookup(self) -> Self {
        self.without("clGetExtensionFunctionAddressForPlatform")
    }

    /// Install the configuration on this thread and build the library.
    pub(crate) fn build(self) -> FakeLibrary {
        STATE.with(|s| *s.borrow_mut() = self.state.clone());

        let mut symbols: HashMap<&'static str, FunctionAddress> = HashMap::new();
        for (_, functions) in TABLES {
            for &function in functions.iter() {
                symbols.insert(function, FunctionAddress::new(fake_entry_point as EntryPoint as usize));
            }
        }
        // clGetGLContextInfoKHR is an extension: only visible per platform
        symbols.remove("clGetGLContextInfoKHR");

        symbols.insert(
            "clGetPlatformIDs",
            FunctionAddress::new(fake_get_platform_ids as sys::clGetPlatformIDs_fn as usize),
        );
        symbols.insert(
            "clGetPlatformInfo",
            FunctionAddress::new(fake_get_platform_info as sys::clGetPlatformInfo_fn as usize),
        );
        symbols.insert(
            "clGetExtensionFunctionAddress",
            FunctionAddress::new(
                fake_get_extension_function_address as sys::clGetExtensionFunctionAddress_fn as usize,
            ),
        );
        symbols.insert(
            "clGetExtensionFunctionAddressForPlatform",
            FunctionAddress::new(
                fake_get_extension_function_address_for_platform
                    as sys::clGetExtensionFunctionAddressForPlatform_fn
                    as usize,
            ),
        );

        for name in &self.missing {
            symbols.remove(name);
        }

        FakeLibrary {
            symbols,
            releases: ReleaseCounter::default(),
        }
    }

    pub(crate) fn platform(index: u32) -> PlatformId {
        PlatformId::from_raw((PLATFORM_BASE + index as usize) as sys::cl_platform_id)
    }

    pub(crate) fn extension_address() -> FunctionAddress {
        FunctionAddress::new(fake_extension as EntryPoint as usize)
    }

    pub(crate) fn platform_extension_address() -> FunctionAddress {
        FunctionAddress::new(fake_platform_extension as EntryPoint as usize)
    }
}

/// Counts `release()` calls on a [`FakeLibrary`].
#[derive(Clone, Default)]
pub(crate) struct ReleaseCounter(Arc<AtomicUsize>);

impl ReleaseCounter {
    pub(crate) fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// A "loaded library" backed by a symbol map.
pub(crate) struct FakeLibrary {
    symbols: HashMap<&'static str, FunctionAddress>,
    releases: ReleaseCounter,
}

impl FakeLibrary {
    /// A library exporting exactly `symbols`
    pub(crate) fn with_symbols(symbols: &[(&'static str, FunctionAddress)]) -> Self {
        Self {
            symbols: symbols.iter().copied().collect(),
            releases: ReleaseCounter::default(),
        }
    }

    pub(crate) fn release_counter(&self) -> ReleaseCounter {
        self.releases.clone()
    }
}

impl FunctionProvider for FakeLibrary {
    fn function_address(&self, name: &str) -> FunctionAddress {
        self.symbols.get(name).copied().unwrap_or(FunctionAddress::NULL)
    }

    fn release(&mut self) {
        self.releases.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    #[test]
    fn test_exported_entry_points_are_callable() {
        let library = FakeIcd::new().platforms(3).build();

        let get_platform_ids = unsafe {
            library
                .function_address("clGetPlatformIDs")
                .cast::<sys::clGetPlatformIDs_fn>()
                .unwrap()
        };
        let mut count = 0;
        let ret = unsafe { get_platform_ids(0, ptr::null_mut(), &mut count) };
        assert_eq!(ret, sys::CL_SUCCESS);
        assert_eq!(count, 3);

        let lookup = unsafe {
            library
                .function_address("clGetExtensionFunctionAddress")
                .cast::<sys::clGetExtensionFunctionAddress_fn>()
                .unwrap()
        };
        let name = CString::new(FAKE_EXTENSION).unwrap();
        let address = FunctionAddress::from(unsafe { lookup(name.as_ptr()) });
        assert_eq!(address, FakeIcd::extension_address());
    }
}
