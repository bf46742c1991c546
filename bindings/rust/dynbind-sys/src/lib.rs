// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 dynbind Contributors


//! Raw FFI types for dynbind
//!
//! This crate provides the unsafe, low-level C types, constants and
//! function-pointer signatures for the native entry points dynbind resolves
//! at runtime. Nothing here is linked: every function is looked up by name in
//! a dynamically loaded library and cast to one of the `*_fn` aliases below.
//! For a safe, idiomatic Rust API, use the `dynbind` crate instead.
//!
//! # Safety
//!
//! All function types in this crate are unsafe and follow the native calling
//! conventions (`extern "system"` for OpenCL, `extern "C"` for OpenAL and
//! LibOVR). The caller is responsible for:
//! - Only invoking an address that was resolved for the matching name
//! - Ensuring pointers are valid and properly aligned
//! - Keeping the owning library loaded for as long as the address is used
//!
//! # Example
//!
//! ```no_run
//! use dynbind_sys::*;
//!
//! # fn resolve(_: &str) -> usize { 0 }
//! let address = resolve("clGetPlatformIDs");
//! if address != 0 {
//!     let get_platform_ids: clGetPlatformIDs_fn = unsafe { std::mem::transmute(address) };
//!     let mut count: cl_uint = 0;
//!     unsafe { get_platform_ids(0, std::ptr::null_mut(), &mut count) };
//! }
//! ```

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

use std::ffi::{c_char, c_int, c_void};

// =========================================================================
// OpenCL
// =========================================================================

pub type cl_int = i32;
pub type cl_uint = u32;
pub type cl_platform_info = cl_uint;

#[repr(C)]
pub struct _cl_platform_id {
    _private: [u8; 0],
}

pub type cl_platform_id = *mut _cl_platform_id;

pub const CL_SUCCESS: cl_int = 0;
pub const CL_INVALID_VALUE: cl_int = -30;
pub const CL_PLATFORM_NOT_FOUND_KHR: cl_int = -1001;

pub const CL_PLATFORM_PROFILE: cl_platform_info = 0x0900;
pub const CL_PLATFORM_VERSION: cl_platform_info = 0x0901;
pub const CL_PLATFORM_NAME: cl_platform_info = 0x0902;
pub const CL_PLATFORM_VENDOR: cl_platform_info = 0x0903;
pub const CL_PLATFORM_EXTENSIONS: cl_platform_info = 0x0904;

pub type clGetPlatformIDs_fn = unsafe extern "system" fn(
    num_entries: cl_uint,
    platforms: *mut cl_platform_id,
    num_platforms: *mut cl_uint,
) -> cl_int;

pub type clGetPlatformInfo_fn = unsafe extern "system" fn(
    platform: cl_platform_id,
    param_name: cl_platform_info,
    param_value_size: usize,
    param_value: *mut c_void,
    param_value_size_ret: *mut usize,
) -> cl_int;

/// Deprecated in OpenCL 1.1 but still the only lookup that works through
/// every ICD loader.
pub type clGetExtensionFunctionAddress_fn =
    unsafe extern "system" fn(func_name: *const c_char) -> *mut c_void;

/// OpenCL 1.2+
pub type clGetExtensionFunctionAddressForPlatform_fn =
    unsafe extern "system" fn(platform: cl_platform_id, func_name: *const c_char) -> *mut c_void;

// =========================================================================
// OpenAL
// =========================================================================

pub type ALenum = c_int;
pub type ALchar = c_char;
pub type ALCenum = c_int;
pub type ALCchar = c_char;

#[repr(C)]
pub struct ALCdevice {
    _private: [u8; 0],
}

pub const AL_NO_ERROR: ALenum = 0;
pub const AL_INVALID_NAME: ALenum = 0xA001;
pub const AL_INVALID_ENUM: ALenum = 0xA002;
pub const AL_INVALID_VALUE: ALenum = 0xA003;
pub const AL_INVALID_OPERATION: ALenum = 0xA004;
pub const AL_OUT_OF_MEMORY: ALenum = 0xA005;

pub const ALC_NO_ERROR: ALCenum = 0;
pub const ALC_INVALID_DEVICE: ALCenum = 0xA001;
pub const ALC_INVALID_CONTEXT: ALCenum = 0xA002;
pub const ALC_INVALID_ENUM: ALCenum = 0xA003;
pub const ALC_INVALID_VALUE: ALCenum = 0xA004;
pub const ALC_OUT_OF_MEMORY: ALCenum = 0xA005;

pub type alGetError_fn = unsafe extern "C" fn() -> ALenum;
pub type alGetString_fn = unsafe extern "C" fn(param: ALenum) -> *const ALchar;
pub type alcGetError_fn = unsafe extern "C" fn(device: *mut ALCdevice) -> ALCenum;
pub type alcGetString_fn =
    unsafe extern "C" fn(device: *mut ALCdevice, param: ALCenum) -> *const ALCchar;

// =========================================================================
// LibOVR (0.7 runtime)
// =========================================================================

pub type ovrResult = i32;

pub const ovrSuccess: ovrResult = 0;

pub const OVR_PRODUCT_VERSION: u32 = 0;
pub const OVR_MAJOR_VERSION: u32 = 7;
pub const OVR_MINOR_VERSION: u32 = 0;
pub const OVR_PATCH_VERSION: u32 = 0;
pub const OVR_BUILD_NUMBER: u32 = 0;

pub const ovrInit_Debug: u32 = 0x0000_0001;
pub const ovrInit_ServerOptional: u32 = 0x0000_0002;
pub const ovrInit_RequestVersion: u32 = 0x0000_0004;
pub const ovrInit_ForceNoDebug: u32 = 0x0000_0008;

pub const ovrLogLevel_Debug: c_int = 0;
pub const ovrLogLevel_Info: c_int = 1;
pub const ovrLogLevel_Error: c_int = 2;

pub type ovrLogCallback =
    Option<unsafe extern "C" fn(user_data: usize, level: c_int, message: *const c_char)>;

#[repr(C, align(8))]
#[derive(Debug, Clone, Copy, Default)]
pub struct ovrInitParams {
    pub Flags: u32,
    pub RequestedMinorVersion: u32,
    pub LogCallback: ovrLogCallback,
    pub UserData: usize,
    pub ConnectionTimeoutMS: u32,
}

pub type ovr_Initialize_fn = unsafe extern "C" fn(params: *const ovrInitParams) -> ovrResult;
pub type ovr_GetVersionString_fn = unsafe extern "C" fn() -> *const c_char;
pub type ovr_Shutdown_fn = unsafe extern "C" fn();
