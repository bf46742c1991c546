//! Platform enumeration and platform info queries

use std::ffi::c_void;
use std::ptr;

use dynbind_sys as sys;

use crate::address::FunctionAddress;

/// Opaque handle for one OpenCL platform (`cl_platform_id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlatformId(usize);

impl PlatformId {
    /// "No platform selected"
    pub const NULL: PlatformId = PlatformId(0);

    pub fn from_raw(raw: sys::cl_platform_id) -> Self {
        Self(raw as usize)
    }

    pub fn as_raw(self) -> sys::cl_platform_id {
        self.0 as sys::cl_platform_id
    }

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// String-valued `clGetPlatformInfo` parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformInfo {
    Profile,
    Version,
    Name,
    Vendor,
    Extensions,
}

impl PlatformInfo {
    fn to_c(self) -> sys::cl_platform_info {
        match self {
            PlatformInfo::Profile => sys::CL_PLATFORM_PROFILE,
            PlatformInfo::Version => sys::CL_PLATFORM_VERSION,
            PlatformInfo::Name => sys::CL_PLATFORM_NAME,
            PlatformInfo::Vendor => sys::CL_PLATFORM_VENDOR,
            PlatformInfo::Extensions => sys::CL_PLATFORM_EXTENSIONS,
        }
    }
}

/// Number of platforms reported by `clGetPlatformIDs`.
///
/// An error return (including `CL_PLATFORM_NOT_FOUND_KHR` from an ICD loader
/// with no vendors installed) counts as zero platforms.
pub fn platform_count(get_platform_ids: FunctionAddress) -> u32 {
    // Safety: the address was resolved for clGetPlatformIDs
    let Some(get_platform_ids) = (unsafe { get_platform_ids.cast::<sys::clGetPlatformIDs_fn>() })
    else {
        return 0;
    };

    let mut count: sys::cl_uint = 0;
    let errcode = unsafe { get_platform_ids(0, ptr::null_mut(), &mut count) };
    if errcode == sys::CL_SUCCESS {
        count
    } else {
        0
    }
}

/// All platform ids reported by `clGetPlatformIDs`.
pub fn platform_ids(get_platform_ids: FunctionAddress) -> Vec<PlatformId> {
    let count = platform_count(get_platform_ids);
    if count == 0 {
        return Vec::new();
    }
    let Some(get_platform_ids) = (unsafe { get_platform_ids.cast::<sys::clGetPlatformIDs_fn>() })
    else {
        return Vec::new();
    };

    let mut ids: Vec<sys::cl_platform_id> = vec![ptr::null_mut(); count as usize];
    let mut returned: sys::cl_uint = 0;
    let errcode = unsafe { get_platform_ids(count, ids.as_mut_ptr(), &mut returned) };
    if errcode != sys::CL_SUCCESS {
        return Vec::new();
    }
    ids.truncate(returned.min(count) as usize);
    ids.into_iter().map(PlatformId::from_raw).collect()
}

/// Query a string parameter with the size-then-data protocol.
///
/// `None` when the function is absent or either call fails.
pub fn platform_info_string(
    get_platform_info: FunctionAddress,
    platform: PlatformId,
    param: PlatformInfo,
) -> Option<String> {
    // Safety: the address was resolved for clGetPlatformInfo
    let get_platform_info = unsafe { get_platform_info.cast::<sys::clGetPlatformInfo_fn>() }?;

    let mut size: usize = 0;
    let errcode = unsafe {
        get_platform_info(platform.as_raw(), param.to_c(), 0, ptr::null_mut(), &mut size)
    };
    if errcode != sys::CL_SUCCESS {
        return None;
    }
    if size == 0 {
        return Some(String::new());
    }

    let mut buffer = vec![0u8; size];
    let errcode = unsafe {
        get_platform_info(
            platform.as_raw(),
            param.to_c(),
            size,
            buffer.as_mut_ptr() as *mut c_void,
            ptr::null_mut(),
        )
    };
    if errcode != sys::CL_SUCCESS {
        return None;
    }

    // Drop the terminator and anything after it
    let end = buffer.iter().position(|&b| b == 0).unwrap_or(buffer.len());
    Some(String::from_utf8_lossy(&buffer[..end]).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeIcd;
    use crate::FunctionProvider;

    #[test]
    fn test_null_platform() {
        assert!(PlatformId::NULL.is_null());
        assert!(PlatformId::from_raw(ptr::null_mut()).is_null());
        assert!(!PlatformId(0x1000).is_null());
    }

    #[test]
    fn test_platform_count_and_ids() {
        let library = FakeIcd::new().platforms(3).build();
        let get_ids = library.function_address("clGetPlatformIDs");

        assert_eq!(platform_count(get_ids), 3);
        let ids = platform_ids(get_ids);
        assert_eq!(ids.len(), 3);
        assert!(ids.iter().all(|id| !id.is_null()));
    }

    #[test]
    fn test_no_platforms() {
        let library = FakeIcd::new().platforms(0).build();
        let get_ids = library.function_address("clGetPlatformIDs");
        assert_eq!(platform_count(get_ids), 0);
        assert!(platform_ids(get_ids).is_empty());
    }

    #[test]
    fn test_missing_function_is_zero() {
        assert_eq!(platform_count(FunctionAddress::NULL), 0);
        assert_eq!(
            platform_info_string(FunctionAddress::NULL, PlatformId::NULL, PlatformInfo::Version),
            None
        );
    }

    #[test]
    fn test_platform_info_strings() {
        let library = FakeIcd::new()
            .version("OpenCL 1.2 Fake")
            .extensions("cl_khr_icd cl_khr_gl_sharing")
            .build();
        let get_ids = library.function_address("clGetPlatformIDs");
        let get_info = library.function_address("clGetPlatformInfo");
        let platform = platform_ids(get_ids)[0];

        assert_eq!(
            platform_info_string(get_info, platform, PlatformInfo::Version).as_deref(),
            Some("OpenCL 1.2 Fake")
        );
        assert_eq!(
            platform_info_string(get_info, platform, PlatformInfo::Extensions).as_deref(),
            Some("cl_khr_icd cl_khr_gl_sharing")
        );
        assert_eq!(
            platform_info_string(get_info, platform, PlatformInfo::Profile).as_deref(),
            Some("FULL_PROFILE")
        );
    }

    #[test]
    fn test_platform_info_failure() {
        let library = FakeIcd::new().version_query_fails().build();
        let get_ids = library.function_address("clGetPlatformIDs");
        let get_info = library.function_address("clGetPlatformInfo");
        let platform = platform_ids(get_ids)[0];

        assert_eq!(platform_info_string(get_info, platform, PlatformInfo::Version), None);
    }
}
