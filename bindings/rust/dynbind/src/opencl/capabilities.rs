//! OpenCL function tables and the capabilities that gate them

use std::collections::HashMap;

use crate::address::FunctionAddress;
use crate::error::{Error, Result};
use crate::log::{log_emit, LogLevel};
use crate::provider::{FunctionProvider, FunctionProviderLocal};

use super::platform::{self, PlatformId, PlatformInfo};
use super::version::{parse_version, ApiVersion, CapabilitySet};

pub const OPENCL10: &str = "OpenCL10";
pub const OPENCL11: &str = "OpenCL11";
pub const OPENCL12: &str = "OpenCL12";
pub const OPENCL20: &str = "OpenCL20";
pub const OPENCL10GL: &str = "OpenCL10GL";
pub const OPENCL12GL: &str = "OpenCL12GL";
pub const KHR_GL_SHARING: &str = "cl_khr_gl_sharing";

const CL10_FUNCTIONS: &[&str] = &[
    "clGetPlatformIDs",
    "clGetPlatformInfo",
    "clGetDeviceIDs",
    "clGetDeviceInfo",
    "clCreateContext",
    "clReleaseContext",
    "clCreateCommandQueue",
    "clReleaseCommandQueue",
    "clCreateBuffer",
    "clReleaseMemObject",
    "clEnqueueReadBuffer",
    "clEnqueueWriteBuffer",
    "clCreateProgramWithSource",
    "clBuildProgram",
    "clReleaseProgram",
    "clCreateKernel",
    "clSetKernelArg",
    "clReleaseKernel",
    "clEnqueueNDRangeKernel",
    "clFinish",
];

const CL11_FUNCTIONS: &[&str] = &[
    "clCreateSubBuffer",
    "clSetMemObjectDestructorCallback",
    "clCreateUserEvent",
    "clSetUserEventStatus",
    "clSetEventCallback",
    "clEnqueueReadBufferRect",
    "clEnqueueWriteBufferRect",
    "clEnqueueCopyBufferRect",
];

const CL12_FUNCTIONS: &[&str] = &[
    "clGetExtensionFunctionAddressForPlatform",
    "clCreateSubDevices",
    "clRetainDevice",
    "clReleaseDevice",
    "clCreateImage",
    "clCompileProgram",
    "clLinkProgram",
    "clUnloadPlatformCompiler",
    "clGetKernelArgInfo",
    "clEnqueueFillBuffer",
    "clEnqueueMarkerWithWaitList",
    "clEnqueueBarrierWithWaitList",
];

const CL20_FUNCTIONS: &[&str] = &[
    "clCreateCommandQueueWithProperties",
    "clCreatePipe",
    "clGetPipeInfo",
    "clSVMAlloc",
    "clSVMFree",
    "clEnqueueSVMFree",
    "clEnqueueSVMMap",
    "clEnqueueSVMUnmap",
    "clSetKernelArgSVMPointer",
    "clCreateSamplerWithProperties",
];

const CL10GL_FUNCTIONS: &[&str] = &[
    "clCreateFromGLBuffer",
    "clCreateFromGLTexture2D",
    "clCreateFromGLTexture3D",
    "clCreateFromGLRenderbuffer",
    "clGetGLObjectInfo",
    "clGetGLTextureInfo",
    "clEnqueueAcquireGLObjects",
    "clEnqueueReleaseGLObjects",
];

const CL12GL_FUNCTIONS: &[&str] = &["clCreateFromGLTexture"];

const KHR_GL_SHARING_FUNCTIONS: &[&str] = &["clGetGLContextInfoKHR"];

/// Every known table: capability tag and the functions it requires.
pub(crate) const TABLES: &[(&str, &[&str])] = &[
    (OPENCL10, CL10_FUNCTIONS),
    (OPENCL11, CL11_FUNCTIONS),
    (OPENCL12, CL12_FUNCTIONS),
    (OPENCL20, CL20_FUNCTIONS),
    (OPENCL10GL, CL10GL_FUNCTIONS),
    (OPENCL12GL, CL12GL_FUNCTIONS),
    (KHR_GL_SHARING, KHR_GL_SHARING_FUNCTIONS),
];

/// Resolved addresses for one capability.
///
/// Only exists if every function of the capability resolved.
#[derive(Debug, Clone)]
pub struct FunctionTable {
    name: &'static str,
    functions: Vec<(&'static str, FunctionAddress)>,
}

impl FunctionTable {
    /// Resolve all `functions`, or report the first one that is missing.
    pub fn resolve<F>(
        name: &'static str,
        functions: &[&'static str],
        lookup: F,
    ) -> std::result::Result<Self, &'static str>
    where
        F: Fn(&str) -> FunctionAddress,
    {
        let functions = functions
            .iter()
            .map(|&function| match lookup(function).non_null() {
                Some(address) => Ok((function, address)),
                None => Err(function),
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { name, functions })
    }

    /// Capability tag of this table
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Address of `function`, or null if it is not part of this table
    pub fn get(&self, function: &str) -> FunctionAddress {
        self.functions
            .iter()
            .find(|(name, _)| *name == function)
            .map(|&(_, address)| address)
            .unwrap_or(FunctionAddress::NULL)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, FunctionAddress)> + '_ {
        self.functions.iter().copied()
    }
}

/// Return `functions` if `extension` is advertised in `ext`.
///
/// An advertised extension without its entry points logs one warning and
/// yields `None`: the driver is inconsistent, but that is not fatal.
pub fn check_extension<T>(
    ext: &CapabilitySet,
    extension: &str,
    functions: std::result::Result<T, &'static str>,
) -> Option<T> {
    if !ext.contains(extension) {
        return None;
    }
    match functions {
        Ok(functions) => Some(functions),
        Err(missing) => {
            log_emit(
                LogLevel::Warning,
                &format!(
                    "[CL] {} was reported as available but an entry point is missing ({}).",
                    extension, missing
                ),
            );
            None
        }
    }
}

/// What an OpenCL library or platform can do.
#[derive(Debug, Clone)]
pub struct ClCapabilities {
    version: Option<ApiVersion>,
    extensions: CapabilitySet,
    tables: HashMap<&'static str, FunctionTable>,
}

impl ClCapabilities {
    /// Capabilities of the library itself, before any platform is chosen.
    ///
    /// Every table is resolved without gating; the capability set holds the
    /// tags of the tables that resolved. Without the OpenCL 1.0 functions the
    /// library is unusable.
    pub fn for_icd<P>(provider: &P) -> Result<Self>
    where
        P: FunctionProvider + ?Sized,
    {
        let mut tables = HashMap::new();
        let mut extensions = CapabilitySet::new();
        for &(tag, functions) in TABLES {
            match FunctionTable::resolve(tag, functions, |name| provider.function_address(name)) {
                Ok(table) => {
                    extensions.insert(tag);
                    tables.insert(tag, table);
                }
                Err(missing) if tag == OPENCL10 => return Err(Error::MissingCoreFunction(missing)),
                Err(_) => {}
            }
        }

        Ok(Self {
            version: None,
            extensions,
            tables,
        })
    }

    /// Capabilities of one platform, gated by its version and extensions.
    pub fn for_platform<P>(provider: &P, platform: PlatformId) -> Result<Self>
    where
        P: FunctionProviderLocal + ?Sized,
    {
        let get_platform_info = provider.function_address("clGetPlatformInfo");
        if get_platform_info.is_null() {
            return Err(Error::MissingCoreFunction("clGetPlatformInfo"));
        }

        let version_string =
            platform::platform_info_string(get_platform_info, platform, PlatformInfo::Version)
                .ok_or(Error::PlatformQuery {
                    param: "CL_PLATFORM_VERSION",
                })?;
        let version = parse_version(&version_string, "OpenCL")?;
        let extension_string =
            platform::platform_info_string(get_platform_info, platform, PlatformInfo::Extensions)
                .unwrap_or_default();

        let extensions = CapabilitySet::build(&version, &extension_string);

        let lookup = |name: &str| {
            let address = provider.function_address_for(platform, name);
            if address.is_null() {
                provider.function_address(name)
            } else {
                address
            }
        };

        let mut tables = HashMap::new();
        for &(tag, functions) in TABLES {
            let resolved = FunctionTable::resolve(tag, functions, lookup);
            if let Some(table) = check_extension(&extensions, tag, resolved) {
                tables.insert(tag, table);
            }
        }

        Ok(Self {
            version: Some(version),
            extensions,
            tables,
        })
    }

    /// Platform version; `None` for library-level capabilities
    pub fn version(&self) -> Option<&ApiVersion> {
        self.version.as_ref()
    }

    /// Capability tags and extension names
    pub fn extensions(&self) -> &CapabilitySet {
        &self.extensions
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.extensions.contains(tag)
    }

    /// Function table for a capability tag, if it is supported and complete
    pub fn table(&self, tag: &str) -> Option<&FunctionTable> {
        self.tables.get(tag)
    }

    pub fn cl10(&self) -> Option<&FunctionTable> {
        self.table(OPENCL10)
    }

    pub fn cl11(&self) -> Option<&FunctionTable> {
        self.table(OPENCL11)
    }

    pub fn cl12(&self) -> Option<&FunctionTable> {
        self.table(OPENCL12)
    }

    pub fn cl20(&self) -> Option<&FunctionTable> {
        self.table(OPENCL20)
    }

    pub fn cl10_gl(&self) -> Option<&FunctionTable> {
        self.table(OPENCL10GL)
    }

    pub fn cl12_gl(&self) -> Option<&FunctionTable> {
        self.table(OPENCL12GL)
    }

    pub fn khr_gl_sharing(&self) -> Option<&FunctionTable> {
        self.table(KHR_GL_SHARING)
    }
}
