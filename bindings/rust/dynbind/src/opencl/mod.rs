//! OpenCL bindings
//!
//! Loading goes through the ICD loader (`OpenCL.dll`, `libOpenCL.so`, the
//! macOS framework). [`Cl`] owns the session; [`ClSession`] resolves
//! functions and reports what the library and each platform support.

pub mod capabilities;
pub mod icd;
pub mod platform;
pub mod session;
pub mod version;

pub use capabilities::{check_extension, ClCapabilities, FunctionTable};
pub use icd::{IcdFunctionProvider, ResolutionStrategy};
pub use platform::{PlatformId, PlatformInfo};
pub use session::{Cl, ClSession};
pub use version::{
    add_cl_versions, parse_version, tokenize_extensions, ApiVersion, CapabilitySet,
    GL_SHARING_EXTENSIONS,
};
