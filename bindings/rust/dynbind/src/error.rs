//! Error types for dynbind

use thiserror::Error;

/// Error type for dynbind operations
#[derive(Debug, Error)]
pub enum Error {
    /// None of the candidate names for a shared library could be opened
    #[error("Failed to load native library '{name}': {source}")]
    LibraryLoad {
        name: String,
        #[source]
        source: libloading::Error,
    },

    /// A native entry point the binding cannot work without is absent
    #[error("A core function is missing: {0}. Make sure that the native library is available.")]
    MissingCoreFunction(&'static str),

    /// No single OpenCL platform to resolve through and the ICD offers no generic lookup
    #[error("Cannot pick a platform for extension lookup: {platforms} platforms and no clGetExtensionFunctionAddress")]
    AmbiguousPlatformResolution { platforms: u32 },

    /// A native version string did not have the expected shape
    #[error("Malformed API version string [{input}]")]
    VersionParse { input: String },

    /// A binding session is already active
    #[error("OpenCL has already been created")]
    AlreadyInitialized,

    /// No binding session is active and explicit initialization is required
    #[error("OpenCL has not been created")]
    NotInitialized,

    /// `alGetError` reported a failure
    #[error("OpenAL error {code:#06x}: {message}")]
    OpenAl { code: i32, message: String },

    /// `alcGetError` reported a failure
    #[error("OpenAL context error {code:#06x}: {message}")]
    OpenAlc { code: i32, message: String },

    /// A LibOVR call returned a failure `ovrResult`
    #[error("LibOVR call failed with result {code}")]
    Ovr { code: i32 },

    /// A `clGetPlatformInfo` query returned an error or no value
    #[error("clGetPlatformInfo failed to report {param}")]
    PlatformQuery { param: &'static str },

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),
}

/// Result type alias for dynbind operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn version_parse(input: &str) -> Self {
        Error::VersionParse {
            input: input.to_string(),
        }
    }

    /// True for failures that leave the native library unusable.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::LibraryLoad { .. }
                | Error::MissingCoreFunction(_)
                | Error::AmbiguousPlatformResolution { .. }
                | Error::VersionParse { .. }
        )
    }
}
