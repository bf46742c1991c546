//! Binding configuration options

/// Overrides the OpenCL library name or path
pub const ENV_LIBRARY_NAME_OPENCL: &str = "DYNBIND_LIBRARY_NAME_OPENCL";
/// Overrides the OpenAL library name or path
pub const ENV_LIBRARY_NAME_OPENAL: &str = "DYNBIND_LIBRARY_NAME_OPENAL";
/// Overrides the LibOVR runtime name or path
pub const ENV_LIBRARY_NAME_LIBOVR: &str = "DYNBIND_LIBRARY_NAME_LIBOVR";
/// When true, OpenCL is never created implicitly
pub const ENV_EXPLICIT_INIT_OPENCL: &str = "DYNBIND_EXPLICIT_INIT_OPENCL";

/// Default OpenCL library short name
pub const DEFAULT_OPENCL_LIBRARY: &str = "OpenCL";

/// Default OpenAL library short name
#[cfg(windows)]
pub const DEFAULT_OPENAL_LIBRARY: &str = "OpenAL32";
/// Default OpenAL library short name
#[cfg(not(windows))]
pub const DEFAULT_OPENAL_LIBRARY: &str = "openal";

/// Default LibOVR runtime short name
#[cfg(all(windows, target_pointer_width = "64"))]
pub const DEFAULT_LIBOVR_LIBRARY: &str = "LibOVRRT64_0_7";
/// Default LibOVR runtime short name
#[cfg(all(windows, not(target_pointer_width = "64")))]
pub const DEFAULT_LIBOVR_LIBRARY: &str = "LibOVRRT32_0_7";
/// Default LibOVR runtime short name
#[cfg(all(not(windows), target_pointer_width = "64"))]
pub const DEFAULT_LIBOVR_LIBRARY: &str = "OVRRT64_0";
/// Default LibOVR runtime short name
#[cfg(all(not(windows), not(target_pointer_width = "64")))]
pub const DEFAULT_LIBOVR_LIBRARY: &str = "OVRRT32_0";

/// Binding configuration
///
/// Use the builder pattern to customize which native libraries are loaded:
///
/// ```no_run
/// use dynbind::Config;
///
/// let config = Config::new()
///     .opencl_library_name(Some("/opt/cuda/lib64/libOpenCL.so.1".into()))
///     .explicit_init(true);
/// ```
///
/// [`Config::from_env`] starts from the defaults and applies the
/// `DYNBIND_*` environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    opencl_library_name: Option<String>,
    openal_library_name: Option<String>,
    libovr_library_name: Option<String>,
    explicit_init: bool,
}

impl Config {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults with the process environment applied
    pub fn from_env() -> Self {
        Self::new().apply_env(|key| std::env::var(key).ok())
    }

    /// Apply overrides read through `lookup`.
    ///
    /// Empty values are ignored.
    pub fn apply_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(name) = value(ENV_LIBRARY_NAME_OPENCL) {
            self.opencl_library_name = Some(name);
        }
        if let Some(name) = value(ENV_LIBRARY_NAME_OPENAL) {
            self.openal_library_name = Some(name);
        }
        if let Some(name) = value(ENV_LIBRARY_NAME_LIBOVR) {
            self.libovr_library_name = Some(name);
        }
        if let Some(flag) = value(ENV_EXPLICIT_INIT_OPENCL) {
            self.explicit_init = parse_flag(&flag);
        }
        self
    }

    /// Set the OpenCL library name or path (default: `OpenCL`)
    pub fn opencl_library_name(mut self, name: Option<String>) -> Self {
        self.opencl_library_name = name;
        self
    }

    /// Set the OpenAL library name or path (default: `OpenAL32` on Windows,
    /// `openal` elsewhere)
    pub fn openal_library_name(mut self, name: Option<String>) -> Self {
        self.openal_library_name = name;
        self
    }

    /// Set the LibOVR runtime name or path
    pub fn libovr_library_name(mut self, name: Option<String>) -> Self {
        self.libovr_library_name = name;
        self
    }

    /// Require OpenCL to be created explicitly (default: false)
    ///
    /// When set, [`Cl::get_or_create`](crate::opencl::Cl::get_or_create)
    /// fails with [`NotInitialized`](crate::Error::NotInitialized) instead of
    /// creating a session.
    pub fn explicit_init(mut self, explicit: bool) -> Self {
        self.explicit_init = explicit;
        self
    }

    /// OpenCL library to load
    pub fn opencl_library(&self) -> &str {
        self.opencl_library_name
            .as_deref()
            .unwrap_or(DEFAULT_OPENCL_LIBRARY)
    }

    /// OpenAL library to load
    pub fn openal_library(&self) -> &str {
        self.openal_library_name
            .as_deref()
            .unwrap_or(DEFAULT_OPENAL_LIBRARY)
    }

    /// LibOVR runtime to load
    pub fn libovr_library(&self) -> &str {
        self.libovr_library_name
            .as_deref()
            .unwrap_or(DEFAULT_LIBOVR_LIBRARY)
    }

    pub fn is_explicit_init(&self) -> bool {
        self.explicit_init
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}
