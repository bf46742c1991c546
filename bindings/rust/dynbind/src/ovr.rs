//! LibOVR runtime loading and initialization
//!
//! Only the runtime lifecycle is bound: load, `ovr_Initialize` with the
//! runtime's log output routed into [`log_emit`], the version query and
//! `ovr_Shutdown`.

use std::ffi::{c_char, c_int, CStr};
use std::ops::{BitOr, BitOrAssign};
use std::sync::Mutex;

use dynbind_sys as sys;

use crate::error::{Error, Result};
use crate::library::SharedLibrary;
use crate::log::{log_emit, LogLevel};
use crate::options::Config;
use crate::provider::{require_fn, FunctionProvider};

/// Version of the SDK these bindings target, `"<product>.<major>.<minor>.<patch>"`
pub fn sdk_version() -> String {
    format!(
        "{}.{}.{}.{}",
        sys::OVR_PRODUCT_VERSION,
        sys::OVR_MAJOR_VERSION,
        sys::OVR_MINOR_VERSION,
        sys::OVR_PATCH_VERSION
    )
}

/// `ovr_Initialize` flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InitFlags(u32);

impl InitFlags {
    pub const NONE: InitFlags = InitFlags(0);
    /// Debug runtime behaviour
    pub const DEBUG: InitFlags = InitFlags(sys::ovrInit_Debug);
    /// Succeed even if the service is not running
    pub const SERVER_OPTIONAL: InitFlags = InitFlags(sys::ovrInit_ServerOptional);
    /// Ask for the minor version these bindings were built against
    pub const REQUEST_VERSION: InitFlags = InitFlags(sys::ovrInit_RequestVersion);
    pub const FORCE_NO_DEBUG: InitFlags = InitFlags(sys::ovrInit_ForceNoDebug);

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: InitFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for InitFlags {
    type Output = InitFlags;

    fn bitor(self, rhs: InitFlags) -> InitFlags {
        InitFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for InitFlags {
    fn bitor_assign(&mut self, rhs: InitFlags) {
        self.0 |= rhs.0;
    }
}

fn level_from_ovr(level: c_int) -> LogLevel {
    match level {
        sys::ovrLogLevel_Debug => LogLevel::Debug,
        sys::ovrLogLevel_Error => LogLevel::Error,
        _ => LogLevel::Info,
    }
}

/// Runtime log callback; forwards into the crate log pipeline.
extern "C" fn log_trampoline(_user_data: usize, level: c_int, message: *const c_char) {
    if message.is_null() {
        return;
    }

    // catch_unwind prevents panics from unwinding across the FFI boundary
    let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let message = unsafe { CStr::from_ptr(message) }.to_string_lossy();
        log_emit(level_from_ovr(level), &format!("LibOVR: {}", message));
    }));
}

struct EntryPoints {
    initialize: sys::ovr_Initialize_fn,
    get_version_string: sys::ovr_GetVersionString_fn,
    shutdown: sys::ovr_Shutdown_fn,
}

impl EntryPoints {
    /// Safety: `provider` must resolve these names to the LibOVR functions.
    unsafe fn resolve(provider: &dyn FunctionProvider) -> Result<Self> {
        Ok(Self {
            initialize: require_fn(provider, "ovr_Initialize")?,
            get_version_string: require_fn(provider, "ovr_GetVersionString")?,
            shutdown: require_fn(provider, "ovr_Shutdown")?,
        })
    }
}

/// A loaded LibOVR runtime.
///
/// # Example
///
/// ```no_run
/// use dynbind::ovr::{InitFlags, LibOvr};
/// use dynbind::Config;
///
/// # fn main() -> dynbind::Result<()> {
/// let ovr = LibOvr::load(&Config::from_env())?;
/// ovr.initialize(InitFlags::DEBUG)?;
/// println!("runtime {:?}", ovr.version_string());
/// ovr.shutdown();
/// # Ok(())
/// # }
/// ```
pub struct LibOvr {
    provider: Box<dyn FunctionProvider>,
    entry: EntryPoints,
    /// Guards initialize/shutdown
    initialized: Mutex<bool>,
}

impl LibOvr {
    /// Load the LibOVR runtime named by `config`.
    pub fn load(config: &Config) -> Result<Self> {
        let library = SharedLibrary::load(config.libovr_library())?;
        Self::with_provider(Box::new(library))
    }

    /// Resolve the runtime entry points from `provider`.
    ///
    /// The provider is released if any of them is missing.
    pub fn with_provider(mut provider: Box<dyn FunctionProvider>) -> Result<Self> {
        match unsafe { EntryPoints::resolve(&*provider) } {
            Ok(entry) => Ok(Self {
                provider,
                entry,
                initialized: Mutex::new(false),
            }),
            Err(e) => {
                provider.release();
                Err(e)
            }
        }
    }

    /// Initialize the runtime.
    ///
    /// Runtime log messages are forwarded to [`log_emit`] until
    /// [`shutdown`](Self::shutdown).
    pub fn initialize(&self, flags: InitFlags) -> Result<()> {
        let mut initialized = self.initialized.lock().unwrap_or_else(|e| e.into_inner());
        if *initialized {
            return Err(Error::AlreadyInitialized);
        }

        let params = sys::ovrInitParams {
            Flags: flags.bits(),
            RequestedMinorVersion: sys::OVR_MINOR_VERSION,
            LogCallback: Some(log_trampoline),
            UserData: 0,
            ConnectionTimeoutMS: 0,
        };

        let code = unsafe { (self.entry.initialize)(&params) };
        if code < sys::ovrSuccess {
            return Err(Error::Ovr { code });
        }

        *initialized = true;
        log_emit(LogLevel::Info, &format!("LibOVR initialized (flags {:#x})", flags.bits()));
        Ok(())
    }

    /// Version reported by the runtime, if it reports one
    pub fn version_string(&self) -> Option<String> {
        let version = unsafe { (self.entry.get_version_string)() };
        if version.is_null() {
            return None;
        }
        Some(unsafe { CStr::from_ptr(version) }.to_string_lossy().into_owned())
    }

    pub fn is_initialized(&self) -> bool {
        *self.initialized.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Shut the runtime down. Does nothing if it is not initialized.
    pub fn shutdown(&self) {
        let mut initialized = self.initialized.lock().unwrap_or_else(|e| e.into_inner());
        if *initialized {
            unsafe { (self.entry.shutdown)() };
            *initialized = false;
            log_emit(LogLevel::Info, "LibOVR shut down");
        }
    }
}

impl Drop for LibOvr {
    fn drop(&mut self) {
        self.shutdown();
        self.provider.release();
    }
}

impl std::fmt::Debug for LibOvr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibOvr")
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}
