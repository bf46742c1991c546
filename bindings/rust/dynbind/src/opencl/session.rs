//! OpenCL session lifecycle
//!
//! A [`ClSession`] owns the function provider for the loaded OpenCL library,
//! the resolution strategy it picked and the ICD capabilities. All three are
//! created together by one of the `Cl::create*` calls and torn down together
//! by [`Cl::destroy`].

use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use crate::address::FunctionAddress;
use crate::error::{Error, Result};
use crate::library::SharedLibrary;
use crate::log::{log_emit, LogLevel};
use crate::options::Config;
use crate::provider::{FunctionProvider, FunctionProviderLocal};

use super::capabilities::ClCapabilities;
use super::icd::{IcdFunctionProvider, ResolutionStrategy};
use super::platform::{self, PlatformId, PlatformInfo};

/// Tried in order after the platform default name
#[cfg(target_os = "linux")]
const OPENCL_FALLBACKS: &[&str] = &["libOpenCL.so.1"];
#[cfg(target_os = "macos")]
const OPENCL_FALLBACKS: &[&str] = &["/System/Library/Frameworks/OpenCL.framework/OpenCL"];
#[cfg(not(any(target_os = "linux", target_os = "macos")))]
const OPENCL_FALLBACKS: &[&str] = &[];

type SessionSlot = Option<Arc<ClSession>>;

/// An initialized OpenCL binding.
///
/// Shared through `Arc`; once the owning [`Cl`] destroys the session every
/// lookup returns [`FunctionAddress::NULL`].
pub struct ClSession {
    provider: RwLock<Option<Box<dyn FunctionProviderLocal>>>,
    icd: ClCapabilities,
    strategy: Option<ResolutionStrategy>,
}

impl ClSession {
    /// Address of an OpenCL or extension function, or null if unavailable
    pub fn function_address(&self, name: &str) -> FunctionAddress {
        let provider = self.provider.read().unwrap_or_else(|e| e.into_inner());
        match provider.as_ref() {
            Some(provider) => provider.function_address(name),
            None => FunctionAddress::NULL,
        }
    }

    /// Address of `name` as exposed by `platform`, or null
    pub fn function_address_for(&self, platform: PlatformId, name: &str) -> FunctionAddress {
        let provider = self.provider.read().unwrap_or_else(|e| e.into_inner());
        match provider.as_ref() {
            Some(provider) => provider.function_address_for(platform, name),
            None => FunctionAddress::NULL,
        }
    }

    /// Library-level capabilities, computed without a platform
    pub fn icd(&self) -> &ClCapabilities {
        &self.icd
    }

    /// Extension lookup strategy, when the session was created from a library
    pub fn strategy(&self) -> Option<ResolutionStrategy> {
        self.strategy
    }

    /// All platforms reported by the library
    pub fn platforms(&self) -> Vec<PlatformId> {
        platform::platform_ids(self.function_address("clGetPlatformIDs"))
    }

    /// A string parameter of `platform`, or `None` if the query fails
    pub fn platform_info(&self, platform: PlatformId, param: PlatformInfo) -> Option<String> {
        platform::platform_info_string(self.function_address("clGetPlatformInfo"), platform, param)
    }

    /// Version, extensions and function tables of `platform`
    pub fn platform_capabilities(&self, platform: PlatformId) -> Result<ClCapabilities> {
        let provider = self.provider.read().unwrap_or_else(|e| e.into_inner());
        let provider = provider.as_ref().ok_or(Error::NotInitialized)?;
        ClCapabilities::for_platform(&**provider, platform)
    }

    /// False once the session has been destroyed
    pub fn is_active(&self) -> bool {
        self.provider
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    fn release(&self) {
        let provider = self
            .provider
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(mut provider) = provider {
            provider.release();
        }
    }
}

impl std::fmt::Debug for ClSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClSession")
            .field("active", &self.is_active())
            .field("strategy", &self.strategy)
            .field("icd", &self.icd.extensions().sorted())
            .finish()
    }
}

/// Owner of at most one [`ClSession`].
///
/// Most applications use the process-wide instance from [`Cl::global`].
///
/// # Example
///
/// ```no_run
/// use dynbind::opencl::Cl;
/// use dynbind::Config;
///
/// # fn main() -> dynbind::Result<()> {
/// let session = Cl::global().create(&Config::from_env())?;
/// for platform in session.platforms() {
///     let caps = session.platform_capabilities(platform)?;
///     println!("{:?}: OpenCL 1.2 = {}", platform, caps.contains("OpenCL12"));
/// }
/// Cl::global().destroy();
/// # Ok(())
/// # }
/// ```
pub struct Cl {
    session: Mutex<SessionSlot>,
}

static GLOBAL: Cl = Cl::new();

impl Default for Cl {
    fn default() -> Self {
        Self::new()
    }
}

impl Cl {
    pub const fn new() -> Self {
        Self {
            session: Mutex::new(None),
        }
    }

    /// The process-wide instance
    pub fn global() -> &'static Cl {
        &GLOBAL
    }

    /// Load the OpenCL library named by `config` and create a session.
    pub fn create(&self, config: &Config) -> Result<Arc<ClSession>> {
        self.create_with_library(config.opencl_library())
    }

    /// Load the OpenCL library `name` and create a session.
    ///
    /// Fails with [`Error::AlreadyInitialized`] if a session exists; the
    /// existing session is not touched.
    pub fn create_with_library(&self, name: &str) -> Result<Arc<ClSession>> {
        let mut slot = self.lock();
        if slot.is_some() {
            return Err(Error::AlreadyInitialized);
        }
        create_locked(&mut slot, name)
    }

    /// Create a session around an application supplied provider.
    ///
    /// The provider is released if the session cannot be created.
    pub fn create_with_provider(
        &self,
        mut provider: Box<dyn FunctionProviderLocal>,
    ) -> Result<Arc<ClSession>> {
        let mut slot = self.lock();
        if slot.is_some() {
            provider.release();
            return Err(Error::AlreadyInitialized);
        }
        install(&mut slot, provider, None)
    }

    /// Release the session. Does nothing if there is none.
    pub fn destroy(&self) {
        let session = self.lock().take();
        if let Some(session) = session {
            session.release();
            log_emit(LogLevel::Info, "[CL] OpenCL destroyed");
        }
    }

    /// The current session, if any
    pub fn session(&self) -> Option<Arc<ClSession>> {
        self.lock().clone()
    }

    pub fn is_created(&self) -> bool {
        self.lock().is_some()
    }

    /// The current session, creating one from `config` if needed.
    ///
    /// With [`Config::explicit_init`] set, a missing session is
    /// [`Error::NotInitialized`] instead.
    pub fn get_or_create(&self, config: &Config) -> Result<Arc<ClSession>> {
        let mut slot = self.lock();
        if let Some(session) = slot.as_ref() {
            return Ok(session.clone());
        }
        if config.is_explicit_init() {
            return Err(Error::NotInitialized);
        }
        create_locked(&mut slot, config.opencl_library())
    }

    fn lock(&self) -> MutexGuard<'_, SessionSlot> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for Cl {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn create_locked(slot: &mut SessionSlot, name: &str) -> Result<Arc<ClSession>> {
    let library = SharedLibrary::load_with_fallbacks(name, OPENCL_FALLBACKS)?;
    let provider = IcdFunctionProvider::new(Box::new(library))?;
    let strategy = provider.strategy();
    install(slot, Box::new(provider), Some(strategy))
}

fn install(
    slot: &mut SessionSlot,
    mut provider: Box<dyn FunctionProviderLocal>,
    strategy: Option<ResolutionStrategy>,
) -> Result<Arc<ClSession>> {
    let icd = match ClCapabilities::for_icd(&*provider) {
        Ok(icd) => icd,
        Err(e) => {
            provider.release();
            return Err(e);
        }
    };

    let session = Arc::new(ClSession {
        provider: RwLock::new(Some(provider)),
        icd,
        strategy,
    });
    *slot = Some(session.clone());
    log_emit(LogLevel::Info, "[CL] OpenCL created");
    Ok(session)
}
