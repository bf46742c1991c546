//! Runtime-loaded bindings for OpenCL, OpenAL and LibOVR
//!
//! Nothing is linked at build time. Each native library is opened at runtime,
//! its functions are resolved by name into [`FunctionAddress`]es, and those
//! are cast to the typed pointers in `dynbind-sys` at the call site.
//!
//! # Quick Start
//!
//! ```no_run
//! use dynbind::opencl::{Cl, PlatformInfo};
//! use dynbind::Config;
//!
//! fn main() -> dynbind::Result<()> {
//!     let session = Cl::global().create(&Config::from_env())?;
//!     println!("extension lookup: {:?}", session.strategy());
//!
//!     for platform in session.platforms() {
//!         let name = session.platform_info(platform, PlatformInfo::Name);
//!         let caps = session.platform_capabilities(platform)?;
//!         println!("{:?}: {:?}", name, caps.extensions().sorted());
//!     }
//!
//!     Cl::global().destroy();
//!     Ok(())
//! }
//! ```
//!
//! # API Overview
//!
//! - [`SharedLibrary`] - A native library opened at runtime
//! - [`FunctionProvider`] / [`FunctionProviderLocal`] - Name to address lookup
//! - [`opencl::Cl`] - OpenCL session lifecycle and ICD-aware function lookup
//! - [`opencl::CapabilitySet`] - Version and extension tags of a platform
//! - [`OpenAl`] - OpenAL error checks
//! - [`ovr::LibOvr`] - LibOVR runtime lifecycle
//! - [`Config`] - Library names and initialization policy
//!
//! # Soundness Limitations
//!
//! A [`FunctionAddress`] is only meaningful while the library it came from
//! is loaded. Destroying an OpenCL session releases the library; addresses
//! obtained earlier must not be called afterwards.

mod address;
mod error;
mod library;
mod log;
mod openal;
mod options;
mod provider;

pub mod opencl;
pub mod ovr;

#[cfg(test)]
mod testing;

pub use address::FunctionAddress;
pub use error::{Error, Result};
pub use library::SharedLibrary;
pub use log::{clear_log_handler, log_emit, set_log_handler, LogLevel};
pub use openal::{AlcDevice, OpenAl};
pub use options::{
    Config, ENV_EXPLICIT_INIT_OPENCL, ENV_LIBRARY_NAME_LIBOVR, ENV_LIBRARY_NAME_OPENAL,
    ENV_LIBRARY_NAME_OPENCL,
};
pub use provider::{require, FunctionProvider, FunctionProviderLocal};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::LOG_TEST_LOCK;
    use crate::opencl::{Cl, IcdFunctionProvider, PlatformId, ResolutionStrategy};
    use crate::testing::FakeIcd;
    use std::sync::{Arc, Mutex};

    // =========================================================================
    // Custom Provider Tests
    // =========================================================================

    /// A provider that exposes nothing but counts lookups
    struct Counting {
        lookups: Arc<Mutex<Vec<String>>>,
    }

    impl FunctionProvider for Counting {
        fn function_address(&self, name: &str) -> FunctionAddress {
            self.lookups.lock().unwrap().push(name.to_string());
            FunctionAddress::NULL
        }
    }

    impl FunctionProviderLocal for Counting {
        fn function_address_for(&self, _platform: PlatformId, name: &str) -> FunctionAddress {
            self.function_address(name)
        }
    }

    #[test]
    fn test_custom_provider_without_core_functions() {
        let lookups = Arc::new(Mutex::new(Vec::new()));
        let cl = Cl::new();
        let err = cl
            .create_with_provider(Box::new(Counting {
                lookups: lookups.clone(),
            }))
            .unwrap_err();

        assert!(matches!(err, Error::MissingCoreFunction("clGetPlatformIDs")));
        assert!(err.is_fatal());
        assert_eq!(lookups.lock().unwrap().first().map(String::as_str), Some("clGetPlatformIDs"));
        assert!(!cl.is_created());
    }

    #[test]
    fn test_types_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<opencl::ClSession>();
        assert_send_sync::<Cl>();
        assert_send_sync::<OpenAl>();
        assert_send_sync::<ovr::LibOvr>();
        assert_send_sync::<SharedLibrary>();
    }

    // =========================================================================
    // End to End
    // =========================================================================

    #[test]
    fn test_single_platform_end_to_end() {
        let library = FakeIcd::new()
            .version("OpenCL 2.0 Fake")
            .extensions("cl_khr_icd cl_APPLE_gl_sharing")
            .build();
        let provider = IcdFunctionProvider::new(Box::new(library)).unwrap();
        assert_eq!(
            provider.strategy(),
            ResolutionStrategy::PerPlatform(FakeIcd::platform(0))
        );

        let cl = Cl::new();
        let session = cl.create_with_provider(Box::new(provider)).unwrap();
        let platforms = session.platforms();
        assert_eq!(platforms, vec![FakeIcd::platform(0)]);

        let caps = session.platform_capabilities(platforms[0]).unwrap();
        assert_eq!(
            caps.extensions().sorted(),
            [
                "OpenCL10",
                "OpenCL10GL",
                "OpenCL11",
                "OpenCL12",
                "OpenCL12GL",
                "OpenCL20",
                "cl_APPLE_gl_sharing",
                "cl_khr_icd",
            ]
        );
        assert!(caps.cl20().is_some());
        assert!(caps.cl12_gl().is_some());
        // Tag and table are keyed by the Khronos extension name only
        assert!(caps.khr_gl_sharing().is_none());

        cl.destroy();
        assert!(session.function_address("clFinish").is_null());
    }

    #[test]
    fn test_multi_platform_end_to_end() {
        let library = FakeIcd::new().platforms(3).version("OpenCL 1.1 Fake").build();
        let provider = IcdFunctionProvider::new(Box::new(library)).unwrap();
        assert_eq!(provider.strategy(), ResolutionStrategy::Generic);

        let cl = Cl::new();
        let session = cl.create_with_provider(Box::new(provider)).unwrap();
        assert_eq!(session.platforms().len(), 3);

        for platform in session.platforms() {
            let caps = session.platform_capabilities(platform).unwrap();
            assert!(caps.contains("OpenCL11"));
            assert!(!caps.contains("OpenCL12"));
            assert!(caps.cl12().is_none());
        }
    }

    #[test]
    fn test_strategy_is_logged() {
        let _lock = LOG_TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let messages = Arc::new(Mutex::new(Vec::new()));
        let messages_clone = messages.clone();
        set_log_handler(move |level, msg| {
            if msg.contains("resolved with Generic") {
                messages_clone.lock().unwrap().push(level);
            }
        });

        let library = FakeIcd::new().platforms(2).build();
        let provider = IcdFunctionProvider::new(Box::new(library));
        clear_log_handler();

        assert!(provider.is_ok());
        assert_eq!(messages.lock().unwrap().as_slice(), &[LogLevel::Debug]);
    }
}
