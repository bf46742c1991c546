//! Create an OpenCL session from an application supplied provider
//!
//! The application opens the library itself and wraps it in a provider that
//! logs every lookup. That provider is handed to the ICD resolver, and the
//! result is installed as the session.
//!
//! Run: cargo run --example custom_provider [library]

use std::sync::atomic::{AtomicUsize, Ordering};

use dynbind::opencl::{Cl, IcdFunctionProvider};
use dynbind::{log_emit, Config, FunctionAddress, FunctionProvider, LogLevel, Result, SharedLibrary};

/// Wraps a library and counts resolved and missing lookups.
struct Tracing {
    library: SharedLibrary,
    resolved: AtomicUsize,
    missing: AtomicUsize,
}

impl FunctionProvider for Tracing {
    fn function_address(&self, name: &str) -> FunctionAddress {
        let address = self.library.function_address(name);
        if address.is_null() {
            self.missing.fetch_add(1, Ordering::Relaxed);
            log_emit(LogLevel::Debug, &format!("lookup {} -> missing", name));
        } else {
            self.resolved.fetch_add(1, Ordering::Relaxed);
            log_emit(LogLevel::Debug, &format!("lookup {} -> {:?}", name, address));
        }
        address
    }

    fn release(&mut self) {
        log_emit(
            LogLevel::Info,
            &format!(
                "releasing {} ({} resolved, {} missing)",
                self.library.name(),
                self.resolved.load(Ordering::Relaxed),
                self.missing.load(Ordering::Relaxed)
            ),
        );
        self.library.release();
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("dynbind=info")),
        )
        .init();

    let config = Config::from_env();
    let name = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config.opencl_library().to_string());

    let provider = Tracing {
        library: SharedLibrary::load(&name)?,
        resolved: AtomicUsize::new(0),
        missing: AtomicUsize::new(0),
    };
    let icd = IcdFunctionProvider::new(Box::new(provider))?;
    println!("Extension lookup: {:?}", icd.strategy());

    let cl = Cl::new();
    let session = cl.create_with_provider(Box::new(icd))?;
    println!("ICD tables: {:?}", session.icd().extensions().sorted());
    println!("Platforms: {}", session.platforms().len());

    // Second creation is rejected and leaves the session alone
    if let Err(e) = cl.create_with_library(&name) {
        println!("Second create: {}", e);
    }

    cl.destroy();
    Ok(())
}
