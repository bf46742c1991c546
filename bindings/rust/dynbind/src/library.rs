//! Dynamic library loading

use std::ffi::{c_void, OsStr, OsString};
use std::path::Path;

use libloading::Library;

use crate::address::FunctionAddress;
use crate::error::{Error, Result};
use crate::log::{log_emit, LogLevel};
use crate::provider::FunctionProvider;

/// A native shared library opened at runtime.
///
/// The library stays loaded until [`release`](FunctionProvider::release) is
/// called or the value is dropped, whichever happens first.
///
/// # Example
///
/// ```no_run
/// use dynbind::{FunctionProvider, SharedLibrary};
///
/// # fn main() -> dynbind::Result<()> {
/// let library = SharedLibrary::load("OpenCL")?;
/// let address = library.function_address("clGetPlatformIDs");
/// println!("clGetPlatformIDs at {:?}", address);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SharedLibrary {
    name: String,
    path: OsString,
    library: Option<Library>,
}

impl SharedLibrary {
    /// Load a library by short name (`"OpenCL"`), file name
    /// (`"libOpenCL.so.1"`) or path.
    pub fn load(name: &str) -> Result<Self> {
        Self::load_with_fallbacks(name, &[])
    }

    /// Load a library, trying `fallbacks` in order when `name` cannot be
    /// opened.
    pub fn load_with_fallbacks(name: &str, fallbacks: &[&str]) -> Result<Self> {
        if name.is_empty() {
            return Err(Error::InvalidArgument("empty library name"));
        }

        let mut failure = None;
        for candidate in candidate_names(name, fallbacks) {
            // Safety: loading runs the library's initializers; the libraries
            // this crate loads are system driver loaders.
            match unsafe { Library::new(&candidate) } {
                Ok(library) => {
                    log_emit(
                        LogLevel::Debug,
                        &format!("Loaded native library {}", candidate.to_string_lossy()),
                    );
                    return Ok(Self {
                        name: name.to_string(),
                        path: candidate,
                        library: Some(library),
                    });
                }
                Err(e) => {
                    log_emit(
                        LogLevel::Debug,
                        &format!("Failed to load {}: {}", candidate.to_string_lossy(), e),
                    );
                    failure = Some(e);
                }
            }
        }

        match failure {
            Some(source) => Err(Error::LibraryLoad {
                name: name.to_string(),
                source,
            }),
            None => Err(Error::InvalidArgument("no library candidates")),
        }
    }

    /// The name this library was requested by
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The candidate that was actually opened
    pub fn path(&self) -> &OsStr {
        &self.path
    }

    /// False once the library has been released
    pub fn is_loaded(&self) -> bool {
        self.library.is_some()
    }
}

impl FunctionProvider for SharedLibrary {
    fn function_address(&self, name: &str) -> FunctionAddress {
        let Some(library) = self.library.as_ref() else {
            return FunctionAddress::NULL;
        };
        // Safety: the symbol is only read as an address, never called here.
        match unsafe { library.get::<*mut c_void>(name.as_bytes()) } {
            Ok(symbol) => FunctionAddress::from_ptr(*symbol),
            Err(_) => FunctionAddress::NULL,
        }
    }

    fn release(&mut self) {
        if let Some(library) = self.library.take() {
            if let Err(e) = library.close() {
                log_emit(
                    LogLevel::Warning,
                    &format!("Failed to unload {}: {}", self.path.to_string_lossy(), e),
                );
            }
        }
    }
}

impl Drop for SharedLibrary {
    fn drop(&mut self) {
        self.release();
    }
}

/// Names to try for `name`, in order: the name as given if it already looks
/// like a file, otherwise the platform file name, then `fallbacks`.
fn candidate_names(name: &str, fallbacks: &[&str]) -> Vec<OsString> {
    let mut candidates = Vec::with_capacity(1 + fallbacks.len());
    if is_explicit_file(name) {
        candidates.push(OsString::from(name));
    } else {
        candidates.push(libloading::library_filename(name));
    }
    candidates.extend(fallbacks.iter().map(OsString::from));
    candidates
}

fn is_explicit_file(name: &str) -> bool {
    let path = Path::new(name);
    path.components().count() > 1
        || path.extension().is_some()
        || path.is_absolute()
}
