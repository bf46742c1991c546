//! OpenAL error translation
//!
//! OpenAL reports failures through a sticky error flag that has to be polled
//! with `alGetError` (or `alcGetError` for device and context calls).
//! [`OpenAl::check_error`] and [`OpenAl::check_alc_error`] turn that flag
//! into a [`Result`], using the driver's own description as the message.

use std::ffi::{c_char, CStr};
use std::ptr;

use dynbind_sys as sys;

use crate::error::{Error, Result};
use crate::library::SharedLibrary;
use crate::options::Config;
use crate::provider::{require_fn, FunctionProvider};

#[cfg(target_os = "linux")]
const OPENAL_FALLBACKS: &[&str] = &["libopenal.so.1"];
#[cfg(target_os = "macos")]
const OPENAL_FALLBACKS: &[&str] = &["/System/Library/Frameworks/OpenAL.framework/OpenAL"];
#[cfg(not(any(target_os = "linux", target_os = "macos")))]
const OPENAL_FALLBACKS: &[&str] = &[];

const UNKNOWN_ERROR: &str = "Unknown OpenAL error";

/// An OpenAL device handle (`ALCdevice*`), or null for "no device".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlcDevice(*mut sys::ALCdevice);

impl AlcDevice {
    /// Query errors that are not tied to a device
    pub const NULL: AlcDevice = AlcDevice(ptr::null_mut());

    /// Wrap a device pointer returned by `alcOpenDevice`.
    ///
    /// # Safety
    ///
    /// `device` must be null or a device opened through the same OpenAL
    /// library, and must stay open while this handle is used.
    pub unsafe fn from_raw(device: *mut sys::ALCdevice) -> Self {
        Self(device)
    }

    pub fn as_raw(self) -> *mut sys::ALCdevice {
        self.0
    }

    pub fn is_null(self) -> bool {
        self.0.is_null()
    }
}

struct EntryPoints {
    al_get_error: sys::alGetError_fn,
    al_get_string: sys::alGetString_fn,
    alc_get_error: sys::alcGetError_fn,
    alc_get_string: sys::alcGetString_fn,
}

impl EntryPoints {
    /// Safety: `provider` must resolve these names to the OpenAL functions.
    unsafe fn resolve(provider: &dyn FunctionProvider) -> Result<Self> {
        Ok(Self {
            al_get_error: require_fn(provider, "alGetError")?,
            al_get_string: require_fn(provider, "alGetString")?,
            alc_get_error: require_fn(provider, "alcGetError")?,
            alc_get_string: require_fn(provider, "alcGetString")?,
        })
    }
}

/// Error checking entry points of a loaded OpenAL library.
pub struct OpenAl {
    provider: Box<dyn FunctionProvider>,
    entry: EntryPoints,
}

impl OpenAl {
    /// Load the OpenAL library named by `config`.
    pub fn load(config: &Config) -> Result<Self> {
        let library = SharedLibrary::load_with_fallbacks(config.openal_library(), OPENAL_FALLBACKS)?;
        Self::with_provider(Box::new(library))
    }

    /// Resolve the error entry points from `provider`.
    ///
    /// The provider is released if any of them is missing.
    pub fn with_provider(mut provider: Box<dyn FunctionProvider>) -> Result<Self> {
        match unsafe { EntryPoints::resolve(&*provider) } {
            Ok(entry) => Ok(Self { provider, entry }),
            Err(e) => {
                provider.release();
                Err(e)
            }
        }
    }

    /// Poll `alGetError`; any pending error becomes [`Error::OpenAl`].
    ///
    /// Polling clears the flag, so a second call returns `Ok(())`.
    pub fn check_error(&self) -> Result<()> {
        let code = unsafe { (self.entry.al_get_error)() };
        if code == sys::AL_NO_ERROR {
            return Ok(());
        }
        Err(Error::OpenAl {
            code,
            message: self.error_string(code),
        })
    }

    /// Poll `alcGetError` for `device`; any pending error becomes
    /// [`Error::OpenAlc`].
    pub fn check_alc_error(&self, device: AlcDevice) -> Result<()> {
        let code = unsafe { (self.entry.alc_get_error)(device.as_raw()) };
        if code == sys::ALC_NO_ERROR {
            return Ok(());
        }
        Err(Error::OpenAlc {
            code,
            message: self.alc_error_string(device, code),
        })
    }

    /// Driver description of an AL error code
    pub fn error_string(&self, code: sys::ALenum) -> String {
        unsafe { string_or_unknown((self.entry.al_get_string)(code)) }
    }

    /// Driver description of an ALC error code
    pub fn alc_error_string(&self, device: AlcDevice, code: sys::ALCenum) -> String {
        unsafe { string_or_unknown((self.entry.alc_get_string)(device.as_raw(), code)) }
    }
}

impl Drop for OpenAl {
    fn drop(&mut self) {
        self.provider.release();
    }
}

impl std::fmt::Debug for OpenAl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAl").finish_non_exhaustive()
    }
}

/// Safety: `s` must be null or a NUL-terminated string.
unsafe fn string_or_unknown(s: *const c_char) -> String {
    if s.is_null() {
        UNKNOWN_ERROR.to_string()
    } else {
        CStr::from_ptr(s).to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::FunctionAddress;
    use crate::testing::FakeLibrary;
    use std::cell::Cell;

    thread_local! {
        static AL_ERROR: Cell<sys::ALenum> = Cell::new(sys::AL_NO_ERROR);
        static ALC_ERROR: Cell<sys::ALCenum> = Cell::new(sys::ALC_NO_ERROR);
        static ALC_LAST_DEVICE: Cell<usize> = Cell::new(0);
    }

    unsafe extern "C" fn fake_al_get_error() -> sys::ALenum {
        AL_ERROR.with(|e| e.replace(sys::AL_NO_ERROR))
    }

    unsafe extern "C" fn fake_al_get_string(param: sys::ALenum) -> *const sys::ALchar {
        match param {
            sys::AL_INVALID_VALUE => b"Invalid Value\0".as_ptr().cast(),
            sys::AL_INVALID_OPERATION => b"Invalid Operation\0".as_ptr().cast(),
            _ => ptr::null(),
        }
    }

    unsafe extern "C" fn fake_alc_get_error(device: *mut sys::ALCdevice) -> sys::ALCenum {
        ALC_LAST_DEVICE.with(|d| d.set(device as usize));
        ALC_ERROR.with(|e| e.replace(sys::ALC_NO_ERROR))
    }

    unsafe extern "C" fn fake_alc_get_string(
        _device: *mut sys::ALCdevice,
        param: sys::ALCenum,
    ) -> *const sys::ALCchar {
        match param {
            sys::ALC_INVALID_DEVICE => b"Invalid Device\0".as_ptr().cast(),
            _ => ptr::null(),
        }
    }

    fn fake_symbols() -> Vec<(&'static str, FunctionAddress)> {
        vec![
            ("alGetError", FunctionAddress::new(fake_al_get_error as sys::alGetError_fn as usize)),
            ("alGetString", FunctionAddress::new(fake_al_get_string as sys::alGetString_fn as usize)),
            ("alcGetError", FunctionAddress::new(fake_alc_get_error as sys::alcGetError_fn as usize)),
            ("alcGetString", FunctionAddress::new(fake_alc_get_string as sys::alcGetString_fn as usize)),
        ]
    }

    fn fake_openal() -> OpenAl {
        AL_ERROR.with(|e| e.set(sys::AL_NO_ERROR));
        ALC_ERROR.with(|e| e.set(sys::ALC_NO_ERROR));
        OpenAl::with_provider(Box::new(FakeLibrary::with_symbols(&fake_symbols()))).unwrap()
    }

    #[test]
    fn test_no_error() {
        let al = fake_openal();
        assert!(al.check_error().is_ok());
        assert!(al.check_alc_error(AlcDevice::NULL).is_ok());
    }

    #[test]
    fn test_al_error_translated() {
        let al = fake_openal();
        AL_ERROR.with(|e| e.set(sys::AL_INVALID_VALUE));

        match al.check_error() {
            Err(Error::OpenAl { code, message }) => {
                assert_eq!(code, sys::AL_INVALID_VALUE);
                assert_eq!(message, "Invalid Value");
            }
            other => panic!("unexpected result: {:?}", other),
        }
        // The flag is cleared by the poll
        assert!(al.check_error().is_ok());
    }

    #[test]
    fn test_al_error_without_description() {
        let al = fake_openal();
        AL_ERROR.with(|e| e.set(sys::AL_OUT_OF_MEMORY));

        match al.check_error() {
            Err(Error::OpenAl { message, .. }) => assert_eq!(message, UNKNOWN_ERROR),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_alc_error_passes_device() {
        let al = fake_openal();
        ALC_ERROR.with(|e| e.set(sys::ALC_INVALID_DEVICE));
        let device = unsafe { AlcDevice::from_raw(0x4000 as *mut sys::ALCdevice) };

        match al.check_alc_error(device) {
            Err(Error::OpenAlc { code, message }) => {
                assert_eq!(code, sys::ALC_INVALID_DEVICE);
                assert_eq!(message, "Invalid Device");
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(ALC_LAST_DEVICE.with(|d| d.get()), 0x4000);
    }

    #[test]
    fn test_missing_entry_point() {
        let mut symbols = fake_symbols();
        symbols.retain(|(name, _)| *name != "alcGetString");
        let library = FakeLibrary::with_symbols(&symbols);
        let releases = library.release_counter();

        match OpenAl::with_provider(Box::new(library)) {
            Err(Error::MissingCoreFunction(name)) => assert_eq!(name, "alcGetString"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(releases.get(), 1);
    }

    #[test]
    fn test_drop_releases_provider() {
        let library = FakeLibrary::with_symbols(&fake_symbols());
        let releases = library.release_counter();
        let al = OpenAl::with_provider(Box::new(library)).unwrap();
        drop(al);
        assert_eq!(releases.get(), 1);
    }

    #[test]
    fn test_load_missing_library() {
        let config = Config::new().openal_library_name(Some("dynbind_missing_openal".into()));
        assert!(matches!(OpenAl::load(&config), Err(Error::LibraryLoad { .. })));
    }
}
