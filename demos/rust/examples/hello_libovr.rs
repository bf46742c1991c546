//! Initialize the LibOVR runtime and print its version
//!
//! Runtime log messages are routed through a dynbind log handler and
//! printed with their severity.
//!
//! Run: cargo run --example hello_libovr

use dynbind::ovr::{sdk_version, InitFlags, LibOvr};
use dynbind::{clear_log_handler, set_log_handler, Config, LogLevel, Result};

fn main() -> Result<()> {
    println!("Hello LibOVR (Rust)");
    println!("===================\n");

    set_log_handler(|level: LogLevel, msg: &str| {
        println!("[{}] {}", level, msg);
    });

    let config = Config::from_env();
    println!("Runtime: {}", config.libovr_library());
    println!(
        "Bindings SDK version: {} (build {})",
        sdk_version(),
        dynbind_sys::OVR_BUILD_NUMBER
    );

    let ovr = LibOvr::load(&config)?;
    match ovr.initialize(InitFlags::DEBUG | InitFlags::REQUEST_VERSION) {
        Ok(()) => println!("ovr_Initialize = ok"),
        Err(e) => {
            println!("ovr_Initialize failed: {}", e);
            clear_log_handler();
            return Err(e);
        }
    }

    println!(
        "ovr_GetVersionString = {}",
        ovr.version_string().as_deref().unwrap_or("<none>")
    );

    ovr.shutdown();
    clear_log_handler();
    Ok(())
}
