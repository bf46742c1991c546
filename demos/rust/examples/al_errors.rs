//! Translate OpenAL error codes into Rust errors
//!
//! Loads OpenAL, checks the (empty) error state, then prints the driver's
//! description for each AL and ALC error code.
//!
//! Run: cargo run --example al_errors

use dynbind::{AlcDevice, Config, OpenAl, Result};
use dynbind_sys as sys;

const AL_ERRORS: [(sys::ALenum, &str); 5] = [
    (sys::AL_INVALID_NAME, "AL_INVALID_NAME"),
    (sys::AL_INVALID_ENUM, "AL_INVALID_ENUM"),
    (sys::AL_INVALID_VALUE, "AL_INVALID_VALUE"),
    (sys::AL_INVALID_OPERATION, "AL_INVALID_OPERATION"),
    (sys::AL_OUT_OF_MEMORY, "AL_OUT_OF_MEMORY"),
];

const ALC_ERRORS: [(sys::ALCenum, &str); 5] = [
    (sys::ALC_INVALID_DEVICE, "ALC_INVALID_DEVICE"),
    (sys::ALC_INVALID_CONTEXT, "ALC_INVALID_CONTEXT"),
    (sys::ALC_INVALID_ENUM, "ALC_INVALID_ENUM"),
    (sys::ALC_INVALID_VALUE, "ALC_INVALID_VALUE"),
    (sys::ALC_OUT_OF_MEMORY, "ALC_OUT_OF_MEMORY"),
];

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("dynbind=info")),
        )
        .init();

    println!("OpenAL Error Translation (Rust)");
    println!("===============================\n");

    let al = OpenAl::load(&Config::from_env())?;

    // No context is current, so this only reports a stale error if any
    match al.check_error() {
        Ok(()) => println!("alGetError: no error pending"),
        Err(e) => println!("alGetError: {}", e),
    }
    match al.check_alc_error(AlcDevice::NULL) {
        Ok(()) => println!("alcGetError: no error pending\n"),
        Err(e) => println!("alcGetError: {}\n", e),
    }

    for (code, name) in AL_ERRORS {
        println!("  {:<22} {:#06x}  {}", name, code, al.error_string(code));
    }
    println!();
    for (code, name) in ALC_ERRORS {
        println!(
            "  {:<22} {:#06x}  {}",
            name,
            code,
            al.alc_error_string(AlcDevice::NULL, code)
        );
    }

    Ok(())
}
