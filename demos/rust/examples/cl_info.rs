//! Print the OpenCL platforms and what each of them supports
//!
//! Loads the OpenCL ICD loader, reports the extension lookup strategy it
//! picked, then lists every platform with its version, extension tags and
//! the function tables that resolved.
//!
//! Run: cargo run --example cl_info
//! Override the library with DYNBIND_LIBRARY_NAME_OPENCL=/path/to/libOpenCL.so

use dynbind::opencl::{Cl, PlatformInfo};
use dynbind::{Config, Result};

const TABLES: [&str; 7] = [
    "OpenCL10",
    "OpenCL11",
    "OpenCL12",
    "OpenCL20",
    "OpenCL10GL",
    "OpenCL12GL",
    "cl_khr_gl_sharing",
];

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("dynbind=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .init();
}

fn main() -> Result<()> {
    init_tracing();

    println!("OpenCL Platform Info (Rust)");
    println!("===========================\n");

    let config = Config::from_env();
    println!("Library: {}", config.opencl_library());

    let cl = Cl::global();
    let session = cl.create(&config)?;
    println!("Extension lookup: {:?}", session.strategy());
    println!("ICD tables: {:?}\n", session.icd().extensions().sorted());

    let platforms = session.platforms();
    tracing::info!(count = platforms.len(), "enumerated OpenCL platforms");
    if platforms.is_empty() {
        println!("No platforms installed.");
    }

    for (index, platform) in platforms.into_iter().enumerate() {
        let info = |param| {
            session
                .platform_info(platform, param)
                .unwrap_or_else(|| "<unavailable>".to_string())
        };
        println!("Platform {}: {}", index, info(PlatformInfo::Name));
        println!("  Vendor:  {}", info(PlatformInfo::Vendor));
        println!("  Version: {}", info(PlatformInfo::Version));
        println!("  Profile: {}", info(PlatformInfo::Profile));

        match session.platform_capabilities(platform) {
            Ok(caps) => {
                if let Some(version) = caps.version() {
                    println!("  Parsed:  {}.{}", version.major, version.minor);
                }
                println!("  Extensions: {}", caps.extensions().len());
                for tag in TABLES {
                    let state = match (caps.contains(tag), caps.table(tag)) {
                        (true, Some(table)) => format!("{} functions", table.len()),
                        (true, None) => "advertised, incomplete".to_string(),
                        (false, _) => "-".to_string(),
                    };
                    println!("    {:<18} {}", tag, state);
                }
            }
            Err(e) => println!("  Capabilities unavailable: {}", e),
        }
        println!();
    }

    cl.destroy();
    Ok(())
}
