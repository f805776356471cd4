// build.rs - OpenSSL location detection and link configuration
use std::env;
use std::path::Path;
use std::process::Command;

/// Check if the OpenSSL binary reports version 1.1.0 or higher
///
/// The wrappers rely on `X509_STORE_up_ref` and `X509_STORE_CTX_set0_trusted_stack`,
/// which first appeared in 1.1.0.
fn is_openssl_11_or_higher(openssl_bin: &Path) -> bool {
    Command::new(openssl_bin)
        .arg("version")
        .output()
        .ok()
        .and_then(|output| {
            let version = String::from_utf8_lossy(&output.stdout);
            // Parse version string like "OpenSSL 3.0.13 ..."
            version.split_whitespace().nth(1).and_then(|ver_str| {
                let mut parts = ver_str.split('.');
                let major = parts.next()?.parse::<u32>().ok()?;
                let minor = parts.next()?.parse::<u32>().ok()?;
                Some(major > 1 || (major == 1 && minor >= 1))
            })
        })
        .unwrap_or(false)
}

fn main() {
    // Common OpenSSL 3.x installation locations
    let openssl_locations = [
        "/opt/openssl", "/opt/openssl3",
        "/usr/local/openssl", "/usr/local/opt/openssl@3",
        "/opt/homebrew/opt/openssl@3",
    ];

    let openssl_dir = env::var("OPENSSL_DIR").ok().or_else(|| {
        openssl_locations.iter().find_map(|&location| {
            let path = Path::new(location);
            let openssl_bin = path.join("bin").join("openssl");

            if openssl_bin.exists() && is_openssl_11_or_higher(&openssl_bin) {
                println!("cargo:warning=Detected OpenSSL at: {}", location);
                Some(location.to_string())
            } else {
                None
            }
        })
    });

    match &openssl_dir {
        Some(dir) => {
            let lib_dir = Path::new(dir).join("lib");
            let lib64_dir = Path::new(dir).join("lib64");

            for dir in [&lib_dir, &lib64_dir] {
                if dir.exists() {
                    println!("cargo:rustc-link-search=native={}", dir.display());
                    println!("cargo:rustc-link-arg=-Wl,-rpath,{}", dir.display());
                }
            }

            let openssl_bin = Path::new(dir).join("bin").join("openssl");
            if openssl_bin.exists() && !is_openssl_11_or_higher(&openssl_bin) {
                println!("cargo:warning=OpenSSL at {} is older than 1.1.0 and is not supported", dir);
            }
        }
        None => {
            // openssl-sys locates the system library on its own
            println!("cargo:warning=No custom OpenSSL directory found, using system OpenSSL");
        }
    }

    // Some symbols are declared locally rather than through openssl-sys
    println!("cargo:rustc-link-lib=dylib=crypto");

    println!("cargo:rerun-if-env-changed=OPENSSL_DIR");
}
