use std::env;

fn main() {
    let version =
        env::var("JIABAO_VERSION").unwrap_or_else(|_| env::var("CARGO_PKG_VERSION").unwrap());
    println!("cargo:rustc-env=JIABAO_VERSION={version}");
    println!("cargo:rerun-if-env-changed=JIABAO_VERSION");
}
