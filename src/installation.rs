//! Installation geometry, generated by `build.rs` from `installation.toml`
include!(concat!(env!("OUT_DIR"), "/installation.rs"));
