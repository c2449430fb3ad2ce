pub mod api;
pub mod assignment;
pub mod character;
pub mod config;
pub mod consts;
pub mod error;
pub mod loader;
pub mod mods;
pub mod optimizer;
pub mod scorer;
pub mod stats;
pub mod synth;
// cmd and reports belong to the binary (see main.rs).
