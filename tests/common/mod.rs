#![allow(dead_code)]

pub mod mocks;
pub mod product;

pub use mocks::{MockFile, MockMessages};
pub use product::{FIELDS, HEADERS, Product};

/// Installs a test logger once, honoring `RUST_LOG`.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
