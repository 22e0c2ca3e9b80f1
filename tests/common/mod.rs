#![allow(dead_code)]

use imgops::{ImgHandle, Value};
use tracing_subscriber::EnvFilter;

/// Install a test-writer subscriber once; honours `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn image(value: Value) -> ImgHandle {
    value.as_img().cloned().expect("image result")
}

pub fn float(value: Value) -> f64 {
    value.as_float().expect("float result")
}
