// Exit codes for scripted callers
use tinytensor_common::TinyTensorError;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_GENERIC_FAIL: i32 = 1;
pub const EXIT_ALLOCATION_FAIL: i32 = 2;
pub const EXIT_CONFIG_FAIL: i32 = 3;

/// Pick the exit code for the first tinytensor error in the chain.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.chain().find_map(|cause| cause.downcast_ref::<TinyTensorError>()) {
        Some(e) if e.is_allocation() => EXIT_ALLOCATION_FAIL,
        Some(TinyTensorError::Config(_)) => EXIT_CONFIG_FAIL,
        _ => EXIT_GENERIC_FAIL,
    }
}
