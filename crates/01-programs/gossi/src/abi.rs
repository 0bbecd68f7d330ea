//! Names and status codes shared by the guest module and its host.
//!
//! Strings cross the boundary as `(ptr, len)` pairs in guest linear memory.
//! The host allocates argument buffers with [`EXPORT_ALLOC`], calls
//! [`EXPORT_RUN`], reads `len` bytes at [`EXPORT_RESULT_PTR`] and frees the
//! arguments with [`EXPORT_DEALLOC`]. The result buffer stays owned by the
//! guest and is overwritten by the next call.

/// Linear memory export.
pub const EXPORT_MEMORY: &str = "memory";
/// `alloc(len: u32) -> u32`.
pub const EXPORT_ALLOC: &str = "alloc";
/// `dealloc(ptr: u32, len: u32)`.
pub const EXPORT_DEALLOC: &str = "dealloc";
/// `start()`, called once after instantiation.
pub const EXPORT_START: &str = "start";
/// `run(prog_ptr, prog_len, data_ptr, data_len) -> i32`.
pub const EXPORT_RUN: &str = "run";
/// `result_ptr() -> u32`.
pub const EXPORT_RESULT_PTR: &str = "result_ptr";

/// Import module namespace supplied by the host.
pub const IMPORT_MODULE: &str = "env";
/// `host_log(ptr: u32, len: u32)`; the bytes are UTF-8.
pub const IMPORT_LOG: &str = "host_log";

/// Returned by `run` when an argument is not valid UTF-8.
pub const RUN_ERR_UTF8: i32 = -1;
/// Returned by `run` when the result does not fit an `i32` length.
pub const RUN_ERR_TOO_LARGE: i32 = -2;

/// Human readable description of a negative `run` status.
pub fn describe_status(status: i32) -> &'static str {
    match status {
        RUN_ERR_UTF8 => "argument is not valid UTF-8",
        RUN_ERR_TOO_LARGE => "result too large",
        _ => "unknown guest status",
    }
}
