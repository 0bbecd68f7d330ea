//! Guest module published as `/wasm/main.wasm`.
//!
//! Exposes the raw ABI described in [`gossi::abi`]. Symbols are only
//! unmangled on wasm32 so the rlib stays linkable (and testable) natively.
#![allow(clippy::missing_safety_doc)]

use std::cell::RefCell;

use gossi::abi::{RUN_ERR_TOO_LARGE, RUN_ERR_UTF8};

thread_local! {
    static RESULT: RefCell<Vec<u8>> = const { RefCell::new(Vec::new()) };
}

#[cfg(target_arch = "wasm32")]
mod host {
    #[link(wasm_import_module = "env")]
    extern "C" {
        fn host_log(ptr: *const u8, len: usize);
    }

    pub(crate) fn log(msg: &str) {
        // SAFETY: the host only reads `len` bytes at `ptr` during the call.
        unsafe { host_log(msg.as_ptr(), msg.len()) }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod host {
    use std::cell::RefCell;

    thread_local! {
        static LINES: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
    }

    pub(crate) fn log(msg: &str) {
        LINES.with(|lines| lines.borrow_mut().push(msg.to_owned()));
    }

    #[cfg(test)]
    pub(crate) fn take_lines() -> Vec<String> {
        LINES.with(|lines| std::mem::take(&mut *lines.borrow_mut()))
    }
}

/// Allocates `len` bytes for the host to write an argument into.
#[cfg_attr(target_arch = "wasm32", no_mangle)]
pub extern "C" fn alloc(len: usize) -> *mut u8 {
    let mut buf = Vec::<u8>::with_capacity(len);
    let ptr = buf.as_mut_ptr();
    std::mem::forget(buf);
    ptr
}

/// Releases a buffer previously returned by [`alloc`] with the same `len`.
#[cfg_attr(target_arch = "wasm32", no_mangle)]
pub unsafe extern "C" fn dealloc(ptr: *mut u8, len: usize) {
    if ptr.is_null() {
        return;
    }
    drop(Vec::from_raw_parts(ptr, 0, len));
}

/// Begins execution. Called once by the host after instantiation.
#[cfg_attr(target_arch = "wasm32", no_mangle)]
pub extern "C" fn start() {
    host::log(&format!(
        "gossi guest started ({} programs)",
        gossi::Program::KNOWN.len()
    ));
}

/// Runs a program; returns the result length or a negative status.
///
/// The result stays readable at [`result_ptr`] until the next call.
#[cfg_attr(target_arch = "wasm32", no_mangle)]
pub unsafe extern "C" fn run(
    prog_ptr: *const u8,
    prog_len: usize,
    data_ptr: *const u8,
    data_len: usize,
) -> i32 {
    let Some(program) = read_str(prog_ptr, prog_len) else {
        return RUN_ERR_UTF8;
    };
    let Some(data) = read_str(data_ptr, data_len) else {
        return RUN_ERR_UTF8;
    };

    let out = gossi::run(program, data);
    let Ok(len) = i32::try_from(out.len()) else {
        return RUN_ERR_TOO_LARGE;
    };
    RESULT.with(|result| *result.borrow_mut() = out.into_bytes());
    len
}

/// Address of the buffer holding the last result.
#[cfg_attr(target_arch = "wasm32", no_mangle)]
pub extern "C" fn result_ptr() -> *const u8 {
    RESULT.with(|result| result.borrow().as_ptr())
}

unsafe fn read_str<'a>(ptr: *const u8, len: usize) -> Option<&'a str> {
    if len == 0 {
        return Some("");
    }
    if ptr.is_null() {
        return None;
    }
    // SAFETY: the host wrote `len` bytes at `ptr` via `alloc`.
    let bytes = std::slice::from_raw_parts(ptr, len);
    std::str::from_utf8(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(program: &str, data: &[u8]) -> Result<String, i32> {
        let status =
            unsafe { run(program.as_ptr(), program.len(), data.as_ptr(), data.len()) };
        if status < 0 {
            return Err(status);
        }
        let bytes = unsafe { std::slice::from_raw_parts(result_ptr(), status as usize) };
        Ok(String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[test]
    fn run_writes_result_buffer() {
        assert_eq!(call("uppercase", b"abc").unwrap(), "ABC by gossi");
        assert_eq!(call("echo", b"").unwrap(), " by gossi");
    }

    #[test]
    fn invalid_utf8_reports_status() {
        assert_eq!(call("echo", &[0xff, 0xfe]), Err(RUN_ERR_UTF8));
    }

    #[test]
    fn result_is_replaced_by_next_call() {
        call("echo", b"first").unwrap();
        assert_eq!(call("lowercase", b"SECOND").unwrap(), "second by gossi");
    }

    #[test]
    fn alloc_roundtrip_holds_bytes() {
        let ptr = alloc(4);
        unsafe {
            std::ptr::copy_nonoverlapping(b"echo".as_ptr(), ptr, 4);
            let status = run(ptr, 4, b"x".as_ptr(), 1);
            assert_eq!(status, 10);
            dealloc(ptr, 4);
        }
    }

    #[test]
    fn start_logs_through_host() {
        start();
        let lines = host::take_lines();
        assert_eq!(lines, vec!["gossi guest started (3 programs)".to_string()]);
    }
}
