//! `WebAssembly.instantiateStreaming` loader and the guest entry point.

use std::cell::RefCell;
use std::rc::Rc;

use bridge::{EntryError, EntryPoint, LoadError, LoadFuture, ModuleLoader};
use futures::FutureExt;
use gossi::abi;
use js_sys::{Array, Function, Object, Reflect, Uint8Array, WebAssembly};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

type SharedMemory = Rc<RefCell<Option<WebAssembly::Memory>>>;

/// Fetches the guest with `fetch` and compiles it while streaming.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebModuleLoader;

impl ModuleLoader for WebModuleLoader {
    fn load(&self, url: &str) -> LoadFuture {
        let url = url.to_owned();
        async move {
            instantiate(&url)
                .await
                .map(|entry| Rc::new(entry) as Rc<dyn EntryPoint>)
        }
        .boxed_local()
    }
}

async fn instantiate(url: &str) -> Result<WasmEntry, LoadError> {
    let window = web_sys::window().ok_or_else(|| LoadError::Fetch("no window".into()))?;
    let response = window.fetch_with_str(url);

    let memory: SharedMemory = Rc::default();
    let imports =
        import_object(memory.clone()).map_err(|err| LoadError::Instantiate(describe(&err)))?;

    let source = JsFuture::from(WebAssembly::instantiate_streaming(&response, &imports))
        .await
        .map_err(classify)?;
    let instance: WebAssembly::Instance = Reflect::get(&source, &JsValue::from_str("instance"))
        .ok()
        .and_then(|value| value.dyn_into().ok())
        .ok_or_else(|| LoadError::Instantiate("result has no instance".into()))?;
    let exports = instance.exports();

    let entry = WasmEntry {
        memory: export(&exports, abi::EXPORT_MEMORY)?,
        alloc: export(&exports, abi::EXPORT_ALLOC)?,
        dealloc: export(&exports, abi::EXPORT_DEALLOC)?,
        run: export(&exports, abi::EXPORT_RUN)?,
        result_ptr: export(&exports, abi::EXPORT_RESULT_PTR)?,
    };
    memory.replace(Some(entry.memory.clone()));

    let start: Function = export(&exports, abi::EXPORT_START)?;
    start
        .call0(&JsValue::UNDEFINED)
        .map_err(|err| LoadError::Start(describe(&err)))?;

    log::debug!("instantiated {url}");
    Ok(entry)
}

/// Import object with `env.host_log` routed to the `log` facade.
///
/// The closure is leaked: the instance keeps calling it for the page lifetime.
fn import_object(memory: SharedMemory) -> Result<Object, JsValue> {
    let host_log = Closure::<dyn Fn(u32, u32)>::new(move |ptr: u32, len: u32| {
        let memory = memory.borrow();
        let Some(memory) = memory.as_ref() else {
            log::warn!("guest logged before its memory was exported");
            return;
        };
        match read_string(memory, ptr, len) {
            Ok(line) => log::info!(target: "guest", "{line}"),
            Err(err) => log::warn!("guest log line dropped: {err}"),
        }
    });

    let env = Object::new();
    Reflect::set(&env, &JsValue::from_str(abi::IMPORT_LOG), host_log.as_ref())?;
    host_log.forget();

    let imports = Object::new();
    Reflect::set(&imports, &JsValue::from_str(abi::IMPORT_MODULE), &env)?;
    Ok(imports)
}

fn export<T: JsCast>(exports: &Object, name: &'static str) -> Result<T, LoadError> {
    Reflect::get(exports, &JsValue::from_str(name))
        .ok()
        .filter(|value| !value.is_undefined())
        .and_then(|value| value.dyn_into::<T>().ok())
        .ok_or(LoadError::MissingExport(name))
}

fn classify(err: JsValue) -> LoadError {
    let msg = describe(&err);
    if err.is_instance_of::<WebAssembly::CompileError>() {
        LoadError::Compile(msg)
    } else if err.is_instance_of::<WebAssembly::LinkError>() {
        LoadError::Instantiate(msg)
    } else if err.is_instance_of::<WebAssembly::RuntimeError>() {
        LoadError::Start(msg)
    } else {
        // TypeError: network failure, non-OK status or wrong MIME type.
        LoadError::Fetch(msg)
    }
}

fn describe(err: &JsValue) -> String {
    if let Some(err) = err.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

fn read_string(memory: &WebAssembly::Memory, ptr: u32, len: u32) -> Result<String, EntryError> {
    let view = Uint8Array::new(&memory.buffer());
    let end = ptr
        .checked_add(len)
        .filter(|end| *end <= view.length())
        .ok_or_else(|| EntryError::Host(format!("out-of-bounds read {ptr}+{len}")))?;
    String::from_utf8(view.subarray(ptr, end).to_vec()).map_err(|_| EntryError::InvalidUtf8)
}

fn as_u32(value: JsValue, what: &str) -> Result<u32, EntryError> {
    value
        .as_f64()
        .map(|n| n as i32 as u32)
        .ok_or_else(|| EntryError::Host(format!("{what} returned a non-number")))
}

fn host(err: JsValue) -> EntryError {
    EntryError::Host(describe(&err))
}

#[derive(Clone, Copy)]
struct GuestBuf {
    ptr: u32,
    len: u32,
}

/// Entry point backed by an instantiated guest module.
///
/// Each call copies the arguments into guest memory, invokes `run` and copies
/// the result back out.
pub struct WasmEntry {
    memory: WebAssembly::Memory,
    alloc: Function,
    dealloc: Function,
    run: Function,
    result_ptr: Function,
}

impl WasmEntry {
    fn put(&self, bytes: &[u8]) -> Result<GuestBuf, EntryError> {
        let len = u32::try_from(bytes.len())
            .map_err(|_| EntryError::Host("argument too large".into()))?;
        let ptr = as_u32(
            self.alloc
                .call1(&JsValue::UNDEFINED, &JsValue::from(len))
                .map_err(host)?,
            abi::EXPORT_ALLOC,
        )?;
        if len > 0 {
            // Fresh view: alloc may have grown (and detached) the buffer.
            let view = Uint8Array::new(&self.memory.buffer());
            view.subarray(ptr, ptr + len).copy_from(bytes);
        }
        Ok(GuestBuf { ptr, len })
    }

    fn free(&self, buf: GuestBuf) {
        let freed = self.dealloc.call2(
            &JsValue::UNDEFINED,
            &JsValue::from(buf.ptr),
            &JsValue::from(buf.len),
        );
        if let Err(err) = freed {
            log::warn!("guest dealloc failed: {}", describe(&err));
        }
    }

    fn invoke(&self, program: GuestBuf, data: GuestBuf) -> Result<String, EntryError> {
        let args = Array::of4(
            &JsValue::from(program.ptr),
            &JsValue::from(program.len),
            &JsValue::from(data.ptr),
            &JsValue::from(data.len),
        );
        let status = self
            .run
            .apply(&JsValue::UNDEFINED, &args)
            .map_err(host)?
            .as_f64()
            .map(|n| n as i32)
            .ok_or_else(|| EntryError::Host("run returned a non-number".into()))?;
        if status < 0 {
            return Err(EntryError::Guest {
                status,
                reason: abi::describe_status(status),
            });
        }

        let ptr = as_u32(
            self.result_ptr.call0(&JsValue::UNDEFINED).map_err(host)?,
            abi::EXPORT_RESULT_PTR,
        )?;
        read_string(&self.memory, ptr, status as u32)
    }
}

impl EntryPoint for WasmEntry {
    fn call(&self, program: &str, data: &str) -> Result<String, EntryError> {
        let program = self.put(program.as_bytes())?;
        let data = match self.put(data.as_bytes()) {
            Ok(buf) => buf,
            Err(err) => {
                self.free(program);
                return Err(err);
            }
        };
        let outcome = self.invoke(program, data);
        self.free(program);
        self.free(data);
        outcome
    }
}
