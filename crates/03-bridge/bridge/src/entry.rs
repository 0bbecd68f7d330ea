use crate::EntryError;

/// The single routine a loaded module exposes to the host.
///
/// `program` and `data` are opaque to the bridge and passed through as-is.
pub trait EntryPoint {
    /// Invokes the routine.
    fn call(&self, program: &str, data: &str) -> Result<String, EntryError>;
}

impl<F> EntryPoint for F
where
    F: Fn(&str, &str) -> Result<String, EntryError>,
{
    fn call(&self, program: &str, data: &str) -> Result<String, EntryError> {
        self(program, data)
    }
}
