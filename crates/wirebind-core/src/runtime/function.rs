//! Host function values.

use std::fmt;
use std::rc::Rc;

use crate::{Dynamic, Exception};

use super::Runtime;

/// Body of a host function: `(runtime, this, args) -> result`.
pub(crate) type HostFnBody = dyn Fn(&Runtime, &Dynamic, &[Dynamic]) -> Result<Dynamic, Exception>;

pub(crate) struct HostFunction {
    name: String,
    body: Box<HostFnBody>,
}

/// Shared reference to a host function.
///
/// Cloning shares the same function; equality is identity.
#[derive(Clone)]
pub struct FunctionRef(Rc<HostFunction>);

impl FunctionRef {
    pub(crate) fn new(name: String, body: Box<HostFnBody>) -> Self {
        FunctionRef(Rc::new(HostFunction { name, body }))
    }

    /// The name the function was created with.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Check whether two references denote the same function.
    pub fn ptr_eq(&self, other: &FunctionRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn invoke(
        &self,
        runtime: &Runtime,
        this: &Dynamic,
        args: &[Dynamic],
    ) -> Result<Dynamic, Exception> {
        (self.0.body)(runtime, this, args)
    }
}

impl fmt::Debug for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FunctionRef").field(&self.0.name).finish()
    }
}
