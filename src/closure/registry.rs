use crate::closure::ClosurePrimitive;
use anyhow::{bail, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Process-scoped name → primitive table.
///
/// Built once during single-threaded renderer startup, then shared read-only
/// (e.g. behind an `Arc`) by every shading task; lookups are plain map reads
/// with no locking. Mutating the registry after shading has started is a
/// caller error this type does not defend against.
#[derive(Default)]
pub struct ClosureRegistry {
    prims: HashMap<String, Arc<ClosurePrimitive>>,
}

impl ClosureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a primitive under its name and returns the shared handle.
    /// Duplicate names are rejected: silently replacing a primitive would
    /// make shader behavior depend on registration order.
    pub fn register(&mut self, prim: ClosurePrimitive) -> Result<Arc<ClosurePrimitive>> {
        if self.prims.contains_key(prim.name()) {
            bail!("closure primitive {:?} is already registered", prim.name());
        }
        debug!(
            name = %prim.name(),
            category = ?prim.category(),
            argcodes = %prim.argcodes(),
            "registered closure primitive"
        );
        let prim = Arc::new(prim);
        self.prims.insert(prim.name().to_owned(), Arc::clone(&prim));
        Ok(prim)
    }

    pub fn lookup(&self, name: &str) -> Option<&Arc<ClosurePrimitive>> {
        self.prims.get(name)
    }

    /// Like [`lookup`], but an unregistered name is an error — fatal to the
    /// shader evaluation that requested it, not to the process.
    ///
    /// [`lookup`]: ClosureRegistry::lookup
    pub fn get(&self, name: &str) -> Result<&Arc<ClosurePrimitive>> {
        match self.prims.get(name) {
            Some(prim) => Ok(prim),
            None => bail!("no closure primitive registered under {:?}", name),
        }
    }

    pub fn len(&self) -> usize {
        self.prims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prims.is_empty()
    }
}
