use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};

use crate::detect::backend::DetectorBackend;
use crate::detect::result::Detection;

/// Name-keyed registry of detector backends.
///
/// Backends are wrapped in `Mutex` because `DetectorBackend::detect`
/// takes `&mut self`. The first registered backend becomes the
/// default; deployments select one by config name.
pub struct BackendRegistry {
    backends: HashMap<String, Arc<Mutex<dyn DetectorBackend>>>,
    default_name: Option<String>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self {
            backends: HashMap::new(),
            default_name: None,
        }
    }

    /// Register a backend. The first registered backend becomes the
    /// default.
    pub fn register<B: DetectorBackend + 'static>(&mut self, backend: B) {
        let name = backend.name().to_string();
        if self.default_name.is_none() {
            self.default_name = Some(name.clone());
        }
        self.backends.insert(name, Arc::new(Mutex::new(backend)));
    }

    /// Set the default backend by name.
    pub fn set_default(&mut self, name: &str) -> Result<()> {
        if !self.backends.contains_key(name) {
            return Err(anyhow!("backend '{}' not registered", name));
        }
        self.default_name = Some(name.to_string());
        Ok(())
    }

    /// Get a backend by name.
    pub fn get(&self, name: &str) -> Option<Arc<Mutex<dyn DetectorBackend>>> {
        self.backends.get(name).cloned()
    }

    /// Resolve a backend by name, falling back to the default.
    pub fn select(&self, name: Option<&str>) -> Result<Arc<Mutex<dyn DetectorBackend>>> {
        match name {
            Some(name) => self
                .get(name)
                .ok_or_else(|| anyhow!("backend '{}' not registered", name)),
            None => self
                .default_name
                .as_ref()
                .and_then(|name| self.get(name))
                .ok_or_else(|| anyhow!("no detector backend registered")),
        }
    }

    /// List registered backend names.
    pub fn list(&self) -> Vec<String> {
        self.backends.keys().cloned().collect()
    }

    /// Run detection on the named (or default) backend.
    pub fn detect(
        &self,
        name: Option<&str>,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<Detection>> {
        let backend = self.select(name)?;
        let mut guard = backend
            .lock()
            .map_err(|_| anyhow!("backend lock poisoned"))?;
        guard.detect(pixels, width, height)
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::backends::StubBackend;

    #[test]
    fn first_registered_backend_is_default() {
        let mut registry = BackendRegistry::new();
        registry.register(StubBackend::new());
        let backend = registry.select(None).unwrap();
        assert_eq!(backend.lock().unwrap().name(), "stub");
    }

    #[test]
    fn select_by_unknown_name_fails() {
        let mut registry = BackendRegistry::new();
        registry.register(StubBackend::new());
        assert!(registry.select(Some("tract")).is_err());
        assert!(registry.set_default("tract").is_err());
    }

    #[test]
    fn empty_registry_has_no_default() {
        let registry = BackendRegistry::new();
        assert!(registry.select(None).is_err());
        assert!(registry.list().is_empty());
    }

    #[test]
    fn detect_routes_to_named_backend() {
        let mut registry = BackendRegistry::new();
        registry.register(StubBackend::new());
        let detections = registry.detect(Some("stub"), &[], 0, 0).unwrap();
        assert!(detections.is_empty());
    }
}
