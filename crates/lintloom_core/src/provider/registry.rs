//! Engine handle memoization.
//!
//! Handles are shared across plugin attachments whose identity key and
//! options fingerprint to the same value. The fingerprint hashes the
//! canonical JSON rendering of both, with object keys sorted recursively,
//! so option-map key order never splits a pool.

use std::collections::HashMap;
use std::sync::Arc;

use lintloom_engine::EngineFactory;
use parking_lot::Mutex;
use tracing::debug;

use super::handle::EngineHandle;
use crate::error::PluginError;
use crate::options::LintOptions;
use crate::resolver::ResolvedConfig;

/// Registry of memoized engine handles.
///
/// Registries carry no ambient state: callers create one and share it
/// explicitly, so independent registries can coexist in one process.
#[derive(Default)]
pub struct EngineRegistry {
    handles: Mutex<HashMap<String, Arc<EngineHandle>>>,
}

impl EngineRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handle memoized for this key and option set,
    /// constructing it on first use.
    ///
    /// Construction failures are not cached; a later acquire with a
    /// working engine succeeds.
    pub fn acquire(
        &self,
        key: &str,
        config: &ResolvedConfig,
        factory: Arc<dyn EngineFactory>,
    ) -> Result<Arc<EngineHandle>, PluginError> {
        let fingerprint = fingerprint(key, &config.options)?;
        let mut handles = self.handles.lock();
        if let Some(handle) = handles.get(&fingerprint) {
            debug!(%fingerprint, "reusing lint engine handle");
            return Ok(handle.clone());
        }

        let threads = config.options.threads.resolve();
        let handle = Arc::new(EngineHandle::new(
            threads,
            factory,
            config.options.engine_options(),
        )?);
        debug!(%fingerprint, threads, "constructed lint engine handle");
        handles.insert(fingerprint, handle.clone());
        Ok(handle)
    }

    /// Number of memoized handles.
    pub fn len(&self) -> usize {
        self.handles.lock().len()
    }

    /// Whether the registry holds no handles.
    pub fn is_empty(&self) -> bool {
        self.handles.lock().is_empty()
    }
}

/// Computes the memoization fingerprint for an identity key and options.
///
/// `serde_json` object maps are ordered, so one pass through `Value`
/// canonicalizes nested configuration regardless of insertion order.
fn fingerprint(key: &str, options: &LintOptions) -> Result<String, PluginError> {
    let options_value = serde_json::to_value(options)
        .map_err(|e| PluginError::config(format!("Failed to serialize options: {e}")))?;
    let mut payload = serde_json::Map::new();
    payload.insert("key".to_string(), serde_json::Value::String(key.to_string()));
    payload.insert("options".to_string(), options_value);
    let canonical = serde_json::Value::Object(payload).to_string();
    Ok(blake3::hash(canonical.as_bytes()).to_hex().to_string())
}
