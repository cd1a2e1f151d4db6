//! Codec registry keyed by archive extension and implementation name
//!
//! Lets callers swap in alternate backends (for example a system codec
//! registered under `"system"`) without touching anything else.

use crate::config::CompressionConfig;
use crate::error::CompressError;
use crate::pipeline::{BwtCodec, Codec, Lz77Codec};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

pub const DEFAULT_IMPLEMENTATION: &str = "custom";

pub type CodecFactory = Box<dyn Fn(&CompressionConfig) -> Box<dyn Codec> + Send + Sync>;

#[derive(Default)]
pub struct CodecRegistry {
    factories: BTreeMap<String, BTreeMap<String, CodecFactory>>,
}

fn normalize_extension(extension: &str) -> String {
    let lower = extension.to_lowercase();
    if lower.starts_with('.') {
        lower
    } else {
        format!(".{lower}")
    }
}

fn normalize_implementation(implementation: &str) -> String {
    if implementation.is_empty() {
        DEFAULT_IMPLEMENTATION.to_string()
    } else {
        implementation.to_lowercase()
    }
}

impl CodecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in BWT and LZ77 pipelines.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(".bwt", DEFAULT_IMPLEMENTATION, |config| {
            Box::new(BwtCodec::from_config(config))
        });
        registry.register(".lz77", DEFAULT_IMPLEMENTATION, |config| {
            Box::new(Lz77Codec::from_config(config))
        });
        registry
    }

    /// Register or replace the factory for `(extension, implementation)`.
    pub fn register<F>(&mut self, extension: &str, implementation: &str, factory: F)
    where
        F: Fn(&CompressionConfig) -> Box<dyn Codec> + Send + Sync + 'static,
    {
        self.factories
            .entry(normalize_extension(extension))
            .or_default()
            .insert(normalize_implementation(implementation), Box::new(factory));
    }

    pub fn codec(
        &self,
        extension: &str,
        implementation: &str,
        config: &CompressionConfig,
    ) -> Result<Box<dyn Codec>, CompressError> {
        let extension = normalize_extension(extension);
        let implementation = normalize_implementation(implementation);

        let implementations = self.factories.get(&extension).ok_or_else(|| {
            CompressError::UnsupportedExtension {
                extension: extension.clone(),
                supported: self.supported_extensions().join(", "),
            }
        })?;
        let factory = implementations.get(&implementation).ok_or_else(|| {
            CompressError::UnknownImplementation {
                extension: extension.clone(),
                implementation: implementation.clone(),
                available: implementations.keys().cloned().collect::<Vec<_>>().join(", "),
            }
        })?;

        debug!(%extension, %implementation, "resolved codec");
        Ok(factory(config))
    }

    /// Pick a codec from the extension of `path`.
    pub fn codec_for_path(
        &self,
        path: &Path,
        implementation: &str,
        config: &CompressionConfig,
    ) -> Result<Box<dyn Codec>, CompressError> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.codec(&extension, implementation, config)
    }

    pub fn supported_extensions(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    pub fn available_implementations(&self, extension: &str) -> Vec<String> {
        self.factories
            .get(&normalize_extension(extension))
            .map(|impls| impls.keys().cloned().collect())
            .unwrap_or_default()
    }
}
