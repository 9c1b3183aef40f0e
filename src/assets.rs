//! Symbol registry and texture lookup
//!
//! Symbol names from the config are resolved to compact [`SymbolId`]s once,
//! at load time. Reels and renderers only ever deal in ids.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{AssetError, ConfigError};

/// Most distinct symbols a registry can hold
pub const MAX_SYMBOLS: usize = u16::MAX as usize + 1;

/// Index of a symbol in the [`SymbolRegistry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolId(pub u16);

/// Name <-> id table for the machine's symbol set
#[derive(Debug, Clone, Default)]
pub struct SymbolRegistry {
    names: Vec<String>,
    by_name: HashMap<String, SymbolId>,
}

impl SymbolRegistry {
    /// Build a registry from symbol names. Duplicates collapse onto the first id.
    pub fn from_names<I, S>(names: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self::default();
        for name in names {
            registry.register(name.into())?;
        }
        if registry.is_empty() {
            return Err(ConfigError::EmptySymbolSet);
        }
        Ok(registry)
    }

    fn register(&mut self, name: String) -> Result<SymbolId, ConfigError> {
        if let Some(&id) = self.by_name.get(&name) {
            return Ok(id);
        }
        let id = u16::try_from(self.names.len())
            .map(SymbolId)
            .map_err(|_| ConfigError::TooManySymbols { max: MAX_SYMBOLS })?;
        self.by_name.insert(name.clone(), id);
        self.names.push(name);
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn id(&self, name: &str) -> Option<SymbolId> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, id: SymbolId) -> Option<&str> {
        self.names.get(id.0 as usize).map(String::as_str)
    }

    /// All ids in registration order
    pub fn ids(&self) -> impl Iterator<Item = SymbolId> + '_ {
        // `register` caps the table at MAX_SYMBOLS, so every index fits
        (0..self.names.len()).map(|i| SymbolId(i as u16))
    }
}

/// Opaque handle to a drawable resource owned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Resolves symbols to drawable resources
pub trait TextureProvider {
    fn texture(&self, id: SymbolId) -> Result<TextureHandle, AssetError>;
}

/// Texture table preloaded from the registry.
///
/// Symbols marked missing fail to resolve, which is how a host reports a
/// texture that did not load.
#[derive(Debug, Clone, Default)]
pub struct TextureTable {
    handles: HashMap<SymbolId, TextureHandle>,
    failures: HashMap<SymbolId, String>,
}

impl TextureTable {
    /// One handle per registered symbol, numbered in registration order
    pub fn preload(registry: &SymbolRegistry) -> Self {
        let handles = registry.ids().map(|id| (id, TextureHandle(id.0 as u32))).collect();
        log::info!("Preloaded {} symbol textures", registry.len());
        Self {
            handles,
            failures: HashMap::new(),
        }
    }

    /// Record a load failure for `id`
    pub fn mark_missing(&mut self, id: SymbolId, name: impl Into<String>) {
        self.handles.remove(&id);
        self.failures.insert(id, name.into());
    }
}

impl TextureProvider for TextureTable {
    fn texture(&self, id: SymbolId) -> Result<TextureHandle, AssetError> {
        if let Some(handle) = self.handles.get(&id) {
            return Ok(*handle);
        }
        match self.failures.get(&id) {
            Some(name) => Err(AssetError::Load {
                name: name.clone(),
                reason: "texture not loaded".to_string(),
            }),
            None => Err(AssetError::UnknownSymbol(id.0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_resolves_names_once() {
        let registry = SymbolRegistry::from_names(["cherry", "bell", "cherry", "seven"]).unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.id("cherry"), Some(SymbolId(0)));
        assert_eq!(registry.id("seven"), Some(SymbolId(2)));
        assert_eq!(registry.name(SymbolId(1)), Some("bell"));
        assert_eq!(registry.id("lemon"), None);
    }

    #[test]
    fn test_empty_registry_rejected() {
        let names: [&str; 0] = [];
        assert!(matches!(
            SymbolRegistry::from_names(names),
            Err(ConfigError::EmptySymbolSet)
        ));
    }

    #[test]
    fn test_registry_caps_distinct_symbols() {
        let full = SymbolRegistry::from_names((0..MAX_SYMBOLS).map(|i| i.to_string())).unwrap();
        assert_eq!(full.len(), MAX_SYMBOLS);
        assert_eq!(full.id("65535"), Some(SymbolId(u16::MAX)));

        let over = SymbolRegistry::from_names((0..=MAX_SYMBOLS).map(|i| i.to_string()));
        assert!(matches!(over, Err(ConfigError::TooManySymbols { max: MAX_SYMBOLS })));

        // Repeats do not count against the limit
        let repeats = (0..MAX_SYMBOLS).map(|i| i.to_string()).chain(["0".to_string()]);
        assert!(SymbolRegistry::from_names(repeats).is_ok());
    }

    #[test]
    fn test_texture_table_failures() {
        let registry = SymbolRegistry::from_names(["a", "b"]).unwrap();
        let mut table = TextureTable::preload(&registry);
        assert_eq!(table.texture(SymbolId(1)).unwrap(), TextureHandle(1));

        table.mark_missing(SymbolId(1), "b");
        assert!(matches!(table.texture(SymbolId(1)), Err(AssetError::Load { .. })));
        assert!(matches!(table.texture(SymbolId(7)), Err(AssetError::UnknownSymbol(7))));
    }
}
