use super::imports::SymbolId;
use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq)]
pub struct NamedExport {
    pub local: SymbolId,
    pub type_only: bool,
}

/// Export table of one file. Named exports keep insertion order.
#[derive(Debug, Clone, Default)]
pub struct ExportManager {
    default: Option<SymbolId>,
    named: IndexMap<String, NamedExport>,
}

impl ExportManager {
    pub fn set_default(&mut self, id: impl Into<SymbolId>) {
        self.default = Some(id.into());
    }

    pub fn default_export(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Adds `export { local as exported }`; a second export under the same
    /// name replaces the first.
    pub fn add_named(&mut self, exported: impl Into<String>, type_only: bool, local: impl Into<SymbolId>) {
        self.named.insert(
            exported.into(),
            NamedExport {
                local: local.into(),
                type_only,
            },
        );
    }

    pub fn named(&self) -> impl Iterator<Item = (&str, &NamedExport)> {
        self.named.iter().map(|(name, export)| (name.as_str(), export))
    }

    pub fn is_empty(&self) -> bool {
        self.default.is_none() && self.named.is_empty()
    }
}
