use serde::{Deserialize, Serialize};

use super::construct::current_timestamp;

/// Whether the whole module or named members are imported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImportType {
    #[serde(rename = "import")]
    Direct,
    #[serde(rename = "from-import")]
    FromImport,
}

impl ImportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportType::Direct => "import",
            ImportType::FromImport => "from-import",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "from-import" => ImportType::FromImport,
            _ => ImportType::Direct,
        }
    }
}

impl std::fmt::Display for ImportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity of a stored import: (filename, module_name) is unique within
/// the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportKey {
    pub filename: String,
    pub module_name: String,
}

impl ImportKey {
    pub fn new(filename: impl Into<String>, module_name: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            module_name: module_name.into(),
        }
    }

    pub fn record_id(&self) -> String {
        format!("{}::{}", self.filename, self.module_name)
    }
}

/// A module/package reference observed in a source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReference {
    filename: String,
    repository: String,
    module_name: String,
    import_type: ImportType,
    created_at: i64,
    updated_at: i64,
}

impl ImportReference {
    pub fn new(
        filename: String,
        repository: String,
        module_name: String,
        import_type: ImportType,
    ) -> Self {
        let now = current_timestamp();
        Self {
            filename,
            repository,
            module_name,
            import_type,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstitutes from persisted data (used by store adapters).
    pub fn reconstitute(
        filename: String,
        repository: String,
        module_name: String,
        import_type: ImportType,
        created_at: i64,
        updated_at: i64,
    ) -> Self {
        Self {
            filename,
            repository,
            module_name,
            import_type,
            created_at,
            updated_at,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn import_type(&self) -> ImportType {
        self.import_type
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn updated_at(&self) -> i64 {
        self.updated_at
    }

    pub fn key(&self) -> ImportKey {
        ImportKey::new(self.filename.clone(), self.module_name.clone())
    }

    pub fn preserving_created_at(mut self, created_at: i64) -> Self {
        self.created_at = created_at;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_key_record_id() {
        let key = ImportKey::new("main.py", "os.path");
        assert_eq!(key.record_id(), "main.py::os.path");
    }

    #[test]
    fn test_import_type_wire_names() {
        assert_eq!(ImportType::Direct.as_str(), "import");
        assert_eq!(ImportType::FromImport.as_str(), "from-import");
        assert_eq!(ImportType::from_str("from-import"), ImportType::FromImport);
        assert_eq!(ImportType::from_str("import"), ImportType::Direct);
    }
}
