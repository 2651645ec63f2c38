use serde::{Deserialize, Serialize};

/// Syntactic category of an indexed construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructKind {
    Function,
    Class,
    Section,
}

impl ConstructKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstructKind::Function => "function",
            ConstructKind::Class => "class",
            ConstructKind::Section => "section",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "class" => ConstructKind::Class,
            "section" => ConstructKind::Section,
            _ => ConstructKind::Function,
        }
    }
}

impl std::fmt::Display for ConstructKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity of a stored construct: the (filename, span) triple is unique
/// within the store and drives deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstructKey {
    pub filename: String,
    pub line_start: u32,
    pub line_end: u32,
}

impl ConstructKey {
    pub fn new(filename: impl Into<String>, line_start: u32, line_end: u32) -> Self {
        Self {
            filename: filename.into(),
            line_start,
            line_end,
        }
    }

    /// Store primary key derived from the identity tuple, never from
    /// insertion order.
    pub fn record_id(&self) -> String {
        format!("{}:{}-{}", self.filename, self.line_start, self.line_end)
    }
}

impl std::fmt::Display for ConstructKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.record_id())
    }
}

/// A logical source-code unit (function, class, or documentation section)
/// extracted from a version-controlled tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConstruct {
    filename: String,
    commit: String,
    code: String,
    kind: ConstructKind,
    name: String,
    line_start: u32,
    line_end: u32,
    embedding: Option<Vec<f32>>,
    created_at: i64,
    updated_at: i64,
}

impl SourceConstruct {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        filename: String,
        commit: String,
        kind: ConstructKind,
        name: String,
        line_start: u32,
        line_end: u32,
        code: String,
    ) -> Self {
        let now = current_timestamp();
        Self {
            filename,
            commit,
            code,
            kind,
            name,
            line_start,
            line_end,
            embedding: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstitutes from persisted data (used by store adapters).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        filename: String,
        commit: String,
        kind: ConstructKind,
        name: String,
        line_start: u32,
        line_end: u32,
        code: String,
        embedding: Option<Vec<f32>>,
        created_at: i64,
        updated_at: i64,
    ) -> Self {
        Self {
            filename,
            commit,
            code,
            kind,
            name,
            line_start,
            line_end,
            embedding,
            created_at,
            updated_at,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn commit(&self) -> &str {
        &self.commit
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn kind(&self) -> ConstructKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn line_start(&self) -> u32 {
        self.line_start
    }

    pub fn line_end(&self) -> u32 {
        self.line_end
    }

    pub fn embedding(&self) -> Option<&[f32]> {
        self.embedding.as_deref()
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn updated_at(&self) -> i64 {
        self.updated_at
    }

    pub fn key(&self) -> ConstructKey {
        ConstructKey::new(self.filename.clone(), self.line_start, self.line_end)
    }

    pub fn with_embedding(mut self, vector: Vec<f32>) -> Self {
        self.embedding = Some(vector);
        self
    }

    /// Carries the creation timestamp of a superseded record so an
    /// in-place update keeps its original insertion time.
    pub fn preserving_created_at(mut self, created_at: i64) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn location(&self) -> String {
        format!("{}:{}-{}", self.filename, self.line_start, self.line_end)
    }
}

pub(crate) fn current_timestamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// SHA-256 digest of construct text, used for text-equality checks.
pub fn content_digest(content: &str) -> String {
    use sha2::{Digest, Sha256};
    let hash = Sha256::digest(content.as_bytes());
    format!("{:x}", hash)
}
