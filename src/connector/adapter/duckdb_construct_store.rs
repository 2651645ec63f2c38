use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use duckdb::{params, Connection};
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::ConstructStore;
use crate::domain::{
    ConstructKey, ConstructKind, DomainError, ImportKey, ImportReference, ImportType,
    SourceConstruct,
};

/// DuckDB-backed document store. Primary keys are derived from the
/// identity tuples, and both tuples additionally carry UNIQUE
/// constraints, so concurrent upserts racing on a key converge on a
/// single row, with `ON CONFLICT` making the last writer win on `updated_at`.
pub struct DuckdbConstructStore {
    conn: Arc<Mutex<Connection>>,
}

impl DuckdbConstructStore {
    pub fn new(db_path: &Path) -> Result<Self, DomainError> {
        let conn = Connection::open(db_path)
            .map_err(|e| DomainError::store(format!("Failed to open DuckDB database: {}", e)))?;
        Self::initialize_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn in_memory() -> Result<Self, DomainError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            DomainError::store(format!("Failed to open DuckDB in-memory DB: {}", e))
        })?;
        Self::initialize_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), DomainError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS constructs (
                id TEXT PRIMARY KEY,
                filename TEXT NOT NULL,
                commit_id TEXT NOT NULL,
                code TEXT NOT NULL,
                kind TEXT NOT NULL,
                name TEXT NOT NULL,
                line_start INTEGER NOT NULL,
                line_end INTEGER NOT NULL,
                embedding TEXT,
                created_at BIGINT NOT NULL,
                updated_at BIGINT NOT NULL,
                UNIQUE (filename, line_start, line_end)
            );
            CREATE TABLE IF NOT EXISTS imports (
                id TEXT PRIMARY KEY,
                filename TEXT NOT NULL,
                repository TEXT NOT NULL,
                module_name TEXT NOT NULL,
                import_type TEXT NOT NULL,
                created_at BIGINT NOT NULL,
                updated_at BIGINT NOT NULL,
                UNIQUE (filename, module_name)
            );
            "#,
        )
        .map_err(|e| DomainError::store(format!("Failed to initialize schema: {}", e)))?;

        debug!("DuckDB construct schema initialized");
        Ok(())
    }

    fn serialize_embedding(embedding: Option<&[f32]>) -> Option<String> {
        embedding.and_then(|vector| serde_json::to_string(vector).ok())
    }

    fn deserialize_embedding(json: Option<String>) -> Option<Vec<f32>> {
        json.and_then(|s| serde_json::from_str(&s).ok())
    }

    fn row_to_construct(row: &duckdb::Row<'_>) -> Result<SourceConstruct, duckdb::Error> {
        let kind: String = row.get(3)?;
        let embedding_json: Option<String> = row.get(7)?;
        Ok(SourceConstruct::reconstitute(
            row.get(0)?,
            row.get(1)?,
            ConstructKind::from_str(&kind),
            row.get(4)?,
            row.get::<_, i64>(5)? as u32,
            row.get::<_, i64>(6)? as u32,
            row.get(2)?,
            Self::deserialize_embedding(embedding_json),
            row.get(8)?,
            row.get(9)?,
        ))
    }
}

#[async_trait]
impl ConstructStore for DuckdbConstructStore {
    async fn find_construct(
        &self,
        key: &ConstructKey,
    ) -> Result<Option<SourceConstruct>, DomainError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(
                "SELECT filename, commit_id, code, kind, name, line_start, line_end, embedding, created_at, updated_at \
                 FROM constructs WHERE filename = ?1 AND line_start = ?2 AND line_end = ?3",
            )
            .map_err(|e| DomainError::store(format!("Failed to prepare statement: {}", e)))?;

        match stmt.query_row(
            params![key.filename, key.line_start as i64, key.line_end as i64],
            Self::row_to_construct,
        ) {
            Ok(construct) => Ok(Some(construct)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DomainError::store(format!(
                "Failed to query construct: {}",
                e
            ))),
        }
    }

    async fn upsert_construct(&self, construct: &SourceConstruct) -> Result<(), DomainError> {
        let conn = self.conn.lock().await;
        let embedding_json = Self::serialize_embedding(construct.embedding());

        conn.execute(
            r#"
            INSERT INTO constructs (id, filename, commit_id, code, kind, name, line_start, line_end, embedding, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT (id) DO UPDATE SET
                commit_id = excluded.commit_id,
                code = excluded.code,
                kind = excluded.kind,
                name = excluded.name,
                embedding = excluded.embedding,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at
            "#,
            params![
                construct.key().record_id(),
                construct.filename(),
                construct.commit(),
                construct.code(),
                construct.kind().as_str(),
                construct.name(),
                construct.line_start() as i64,
                construct.line_end() as i64,
                embedding_json,
                construct.created_at(),
                construct.updated_at(),
            ],
        )
        .map_err(|e| DomainError::store(format!("Failed to upsert construct: {}", e)))?;

        Ok(())
    }

    async fn find_import(&self, key: &ImportKey) -> Result<Option<ImportReference>, DomainError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(
                "SELECT filename, repository, module_name, import_type, created_at, updated_at \
                 FROM imports WHERE filename = ?1 AND module_name = ?2",
            )
            .map_err(|e| DomainError::store(format!("Failed to prepare statement: {}", e)))?;

        match stmt.query_row(params![key.filename, key.module_name], |row| {
            let import_type: String = row.get(3)?;
            Ok(ImportReference::reconstitute(
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                ImportType::from_str(&import_type),
                row.get(4)?,
                row.get(5)?,
            ))
        }) {
            Ok(import) => Ok(Some(import)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DomainError::store(format!("Failed to query import: {}", e))),
        }
    }

    async fn upsert_import(&self, import: &ImportReference) -> Result<(), DomainError> {
        let conn = self.conn.lock().await;

        conn.execute(
            r#"
            INSERT INTO imports (id, filename, repository, module_name, import_type, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT (id) DO UPDATE SET
                repository = excluded.repository,
                import_type = excluded.import_type,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at
            "#,
            params![
                import.key().record_id(),
                import.filename(),
                import.repository(),
                import.module_name(),
                import.import_type().as_str(),
                import.created_at(),
                import.updated_at(),
            ],
        )
        .map_err(|e| DomainError::store(format!("Failed to upsert import: {}", e)))?;

        Ok(())
    }

    async fn construct_count(&self) -> Result<u64, DomainError> {
        let conn = self.conn.lock().await;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM constructs", [], |row| row.get(0))
            .map_err(|e| DomainError::store(format!("Failed to count constructs: {}", e)))?;
        Ok(count as u64)
    }

    async fn import_count(&self) -> Result<u64, DomainError> {
        let conn = self.conn.lock().await;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM imports", [], |row| row.get(0))
            .map_err(|e| DomainError::store(format!("Failed to count imports: {}", e)))?;
        Ok(count as u64)
    }
}
