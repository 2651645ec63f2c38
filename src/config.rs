use std::path::PathBuf;
use std::time::Duration;

/// Pipeline knobs, loaded from `EMBD_*` environment variables with
/// defaults suitable for a local run.
///
/// | Variable                   | Default        | Purpose                          |
/// |----------------------------|----------------|----------------------------------|
/// | `EMBD_DATABASE_PATH`       | (data dir)     | Store location override          |
/// | `EMBD_FILE_EXTENSIONS`     | `py,md,mdx,markdown` | Recognized file kinds      |
/// | `EMBD_MAX_EMBED_CHARS`     | `8192`         | Single-request size ceiling      |
/// | `EMBD_CHUNK_SIZE`          | `6144`         | Sub-span size for oversized text |
/// | `EMBD_CHUNK_OVERLAP`       | `256`          | Overlap between sub-spans        |
/// | `EMBD_WORKERS`             | `8`            | Concurrent files in flight       |
/// | `EMBD_EMBED_CONCURRENCY`   | `4`            | Outstanding embedding requests   |
/// | `EMBD_EMBED_TIMEOUT_SECS`  | `30`           | Per-request embedding timeout    |
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub database_path: Option<PathBuf>,
    pub extensions: Vec<String>,
    pub max_embed_chars: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub worker_concurrency: usize,
    pub embed_concurrency: usize,
    pub embed_timeout: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            extensions: default_extensions(),
            max_embed_chars: 8192,
            chunk_size: 6144,
            chunk_overlap: 256,
            worker_concurrency: 8,
            embed_concurrency: 4,
            embed_timeout: Duration::from_secs(30),
        }
    }
}

impl RunConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            database_path: std::env::var("EMBD_DATABASE_PATH").ok().map(PathBuf::from),
            extensions: std::env::var("EMBD_FILE_EXTENSIONS")
                .ok()
                .map(|raw| parse_extensions(&raw))
                .filter(|exts| !exts.is_empty())
                .unwrap_or(defaults.extensions),
            max_embed_chars: env_usize("EMBD_MAX_EMBED_CHARS", defaults.max_embed_chars),
            chunk_size: env_usize("EMBD_CHUNK_SIZE", defaults.chunk_size),
            chunk_overlap: env_usize("EMBD_CHUNK_OVERLAP", defaults.chunk_overlap),
            worker_concurrency: env_usize("EMBD_WORKERS", defaults.worker_concurrency),
            embed_concurrency: env_usize("EMBD_EMBED_CONCURRENCY", defaults.embed_concurrency),
            embed_timeout: Duration::from_secs(
                env_usize("EMBD_EMBED_TIMEOUT_SECS", 30) as u64
            ),
        }
    }
}

pub fn default_extensions() -> Vec<String> {
    ["py", "md", "mdx", "markdown"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

fn env_usize(var: &str, default: usize) -> usize {
    std::env::var(var)
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RunConfig::default();
        assert!(config.extensions.contains(&"py".to_string()));
        assert!(config.extensions.contains(&"md".to_string()));
        assert!(config.chunk_size <= config.max_embed_chars);
    }

    #[test]
    fn test_parse_extensions() {
        assert_eq!(
            parse_extensions("py, .md ,MDX,,"),
            vec!["py".to_string(), "md".to_string(), "mdx".to_string()]
        );
        assert!(parse_extensions(" , ").is_empty());
    }
}
