use std::{
    hash::{DefaultHasher, Hash, Hasher},
    path::{Path, PathBuf},
};

use tokio::fs;
use tracing::debug;

use crate::{error::Result, provider::Provider};

/// Get the cache directory for a given video URL
pub fn get_cache_dir(url: &str) -> PathBuf {
    cache_dir_in(&get_root_cache_dir(), url)
}

pub fn cache_dir_in(root: &Path, url: &str) -> PathBuf {
    let mut hasher = DefaultHasher::new();
    url.hash(&mut hasher);
    let url_hash = hasher.finish();

    root.join(url_hash.to_string())
}

pub fn get_root_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("quizcast")
}

/// Path of the raw quiz response (provider and language aware).
///
/// Only the model's raw text is cached; validation and answer shuffling run
/// again on every load.
pub fn get_response_path(cache_dir: &Path, provider: &Provider, lang: &str) -> PathBuf {
    cache_dir.join(format!("quiz_{}_{}.txt", provider.slug(), lang.to_lowercase()))
}

pub async fn load_cached_response(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path).await {
        Ok(text) => {
            debug!(path = %path.display(), "raw response cache hit");
            Ok(Some(text))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub async fn save_response(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, text).await?;
    Ok(())
}
