use crate::*;
use std::path::Path;
use std::path::PathBuf;

/// On-disk layout of one training run:
/// `runs/<experiment>_<unix-secs>/{config.json, checkpoints/, summaries/}`.
#[derive(Debug, Clone)]
pub struct RunDir {
    root: PathBuf,
}

impl RunDir {
    pub fn create(base: &Path, experiment: &str, config: &ServerConfig) -> Result<Self, Error> {
        let time = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let root = base.join("runs").join(format!("{}_{}", experiment, time));
        let dir = Self { root };
        std::fs::create_dir_all(dir.checkpoints())?;
        std::fs::create_dir_all(dir.summaries())?;
        std::fs::write(
            dir.root.join("config.json"),
            serde_json::to_string_pretty(config)?,
        )?;
        log::info!("run directory {}", dir.root.display());
        Ok(dir)
    }
    pub fn checkpoints(&self) -> PathBuf {
        self.root.join("checkpoints")
    }
    pub fn summaries(&self) -> PathBuf {
        self.root.join("summaries")
    }
}
