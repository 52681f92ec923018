use crate::*;
use std::path::Path;
use std::path::PathBuf;

/// Numbered JSON weight snapshots in one directory, pruned to the newest few.
#[derive(Debug, Clone)]
pub struct Checkpoints {
    dir: PathBuf,
    keep: usize,
}

impl Checkpoints {
    /// `keep == 0` retains every checkpoint.
    pub fn new(dir: PathBuf, keep: usize) -> Self {
        Self { dir, keep }
    }

    pub fn save(&self, weights: &WeightSet) -> Result<PathBuf, Error> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("weights-{:010}.json", weights.iteration()));
        let temp = path.with_extension("json.tmp");
        std::fs::write(&temp, serde_json::to_vec(weights)?)?;
        std::fs::rename(&temp, &path)?;
        log::info!("checkpoint {}", path.display());
        self.prune()?;
        Ok(path)
    }

    /// Saved checkpoints, oldest first.
    pub fn list(&self) -> Result<Vec<PathBuf>, Error> {
        let mut paths = std::fs::read_dir(&self.dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("weights-") && n.ends_with(".json"))
            })
            .collect::<Vec<_>>();
        paths.sort();
        Ok(paths)
    }

    pub fn latest(&self) -> Result<Option<PathBuf>, Error> {
        Ok(self.list()?.pop())
    }

    pub fn restore(path: &Path) -> Result<WeightSet, Error> {
        let bytes = std::fs::read(path)?;
        serde_json::from_slice(&bytes)
            .map_err(|e| Error::Parse(format!("{}: {}", path.display(), e)))
    }

    fn prune(&self) -> Result<(), Error> {
        if self.keep == 0 {
            return Ok(());
        }
        let paths = self.list()?;
        for stale in paths.iter().take(paths.len().saturating_sub(self.keep)) {
            log::debug!("pruning checkpoint {}", stale.display());
            std::fs::remove_file(stale)?;
        }
        Ok(())
    }
}
