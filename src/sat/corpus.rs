use super::*;
use rand::Rng;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

/// In-memory pool of named problems, loaded once per actor.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    problems: Vec<(String, Arc<Problem>)>,
}

impl Corpus {
    /// Recursively load every file under `dir` as DIMACS.
    pub fn load(dir: &Path) -> Result<Self, crate::Error> {
        let mut problems = Vec::new();
        for path in Self::walk(dir)? {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            problems.push((name, Arc::new(Problem::load(&path)?)));
        }
        if problems.is_empty() {
            return Err(crate::Error::Configuration(format!(
                "no problems found under {}",
                dir.display()
            )));
        }
        log::info!("loaded {} problems from {}", problems.len(), dir.display());
        Ok(Self { problems })
    }

    fn walk(dir: &Path) -> Result<Vec<PathBuf>, crate::Error> {
        let mut files = Vec::new();
        let mut stack = vec![dir.to_path_buf()];
        while let Some(next) = stack.pop() {
            for entry in std::fs::read_dir(&next)? {
                let path = entry?.path();
                match path.is_dir() {
                    true => stack.push(path),
                    false => files.push(path),
                }
            }
        }
        files.sort();
        Ok(files)
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }
    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }
    /// Uniformly random problem.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> (&str, Arc<Problem>) {
        let (name, problem) = &self.problems[rng.random_range(0..self.problems.len())];
        (name.as_str(), problem.clone())
    }
}

impl FromIterator<(String, Problem)> for Corpus {
    fn from_iter<T: IntoIterator<Item = (String, Problem)>>(iter: T) -> Self {
        Self {
            problems: iter
                .into_iter()
                .map(|(name, problem)| (name, Arc::new(problem)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn loads_nested_directories() {
        let root = std::env::temp_dir().join(format!("alphacuber-corpus-{}", std::process::id()));
        std::fs::create_dir_all(root.join("nested")).unwrap();
        std::fs::write(root.join("a.cnf"), "p cnf 2 1\n1 2 0\n").unwrap();
        std::fs::write(root.join("nested").join("b.cnf"), "p cnf 1 1\n-1 0\n").unwrap();
        let corpus = Corpus::load(&root).unwrap();
        assert_eq!(corpus.len(), 2);
        let ref mut rng = SmallRng::seed_from_u64(0);
        let (name, _) = corpus.sample(rng);
        assert!(name == "a.cnf" || name == "b.cnf");
        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn empty_directory_is_a_configuration_error() {
        let root = std::env::temp_dir().join(format!("alphacuber-empty-{}", std::process::id()));
        std::fs::create_dir_all(&root).unwrap();
        assert!(matches!(
            Corpus::load(&root),
            Err(crate::Error::Configuration(_))
        ));
        std::fs::remove_dir_all(&root).unwrap();
    }
}
