use std::path::{Path, PathBuf};

use serde_json::Value;

use super::{slugify, write_json, StorageError};

/// Side-artifact store for parsed plans (`<slug>_plan.json`).
#[derive(Debug, Clone)]
pub struct PlanStore {
    dir: PathBuf,
}

impl PlanStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, title: &str) -> PathBuf {
        self.dir.join(plan_file_name(title))
    }

    /// Overwrites any plan previously saved under the same title.
    pub fn save(&self, title: &str, plan: &Value) -> Result<PathBuf, StorageError> {
        write_json(&self.dir, &plan_file_name(title), plan)
    }
}

fn plan_file_name(title: &str) -> String {
    format!("{}_plan.json", slugify(title))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn saves_pretty_plan_under_slug() {
        let dir = tempfile::tempdir().unwrap();
        let store = PlanStore::new(dir.path());
        let plan = json!({"introduction": "I", "sections": [], "conclusion": "C"});

        let path = store.save("Rust Ownership", &plan).unwrap();

        assert_eq!(path, dir.path().join("rust_ownership_plan.json"));
        assert_eq!(path, store.path_for("Rust Ownership"));
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains('\n'));
        assert_eq!(serde_json::from_str::<Value>(&text).unwrap(), plan);
    }

    #[test]
    fn save_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = PlanStore::new(dir.path().join("plans").join("drafts"));
        store.save("x", &json!({})).unwrap();
        assert!(store.dir().join("x_plan.json").exists());
    }

    #[test]
    fn later_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = PlanStore::new(dir.path());
        store.save("t", &json!({"v": 1})).unwrap();
        let path = store.save("t", &json!({"v": 2})).unwrap();
        let saved: Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(saved["v"], 2);
    }

    #[test]
    fn unwritable_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("occupied");
        std::fs::write(&file, "x").unwrap();
        let store = PlanStore::new(file.join("plans"));
        assert!(matches!(store.save("t", &json!({})), Err(StorageError::Io(_))));
    }
}
