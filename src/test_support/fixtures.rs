//! Project fixtures for tests that need real files on disk.

use std::path::{Path, PathBuf};

/// Fixture for a project directory.
#[derive(Debug, Clone)]
pub struct ProjectFixture {
    /// Project name.
    pub name: String,
    /// Project version.
    pub version: String,
    /// Extra `[[targets]]` tables appended to the manifest.
    pub targets: Vec<String>,
    /// Additional files (path relative to project root -> content).
    pub files: Vec<(PathBuf, String)>,
}

impl ProjectFixture {
    /// A project with a manifest and one source file.
    pub fn new(name: impl Into<String>) -> Self {
        ProjectFixture {
            name: name.into(),
            version: "1.0.0".to_string(),
            targets: Vec::new(),
            files: vec![(PathBuf::from("src/main.c"), "int main(void) { return 0; }\n".to_string())],
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Add a target for `arch`/`plat` with a built kernel image.
    pub fn with_target(mut self, arch: &str, plat: &str) -> Self {
        self.targets.push(format!(
            "[[targets]]\narch = \"{arch}\"\nplat = \"{plat}\"\n"
        ));
        self.files.push((
            PathBuf::from(format!("build/{}_{plat}-{arch}", self.name)),
            "kernel".to_string(),
        ));
        self
    }

    /// The generated `packmux.toml`.
    pub fn manifest(&self) -> String {
        let mut manifest = format!(
            "[project]\nname = \"{}\"\nversion = \"{}\"\n",
            self.name, self.version
        );
        for target in &self.targets {
            manifest.push('\n');
            manifest.push_str(target);
        }
        manifest
    }

    /// Write the project into `base_path`.
    pub fn write_to(&self, base_path: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(base_path)?;
        std::fs::write(base_path.join("packmux.toml"), self.manifest())?;

        for (path, content) in &self.files {
            let full = base_path.join(path);
            if let Some(parent) = full.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(full, content)?;
        }

        Ok(base_path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_manifest() {
        let fixture = ProjectFixture::new("app").with_target("x86_64", "qemu");
        let manifest = fixture.manifest();
        assert!(manifest.contains("name = \"app\""));
        assert!(manifest.contains("arch = \"x86_64\""));
        assert!(fixture
            .files
            .iter()
            .any(|(p, _)| p == Path::new("build/app_qemu-x86_64")));
    }
}
