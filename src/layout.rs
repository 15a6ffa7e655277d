//! Where generated and placed sources live.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::package::package_path;

/// Source root inside both the generator output and the project.
pub const JAVA_SOURCE_ROOT: &str = "src/main/java";

/// Kind of a generated Java file, from the directory the generator put it in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FileKind {
    /// Directly in the model package.
    Model,
    /// Directly in the api package.
    Api,
    /// Any other Java source.
    Other,
}

impl FileKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Api => "api",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Package naming for one generated project.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectLayout {
    /// `com.<organization>.<artifact>` unless configured otherwise.
    pub root_package: String,
    /// Sub-package of the root holding models.
    pub model_segment: String,
    /// Sub-package of the root holding API interfaces.
    pub api_segment: String,
}

impl ProjectLayout {
    #[must_use]
    pub fn new(root_package: impl Into<String>, model_segment: impl Into<String>, api_segment: impl Into<String>) -> Self {
        Self {
            root_package: root_package.into(),
            model_segment: model_segment.into(),
            api_segment: api_segment.into(),
        }
    }

    /// Declared package of files of `kind`. `Other` files have none.
    #[must_use]
    pub fn base_package(&self, kind: FileKind) -> Option<String> {
        match kind {
            FileKind::Model => Some(self.model_package()),
            FileKind::Api => Some(format!("{}.{}", self.root_package, self.api_segment)),
            FileKind::Other => None,
        }
    }

    /// Package the generator declares for models.
    #[must_use]
    pub fn model_package(&self) -> String {
        format!("{}.{}", self.root_package, self.model_segment)
    }

    /// `<root>/src/main/java`.
    #[must_use]
    pub fn java_root(root: &Path) -> PathBuf {
        root.join(JAVA_SOURCE_ROOT)
    }

    /// Directory of the root package under `root`.
    #[must_use]
    pub fn source_root(&self, root: &Path) -> PathBuf {
        Self::java_root(root).join(package_path(&self.root_package))
    }

    /// Directory of `package` under `root`.
    #[must_use]
    pub fn package_dir(root: &Path, package: &str) -> PathBuf {
        Self::java_root(root).join(package_path(package))
    }

    /// Classify a Java file found in the generator output rooted at
    /// `generated_root`.
    #[must_use]
    pub fn classify(&self, generated_root: &Path, file: &Path) -> FileKind {
        let Some(parent) = file.parent() else {
            return FileKind::Other;
        };
        [FileKind::Model, FileKind::Api]
            .into_iter()
            .find(|kind| {
                self.base_package(*kind)
                    .is_some_and(|package| parent == Self::package_dir(generated_root, &package))
            })
            .unwrap_or(FileKind::Other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> ProjectLayout {
        ProjectLayout::new("com.acme.shop", "model", "api")
    }

    #[test]
    fn base_packages_per_kind() {
        let l = layout();
        assert_eq!(l.base_package(FileKind::Model).as_deref(), Some("com.acme.shop.model"));
        assert_eq!(l.base_package(FileKind::Api).as_deref(), Some("com.acme.shop.api"));
        assert_eq!(l.base_package(FileKind::Other), None);
    }

    #[test]
    fn classify_by_directory() {
        let l = layout();
        let root = Path::new("/gen");
        let java = root.join("src/main/java/com/acme/shop");
        assert_eq!(l.classify(root, &java.join("model/Pet.java")), FileKind::Model);
        assert_eq!(l.classify(root, &java.join("api/PetApi.java")), FileKind::Api);
        assert_eq!(l.classify(root, &java.join("model/sub/Deep.java")), FileKind::Other);
        assert_eq!(l.classify(root, &java.join("OpenApiApplication.java")), FileKind::Other);
    }

    #[test]
    fn source_root_follows_root_package() {
        assert_eq!(
            layout().source_root(Path::new("/out")),
            PathBuf::from("/out/src/main/java/com/acme/shop")
        );
    }
}
