//! Writing rendered artifacts into a frontend project.
//!
//! ## Guarantees
//!
//! - **Atomic writes**: content goes to a sibling temp file that is renamed
//!   over the destination
//! - **Write policy**: `scaffold` artifacts are only created, never replaced;
//!   `companion` artifacts (unit tests) are only created in the same pass as
//!   their model's scaffold, so a deleted test stays deleted
//! - **Idempotence**: files whose content already matches are not touched,
//!   so regenerating an unchanged schema produces no diff

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::errors::GeneratorError;
use crate::orchestrator::RenderedArtifact;
use crate::registry::{StackId, WritePolicy};

/// What happened to each artifact of a write pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    /// Created or replaced (or would be, in a dry run).
    pub written: Vec<PathBuf>,
    /// Already up to date.
    pub unchanged: Vec<PathBuf>,
    /// Scaffolds left alone because the file exists, and companions whose
    /// scaffold already existed.
    pub skipped: Vec<PathBuf>,
}

impl WriteSummary {
    pub fn total(&self) -> usize {
        self.written.len() + self.unchanged.len() + self.skipped.len()
    }
}

/// Writes `content` to `path` atomically, creating parent directories.
///
/// ## Errors
///
/// Returns `GeneratorError::WriteError` if a directory cannot be created or
/// the temp file cannot be written or renamed.
pub fn write_atomic(path: &Path, content: &str) -> Result<(), GeneratorError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| GeneratorError::WriteError {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = path.with_file_name(format!(".{file_name}.tmp"));
    fs::write(&temp_path, content).map_err(|e| GeneratorError::WriteError {
        path: temp_path.display().to_string(),
        source: e,
    })?;

    fs::rename(&temp_path, path).map_err(|e| GeneratorError::WriteError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// Writes artifacts below `root`, honouring each artifact's write policy.
///
/// With `dry_run` set nothing is written, but the summary reports what a
/// real pass would do.
pub fn write_artifacts(
    root: &Path,
    artifacts: &[RenderedArtifact],
    dry_run: bool,
) -> Result<WriteSummary, GeneratorError> {
    let mut summary = WriteSummary::default();
    let mut fresh_scaffolds: HashSet<ModelKey<'_>> = HashSet::new();

    for artifact in artifacts {
        let destination = root.join(&artifact.path);

        if artifact.policy == WritePolicy::Companion
            && !fresh_scaffolds.contains(&model_key(artifact))
        {
            debug!(path = %destination.display(), "scaffold not created in this pass, skipping");
            summary.skipped.push(destination);
            continue;
        }

        if destination.exists() {
            if matches!(artifact.policy, WritePolicy::Scaffold | WritePolicy::Companion) {
                debug!(path = %destination.display(), "scaffold exists, skipping");
                summary.skipped.push(destination);
                continue;
            }

            let current = fs::read_to_string(&destination).map_err(|e| GeneratorError::ReadError {
                path: destination.display().to_string(),
                source: e,
            })?;
            if current == artifact.content {
                debug!(path = %destination.display(), "unchanged");
                summary.unchanged.push(destination);
                continue;
            }
        }

        if !dry_run {
            write_atomic(&destination, &artifact.content)?;
        }
        if artifact.policy == WritePolicy::Scaffold {
            fresh_scaffolds.insert(model_key(artifact));
        }
        debug!(path = %destination.display(), dry_run, "written");
        summary.written.push(destination);
    }

    info!(
        written = summary.written.len(),
        unchanged = summary.unchanged.len(),
        skipped = summary.skipped.len(),
        dry_run,
        "write pass finished"
    );
    Ok(summary)
}

type ModelKey<'a> = (StackId, Option<&'a str>, Option<&'a str>);

fn model_key(artifact: &RenderedArtifact) -> ModelKey<'_> {
    (
        artifact.stack,
        artifact.application.as_deref(),
        artifact.model.as_deref(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ArtifactKind;
    use tempfile::TempDir;

    fn artifact(path: &str, content: &str, policy: WritePolicy) -> RenderedArtifact {
        RenderedArtifact {
            stack: StackId::Ember,
            artifact: ArtifactKind::Model,
            application: Some("blog".to_string()),
            model: Some("post".to_string()),
            path: path.to_string(),
            content: content.to_string(),
            policy,
        }
    }

    // === write_atomic tests ===

    #[test]
    fn write_atomic_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("app/models/blog/post.js");

        write_atomic(&file_path, "export default {};").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "export default {};");
    }

    #[test]
    fn write_atomic_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("post.js");

        write_atomic(&file_path, "// content").unwrap();

        let leftovers: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("post.js")]);
    }

    // === write_artifacts tests ===

    #[test]
    fn scaffold_is_created_once() {
        let temp_dir = TempDir::new().unwrap();
        let stub = artifact("app/models/blog/post.js", "// stub", WritePolicy::Scaffold);

        let first = write_artifacts(temp_dir.path(), std::slice::from_ref(&stub), false).unwrap();
        assert_eq!(first.written.len(), 1);

        let path = temp_dir.path().join("app/models/blog/post.js");
        fs::write(&path, "// edited by hand").unwrap();

        let second = write_artifacts(temp_dir.path(), &[stub], false).unwrap();
        assert_eq!(second.skipped, vec![path.clone()]);
        assert_eq!(fs::read_to_string(&path).unwrap(), "// edited by hand");
    }

    #[test]
    fn companion_follows_a_fresh_scaffold() {
        let temp_dir = TempDir::new().unwrap();
        let stub = artifact("app/models/blog/post.js", "// stub", WritePolicy::Scaffold);
        let test = artifact(
            "tests/unit/models/blog/post-test.js",
            "// test",
            WritePolicy::Companion,
        );
        let test_path = temp_dir.path().join("tests/unit/models/blog/post-test.js");

        let first = write_artifacts(temp_dir.path(), &[stub.clone(), test.clone()], false).unwrap();
        assert_eq!(first.written.len(), 2);

        fs::remove_file(&test_path).unwrap();
        let second = write_artifacts(temp_dir.path(), &[stub, test], false).unwrap();

        assert_eq!(second.skipped.len(), 2);
        assert!(second.skipped.contains(&test_path));
        assert!(!test_path.exists());
    }

    #[test]
    fn companion_of_another_model_is_not_written() {
        let temp_dir = TempDir::new().unwrap();
        let stub = artifact("app/models/blog/post.js", "// stub", WritePolicy::Scaffold);
        let mut test = artifact("user-test.js", "// test", WritePolicy::Companion);
        test.model = Some("user".to_string());

        let summary = write_artifacts(temp_dir.path(), &[stub, test], true).unwrap();

        assert_eq!(summary.written.len(), 1);
        assert_eq!(summary.skipped, vec![temp_dir.path().join("user-test.js")]);
    }

    #[test]
    fn regenerate_replaces_changed_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("base.js");
        fs::write(&path, "// old").unwrap();

        let summary = write_artifacts(
            temp_dir.path(),
            &[artifact("base.js", "// new", WritePolicy::Regenerate)],
            false,
        )
        .unwrap();

        assert_eq!(summary.written, vec![path.clone()]);
        assert_eq!(fs::read_to_string(&path).unwrap(), "// new");
    }

    #[test]
    fn identical_content_is_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let artifacts = [artifact("base.js", "// same", WritePolicy::Regenerate)];

        write_artifacts(temp_dir.path(), &artifacts, false).unwrap();
        let summary = write_artifacts(temp_dir.path(), &artifacts, false).unwrap();

        assert!(summary.written.is_empty());
        assert_eq!(summary.unchanged.len(), 1);
        assert_eq!(summary.total(), 1);
    }

    #[test]
    fn dry_run_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();

        let summary = write_artifacts(
            temp_dir.path(),
            &[artifact("src/models/Base.js", "// base", WritePolicy::Regenerate)],
            true,
        )
        .unwrap();

        assert_eq!(summary.written.len(), 1);
        assert!(!temp_dir.path().join("src").exists());
    }
}
