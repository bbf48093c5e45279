//! Git pre-commit hook generation.
//!
//! Renders a POSIX sh pre-commit script gated by the three `git` settings
//! booleans and installs it under `.git/hooks`. A hook that was not
//! generated by Atelier (missing marker line) is never overwritten.

use crate::error::{AtelierError, Result};
use crate::settings::model::GitSettings;
use std::path::{Path, PathBuf};

/// Marker line identifying hooks we generated
pub const HOOK_MARKER: &str = "# managed by atelier (pre-commit)";

/// Render the pre-commit script for the given gates.
pub fn render_hook(git: &GitSettings) -> String {
    let mut script = String::from("#!/bin/sh\n");
    script.push_str(HOOK_MARKER);
    script.push('\n');

    if git.ai_sync {
        script.push_str(
            r#"
# Keep AI assistant context files in sync before committing
if command -v atelier >/dev/null 2>&1; then
    atelier status --quiet || true
fi
"#,
        );
    }

    if git.data_security {
        script.push_str(
            r#"
# Block commits that stage files from data directories
staged=$(git diff --cached --name-only)
for f in $staged; do
    case "$f" in
        raw_data/*|derived_data/*|results/private/*)
            echo "pre-commit: refusing to commit data file: $f" >&2
            exit 1
            ;;
    esac
done
"#,
        );
    }

    if git.check_sensitive_dirs {
        script.push_str(
            r#"
# Warn when sensitive directories are not gitignored
for d in raw_data derived_data results/private; do
    if [ -d "$d" ] && ! git check-ignore -q "$d"; then
        echo "pre-commit: warning: $d is not gitignored" >&2
    fi
done
"#,
        );
    }

    script.push_str("\nexit 0\n");
    script
}

/// Install the pre-commit hook into `root/.git/hooks/pre-commit`.
///
/// Returns the hook path. Fails if the project is not a git repository or
/// if a foreign pre-commit hook is already installed.
pub fn install_hook(root: &Path, git: &GitSettings) -> Result<PathBuf> {
    let hooks_dir = root.join(".git").join("hooks");
    if !root.join(".git").exists() {
        return Err(AtelierError::Hook(format!(
            "{} is not a git repository",
            root.display()
        )));
    }
    std::fs::create_dir_all(&hooks_dir)?;

    let hook_path = hooks_dir.join("pre-commit");
    if hook_path.exists() {
        let existing = std::fs::read_to_string(&hook_path)?;
        if !existing.contains(HOOK_MARKER) {
            return Err(AtelierError::Hook(
                "an unmanaged pre-commit hook already exists, not overwriting".to_string(),
            ));
        }
    }

    std::fs::write(&hook_path, render_hook(git))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&hook_path, std::fs::Permissions::from_mode(0o755))?;
    }

    Ok(hook_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gates_control_script_sections() {
        let all_off = GitSettings {
            ai_sync: false,
            data_security: false,
            check_sensitive_dirs: false,
        };
        let script = render_hook(&all_off);
        assert!(script.contains(HOOK_MARKER));
        assert!(!script.contains("atelier status"));
        assert!(!script.contains("git diff --cached"));
        assert!(!script.contains("check-ignore"));

        let all_on = GitSettings {
            ai_sync: true,
            data_security: true,
            check_sensitive_dirs: true,
        };
        let script = render_hook(&all_on);
        assert!(script.contains("atelier status"));
        assert!(script.contains("git diff --cached"));
        assert!(script.contains("check-ignore"));
    }

    #[test]
    fn install_refuses_foreign_hook() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".git/hooks")).unwrap();
        std::fs::write(
            dir.path().join(".git/hooks/pre-commit"),
            "#!/bin/sh\necho custom\n",
        )
        .unwrap();

        let err = install_hook(dir.path(), &GitSettings::default());
        assert!(err.is_err());
    }

    #[test]
    fn install_overwrites_own_hook() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();

        let path = install_hook(dir.path(), &GitSettings::default()).unwrap();
        assert!(path.exists());

        // second install succeeds because the marker is present
        install_hook(dir.path(), &GitSettings::default()).unwrap();
    }

    #[test]
    fn install_requires_git_repo() {
        let dir = tempfile::tempdir().unwrap();
        assert!(install_hook(dir.path(), &GitSettings::default()).is_err());
    }
}
