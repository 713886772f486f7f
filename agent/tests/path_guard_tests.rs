//! Tests for sandbox path resolution.

use proptest::prelude::*;
use std::fs;
use tempfile::tempdir;
use wp_agent::sandbox::{PathError, PathGuard};

// =============================================================================
// Containment
// =============================================================================

#[test]
fn test_resolves_existing_file() -> anyhow::Result<()> {
    let dir = tempdir()?;
    fs::create_dir_all(dir.path().join("wp-content/themes"))?;
    fs::write(dir.path().join("wp-content/themes/style.css"), "body {}")?;
    let guard = PathGuard::new(dir.path())?;

    let resolved = guard.resolve("wp-content/themes/style.css")?;
    assert_eq!(fs::read_to_string(&resolved)?, "body {}");
    assert_eq!(resolved.requested(), "wp-content/themes/style.css");
    Ok(())
}

#[test]
fn test_parent_segments_rejected() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let guard = PathGuard::new(dir.path())?;

    for path in ["../../etc/passwd", "..", "a/../../b", "wp-content/../../x"] {
        assert!(
            matches!(guard.resolve(path), Err(PathError::OutsideRoot { .. })),
            "{path} should be rejected"
        );
    }
    Ok(())
}

#[test]
fn test_parent_segment_rejected_even_when_it_stays_inside() -> anyhow::Result<()> {
    let dir = tempdir()?;
    fs::create_dir(dir.path().join("a"))?;
    let guard = PathGuard::new(dir.path())?;

    assert!(matches!(
        guard.resolve("a/../index.php"),
        Err(PathError::OutsideRoot { .. })
    ));
    Ok(())
}

#[test]
fn test_absolute_path_rejected() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let guard = PathGuard::new(dir.path())?;

    assert!(matches!(
        guard.resolve("/etc/passwd"),
        Err(PathError::OutsideRoot { .. })
    ));
    Ok(())
}

#[test]
fn test_root_itself_is_allowed() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let guard = PathGuard::new(dir.path())?;

    let resolved = guard.resolve(".")?;
    assert_eq!(resolved.as_path(), guard.root());
    Ok(())
}

// =============================================================================
// Symlinks
// =============================================================================

#[cfg(unix)]
#[test]
fn test_symlink_escaping_root_rejected() -> anyhow::Result<()> {
    let outside = tempdir()?;
    fs::write(outside.path().join("secret.txt"), "secret")?;
    let dir = tempdir()?;
    std::os::unix::fs::symlink(outside.path(), dir.path().join("escape"))?;
    let guard = PathGuard::new(dir.path())?;

    assert!(matches!(
        guard.resolve("escape/secret.txt"),
        Err(PathError::OutsideRoot { .. })
    ));
    // A not-yet-existing file behind the link is rejected as well.
    assert!(matches!(
        guard.resolve("escape/new.txt"),
        Err(PathError::OutsideRoot { .. })
    ));
    assert!(!outside.path().join("new.txt").exists());
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_symlink_inside_root_is_followed() -> anyhow::Result<()> {
    let dir = tempdir()?;
    fs::create_dir(dir.path().join("real"))?;
    fs::write(dir.path().join("real/file.txt"), "ok")?;
    std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("alias"))?;
    let guard = PathGuard::new(dir.path())?;

    let resolved = guard.resolve("alias/file.txt")?;
    assert_eq!(resolved.as_path(), guard.root().join("real/file.txt"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_dangling_symlink_is_unresolvable() -> anyhow::Result<()> {
    let dir = tempdir()?;
    std::os::unix::fs::symlink(dir.path().join("missing"), dir.path().join("dangling"))?;
    let guard = PathGuard::new(dir.path())?;

    assert!(matches!(
        guard.resolve("dangling"),
        Err(PathError::Unresolvable { .. })
    ));
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_dangling_symlink_pointing_outside_rejected() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let outside = tempdir()?;
    std::os::unix::fs::symlink(outside.path().join("newfile"), dir.path().join("link"))?;
    std::os::unix::fs::symlink(outside.path().join("newdir"), dir.path().join("linkdir"))?;
    let guard = PathGuard::new(dir.path())?;

    assert!(matches!(
        guard.resolve("link"),
        Err(PathError::OutsideRoot { .. })
    ));
    assert!(matches!(
        guard.resolve("linkdir/file.txt"),
        Err(PathError::OutsideRoot { .. })
    ));
    assert!(!outside.path().join("newfile").exists());
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_dangling_symlink_chain_pointing_outside_rejected() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let outside = tempdir()?;
    std::os::unix::fs::symlink(outside.path().join("missing"), dir.path().join("second"))?;
    std::os::unix::fs::symlink("second", dir.path().join("first"))?;
    let guard = PathGuard::new(dir.path())?;

    assert!(matches!(
        guard.resolve("first"),
        Err(PathError::OutsideRoot { .. })
    ));
    Ok(())
}

#[test]
fn test_resolution_does_not_mutate() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let guard = PathGuard::new(dir.path())?;

    let _ = guard.resolve("new/nested/file.txt")?;
    let _ = guard.resolve("../../etc/passwd");
    assert_eq!(fs::read_dir(dir.path())?.count(), 0);
    Ok(())
}

// =============================================================================
// Properties
// =============================================================================

fn segment_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z0-9_-]{1,8}".prop_map(String::from),
        Just("..".to_string()),
        Just(".".to_string()),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Whatever the caller sends, a successful resolution lies under the root.
    #[test]
    fn resolved_paths_stay_under_root(
        segments in prop::collection::vec(segment_strategy(), 1..6)
    ) {
        let dir = tempdir().unwrap();
        let guard = PathGuard::new(dir.path()).unwrap();
        let relative = segments.join("/");

        match guard.resolve(&relative) {
            Ok(resolved) => {
                prop_assert!(resolved.as_path().starts_with(guard.root()));
                prop_assert!(!segments.iter().any(|s| s == ".."));
            }
            Err(PathError::OutsideRoot { .. }) => {
                prop_assert!(segments.iter().any(|s| s == ".."));
            }
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }
}
