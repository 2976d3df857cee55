//! Filesystem helpers built on `cap-std` and `camino`.

use std::io;

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8};

/// Open a UTF-8 file path using ambient authority.
pub(crate) fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Return whether `path` exists and is a regular file.
pub(crate) fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{path} does not name a file"),
        )
    })?;
    let parent = non_empty_parent(path).unwrap_or_else(|| Utf8Path::new("."));
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    dir.metadata(name).map(|meta| meta.is_file())
}

/// Create every missing directory above `path`.
pub(crate) fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = non_empty_parent(path) else {
        return Ok(());
    };
    // cap-std works relative to an opened directory, so split off the root.
    let (base, relative) = match parent.ancestors().last() {
        Some(root) if parent.has_root() => {
            let relative = parent
                .strip_prefix(root)
                .map_err(|_| io::Error::other(format!("cannot strip {root} from {parent}")))?;
            (root, relative)
        }
        _ => (Utf8Path::new("."), parent),
    };
    if relative.as_str().is_empty() {
        return Ok(());
    }
    fs_utf8::Dir::open_ambient_dir(base, ambient_authority())?.create_dir_all(relative)
}

fn non_empty_parent(path: &Utf8Path) -> Option<&Utf8Path> {
    path.parent().filter(|parent| !parent.as_str().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use rstest::rstest;
    use tempfile::TempDir;

    fn workspace() -> (TempDir, Utf8PathBuf) {
        let tmp = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
        (tmp, root)
    }

    #[rstest]
    fn file_is_file_distinguishes_files_and_directories() {
        let (_tmp, root) = workspace();
        let file = root.join("containers.json");
        std::fs::write(&file, b"[]").expect("write file");

        assert!(file_is_file(&file).expect("file exists"));
        assert!(!file_is_file(&root).expect("directory exists"));
    }

    #[rstest]
    fn file_is_file_reports_missing_paths() {
        let (_tmp, root) = workspace();
        let err = file_is_file(&root.join("absent.json")).expect_err("missing file");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[rstest]
    fn ensure_parent_dir_creates_nested_directories() {
        let (_tmp, root) = workspace();
        let database = root.join("state/nested/kerbside.db");
        ensure_parent_dir(&database).expect("create parents");
        assert!(root.join("state/nested").is_dir());
    }

    #[rstest]
    fn ensure_parent_dir_accepts_bare_file_names() {
        ensure_parent_dir(Utf8Path::new("kerbside.db")).expect("nothing to create");
    }
}
