//! Capability-based filesystem access for survey files and stores.
//!
//! Every helper resolves an ambient directory handle with `cap-std` and then
//! operates relative to it, so callers pass plain UTF-8 paths while the
//! actual I/O stays confined to the resolved directory.
#![forbid(unsafe_code)]

use std::io::{self, BufReader};
use std::path::Component;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};

/// Open `path` for reading.
///
/// # Errors
/// Propagates the underlying I/O error, including `NotFound`.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Open `path` for buffered line-oriented reading.
///
/// # Errors
/// Propagates the underlying I/O error.
pub fn open_buffered(path: &Utf8Path) -> io::Result<BufReader<fs_utf8::File>> {
    open_utf8_file(path).map(BufReader::new)
}

/// Create or truncate `path`, creating missing parent directories first.
///
/// # Errors
/// Fails when the parent cannot be created or the file cannot be opened for
/// writing.
pub fn create_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    ensure_parent_dir(path)?;
    let (dir, name) = open_dir_and_file(path)?;
    dir.create(name.as_str())
}

/// Open the directory containing `path` and return it with the file name.
///
/// # Errors
/// Fails when `path` has no file name or the parent cannot be opened.
pub fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let name = path
        .file_name()
        .map(str::to_owned)
        .ok_or_else(|| io::Error::other(format!("`{path}` does not name a file")))?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, name))
}

/// Create every missing directory above `path`.
///
/// Paths without a parent, or whose parent is the filesystem root, need no
/// work.
///
/// # Errors
/// Propagates failures from opening the base directory or creating the
/// missing components.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() || parent == Utf8Path::new("/") {
        return Ok(());
    }
    let (base, relative) = base_dir_and_relative(parent)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    base.create_dir_all(&relative)
}

/// Report whether `path` names an existing regular file.
///
/// A missing parent directory or file yields `Ok(false)`.
///
/// # Errors
/// Propagates I/O errors other than `NotFound`.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = match open_dir_and_file(path) {
        Ok(opened) => opened,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err),
    };
    match dir.metadata(name.as_str()) {
        Ok(meta) => Ok(meta.is_file()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

/// Lowercased extension of `path`, if it has one.
#[must_use]
pub fn lowercase_extension(path: &Utf8Path) -> Option<String> {
    path.extension().map(str::to_ascii_lowercase)
}

/// Split `dir` into an ambient base directory and the path below it.
///
/// Absolute paths resolve against the root (or the drive prefix on
/// Windows); relative paths resolve against the working directory.
///
/// # Errors
/// Fails when the base cannot be opened or a component is not UTF-8.
pub fn base_dir_and_relative(dir: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let std_dir = dir.as_std_path();
    let (base, relative) = match std_dir.components().next() {
        Some(Component::Prefix(prefix)) => {
            let drive = prefix
                .as_os_str()
                .to_str()
                .ok_or_else(|| io::Error::other("drive prefix is not UTF-8"))?;
            let base = Utf8PathBuf::from(drive).join(std::path::MAIN_SEPARATOR.to_string());
            let relative = std_dir
                .strip_prefix(base.as_std_path())
                .or_else(|_| std_dir.strip_prefix(prefix.as_os_str()))
                .map_err(|_| io::Error::other(format!("cannot strip drive from `{dir}`")))?;
            (base, relative.to_path_buf())
        }
        Some(Component::RootDir) => {
            let base = Utf8PathBuf::from(std::path::MAIN_SEPARATOR.to_string());
            let relative = std_dir
                .strip_prefix(base.as_std_path())
                .map_err(|_| io::Error::other(format!("cannot strip root from `{dir}`")))?;
            (base, relative.to_path_buf())
        }
        _ => (Utf8PathBuf::from("."), std_dir.to_path_buf()),
    };

    let handle = fs_utf8::Dir::open_ambient_dir(&base, ambient_authority())?;
    let relative = Utf8PathBuf::from_path_buf(relative)
        .map_err(|path| io::Error::other(format!("`{}` is not UTF-8", path.display())))?;
    Ok((handle, relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::io::{BufRead, Write};
    use tempfile::TempDir;

    #[fixture]
    fn temp_dir() -> TempDir {
        TempDir::new().expect("create temp dir")
    }

    fn utf8(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp dir")
    }

    #[rstest]
    fn created_files_get_missing_parents(temp_dir: TempDir) {
        let target = utf8(&temp_dir).join("nested/deeper/mesh.json");
        let mut file = create_utf8_file(&target).expect("create file");
        file.write_all(b"{}").expect("write file");
        assert!(file_is_file(&target).expect("stat file"));
    }

    #[rstest]
    fn missing_files_report_false(temp_dir: TempDir) {
        let root = utf8(&temp_dir);
        assert!(!file_is_file(&root.join("absent.db")).expect("stat file"));
        assert!(!file_is_file(&root.join("no/such/dir/absent.db")).expect("stat file"));
    }

    #[rstest]
    fn directories_are_not_files(temp_dir: TempDir) {
        let root = utf8(&temp_dir);
        std::fs::create_dir(root.join("store")).expect("create dir");
        assert!(!file_is_file(&root.join("store")).expect("stat dir"));
    }

    #[rstest]
    fn buffered_reader_yields_lines(temp_dir: TempDir) {
        let path = utf8(&temp_dir).join("roads.xyz");
        std::fs::write(&path, "1 2 3\n4 5 6\n").expect("write fixture");
        let lines: Vec<String> = open_buffered(&path)
            .expect("open fixture")
            .lines()
            .collect::<Result<_, _>>()
            .expect("read lines");
        assert_eq!(lines, vec!["1 2 3", "4 5 6"]);
    }

    #[rstest]
    #[case("roads.XYZ", Some("xyz"))]
    #[case("dir.v2/points.csv", Some("csv"))]
    #[case("README", None)]
    fn extensions_are_lowercased(#[case] raw: &str, #[case] expected: Option<&str>) {
        assert_eq!(
            lowercase_extension(Utf8Path::new(raw)).as_deref(),
            expected
        );
    }

    #[rstest]
    fn relative_parents_resolve_from_working_directory() {
        let (_, relative) = base_dir_and_relative(Utf8Path::new("target")).expect("split");
        assert_eq!(relative, Utf8PathBuf::from("target"));
    }
}
