//! Facilities for discovering input files and reading them line by line.

use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::SplitConfig;
use crate::error::{CorpusError, Result};

/// Lists the regular files directly inside `dir` whose name ends with `suffix`.
///
/// Entries are returned as names relative to `dir`, in the order the filesystem
/// enumerates them.  Symlinks are resolved when deciding whether an entry is a
/// regular file, so a link to a file counts while a link to a directory does not.
pub fn list_files(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let entries =
        std::fs::read_dir(dir).map_err(|err| CorpusError::io(err, Some(dir.to_path_buf())))?;
    for entry in entries {
        let entry = entry.map_err(|err| CorpusError::io(err, Some(dir.to_path_buf())))?;
        let name = entry.file_name();
        if has_suffix(&name, suffix) && entry.path().is_file() {
            files.push(PathBuf::from(name));
        }
    }
    Ok(files)
}

/// Lists every matching file below `dir`, returning paths relative to `dir`.
pub fn list_files_recursive(
    dir: &Path,
    suffix: &str,
    follow_symlinks: bool,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let walker = WalkDir::new(dir).min_depth(1).follow_links(follow_symlinks);
    for entry in walker {
        let entry = entry.map_err(|err| {
            let path = err.path().map(Path::to_path_buf);
            match err.into_io_error() {
                Some(source) => CorpusError::io(source, path),
                None => CorpusError::InvalidConfig(format!(
                    "filesystem loop detected below {dir:?}"
                )),
            }
        })?;
        if has_suffix(entry.file_name(), suffix) && entry.path().is_file() {
            let relative = entry
                .path()
                .strip_prefix(dir)
                .unwrap_or_else(|_| entry.path())
                .to_path_buf();
            files.push(relative);
        }
    }
    Ok(files)
}

/// Discovers the inputs of a run according to the configuration.
pub fn collect_inputs(cfg: &SplitConfig) -> Result<Vec<PathBuf>> {
    let mut files = if cfg.recursive {
        list_files_recursive(&cfg.data_dir, &cfg.suffix, cfg.follow_symlinks)?
    } else {
        list_files(&cfg.data_dir, &cfg.suffix)?
    };
    if cfg.sort_inputs {
        files.sort();
    }
    Ok(files)
}

fn has_suffix(name: &OsStr, suffix: &str) -> bool {
    name.as_encoded_bytes().ends_with(suffix.as_bytes())
}

/// Streams the lines of a UTF-8 text file into `visit`, returning how many were seen.
///
/// Lines end at `\n`, `\r\n` or a lone `\r`; terminators are not passed on.  A
/// trailing line without a terminator is still delivered and an empty file yields
/// no lines at all.
pub fn for_each_line<F>(path: &Path, mut visit: F) -> Result<usize>
where
    F: FnMut(&str) -> Result<()>,
{
    let file =
        File::open(path).map_err(|err| CorpusError::io(err, Some(path.to_path_buf())))?;
    let mut reader = BufReader::new(file);
    let mut buffer = Vec::new();
    let mut physical_line = 0usize;
    let mut delivered = 0usize;
    loop {
        buffer.clear();
        let read = reader
            .read_until(b'\n', &mut buffer)
            .map_err(|err| CorpusError::io(err, Some(path.to_path_buf())))?;
        if read == 0 {
            break;
        }
        physical_line += 1;
        let text = std::str::from_utf8(&buffer).map_err(|_| CorpusError::Decode {
            path: path.to_path_buf(),
            line: physical_line,
        })?;
        let body = text.strip_suffix('\n').unwrap_or(text);
        let body = body.strip_suffix('\r').unwrap_or(body);
        for line in body.split('\r') {
            visit(line)?;
            delivered += 1;
        }
    }
    Ok(delivered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn collect(path: &Path) -> Vec<String> {
        let mut lines = Vec::new();
        for_each_line(path, |line| {
            lines.push(line.to_string());
            Ok(())
        })
        .expect("read lines");
        lines
    }

    #[test]
    fn list_files_filters_suffix_and_file_type() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("a.txt"), "a").expect("write a");
        fs::write(dir.path().join("b.TXT"), "b").expect("write b");
        fs::write(dir.path().join("c.md"), "c").expect("write c");
        fs::create_dir(dir.path().join("folder.txt")).expect("create dir");
        fs::write(dir.path().join("folder.txt").join("nested.txt"), "n").expect("write nested");

        let files = list_files(dir.path(), ".txt").expect("list files");
        assert_eq!(files, vec![PathBuf::from("a.txt")]);
    }

    #[cfg(unix)]
    #[test]
    fn list_files_resolves_symlinks() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("real.txt"), "r").expect("write real");
        fs::create_dir(dir.path().join("sub")).expect("create sub");
        std::os::unix::fs::symlink(dir.path().join("real.txt"), dir.path().join("link.txt"))
            .expect("file symlink");
        std::os::unix::fs::symlink(dir.path().join("sub"), dir.path().join("dirlink.txt"))
            .expect("dir symlink");

        let mut files = list_files(dir.path(), ".txt").expect("list files");
        files.sort();
        assert_eq!(files, vec![PathBuf::from("link.txt"), PathBuf::from("real.txt")]);
    }

    #[test]
    fn list_files_missing_directory_is_io_error() {
        let dir = tempdir().expect("tempdir");
        let err = list_files(&dir.path().join("missing"), ".txt").expect_err("missing dir");
        assert!(matches!(err, CorpusError::Io { .. }));
    }

    #[test]
    fn recursive_listing_returns_relative_paths() {
        let dir = tempdir().expect("tempdir");
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).expect("create nested");
        fs::write(dir.path().join("top.txt"), "t").expect("write top");
        fs::write(nested.join("deep.txt"), "d").expect("write deep");

        let cfg = SplitConfig::builder(dir.path())
            .recursive(true)
            .build()
            .expect("config");
        let files = collect_inputs(&cfg).expect("collect inputs");
        assert_eq!(
            files,
            vec![PathBuf::from("nested").join("deep.txt"), PathBuf::from("top.txt")]
        );
    }

    #[test]
    fn unsorted_inputs_keep_enumeration_order() {
        let dir = tempdir().expect("tempdir");
        for name in ["zeta.txt", "alpha.txt", "mid.txt", "beta.txt", "skip.md"] {
            fs::write(dir.path().join(name), name).expect("write input");
        }

        let cfg = SplitConfig::builder(dir.path())
            .sort_inputs(false)
            .build()
            .expect("config");
        let unsorted = collect_inputs(&cfg).expect("collect unsorted");
        let enumerated = list_files(dir.path(), ".txt").expect("list files");
        assert_eq!(unsorted, enumerated);

        let mut as_set = unsorted.clone();
        as_set.sort();
        let sorted = collect_inputs(&SplitConfig {
            sort_inputs: true,
            ..cfg
        })
        .expect("collect sorted");
        assert_eq!(as_set, sorted);
        assert_eq!(
            sorted,
            vec![
                PathBuf::from("alpha.txt"),
                PathBuf::from("beta.txt"),
                PathBuf::from("mid.txt"),
                PathBuf::from("zeta.txt"),
            ]
        );
    }

    #[test]
    fn for_each_line_handles_universal_newlines() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("mixed.txt");
        fs::write(&path, "one\r\ntwo\rthree\n\nfour").expect("write");
        assert_eq!(collect(&path), vec!["one", "two", "three", "", "four"]);
    }

    #[test]
    fn for_each_line_empty_file_yields_nothing() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("empty.txt");
        fs::write(&path, "").expect("write");
        assert!(collect(&path).is_empty());
    }

    #[test]
    fn for_each_line_reports_decode_errors() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("latin1.txt");
        fs::write(&path, b"ok\ncaf\xe9\n").expect("write");
        let err = for_each_line(&path, |_| Ok(())).expect_err("invalid utf-8");
        assert!(matches!(err, CorpusError::Decode { line: 2, .. }));
    }
}
