use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

/// Read a source file to string, replacing invalid UTF-8 sequences with the
/// replacement character. A leading byte-order mark is dropped so that
/// stylesheet and template bodies inline cleanly.
///
/// # Errors
/// Returns an error if the file cannot be read.
pub fn read_source(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes);
    Ok(String::from_utf8_lossy(bytes).into_owned())
}

/// Atomically write bytes to a file by writing to a temp file then renaming.
///
/// Missing parent directories are created first. The file will either have
/// the old contents or the new contents, never a partial write.
///
/// # Errors
/// Returns an error if the directories cannot be created or the write or
/// rename fails.
pub fn write_output(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent)?;
    }

    let mut temp_path = parent.to_path_buf();
    temp_path.push(format!(
        ".{}.tmp.{}",
        path.file_name().and_then(|n| n.to_str()).unwrap_or("module"),
        std::process::id()
    ));

    {
        let mut file = File::create(&temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }

    match fs::rename(&temp_path, path) {
        Ok(()) => Ok(()),
        Err(e) => {
            // Windows refuses to rename over an existing file.
            if cfg!(windows) {
                fs::copy(&temp_path, path)?;
                let _ = fs::remove_file(&temp_path);
                Ok(())
            } else {
                let _ = fs::remove_file(&temp_path);
                Err(e)
            }
        }
    }
}

/// Copy `source` to `dest` with the same guarantees as [`write_output`].
///
/// # Errors
/// Returns an error if `source` cannot be read or `dest` cannot be written.
pub fn copy_output(source: &Path, dest: &Path) -> io::Result<()> {
    let bytes = fs::read(source)?;
    write_output(dest, &bytes)
}

/// Convert a path to a forward-slash string regardless of host convention.
#[must_use]
pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_read_source_valid_utf8() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b".a { color: red; }").unwrap();
        file.flush().unwrap();

        assert_eq!(read_source(file.path()).unwrap(), ".a { color: red; }");
    }

    #[test]
    fn test_read_source_strips_bom() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"\xEF\xBB\xBFbody{}").unwrap();
        file.flush().unwrap();

        assert_eq!(read_source(file.path()).unwrap(), "body{}");
    }

    #[test]
    fn test_read_source_invalid_utf8() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0x48, 0x65, 0x6c, 0x6c, 0x6f, 0x80, 0x81])
            .unwrap();
        file.flush().unwrap();

        let content = read_source(file.path()).unwrap();
        assert!(content.starts_with("Hello"));
        assert!(content.contains('\u{FFFD}'));
    }

    #[test]
    fn test_write_output_creates_parents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a/1.0.0/index.js");

        write_output(&path, b"define()").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "define()");

        write_output(&path, b"again").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "again");
    }

    #[test]
    fn test_write_output_no_temp_left_on_success() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.js");

        write_output(&path, b"content").unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].as_ref().unwrap().file_name().to_str().unwrap(),
            "out.js"
        );
    }

    #[test]
    fn test_copy_output() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("img/a.png");
        write_output(&source, b"\x89PNG").unwrap();

        let dest = dir.path().join("dist/a.png");
        copy_output(&source, &dest).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"\x89PNG");

        assert!(copy_output(&dir.path().join("missing.png"), &dest).is_err());
    }

    #[test]
    fn test_to_slash() {
        assert_eq!(to_slash(Path::new("a/b/c.js")), "a/b/c.js");
        assert_eq!(to_slash(Path::new(r"a\b\c.js")), "a/b/c.js");
    }
}
