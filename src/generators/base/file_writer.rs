use crate::error::{Error, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::{Builder, TempPath};

fn generation_io(path: &Path) -> impl FnOnce(io::Error) -> Error + '_ {
    move |source| Error::GenerationIo {
        path: path.to_path_buf(),
        source,
    }
}

struct StagedFile {
    target: PathBuf,
    /// Deleted when dropped unless persisted over `target`
    temp: TempPath,
}

/// Writes one container's generated files as a unit.
///
/// Contents are first staged in uniquely named hidden files next to their targets, then
/// renamed into place by [`FileWriter::commit`]. If any step fails, files already moved are
/// restored to their previous contents (or removed), staged temporaries are deleted and
/// directories created for the unit are removed again.
#[derive(Default)]
pub struct FileWriter {
    staged: Vec<StagedFile>,
    created_dirs: Vec<PathBuf>,
    committed: bool,
}

impl FileWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage `content` for `path`, creating missing parent directories
    pub fn stage(&mut self, path: &Path, content: &str) -> Result<()> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        self.ensure_directory_exists(parent)?;

        let mut prefix = std::ffi::OsString::from(".");
        prefix.push(path.file_name().unwrap_or_default());
        prefix.push(".");
        let mut temp = Builder::new()
            .prefix(&prefix)
            .suffix(".tmp")
            .tempfile_in(parent)
            .map_err(generation_io(path))?;
        temp.write_all(content.as_bytes())
            .map_err(generation_io(path))?;

        self.staged.push(StagedFile {
            target: path.to_path_buf(),
            temp: temp.into_temp_path(),
        });
        Ok(())
    }

    fn ensure_directory_exists(&mut self, dir: &Path) -> Result<()> {
        if dir.as_os_str().is_empty() || dir.is_dir() {
            return Ok(());
        }
        let mut missing = Vec::new();
        let mut current = Some(dir);
        while let Some(d) = current {
            if d.as_os_str().is_empty() || d.exists() {
                break;
            }
            missing.push(d.to_path_buf());
            current = d.parent();
        }
        fs::create_dir_all(dir).map_err(generation_io(dir))?;
        // deepest first, so removal on rollback works bottom-up
        self.created_dirs.extend(missing);
        Ok(())
    }

    /// Move every staged file into place, all or nothing
    pub fn commit(mut self) -> Result<Vec<PathBuf>> {
        let staged = std::mem::take(&mut self.staged);
        let mut replaced: Vec<(PathBuf, Option<Vec<u8>>)> = Vec::new();

        // temporaries still pending are deleted when `staged` drops
        for file in staged {
            let target = file.target.clone();
            match replace_file(file) {
                Ok(previous) => replaced.push((target, previous)),
                Err(source) => {
                    restore(&replaced);
                    return Err(Error::GenerationIo {
                        path: target,
                        source,
                    });
                }
            }
        }

        self.committed = true;
        Ok(replaced.into_iter().map(|(path, _)| path).collect())
    }

    pub fn staged_files(&self) -> Vec<&Path> {
        self.staged.iter().map(|f| f.target.as_path()).collect()
    }
}

impl Drop for FileWriter {
    fn drop(&mut self) {
        // staged temporaries must be gone before their directories can be removed
        self.staged.clear();
        if !self.committed {
            for dir in &self.created_dirs {
                // only succeeds when empty
                let _ = fs::remove_dir(dir);
            }
        }
    }
}

/// Rename the staged file over its target, returning the target's previous bytes
fn replace_file(file: StagedFile) -> io::Result<Option<Vec<u8>>> {
    let previous = if file.target.is_file() {
        Some(fs::read(&file.target)?)
    } else {
        None
    };
    file.temp.persist(&file.target).map_err(|e| e.error)?;
    Ok(previous)
}

fn restore(replaced: &[(PathBuf, Option<Vec<u8>>)]) {
    for (path, previous) in replaced.iter().rev() {
        let _ = match previous {
            Some(bytes) => fs::write(path, bytes),
            None => fs::remove_file(path),
        };
    }
}
