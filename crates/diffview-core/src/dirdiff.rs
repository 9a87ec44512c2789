use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::EngineError;
use crate::status::StatusSource;
use crate::types::ChangeRecord;
use crate::walk::{list_regular_files, FileEntry};

const COMPARE_CHUNK_SIZE: usize = 4096;

/// Change list from comparing two directory trees.
///
/// Records carry paths relative to the roots, so a file that changed has the
/// same path on both sides. There is no rename detection: a moved file shows
/// up as a deletion plus an addition.
#[derive(Debug, Clone)]
pub struct DirDiffSource {
    before: PathBuf,
    after: PathBuf,
    size_precheck: bool,
}

impl DirDiffSource {
    pub fn new(
        before: impl Into<PathBuf>,
        after: impl Into<PathBuf>,
    ) -> Result<Self, EngineError> {
        let before = before.into();
        let after = after.into();

        for root in [&before, &after] {
            if !root.is_dir() {
                return Err(EngineError::NotADirectory(root.clone()));
            }
        }

        Ok(Self {
            before,
            after,
            size_precheck: true,
        })
    }

    /// Always compare content, even when sizes already differ.
    pub fn without_size_precheck(mut self) -> Self {
        self.size_precheck = false;
        self
    }

    pub fn before_root(&self) -> &Path {
        &self.before
    }

    pub fn after_root(&self) -> &Path {
        &self.after
    }

    fn is_modified(
        &self,
        path: &str,
        size_before: u64,
        size_after: u64,
    ) -> Result<bool, EngineError> {
        if self.size_precheck && size_before != size_after {
            return Ok(true);
        }
        let equal = files_equal(&self.before.join(path), &self.after.join(path))?;
        Ok(!equal)
    }
}

impl StatusSource for DirDiffSource {
    fn changes(&self) -> Result<Vec<ChangeRecord>, EngineError> {
        let files_before = list_regular_files(&self.before)?;
        let files_after = list_regular_files(&self.after)?;

        debug!(
            before = files_before.len(),
            after = files_after.len(),
            "Listed directory trees"
        );

        let sizes_after: HashMap<&str, u64> = files_after
            .iter()
            .map(|f| (f.path.as_str(), f.size))
            .collect();

        let mut records = Vec::new();
        for FileEntry { path, size } in &files_before {
            match sizes_after.get(path.as_str()) {
                None => records.push(ChangeRecord::deleted(path.as_str())),
                Some(&size_after) => {
                    if self.is_modified(path, *size, size_after)? {
                        records.push(ChangeRecord::modified(path.as_str()));
                    }
                }
            }
        }

        let paths_before: HashSet<&str> = files_before.iter().map(|f| f.path.as_str()).collect();
        records.extend(
            files_after
                .iter()
                .filter(|f| !paths_before.contains(f.path.as_str()))
                .map(|f| ChangeRecord::added(f.path.as_str())),
        );

        debug!(records = records.len(), "Compared directory trees");

        Ok(records)
    }
}

/// Compare two files byte for byte in fixed-size chunks.
pub fn files_equal(a: &Path, b: &Path) -> Result<bool, EngineError> {
    let mut file_a = File::open(a).map_err(|e| EngineError::read(a, e))?;
    let mut file_b = File::open(b).map_err(|e| EngineError::read(b, e))?;

    let mut buf_a = [0u8; COMPARE_CHUNK_SIZE];
    let mut buf_b = [0u8; COMPARE_CHUNK_SIZE];

    loop {
        let n_a = read_chunk(&mut file_a, &mut buf_a).map_err(|e| EngineError::read(a, e))?;
        let n_b = read_chunk(&mut file_b, &mut buf_b).map_err(|e| EngineError::read(b, e))?;

        if n_a != n_b || buf_a[..n_a] != buf_b[..n_b] {
            return Ok(false);
        }
        // Both hit end of input on the same chunk
        if n_a == 0 {
            return Ok(true);
        }
    }
}

/// Fill `buf` as far as the reader allows; a short count means end of input.
fn read_chunk(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
