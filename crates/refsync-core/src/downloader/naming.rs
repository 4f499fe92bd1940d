//! Collision-free destination names within one download batch.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::part_file::part_path;

/// Hands out destination paths in a directory, never the same one twice.
///
/// A name is free when nothing exists on disk under it (final or `.part`) and
/// neither it nor its `.part` name has already been reserved in this batch.
/// Taken names get `_1`, `_2`, … inserted before the extension: `data.csv` → `data_1.csv`.
#[derive(Debug)]
pub struct NameReserver {
    dir: PathBuf,
    reserved: HashSet<PathBuf>,
}

impl NameReserver {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            reserved: HashSet::new(),
        }
    }

    pub fn reserve(&mut self, file_name: &str) -> PathBuf {
        let first = self.dir.join(file_name);
        if self.is_free(&first) {
            return self.claim(first);
        }

        let as_path = Path::new(file_name);
        let stem = as_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.to_string());
        let ext = as_path.extension().map(|e| e.to_string_lossy().into_owned());

        let mut counter = 1u32;
        loop {
            let candidate = match &ext {
                Some(ext) => self.dir.join(format!("{stem}_{counter}.{ext}")),
                None => self.dir.join(format!("{stem}_{counter}")),
            };
            if self.is_free(&candidate) {
                return self.claim(candidate);
            }
            counter += 1;
        }
    }

    /// Reserves both the final name and its staging name.
    fn claim(&mut self, path: PathBuf) -> PathBuf {
        self.reserved.insert(part_path(&path));
        self.reserved.insert(path.clone());
        path
    }

    fn is_free(&self, path: &Path) -> bool {
        let part = part_path(path);
        !self.reserved.contains(path)
            && !self.reserved.contains(&part)
            && !path.exists()
            && !part.exists()
    }
}
