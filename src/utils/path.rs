//! Path utilities for input discovery and output naming

use std::path::{Path, PathBuf};

use crate::domain::errors::DomainError;

/// Extension given to derived output names
pub const OUTPUT_EXTENSION: &str = "mp4";

/// Path utilities for input and output files
pub struct PathUtils;

impl PathUtils {
    /// Get file extension from path, lowercased
    pub fn get_extension(path: &Path) -> Option<String> {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }

    /// True when the extension is in `extensions` (case-insensitive)
    pub fn is_video_file(path: &Path, extensions: &[String]) -> bool {
        match Self::get_extension(path) {
            Some(ext) => extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext)),
            None => false,
        }
    }

    /// Get file stem (name without extension) from path
    pub fn get_stem(path: &Path) -> String {
        path.file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "output".to_string())
    }

    /// Destination for `source` when output goes to `output_dir`.
    ///
    /// A directory other than the source's own keeps the plain stem; writing
    /// next to the source appends `suffix` so the input is never clobbered.
    pub fn derive_output(source: &Path, output_dir: Option<&Path>, suffix: &str) -> PathBuf {
        let source_dir = Self::parent_dir(source);
        let stem = Self::get_stem(source);

        match output_dir {
            Some(dir) if !Self::same_dir(dir, &source_dir) => {
                dir.join(format!("{}.{}", stem, OUTPUT_EXTENSION))
            }
            _ => source_dir.join(format!("{}{}.{}", stem, suffix, OUTPUT_EXTENSION)),
        }
    }

    /// Alternative to `destination` for a `source` whose derived name is taken.
    ///
    /// Appends the source extension (`a.mkv` gives `a_mkv.mp4`), then a counter
    /// until `taken` rejects the candidate no more.
    pub fn disambiguate<F>(destination: &Path, source: &Path, taken: F) -> PathBuf
    where
        F: Fn(&Path) -> bool,
    {
        let dir = Self::parent_dir(destination);
        let stem = Self::get_stem(destination);
        let base = match Self::get_extension(source) {
            Some(ext) => format!("{}_{}", stem, ext),
            None => stem,
        };

        let mut candidate = dir.join(format!("{}.{}", base, OUTPUT_EXTENSION));
        let mut counter = 2;
        while taken(&candidate) {
            candidate = dir.join(format!("{}_{}.{}", base, counter, OUTPUT_EXTENSION));
            counter += 1;
        }
        candidate
    }

    /// Parent directory, `.` for bare file names
    pub fn parent_dir(path: &Path) -> PathBuf {
        match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Reject a destination that resolves to the source itself
    pub fn ensure_distinct(source: &Path, destination: &Path) -> Result<(), DomainError> {
        let same = match (source.canonicalize(), destination.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => source == destination,
        };
        if same {
            return Err(DomainError::BadArgs(format!(
                "output {} would overwrite the input",
                destination.display()
            )));
        }
        Ok(())
    }

    fn same_dir(a: &Path, b: &Path) -> bool {
        match (a.canonicalize(), b.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => a == b,
        }
    }
}
