use anyhow::{Result, Context};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

// @module: File and directory utilities

/// Output name for a downloaded guide whose URL has no usable file name
pub const UNKNOWN_URL_OUTPUT: &str = "epg_unknown.xml";

/// Output name for a local guide whose path has no usable file name
pub const UNKNOWN_PATH_OUTPUT: &str = "local_epg.xml";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Parse a source list: one entry per line, blank and `#` lines ignored
    pub fn parse_source_list(content: &str) -> Vec<String> {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect()
    }

    /// Read a source list file; a missing file yields no sources
    pub fn read_source_list<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
        let path = path.as_ref();
        if !Self::file_exists(path) {
            return Ok(Vec::new());
        }
        Ok(Self::parse_source_list(&Self::read_to_string(path)?))
    }

    // @returns: Last path segment of a URL, or the placeholder name
    pub fn output_name_for_url(source: &str) -> String {
        let from_url = Url::parse(source).ok().and_then(|url| {
            url.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        });

        // Not a parseable URL: fall back to the text after the last slash
        let name = from_url.or_else(|| source.rsplit('/').next().map(str::to_string));

        match name {
            Some(name) if !name.is_empty() => name,
            _ => UNKNOWN_URL_OUTPUT.to_string(),
        }
    }

    // @returns: File name of a local path, or the placeholder name
    pub fn output_name_for_path(source: &str) -> String {
        Path::new(source)
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| UNKNOWN_PATH_OUTPUT.to_string())
    }

    // @generates: Output path inside the output folder
    pub fn generate_output_path<P: AsRef<Path>>(output_dir: P, file_name: &str) -> PathBuf {
        output_dir.as_ref().join(file_name)
    }
}
