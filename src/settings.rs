//! Application settings, persisted as a simple `key=value` file in the OS
//! data directory (next to the session log).
//!
//! The format is deliberately line-based and forgiving: unknown keys are
//! ignored, a missing or unreadable file yields defaults, and saving
//! rewrites the whole file.

use std::path::PathBuf;

use crate::logger;

/// How many entries the recent-files list keeps.
const MAX_RECENT_FILES: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct AppSettings {
    /// Most-recently used .bee files, newest first.
    pub recent_files: Vec<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            recent_files: Vec::new(),
        }
    }
}

impl AppSettings {
    pub(crate) fn settings_path() -> Option<PathBuf> {
        Some(logger::data_dir().join("BeeRef").join("beeref.conf"))
    }

    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            return Self::default();
        };
        let Ok(content) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        Self::parse(&content)
    }

    fn parse(content: &str) -> Self {
        let mut s = Self::default();
        for line in content.lines() {
            let Some((key, val)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let val = val.trim();
            match key {
                "recent_file" => {
                    if !val.is_empty() && s.recent_files.len() < MAX_RECENT_FILES {
                        s.recent_files.push(PathBuf::from(val));
                    }
                }
                _ => {}
            }
        }
        s
    }

    pub fn save(&self) {
        let Some(path) = Self::settings_path() else {
            return;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Err(e) = std::fs::write(&path, self.serialize()) {
            crate::log_warn!("Could not write settings file {}: {}", path.display(), e);
        }
    }

    fn serialize(&self) -> String {
        let mut out = String::new();
        for f in &self.recent_files {
            out.push_str(&format!("recent_file = {}\n", f.display()));
        }
        out
    }

    /// Move `path` to the front of the recent-files list, dropping
    /// duplicates and trimming to the cap. Called after every successful
    /// open or save; the caller persists with [`AppSettings::save`].
    pub fn remember_file(&mut self, path: &std::path::Path) {
        self.recent_files.retain(|p| p != path);
        self.recent_files.insert(0, path.to_path_buf());
        self.recent_files.truncate(MAX_RECENT_FILES);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ignores_unknown_keys_and_blank_lines() {
        let s = AppSettings::parse(
            "theme = dark\n\nrecent_file = /tmp/a.bee\nrecent_file = /tmp/b.bee\n",
        );
        assert_eq!(
            s.recent_files,
            vec![PathBuf::from("/tmp/a.bee"), PathBuf::from("/tmp/b.bee")]
        );
    }

    #[test]
    fn serialize_round_trips() {
        let mut s = AppSettings::default();
        s.recent_files.push(PathBuf::from("/tmp/a.bee"));
        s.recent_files.push(PathBuf::from("/tmp/b.bee"));
        assert_eq!(AppSettings::parse(&s.serialize()), s);
    }

    #[test]
    fn remember_file_dedupes_and_moves_to_front() {
        let mut s = AppSettings::default();
        s.recent_files = vec![PathBuf::from("/a.bee"), PathBuf::from("/b.bee")];
        s.remember_file(std::path::Path::new("/b.bee"));
        assert_eq!(
            s.recent_files,
            vec![PathBuf::from("/b.bee"), PathBuf::from("/a.bee")]
        );
    }

    #[test]
    fn remember_file_caps_the_list() {
        let mut s = AppSettings::default();
        for i in 0..20 {
            s.remember_file(std::path::Path::new(&format!("/f{}.bee", i)));
        }
        assert_eq!(s.recent_files.len(), MAX_RECENT_FILES);
        assert_eq!(s.recent_files[0], PathBuf::from("/f19.bee"));
    }
}
