use serde::{Deserialize, Serialize};

/// Summary of one extraction run, written next to the extracted content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractReport {
    pub input: String,
    pub input_sha256: String,
    pub page_count: u32,
    pub pages_with_text: u32,
    pub text_bytes: u64,
    pub images_saved: u32,
    pub images_skipped: u32,
    pub images_failed: u32,
    pub started: String,
    pub finished: String,
}

/// Per-file outcome of a translation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub path: String,
    pub translated_units: u32,
    pub kept_units: u32,
    pub backed_up: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateReport {
    pub files: Vec<FileReport>,
}

impl TranslateReport {
    pub fn translated_units(&self) -> u32 {
        self.files.iter().map(|f| f.translated_units).sum()
    }

    pub fn kept_units(&self) -> u32 {
        self.files.iter().map(|f| f.kept_units).sum()
    }
}
