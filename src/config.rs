use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub extract: Extract,
    #[serde(default)]
    pub chapters: Chapters,
    #[serde(default)]
    pub figures: Figures,
    #[serde(default)]
    pub translate: Translate,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: Default::default(),
            extract: Default::default(),
            chapters: Default::default(),
            figures: Default::default(),
            translate: Default::default(),
            logging: Default::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paths {
    pub out_dir: String,
    pub images_subdir: String,
    pub tex_dir: String,
    pub figures_dir: String,
}
impl Default for Paths {
    fn default() -> Self {
        Self {
            out_dir: "buku_ajar_extracted".into(),
            images_subdir: "images".into(),
            tex_dir: "latex-book/chapters_id".into(),
            figures_dir: "latex-book/figures".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extract {
    pub content_filename: String,
    pub report_filename: String,
    pub page_delimiter_width: usize,
    pub max_input_file_bytes: u64,
    pub normalize_unicode: bool,
    pub normalize_newlines: bool,
    pub trim_trailing_whitespace: bool,
    pub write_report_json: bool,
}
impl Default for Extract {
    fn default() -> Self {
        Self {
            content_filename: "buku_ajar_content.txt".into(),
            report_filename: "report.json".into(),
            page_delimiter_width: 80,
            max_input_file_bytes: 512 * 1024 * 1024,
            normalize_unicode: true,
            normalize_newlines: true,
            trim_trailing_whitespace: true,
            write_report_json: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapters {
    pub mapping_filename: String,
    #[serde(default = "default_chapter_defs")]
    pub defs: Vec<ChapterDef>,
}
impl Default for Chapters {
    fn default() -> Self {
        Self {
            mapping_filename: "chapter_mapping.txt".into(),
            defs: default_chapter_defs(),
        }
    }
}

/// One chapter of the textbook plus the page-content markers that open it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterDef {
    pub id: String,
    pub title: String,
    pub markers: Vec<String>,
}

fn default_chapter_defs() -> Vec<ChapterDef> {
    let def = |id: &str, title: &str, markers: &[&str]| ChapterDef {
        id: id.into(),
        title: title.into(),
        markers: markers.iter().map(|m| (*m).into()).collect(),
    };
    vec![
        def(
            "ch01",
            "Pengantar Algoritma Genetika",
            &["1) Pengantar Algoritma Genetika"],
        ),
        def("ch02", "Holland Schema", &["2) Holland Schema"]),
        def("ch03", "Encoding", &["3) Encoding"]),
        def("ch04", "Selection", &["4) Selection"]),
        def(
            "ch05",
            "Crossover",
            &["5) Crossover", "6) Crossover", "7) Crossover", "8) Crossover"],
        ),
        def(
            "ch08",
            "Mutation and Update",
            &["11) Operator Mutasi", "12) Perbaikan Generasi", "13) Parameter"],
        ),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Figures {
    pub parent1: Vec<u32>,
    pub parent2: Vec<u32>,
    pub pmx_cut1: usize,
    pub pmx_cut2: usize,
    pub cell_px: u32,
    pub pmx_basename: String,
    pub cycle_basename: String,
    pub write_png: bool,
}
impl Default for Figures {
    fn default() -> Self {
        Self {
            parent1: vec![1, 2, 3, 4, 5, 6, 7, 8, 9],
            parent2: vec![5, 4, 6, 9, 2, 3, 7, 1, 8],
            pmx_cut1: 2,
            pmx_cut2: 5,
            cell_px: 48,
            pmx_basename: "pmx_crossover_detailed".into(),
            cycle_basename: "cycle_crossover_detailed".into(),
            write_png: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Translate {
    pub source_lang: String,
    pub target_lang: String,
    pub skip_envs: Vec<String>,
    pub caption_envs: Vec<String>,
    pub backup_extension: String,
    pub endpoint: String,
    pub timeout_seconds: u64,
}
impl Default for Translate {
    fn default() -> Self {
        Self {
            source_lang: "auto".into(),
            target_lang: "id".into(),
            skip_envs: vec![
                "tikzpicture".into(),
                "axis".into(),
                "lstlisting".into(),
                "verbatim".into(),
                "algorithmic".into(),
                "algorithm".into(),
                "align".into(),
                "equation".into(),
                "picture".into(),
                "table".into(),
                "figure".into(),
            ],
            caption_envs: vec!["figure".into(), "table".into()],
            backup_extension: "bak".into(),
            endpoint: "https://translate.googleapis.com/translate_a/single".into(),
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: false,
            file_path: "".into(),
        }
    }
}
