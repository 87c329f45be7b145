//! Chapter mapping over previously extracted content: assigns pages to
//! chapters by content markers and extracted images to chapters by the page
//! number in their filename.

use crate::config::{ChapterDef, Config};
use anyhow::{Context, Result};
use regex::Regex;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct PageRecord {
    pub num: u32,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct Chapter {
    pub id: String,
    pub title: String,
    pub pages: Vec<PageRecord>,
    pub images: Vec<String>,
}

impl Chapter {
    pub fn page_span(&self) -> Option<(u32, u32)> {
        let min = self.pages.iter().map(|p| p.num).min()?;
        let max = self.pages.iter().map(|p| p.num).max()?;
        Some((min, max))
    }
}

#[derive(Debug, Clone)]
pub struct ChapterMap {
    pub chapters: Vec<Chapter>,
}

impl ChapterMap {
    /// Split page-delimited content and walk pages in order, switching the
    /// current chapter whenever a page carries one of a chapter's markers.
    /// Pages seen before the first marker stay unassigned.
    pub fn from_content(cfg: &Config, content: &str) -> Result<ChapterMap> {
        let w = cfg.extract.page_delimiter_width;
        let marker = Regex::new(&format!(r"(?m)^={{{w}}}\nPAGE (\d+)\n={{{w}}}$"))
            .with_context(|| "page marker regex")?;

        let mut chapters: Vec<Chapter> = cfg
            .chapters
            .defs
            .iter()
            .map(|d| Chapter {
                id: d.id.clone(),
                title: d.title.clone(),
                pages: Vec::new(),
                images: Vec::new(),
            })
            .collect();

        let mut boundaries = Vec::new();
        for caps in marker.captures_iter(content) {
            let m = caps.get(0).expect("whole match");
            let num: u32 = caps[1].parse().with_context(|| "page number")?;
            boundaries.push((m.start(), m.end(), num));
        }

        let mut current: Option<usize> = None;
        for (i, &(_, body_start, num)) in boundaries.iter().enumerate() {
            let body_end = boundaries
                .get(i + 1)
                .map(|&(next_start, _, _)| next_start)
                .unwrap_or(content.len());
            let body = &content[body_start..body_end];

            if let Some(idx) = detect_chapter(&cfg.chapters.defs, body) {
                current = Some(idx);
            }
            if let Some(idx) = current {
                chapters[idx].pages.push(PageRecord {
                    num,
                    content: body.to_string(),
                });
            }
        }

        Ok(ChapterMap { chapters })
    }

    /// Assign each `page_<N>_...` image to the first chapter whose page span
    /// contains N.
    pub fn assign_images<I: IntoIterator<Item = String>>(&mut self, filenames: I) {
        let page_re = Regex::new(r"page_(\d+)").expect("image page regex");
        let mut names: Vec<String> = filenames.into_iter().collect();
        names.sort();

        for name in names {
            if !name.ends_with(".png") {
                continue;
            }
            let Some(num) = page_re
                .captures(&name)
                .and_then(|c| c[1].parse::<u32>().ok())
            else {
                continue;
            };
            for ch in &mut self.chapters {
                if let Some((min, max)) = ch.page_span() {
                    if (min..=max).contains(&num) {
                        info!("{name} -> {} ({})", ch.id, ch.title);
                        ch.images.push(name);
                        break;
                    }
                }
            }
        }
    }

    /// Plain-text summary in the shape the authoring workflow expects.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str("Chapter Mapping Summary\n");
        out.push_str(&"=".repeat(80));
        out.push_str("\n\n");
        for ch in &self.chapters {
            if ch.pages.is_empty() {
                continue;
            }
            let nums: Vec<u32> = ch.pages.iter().map(|p| p.num).collect();
            out.push_str(&format!("{}: {}\n", ch.id.to_uppercase(), ch.title));
            out.push_str(&format!("  Pages: {:?}\n", nums));
            out.push_str(&format!("  Images: {:?}\n", ch.images));
            out.push('\n');
        }
        out
    }
}

fn detect_chapter(defs: &[ChapterDef], body: &str) -> Option<usize> {
    defs.iter()
        .position(|d| d.markers.iter().any(|m| body.contains(m)))
}

pub fn analyze(cfg: &Config, content_path: &Path, images_dir: &Path) -> Result<ChapterMap> {
    let content = std::fs::read_to_string(content_path)
        .with_context(|| format!("reading extracted content: {}", content_path.display()))?;

    let mut map = ChapterMap::from_content(cfg, &content)?;

    match std::fs::read_dir(images_dir) {
        Ok(entries) => {
            let names = entries
                .filter_map(|e| e.ok())
                .filter_map(|e| e.file_name().into_string().ok());
            map.assign_images(names);
        }
        Err(err) => warn!(
            "images dir not readable, skipping image mapping: {}: {err}",
            images_dir.display()
        ),
    }

    for ch in &map.chapters {
        if let Some((min, max)) = ch.page_span() {
            info!(
                "{}: {} pages {}-{} ({} pages, {} images)",
                ch.id,
                ch.title,
                min,
                max,
                ch.pages.len(),
                ch.images.len()
            );
        }
    }

    Ok(map)
}
