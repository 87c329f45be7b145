//! In-place translation of LaTeX chapter files.
//!
//! Single pass, line by line. The only state carried across lines is the name
//! of the protected environment currently open (if any) and the paragraph
//! buffer of consecutive prose lines; nested environments are not modeled.

use crate::{
    config::Config,
    latex::{self, LineKind},
    report::{FileReport, TranslateReport},
    translator::Translator,
};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub struct TexTranslatePipeline<'a> {
    cfg: &'a Config,
    translator: &'a dyn Translator,
    dry_run: bool,
}

impl<'a> TexTranslatePipeline<'a> {
    pub fn new(cfg: &'a Config, translator: &'a dyn Translator, dry_run: bool) -> Self {
        Self {
            cfg,
            translator,
            dry_run,
        }
    }

    /// Translate every `.tex` file under `dir`, sorted by name. An empty
    /// directory is reported and treated as a successful no-op.
    pub fn run(&self, dir: &Path) -> Result<TranslateReport> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
            .with_context(|| format!("reading tex dir: {}", dir.display()))?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("tex"))
            .collect();
        files.sort();

        if files.is_empty() {
            info!("no .tex files found in {}", dir.display());
            return Ok(TranslateReport { files: Vec::new() });
        }

        let mut report = TranslateReport { files: Vec::new() };
        for path in &files {
            info!("processing {}", path.display());
            let file_report = self
                .process_file(path)
                .with_context(|| format!("translating {}", path.display()))?;
            report.files.push(file_report);
        }
        Ok(report)
    }

    /// Rewrite one file, backing up the original first. The backup is only
    /// created if none exists, so a second run never clobbers the pristine
    /// copy with already-translated text.
    pub fn process_file(&self, path: &Path) -> Result<FileReport> {
        let backup = backup_path(path, &self.cfg.translate.backup_extension);
        let mut backed_up = false;
        if !backup.exists() && !self.dry_run {
            std::fs::copy(path, &backup)
                .with_context(|| format!("writing backup: {}", backup.display()))?;
            backed_up = true;
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;

        let mut report = FileReport {
            path: path.display().to_string(),
            translated_units: 0,
            kept_units: 0,
            backed_up,
        };
        let out_lines = self.transduce(&content, &mut report);

        if !self.dry_run {
            std::fs::write(path, out_lines.join("\n") + "\n")
                .with_context(|| format!("writing {}", path.display()))?;
        }
        Ok(report)
    }

    /// The line classifier and paragraph accumulator over one file's content.
    pub fn transduce(&self, content: &str, report: &mut FileReport) -> Vec<String> {
        let mut out_lines: Vec<String> = Vec::new();
        let mut in_skip_env: Option<String> = None;
        let mut paragraph: Vec<&str> = Vec::new();

        for line in content.lines() {
            let kind = latex::classify_line(line);

            // Entering a protected environment wins over everything else.
            if let LineKind::BeginEnv(env) = &kind {
                if self.is_skip_env(env) {
                    self.flush_paragraph(&mut paragraph, &mut out_lines, report);
                    in_skip_env = Some(env.clone());
                    out_lines.push(line.to_string());
                    continue;
                }
            }

            if let Some(env) = &in_skip_env {
                if matches!(kind, LineKind::EndEnv(_)) {
                    out_lines.push(line.to_string());
                    in_skip_env = None;
                    continue;
                }
                if self.cfg.translate.caption_envs.iter().any(|e| e == env) {
                    if let Some((pre, inner, post)) = latex::match_caption(line) {
                        let tr = self.translate_unit(&inner, report);
                        out_lines.push(format!("{pre}{{{tr}}}{post}"));
                        continue;
                    }
                }
                out_lines.push(line.to_string());
                continue;
            }

            match kind {
                LineKind::Heading { inner, .. } => {
                    let tr = self.translate_unit(&inner, report);
                    out_lines.push(latex::replace_brace_span(line, &tr));
                }
                LineKind::Caption { pre, inner, post } => {
                    let tr = self.translate_unit(&inner, report);
                    out_lines.push(format!("{pre}{{{tr}}}{post}"));
                }
                LineKind::Item { rest } => {
                    if rest.trim().is_empty() {
                        out_lines.push(line.to_string());
                    } else {
                        let tr = self.translate_unit(&rest, report);
                        out_lines.push(format!("\\item{tr}"));
                    }
                }
                LineKind::BeginEnv(_) | LineKind::EndEnv(_) | LineKind::Passthrough => {
                    self.flush_paragraph(&mut paragraph, &mut out_lines, report);
                    out_lines.push(line.to_string());
                }
                LineKind::Prose => paragraph.push(line),
            }
        }

        self.flush_paragraph(&mut paragraph, &mut out_lines, report);
        out_lines
    }

    fn is_skip_env(&self, env: &str) -> bool {
        self.cfg.translate.skip_envs.iter().any(|e| e == env)
    }

    /// Translate accumulated prose lines as one block. Flushing an empty
    /// buffer is a no-op.
    fn flush_paragraph(
        &self,
        paragraph: &mut Vec<&str>,
        out_lines: &mut Vec<String>,
        report: &mut FileReport,
    ) {
        if paragraph.is_empty() {
            return;
        }
        let block = paragraph.join("\n");
        let trimmed = block.trim();
        if trimmed.is_empty() {
            out_lines.extend(paragraph.iter().map(|l| l.to_string()));
        } else {
            let translated = self.translate_unit(trimmed, report);
            out_lines.extend(translated.lines().map(String::from));
        }
        paragraph.clear();
    }

    /// Protect spans, translate, restore. A translator failure keeps the
    /// original text for this unit only; the run continues.
    fn translate_unit(&self, text: &str, report: &mut FileReport) -> String {
        let (protected, table) = latex::placeholderize(text);
        let translated = match self.translator.translate(&protected) {
            Ok(t) => {
                report.translated_units += 1;
                t
            }
            Err(err) => {
                report.kept_units += 1;
                warn!("translation failed, keeping original text: {err:#}");
                protected
            }
        };
        latex::restore_placeholders(&translated, &table)
    }
}

/// `chapter1.tex` -> `chapter1.tex.bak`.
pub fn backup_path(path: &Path, extension: &str) -> PathBuf {
    PathBuf::from(format!("{}.{}", path.display(), extension))
}
