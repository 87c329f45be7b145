//! Text and embedded-image extraction from the textbook source PDF.
//!
//! Text comes from pdf-extract per page and is written as one content file
//! with `PAGE <n>` delimiter blocks. Images are pulled out of each page's
//! XObject resources with lopdf and saved as `page_<n>_img_<id>.png`; a
//! failure on a single image is logged and the run continues.

use crate::{
    config::Config,
    report::ExtractReport,
    util::{ensure_dir, now_rfc3339, sha256_hex},
};
use anyhow::{Context, Result, anyhow};
use lopdf::{Dictionary, Document, Object};
use std::path::Path;
use tracing::{info, warn};
use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Default)]
struct ImageCounters {
    saved: u32,
    skipped: u32,
    failed: u32,
}

pub fn extract_pdf(cfg: &Config, input: &Path, out_dir: &Path) -> Result<ExtractReport> {
    let started = now_rfc3339();

    let meta = std::fs::metadata(input)
        .with_context(|| format!("input not found: {}", input.display()))?;
    if meta.len() > cfg.extract.max_input_file_bytes {
        anyhow::bail!("input exceeds max_input_file_bytes: {}", meta.len());
    }

    let images_dir = out_dir.join(&cfg.paths.images_subdir);
    ensure_dir(out_dir)?;
    ensure_dir(&images_dir)?;

    let bytes = std::fs::read(input).with_context(|| format!("reading {}", input.display()))?;
    let input_sha256 = sha256_hex(&bytes);

    info!("extracting content from {}", input.display());

    let pages = pdf_extract::extract_text_from_mem_by_pages(&bytes)
        .map_err(|e| anyhow!("extracting text: {e}"))?;
    info!("total pages: {}", pages.len());

    let delim = "=".repeat(cfg.extract.page_delimiter_width);
    let mut content = String::new();
    let mut pages_with_text = 0u32;
    for (i, text) in pages.iter().enumerate() {
        let text = postprocess_page(cfg, text);
        if text.trim().is_empty() {
            continue;
        }
        pages_with_text += 1;
        content.push_str(&format!("\n{delim}\nPAGE {}\n{delim}\n\n{text}\n", i + 1));
    }

    let content_path = out_dir.join(&cfg.extract.content_filename);
    std::fs::write(&content_path, &content)
        .with_context(|| format!("writing {}", content_path.display()))?;

    let doc = Document::load_mem(&bytes).with_context(|| "parsing PDF structure")?;
    let mut counters = ImageCounters::default();
    for (page_num, page_id) in doc.get_pages() {
        if let Err(err) = extract_page_images(&doc, page_num, page_id, &images_dir, &mut counters)
        {
            counters.failed += 1;
            warn!("image extraction failed on page {page_num}: {err:#}");
        }
    }

    info!(
        "extraction complete: text={} images saved={} skipped={} failed={}",
        content_path.display(),
        counters.saved,
        counters.skipped,
        counters.failed
    );

    let report = ExtractReport {
        input: input.display().to_string(),
        input_sha256,
        page_count: pages.len() as u32,
        pages_with_text,
        text_bytes: content.len() as u64,
        images_saved: counters.saved,
        images_skipped: counters.skipped,
        images_failed: counters.failed,
        started,
        finished: now_rfc3339(),
    };

    if cfg.extract.write_report_json {
        let report_path = out_dir.join(&cfg.extract.report_filename);
        std::fs::write(&report_path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("writing {}", report_path.display()))?;
    }

    Ok(report)
}

fn postprocess_page(cfg: &Config, text: &str) -> String {
    let mut out = text.to_string();
    if cfg.extract.normalize_newlines {
        out = out.replace("\r\n", "\n");
    }
    if cfg.extract.normalize_unicode {
        out = out.nfkc().collect::<String>();
    }
    if cfg.extract.trim_trailing_whitespace {
        out = out
            .lines()
            .map(|l| l.trim_end())
            .collect::<Vec<_>>()
            .join("\n");
    }
    out
}

fn extract_page_images(
    doc: &Document,
    page_num: u32,
    page_id: lopdf::ObjectId,
    images_dir: &Path,
    counters: &mut ImageCounters,
) -> Result<()> {
    let page_dict = doc.get_object(page_id)?.as_dict()?;

    let Some(resources) = resolve_dict(doc, page_dict.get(b"Resources").ok()) else {
        return Ok(());
    };
    let Some(xobjects) = resolve_dict(doc, resources.get(b"XObject").ok()) else {
        return Ok(());
    };

    for (name, entry) in xobjects.iter() {
        let stream = match entry {
            Object::Reference(id) => match doc.get_object(*id) {
                Ok(Object::Stream(s)) => s,
                _ => continue,
            },
            Object::Stream(s) => s,
            _ => continue,
        };

        let is_image = stream
            .dict
            .get(b"Subtype")
            .and_then(|o| o.as_name())
            .map(|n| n == b"Image")
            .unwrap_or(false);
        if !is_image {
            continue;
        }

        let name = String::from_utf8_lossy(name).to_string();
        let out_path = images_dir.join(format!("page_{page_num}_img_{name}.png"));
        match save_image(stream, &out_path) {
            Ok(true) => {
                counters.saved += 1;
                info!("saved image: {}", out_path.display());
            }
            Ok(false) => counters.skipped += 1,
            Err(err) => {
                counters.failed += 1;
                warn!("error saving image {name} on page {page_num}: {err:#}");
            }
        }
    }
    Ok(())
}

fn resolve_dict<'a>(doc: &'a Document, obj: Option<&'a Object>) -> Option<&'a Dictionary> {
    match obj? {
        Object::Reference(id) => match doc.get_object(*id) {
            Ok(Object::Dictionary(d)) => Some(d),
            _ => None,
        },
        Object::Dictionary(d) => Some(d),
        _ => None,
    }
}

/// Returns Ok(true) when the image was written, Ok(false) when the color
/// space or filter is one we do not handle.
fn save_image(stream: &lopdf::Stream, out_path: &Path) -> Result<bool> {
    let width = stream.dict.get(b"Width")?.as_i64()? as u32;
    let height = stream.dict.get(b"Height")?.as_i64()? as u32;

    // Raw DeviceRGB samples decode directly; anything JPEG-encoded goes
    // through the image crate instead.
    if let Ok(data) = stream.decompressed_content() {
        let is_rgb = stream
            .dict
            .get(b"ColorSpace")
            .and_then(|o| o.as_name())
            .map(|n| n == b"DeviceRGB")
            .unwrap_or(false);
        if is_rgb && data.len() == (width * height * 3) as usize {
            let img = image::RgbImage::from_raw(width, height, data)
                .ok_or_else(|| anyhow!("image buffer size mismatch"))?;
            img.save(out_path)
                .with_context(|| format!("writing {}", out_path.display()))?;
            return Ok(true);
        }
        return Ok(false);
    }

    match image::load_from_memory(&stream.content) {
        Ok(img) => {
            img.save(out_path)
                .with_context(|| format!("writing {}", out_path.display()))?;
            Ok(true)
        }
        Err(_) => Ok(false),
    }
}
