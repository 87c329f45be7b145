use anyhow::Result;
use bukutex::config::Config;
use bukutex::report::FileReport;
use bukutex::translate::{TexTranslatePipeline, backup_path};
use bukutex::translator::{Identity, Translator};
use std::path::Path;

/// Marks each translated unit so tests can see exactly what was sent out.
struct Prefixer;

impl Translator for Prefixer {
    fn translate(&self, text: &str) -> Result<String> {
        Ok(format!("[id] {text}"))
    }
}

/// Fails every request, as a hung or unreachable endpoint would.
struct AlwaysFails;

impl Translator for AlwaysFails {
    fn translate(&self, _text: &str) -> Result<String> {
        anyhow::bail!("service unavailable")
    }
}

fn empty_report() -> FileReport {
    FileReport {
        path: "test.tex".into(),
        translated_units: 0,
        kept_units: 0,
        backed_up: false,
    }
}

const SAMPLE: &str = "\\chapter{Pendahuluan}\n\
\n\
Ini adalah paragraf pertama\n\
yang berlanjut ke baris kedua.\n\
\n\
\\begin{tikzpicture}\n\
Teks di dalam gambar\n\
\\end{tikzpicture}\n\
\n\
\\begin{figure}\n\
\\includegraphics{hasil.png}\n\
\\caption{Hasil akhir $x^2$}\n\
\\end{figure}\n\
\n\
\\begin{itemize}\n\
\\item Butir pertama\n\
\\item\n\
\\end{itemize}\n\
% komentar\n";

#[test]
fn protected_environments_pass_through_verbatim() {
    let cfg = Config::default();
    let pipeline = TexTranslatePipeline::new(&cfg, &Prefixer, true);
    let mut report = empty_report();
    let out = pipeline.transduce(SAMPLE, &mut report);

    assert!(out.contains(&"\\begin{tikzpicture}".to_string()));
    assert!(out.contains(&"Teks di dalam gambar".to_string()));
    assert!(out.contains(&"\\includegraphics{hasil.png}".to_string()));
    assert!(out.contains(&"% komentar".to_string()));
}

#[test]
fn captions_inside_figure_are_translated_with_spans_restored() {
    let cfg = Config::default();
    let pipeline = TexTranslatePipeline::new(&cfg, &Prefixer, true);
    let mut report = empty_report();
    let out = pipeline.transduce(SAMPLE, &mut report);

    assert!(out.contains(&"\\caption{[id] Hasil akhir $x^2$}".to_string()));
}

#[test]
fn consecutive_prose_lines_translate_as_one_block() {
    let cfg = Config::default();
    let pipeline = TexTranslatePipeline::new(&cfg, &Prefixer, true);
    let mut report = empty_report();
    let out = pipeline.transduce(SAMPLE, &mut report);

    assert!(out.contains(&"[id] Ini adalah paragraf pertama".to_string()));
    assert!(out.contains(&"yang berlanjut ke baris kedua.".to_string()));
    // The second paragraph line must not carry its own marker.
    assert!(!out.contains(&"[id] yang berlanjut ke baris kedua.".to_string()));
}

#[test]
fn headings_and_items_are_translated() {
    let cfg = Config::default();
    let pipeline = TexTranslatePipeline::new(&cfg, &Prefixer, true);
    let mut report = empty_report();
    let out = pipeline.transduce(SAMPLE, &mut report);

    assert!(out.contains(&"\\chapter{[id] Pendahuluan}".to_string()));
    assert!(out.contains(&"\\item[id]  Butir pertama".to_string()));
    // A bare \item stays as written.
    assert!(out.contains(&"\\item".to_string()));
    // heading + paragraph + caption + item
    assert_eq!(report.translated_units, 4);
}

#[test]
fn translator_failure_keeps_original_text_and_continues() {
    let cfg = Config::default();
    let pipeline = TexTranslatePipeline::new(&cfg, &AlwaysFails, true);
    let mut report = empty_report();
    let out = pipeline.transduce(SAMPLE, &mut report);

    assert!(out.contains(&"\\chapter{Pendahuluan}".to_string()));
    assert!(out.contains(&"Ini adalah paragraf pertama".to_string()));
    assert!(out.contains(&"\\caption{Hasil akhir $x^2$}".to_string()));
    assert_eq!(report.translated_units, 0);
    assert_eq!(report.kept_units, 4);
}

#[test]
fn identity_translator_round_trips_the_file() {
    let cfg = Config::default();
    let pipeline = TexTranslatePipeline::new(&cfg, &Identity, true);
    let mut report = empty_report();
    let out = pipeline.transduce(SAMPLE, &mut report);

    let expected: Vec<String> = SAMPLE.lines().map(String::from).collect();
    assert_eq!(out, expected);
}

#[test]
fn backup_is_created_once_and_never_overwritten() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let tex = dir.path().join("ch01.tex");
    std::fs::write(&tex, SAMPLE)?;

    let cfg = Config::default();
    let pipeline = TexTranslatePipeline::new(&cfg, &Prefixer, false);

    pipeline.process_file(&tex)?;
    let bak = backup_path(&tex, &cfg.translate.backup_extension);
    assert!(bak.exists());
    assert_eq!(std::fs::read_to_string(&bak)?, SAMPLE);

    let first_pass = std::fs::read_to_string(&tex)?;
    assert!(first_pass.contains("\\chapter{[id] Pendahuluan}"));
    assert!(first_pass.ends_with('\n'));

    // Second run re-translates the file but must leave the backup pristine.
    pipeline.process_file(&tex)?;
    assert_eq!(std::fs::read_to_string(&bak)?, SAMPLE);

    Ok(())
}

#[test]
fn dry_run_writes_nothing() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let tex = dir.path().join("ch01.tex");
    std::fs::write(&tex, SAMPLE)?;

    let cfg = Config::default();
    let pipeline = TexTranslatePipeline::new(&cfg, &Prefixer, true);
    pipeline.run(dir.path())?;

    assert_eq!(std::fs::read_to_string(&tex)?, SAMPLE);
    assert!(!backup_path(&tex, &cfg.translate.backup_extension).exists());
    Ok(())
}

#[test]
fn empty_directory_is_a_reported_no_op() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let cfg = Config::default();
    let pipeline = TexTranslatePipeline::new(&cfg, &Identity, false);
    let report = pipeline.run(dir.path())?;
    assert!(report.files.is_empty());
    Ok(())
}
