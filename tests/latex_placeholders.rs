use bukutex::latex::{classify_line, placeholderize, restore_placeholders, LineKind};

#[test]
fn text_without_protected_spans_is_untouched() {
    let input = "Hasil menunjukkan konvergensi yang cepat.";
    let (out, table) = placeholderize(input);
    assert_eq!(out, input);
    assert!(table.is_empty());
    assert_eq!(restore_placeholders(&out, &table), input);
}

#[test]
fn math_and_citation_become_tokens() {
    let input = "Hasil menunjukkan $x^2+y^2=1$ dan \\cite{knuth1968}.";
    let (out, table) = placeholderize(input);

    assert_eq!(table.len(), 2);
    assert!(!out.contains('$'));
    assert!(!out.contains("\\cite"));
    assert!(out.contains("__MATH_0__"));
    assert!(out.contains("__CITE_1__"));
}

#[test]
fn restoration_survives_reordered_words() {
    let input = "Hasil menunjukkan $x^2+y^2=1$ dan \\cite{knuth1968}.";
    let (out, table) = placeholderize(input);

    // A translator that moves the trailing clause to the front.
    let reordered = format!("Dan __CITE_1__, hasil: {}", out.replace(" dan __CITE_1__.", ""));
    let restored = restore_placeholders(&reordered, &table);

    assert!(restored.contains("$x^2+y^2=1$"));
    assert!(restored.contains("\\cite{knuth1968}"));
    assert!(!restored.contains("__MATH_0__"));
    assert!(!restored.contains("__CITE_1__"));
}

#[test]
fn display_math_is_protected_before_inline() {
    let input = "Perhatikan $$\\int_0^1 f$$ dan $g(x)$ berikut.";
    let (out, table) = placeholderize(input);

    assert_eq!(table.len(), 2);
    assert_eq!(table[0].0, "__MATHD_0__");
    assert_eq!(table[0].1, "$$\\int_0^1 f$$");
    assert_eq!(table[1].1, "$g(x)$");
    assert_eq!(restore_placeholders(&out, &table), input);
}

#[test]
fn escaped_dollar_does_not_close_inline_math() {
    let input = "Harga $a \\$ b$ tetap.";
    let (_, table) = placeholderize(input);
    assert_eq!(table.len(), 1);
    assert_eq!(table[0].1, "$a \\$ b$");
}

#[test]
fn line_classification() {
    assert_eq!(
        classify_line("\\begin{tikzpicture}"),
        LineKind::BeginEnv("tikzpicture".into())
    );
    assert_eq!(
        classify_line("  \\end{figure}"),
        LineKind::EndEnv("figure".into())
    );
    assert_eq!(
        classify_line("\\section{Operator Seleksi}"),
        LineKind::Heading {
            command: "\\section".into(),
            inner: "Operator Seleksi".into()
        }
    );
    assert_eq!(
        classify_line("  \\caption{Hasil akhir}"),
        LineKind::Caption {
            pre: "  \\caption".into(),
            inner: "Hasil akhir".into(),
            post: "".into()
        }
    );
    assert_eq!(
        classify_line("\\item Butir pertama"),
        LineKind::Item {
            rest: " Butir pertama".into()
        }
    );
    assert_eq!(classify_line("% komentar"), LineKind::Passthrough);
    assert_eq!(classify_line(""), LineKind::Passthrough);
    assert_eq!(classify_line("\\label{sec:intro}"), LineKind::Passthrough);
    assert_eq!(classify_line("Kalimat biasa."), LineKind::Prose);
}
