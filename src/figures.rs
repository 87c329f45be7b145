//! Step-by-step crossover diagrams for the textbook: one multi-panel figure
//! for partially mapped crossover and one for cycle crossover.
//!
//! Panels are composed as SVG and rasterized to PNG with resvg, both written
//! under the configured figures directory.

use crate::{
    config::Config,
    crossover::{self, CycleTrace, PmxTrace},
    util::ensure_dir,
};
use anyhow::{Context, Result, anyhow};
use std::path::Path;
use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Line, Path as SvgPath, Rectangle, Text};
use tracing::info;

const CYCLE_COLORS: [&str; 4] = ["lightcoral", "lightyellow", "lightpink", "lightcyan"];
const LEFT: f32 = 150.0;
const WIDTH: f32 = 1050.0;

pub fn render_all(cfg: &Config) -> Result<()> {
    render_pmx(cfg)?;
    render_cycle(cfg)?;
    Ok(())
}

pub fn render_pmx(cfg: &Config) -> Result<()> {
    let trace = crossover::pmx(
        &cfg.figures.parent1,
        &cfg.figures.parent2,
        cfg.figures.pmx_cut1,
        cfg.figures.pmx_cut2,
    )?;
    let svg_text = pmx_document(cfg, &trace).to_string();
    write_figure(cfg, &cfg.figures.pmx_basename, &svg_text)
}

pub fn render_cycle(cfg: &Config) -> Result<()> {
    let trace = crossover::cycle_crossover(&cfg.figures.parent1, &cfg.figures.parent2)?;
    let svg_text = cycle_document(cfg, &trace).to_string();
    write_figure(cfg, &cfg.figures.cycle_basename, &svg_text)
}

fn write_figure(cfg: &Config, basename: &str, svg_text: &str) -> Result<()> {
    let dir = Path::new(&cfg.paths.figures_dir);
    ensure_dir(dir)?;

    let svg_path = dir.join(format!("{basename}.svg"));
    std::fs::write(&svg_path, svg_text)
        .with_context(|| format!("writing {}", svg_path.display()))?;
    info!("wrote {}", svg_path.display());

    if cfg.figures.write_png {
        let png_path = dir.join(format!("{basename}.png"));
        rasterize(svg_text, &png_path)?;
        info!("wrote {}", png_path.display());
    }
    Ok(())
}

fn rasterize(svg_text: &str, out: &Path) -> Result<()> {
    use resvg::tiny_skia::{Pixmap, Transform};
    use resvg::usvg::{Options, Tree};

    let mut opt = Options::default();
    opt.fontdb_mut().load_system_fonts();
    let tree =
        Tree::from_str(svg_text, &opt).map_err(|e| anyhow!("parsing generated svg: {e}"))?;

    let size = tree.size().to_int_size();
    let mut pixmap = Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow!("allocating {}x{} pixmap", size.width(), size.height()))?;
    resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());
    pixmap
        .save_png(out)
        .with_context(|| format!("writing {}", out.display()))
}

struct Canvas {
    doc: Document,
    cell: f32,
}

impl Canvas {
    fn new(width: f32, height: f32, cell: f32) -> Self {
        let doc = Document::new()
            .set("width", width)
            .set("height", height)
            .set("viewBox", (0.0, 0.0, width, height));
        let mut canvas = Self { doc, cell };
        canvas.add(
            Rectangle::new()
                .set("x", 0)
                .set("y", 0)
                .set("width", width)
                .set("height", height)
                .set("fill", "white"),
        );
        canvas
    }

    fn add<N: svg::Node>(&mut self, node: N) {
        let doc = std::mem::replace(&mut self.doc, Document::new());
        self.doc = doc.add(node);
    }

    fn text(&mut self, x: f32, y: f32, content: &str, size: f32, bold: bool, anchor: &str) {
        let mut t = Text::new(content)
            .set("x", x)
            .set("y", y)
            .set("font-family", "sans-serif")
            .set("font-size", size)
            .set("text-anchor", anchor);
        if bold {
            t = t.set("font-weight", "bold");
        }
        self.add(t);
    }

    fn colored_text(&mut self, x: f32, y: f32, content: &str, size: f32, color: &str) {
        self.add(
            Text::new(content)
                .set("x", x)
                .set("y", y)
                .set("font-family", "sans-serif")
                .set("font-size", size)
                .set("fill", color),
        );
    }

    fn title(&mut self, y: f32, content: &str) {
        self.text(LEFT, y, content, 18.0, true, "start");
    }

    fn cell_rect(&mut self, x: f32, y: f32, fill: &str, stroke: &str, stroke_width: f32) {
        self.add(
            Rectangle::new()
                .set("x", x)
                .set("y", y)
                .set("width", self.cell)
                .set("height", self.cell)
                .set("fill", fill)
                .set("stroke", stroke)
                .set("stroke-width", stroke_width),
        );
    }

    /// One chromosome row: a box per gene with its value centered.
    fn gene_row(&mut self, y: f32, values: &[u32], fill: &dyn Fn(usize) -> String) {
        for (i, val) in values.iter().enumerate() {
            let x = LEFT + i as f32 * self.cell;
            self.cell_rect(x, y, &fill(i), "black", 2.0);
            self.text(
                x + self.cell / 2.0,
                y + self.cell / 2.0 + 6.0,
                &val.to_string(),
                16.0,
                true,
                "middle",
            );
        }
    }

    fn row_label(&mut self, y: f32, label: &str) {
        self.text(LEFT - 10.0, y + self.cell / 2.0 + 5.0, label, 14.0, true, "end");
    }

    /// Italic position indices under a row.
    fn index_row(&mut self, y: f32, n: usize) {
        for i in 0..n {
            let x = LEFT + i as f32 * self.cell + self.cell / 2.0;
            self.add(
                Text::new(i.to_string())
                    .set("x", x)
                    .set("y", y)
                    .set("font-family", "sans-serif")
                    .set("font-size", 12)
                    .set("font-style", "italic")
                    .set("text-anchor", "middle"),
            );
        }
    }

    fn arrow(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, color: &str) {
        self.add(
            Line::new()
                .set("x1", x1)
                .set("y1", y1)
                .set("x2", x2)
                .set("y2", y2)
                .set("stroke", color)
                .set("stroke-width", 2),
        );
        self.arrow_head(x1, y1, x2, y2, color);
    }

    fn double_arrow(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, color: &str) {
        self.arrow(x1, y1, x2, y2, color);
        self.arrow_head(x2, y2, x1, y1, color);
    }

    fn arrow_head(&mut self, from_x: f32, from_y: f32, tip_x: f32, tip_y: f32, color: &str) {
        let angle = (tip_y - from_y).atan2(tip_x - from_x);
        let len = 8.0;
        let spread = 0.5;
        let ax = tip_x - len * (angle - spread).cos();
        let ay = tip_y - len * (angle - spread).sin();
        let bx = tip_x - len * (angle + spread).cos();
        let by = tip_y - len * (angle + spread).sin();
        let data = Data::new()
            .move_to((tip_x, tip_y))
            .line_to((ax, ay))
            .line_to((bx, by))
            .close();
        self.add(SvgPath::new().set("d", data).set("fill", color));
    }

    fn dashed_vline(&mut self, x: f32, y1: f32, y2: f32, color: &str) {
        self.add(
            Line::new()
                .set("x1", x)
                .set("y1", y1)
                .set("x2", x)
                .set("y2", y2)
                .set("stroke", color)
                .set("stroke-width", 2)
                .set("stroke-dasharray", "6,4"),
        );
    }
}

fn cycle_fill(cycles: &[Vec<usize>]) -> impl Fn(usize) -> String + '_ {
    move |pos| {
        cycles
            .iter()
            .position(|c| c.contains(&pos))
            .map(|ci| CYCLE_COLORS[ci % CYCLE_COLORS.len()].to_string())
            .unwrap_or_else(|| "lightgray".to_string())
    }
}

fn plain_fill(color: &'static str) -> impl Fn(usize) -> String {
    move |_| color.to_string()
}

fn pmx_document(cfg: &Config, trace: &PmxTrace) -> Document {
    let p1 = &cfg.figures.parent1;
    let p2 = &cfg.figures.parent2;
    let cell = cfg.figures.cell_px as f32;
    let (cut1, cut2) = (trace.cut1, trace.cut2);
    let segment_fill = |base: &'static str| {
        move |i: usize| {
            if i >= cut1 && i < cut2 {
                "lightcoral".to_string()
            } else {
                base.to_string()
            }
        }
    };

    let mut c = Canvas::new(WIDTH, 1060.0, cell);
    let annot_x = LEFT + p1.len() as f32 * cell + 50.0;

    // Step 1: parents with cut points.
    let mut y = 40.0;
    c.title(y, "Step 1: Original Parents");
    y += 20.0;
    c.row_label(y, "Parent 1:");
    c.gene_row(y, p1, &segment_fill("lightblue"));
    c.row_label(y + cell + 8.0, "Parent 2:");
    c.gene_row(y + cell + 8.0, p2, &segment_fill("lightgreen"));
    let cut_x1 = LEFT + cut1 as f32 * cell;
    let cut_x2 = LEFT + cut2 as f32 * cell;
    c.dashed_vline(cut_x1, y - 16.0, y + 2.0 * cell + 16.0, "red");
    c.dashed_vline(cut_x2, y - 16.0, y + 2.0 * cell + 16.0, "red");
    c.colored_text(cut_x1 - 20.0, y - 22.0, "Cut 1", 13.0, "red");
    c.colored_text(cut_x2 - 20.0, y - 22.0, "Cut 2", 13.0, "red");

    // Step 2: mapping between the selected segments.
    y += 2.0 * cell + 60.0;
    c.title(y, "Step 2: Create Mapping from Selected Segments");
    y += 20.0;
    let p1_segment = &p1[cut1..cut2];
    let p2_segment = &p2[cut1..cut2];
    c.row_label(y, "P1 segment:");
    c.row_label(y + cell + 24.0, "P2 segment:");
    for (i, (a, b)) in p1_segment.iter().zip(p2_segment).enumerate() {
        let x = LEFT + i as f32 * cell * 1.6;
        c.cell_rect(x, y, "lightcoral", "black", 2.0);
        c.text(x + cell / 2.0, y + cell / 2.0 + 6.0, &a.to_string(), 16.0, true, "middle");
        c.cell_rect(x, y + cell + 24.0, "lightcoral", "black", 2.0);
        c.text(
            x + cell / 2.0,
            y + 1.5 * cell + 30.0,
            &b.to_string(),
            16.0,
            true,
            "middle",
        );
        c.double_arrow(
            x + cell / 2.0,
            y + cell + 2.0,
            x + cell / 2.0,
            y + cell + 22.0,
            "red",
        );
        c.text(
            annot_x,
            y + 20.0 + i as f32 * 22.0,
            &format!("{a} \u{2194} {b}"),
            14.0,
            false,
            "start",
        );
    }
    c.text(annot_x, y - 4.0, "Mapping:", 14.0, true, "start");

    // Step 3: exchanged segment with conflicts highlighted.
    y += 2.0 * cell + 80.0;
    c.title(y, "Step 3: Exchange Segments Between Parents");
    y += 20.0;
    c.row_label(y, "Child 1 (temp):");
    c.gene_row(y, &trace.exchanged, &segment_fill("lightblue"));
    for &pos in &trace.conflicts {
        let x = LEFT + pos as f32 * cell;
        c.cell_rect(x, y, "yellow", "red", 3.0);
        c.text(
            x + cell / 2.0,
            y + cell / 2.0 + 6.0,
            &trace.exchanged[pos].to_string(),
            16.0,
            true,
            "middle",
        );
    }
    c.colored_text(annot_x, y + 16.0, "Conflicts (duplicates):", 14.0, "red");
    c.colored_text(
        annot_x,
        y + 38.0,
        &format!("Positions: {:?}", trace.conflicts),
        14.0,
        "red",
    );

    // Step 4: resolved child with the mapping steps.
    y += cell + 60.0;
    c.title(y, "Step 4: Resolve Conflicts Using Mapping");
    y += 20.0;
    c.row_label(y, "Child 1 (final):");
    c.gene_row(y, &trace.child, &segment_fill("lightgreen"));
    c.text(annot_x, y + 8.0, "Resolution steps:", 14.0, true, "start");
    for (i, step) in trace.steps.iter().enumerate() {
        c.text(
            annot_x,
            y + 30.0 + i as f32 * 20.0,
            &format!("Pos {}: {} \u{2192} {}", step.position, step.from, step.to),
            13.0,
            false,
            "start",
        );
    }

    // Step 5: comparison and validation.
    y += cell + 60.0;
    c.title(y, "Step 5: Final Result Comparison");
    y += 20.0;
    let rows: [(&str, &[u32], &'static str); 3] = [
        ("Parent 1:", p1, "lightblue"),
        ("Parent 2:", p2, "lightgreen"),
        ("Child 1:", &trace.child, "lightyellow"),
    ];
    for (i, (label, values, color)) in rows.into_iter().enumerate() {
        let row_y = y + i as f32 * (cell + 8.0);
        c.row_label(row_y, label);
        c.gene_row(row_y, values, &plain_fill(color));
    }
    let valid = crossover::is_valid_permutation(&trace.child);
    let (mark, color) = validation_mark(valid);
    c.colored_text(
        annot_x,
        y + cell,
        &format!("{mark} Valid permutation: {}", if valid { "Yes" } else { "No" }),
        14.0,
        color,
    );

    c.doc
}

fn cycle_document(cfg: &Config, trace: &CycleTrace) -> Document {
    let p1 = &cfg.figures.parent1;
    let p2 = &cfg.figures.parent2;
    let cell = cfg.figures.cell_px as f32;
    let cycles = &trace.cycles;

    let mut c = Canvas::new(WIDTH, 1280.0, cell);
    let annot_x = LEFT + p1.len() as f32 * cell + 50.0;

    // Step 1: parents with position indices.
    let mut y = 40.0;
    c.title(y, "Step 1: Original Parents with Position Indices");
    y += 20.0;
    c.row_label(y, "Parent 1:");
    c.gene_row(y, p1, &plain_fill("lightblue"));
    c.index_row(y + cell + 14.0, p1.len());
    let y2 = y + cell + 26.0;
    c.row_label(y2, "Parent 2:");
    c.gene_row(y2, p2, &plain_fill("lightgreen"));
    c.index_row(y2 + cell + 14.0, p2.len());

    // Step 2: the first cycle, traced hop by hop.
    y = y2 + cell + 60.0;
    c.title(y, "Step 2: Find Cycle 1 (Starting from Position 0)");
    y += 20.0;
    c.row_label(y, "Parent 1:");
    c.gene_row(y, p1, &cycle_fill(cycles));
    let y2 = y + cell + 8.0;
    c.row_label(y2, "Parent 2:");
    c.gene_row(y2, p2, &cycle_fill(cycles));
    if let Some(cycle1) = cycles.first() {
        for pair in cycle1.windows(2) {
            let from_x = LEFT + pair[0] as f32 * cell + cell / 2.0;
            let to_x = LEFT + pair[1] as f32 * cell + cell / 2.0;
            c.arrow(from_x, y - 8.0, to_x, y - 8.0, "red");
        }
        c.text(annot_x, y + 8.0, "Cycle 1 positions:", 14.0, true, "start");
        c.text(annot_x, y + 28.0, &format!("{cycle1:?}"), 13.0, false, "start");
        for (i, line) in cycle_trace_lines(p1, p2, cycle1).iter().take(6).enumerate() {
            c.text(annot_x, y + 50.0 + i as f32 * 18.0, line, 12.0, false, "start");
        }
    }

    // Step 3: every cycle with its color.
    y = y2 + cell + 60.0;
    c.title(y, "Step 3: Identify All Cycles");
    y += 20.0;
    c.row_label(y, "Parent 1:");
    c.gene_row(y, p1, &cycle_fill(cycles));
    let y2 = y + cell + 8.0;
    c.row_label(y2, "Parent 2:");
    c.gene_row(y2, p2, &cycle_fill(cycles));
    c.text(annot_x, y + 8.0, "All Cycles:", 14.0, true, "start");
    for (i, cycle) in cycles.iter().enumerate() {
        let swatch_y = y + 20.0 + i as f32 * 24.0;
        c.add(
            Rectangle::new()
                .set("x", annot_x)
                .set("y", swatch_y)
                .set("width", 16)
                .set("height", 12)
                .set("fill", CYCLE_COLORS[i % CYCLE_COLORS.len()])
                .set("stroke", "black"),
        );
        c.text(
            annot_x + 24.0,
            swatch_y + 11.0,
            &format!("Cycle {}: {:?}", i + 1, cycle),
            13.0,
            false,
            "start",
        );
    }

    // Steps 4 and 5: the two children with their cycle sources.
    y = y2 + cell + 60.0;
    for (child, label, first_source) in [
        (&trace.child1, "Child 1:", "Parent 1"),
        (&trace.child2, "Child 2:", "Parent 2"),
    ] {
        let step = if label.starts_with("Child 1") { 4 } else { 5 };
        c.title(
            y,
            &format!("Step {step}: Create {} (alternate cycle sources)", label.trim_end_matches(':')),
        );
        y += 20.0;
        c.row_label(y, label);
        c.gene_row(y, child, &cycle_fill(cycles));
        c.text(annot_x, y + 8.0, "Source for each cycle:", 14.0, true, "start");
        for (i, _) in cycles.iter().enumerate() {
            let source = if (i % 2 == 0) == (first_source == "Parent 1") {
                "Parent 1"
            } else {
                "Parent 2"
            };
            c.text(
                annot_x,
                y + 28.0 + i as f32 * 18.0,
                &format!("Cycle {}: from {source}", i + 1),
                13.0,
                false,
                "start",
            );
        }
        y += cell + 60.0;
    }

    // Step 6: comparison and validation.
    c.title(y, "Step 6: Final Result Comparison");
    y += 20.0;
    let rows: [(&str, &[u32], &'static str); 4] = [
        ("Parent 1:", p1, "lightblue"),
        ("Parent 2:", p2, "lightgreen"),
        ("Child 1:", &trace.child1, "lightyellow"),
        ("Child 2:", &trace.child2, "lightpink"),
    ];
    for (i, (label, values, color)) in rows.into_iter().enumerate() {
        let row_y = y + i as f32 * (cell + 8.0);
        c.row_label(row_y, label);
        c.gene_row(row_y, values, &plain_fill(color));
    }
    c.text(annot_x, y + 8.0, "Validation:", 14.0, true, "start");
    for (i, (label, child)) in [("Child 1", &trace.child1), ("Child 2", &trace.child2)]
        .into_iter()
        .enumerate()
    {
        let valid = crossover::is_valid_permutation(child);
        let (mark, color) = validation_mark(valid);
        c.colored_text(
            annot_x,
            y + 30.0 + i as f32 * 20.0,
            &format!("{label}: {mark} {}", if valid { "Valid" } else { "Invalid" }),
            13.0,
            color,
        );
    }
    c.text(annot_x, y + 86.0, "Key property: each element keeps", 13.0, false, "start");
    c.text(annot_x, y + 104.0, "its position from one parent", 13.0, false, "start");

    c.doc
}

fn cycle_trace_lines(p1: &[u32], p2: &[u32], cycle: &[usize]) -> Vec<String> {
    let mut lines = Vec::new();
    for &pos in cycle {
        lines.push(format!("Pos {pos}: P1={}, P2={}", p1[pos], p2[pos]));
    }
    lines
}

fn validation_mark(valid: bool) -> (&'static str, &'static str) {
    if valid {
        ("\u{2713}", "green")
    } else {
        ("\u{2717}", "red")
    }
}
