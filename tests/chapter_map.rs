use bukutex::chapters::ChapterMap;
use bukutex::config::Config;

fn page(num: u32, body: &str) -> String {
    let delim = "=".repeat(80);
    format!("\n{delim}\nPAGE {num}\n{delim}\n\n{body}\n")
}

fn sample_content() -> String {
    let mut content = String::new();
    content.push_str(&page(1, "1) Pengantar Algoritma Genetika\nDefinisi dasar."));
    content.push_str(&page(2, "Lanjutan bab pengantar."));
    content.push_str(&page(3, "2) Holland Schema\nTeorema skema."));
    content.push_str(&page(4, "Contoh skema."));
    content.push_str(&page(5, "5) Crossover\nOperator satu titik."));
    content
}

#[test]
fn pages_follow_the_most_recent_chapter_marker() {
    let cfg = Config::default();
    let map = ChapterMap::from_content(&cfg, &sample_content()).unwrap();

    let nums = |id: &str| -> Vec<u32> {
        map.chapters
            .iter()
            .find(|c| c.id == id)
            .unwrap()
            .pages
            .iter()
            .map(|p| p.num)
            .collect()
    };

    assert_eq!(nums("ch01"), vec![1, 2]);
    assert_eq!(nums("ch02"), vec![3, 4]);
    assert_eq!(nums("ch05"), vec![5]);
    assert_eq!(nums("ch03"), Vec::<u32>::new());
}

#[test]
fn pages_before_any_marker_stay_unassigned() {
    let cfg = Config::default();
    let content = page(1, "Halaman sampul tanpa penanda.");
    let map = ChapterMap::from_content(&cfg, &content).unwrap();
    assert!(map.chapters.iter().all(|c| c.pages.is_empty()));
}

#[test]
fn images_map_into_chapter_page_spans() {
    let cfg = Config::default();
    let mut map = ChapterMap::from_content(&cfg, &sample_content()).unwrap();

    map.assign_images(vec![
        "page_2_img_X0.png".to_string(),
        "page_4_img_X1.png".to_string(),
        "page_9_img_X9.png".to_string(),
        "notes.txt".to_string(),
    ]);

    let images = |id: &str| -> Vec<String> {
        map.chapters
            .iter()
            .find(|c| c.id == id)
            .unwrap()
            .images
            .clone()
    };

    assert_eq!(images("ch01"), vec!["page_2_img_X0.png".to_string()]);
    assert_eq!(images("ch02"), vec!["page_4_img_X1.png".to_string()]);
    // Out-of-span and non-png files are ignored.
    let all: usize = map.chapters.iter().map(|c| c.images.len()).sum();
    assert_eq!(all, 2);
}

#[test]
fn summary_lists_only_populated_chapters() {
    let cfg = Config::default();
    let map = ChapterMap::from_content(&cfg, &sample_content()).unwrap();
    let summary = map.summary();

    assert!(summary.starts_with("Chapter Mapping Summary\n"));
    assert!(summary.contains("CH01: Pengantar Algoritma Genetika"));
    assert!(summary.contains("Pages: [1, 2]"));
    assert!(summary.contains("CH05: Crossover"));
    assert!(!summary.contains("CH03"));
}
