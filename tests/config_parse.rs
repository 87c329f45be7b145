use bukutex::config::Config;

#[test]
fn parse_example_config() {
    let raw = include_str!("../bukutex.example.toml");
    let cfg: Config = toml::from_str(raw).expect("parse TOML");

    assert_eq!(cfg.paths.tex_dir, "latex-book/chapters_id");
    assert_eq!(cfg.figures.parent2, vec![5, 4, 6, 9, 2, 3, 7, 1, 8]);
    assert_eq!(cfg.translate.target_lang, "id");
    assert!(cfg.translate.skip_envs.iter().any(|e| e == "tikzpicture"));
    assert_eq!(cfg.chapters.defs.len(), 6);
}

#[test]
fn defaults_match_example_config() {
    let raw = include_str!("../bukutex.example.toml");
    let parsed: Config = toml::from_str(raw).expect("parse TOML");
    let defaults = Config::default();

    assert_eq!(parsed.figures.parent1, defaults.figures.parent1);
    assert_eq!(parsed.translate.skip_envs, defaults.translate.skip_envs);
    assert_eq!(parsed.extract.page_delimiter_width, defaults.extract.page_delimiter_width);
}

#[test]
fn empty_config_falls_back_to_defaults() {
    let cfg: Config = toml::from_str("").expect("parse empty TOML");
    assert_eq!(cfg.translate.backup_extension, "bak");
    assert_eq!(cfg.figures.pmx_cut1, 2);
    assert_eq!(cfg.figures.pmx_cut2, 5);
}
