use serde::{Deserialize, Serialize};
use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

use crate::constants::{INTERACTIVE_UPDATE_RATE_MS, WEARABLE_DATA_PATH};
use crate::display::color::{parse_hex, Theme};
use crate::display::layout::FaceDimensions;
use crate::face::{FaceOptions, FaceProperties, WindowInsets};

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration; every field is optional so layers merge.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    pub face: Option<FaceConfig>,
    pub theme: Option<ThemeConfig>,
    pub sync: Option<SyncConfig>,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FaceConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub round: Option<bool>,
    pub low_bit_ambient: Option<bool>,
    pub interactive_update_ms: Option<u64>,
    pub dimensions: Option<FaceDimensions>,
}

/// Colours as `#RRGGBB`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ThemeConfig {
    pub background: Option<String>,
    pub digital_text: Option<String>,
    pub primary_light: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SyncConfig {
    /// data item path to watch, `/wearable` unless set
    pub path: Option<String>,
    /// JSON-lines replay file; stdin when absent
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    /// PPM file rewritten on every frame
    pub snapshot: Option<PathBuf>,
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone)]
#[command(name = "sunshinewear", about = "SunshineWear watch face", disable_help_flag = false)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    #[arg(long)]
    pub width: Option<u32>,
    #[arg(long)]
    pub height: Option<u32>,
    #[arg(long, action = ArgAction::Set)]
    pub round: Option<bool>,
    #[arg(long, action = ArgAction::Set)]
    pub low_bit_ambient: Option<bool>,
    /// JSON-lines file of data events (default: stdin)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub sync_source: Option<PathBuf>,
    /// Where each frame is written as PPM
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub snapshot: Option<PathBuf>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Public entry point: parse CLI, read YAML, merge, validate.
pub fn load() -> Result<Config, ConfigError> {
    let cli = Cli::parse();
    let cfg = load_with(&cli)?;

    if cli.dump_config {
        // Pretty YAML of effective config (nice for debugging)
        let s = serde_yaml::to_string(&cfg)?;
        println!("{s}");
        std::process::exit(0);
    }

    Ok(cfg)
}

/// Layer defaults, YAML and `cli`, then validate.
pub fn load_with(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;
    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/sunshinewear/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/sunshinewear/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/sunshinewear.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    let p = PathBuf::from("sunshinewear.yaml");
    if p.exists() { return Some(p) }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&s)?;
    Ok(cfg)
}

fn merge_group<T, F: FnOnce(&mut T, T)>(dst: &mut Option<T>, src: Option<T>, f: F) {
    match (dst.as_mut(), src) {
        (None, Some(s)) => *dst = Some(s),
        (Some(d), Some(s)) => f(d, s),
        _ => {}
    }
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    if src.log_level.is_some() { dst.log_level = src.log_level; }
    merge_group(&mut dst.face, src.face, merge_face);
    merge_group(&mut dst.theme, src.theme, merge_theme);
    merge_group(&mut dst.sync, src.sync, |d: &mut SyncConfig, s: SyncConfig| {
        if s.path.is_some()   { d.path = s.path; }
        if s.source.is_some() { d.source = s.source; }
    });
    merge_group(&mut dst.output, src.output, |d: &mut OutputConfig, s: OutputConfig| {
        if s.snapshot.is_some() { d.snapshot = s.snapshot; }
    });
}

fn merge_face(dst: &mut FaceConfig, src: FaceConfig) {
    if src.width.is_some()                 { dst.width = src.width; }
    if src.height.is_some()                { dst.height = src.height; }
    if src.round.is_some()                 { dst.round = src.round; }
    if src.low_bit_ambient.is_some()       { dst.low_bit_ambient = src.low_bit_ambient; }
    if src.interactive_update_ms.is_some() { dst.interactive_update_ms = src.interactive_update_ms; }
    if src.dimensions.is_some()            { dst.dimensions = src.dimensions; }
}

fn merge_theme(dst: &mut ThemeConfig, src: ThemeConfig) {
    if src.background.is_some()    { dst.background = src.background; }
    if src.digital_text.is_some()  { dst.digital_text = src.digital_text; }
    if src.primary_light.is_some() { dst.primary_light = src.primary_light; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some() { cfg.log_level = cli.log_level.clone(); }

    let any_face = cli.width.is_some()
        || cli.height.is_some()
        || cli.round.is_some()
        || cli.low_bit_ambient.is_some();
    if any_face {
        let face = cfg.face.get_or_insert_with(FaceConfig::default);
        if cli.width.is_some()           { face.width = cli.width; }
        if cli.height.is_some()          { face.height = cli.height; }
        if cli.round.is_some()           { face.round = cli.round; }
        if cli.low_bit_ambient.is_some() { face.low_bit_ambient = cli.low_bit_ambient; }
    }
    if cli.sync_source.is_some() {
        cfg.sync.get_or_insert_with(SyncConfig::default).source = cli.sync_source.clone();
    }
    if cli.snapshot.is_some() {
        cfg.output.get_or_insert_with(OutputConfig::default).snapshot = cli.snapshot.clone();
    }
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(face) = cfg.face.as_ref() {
        if face.width == Some(0) || face.height == Some(0) {
            return Err(ConfigError::Validation("face width/height must be > 0".into()));
        }
        if face.interactive_update_ms == Some(0) {
            return Err(ConfigError::Validation("face interactive_update_ms must be > 0".into()));
        }
    }
    if let Some(theme) = cfg.theme.as_ref() {
        let colours = [
            ("background", &theme.background),
            ("digital_text", &theme.digital_text),
            ("primary_light", &theme.primary_light),
        ];
        for (name, value) in colours {
            if let Some(v) = value {
                if parse_hex(v).is_none() {
                    return Err(ConfigError::Validation(format!("theme {name} must be #RRGGBB, got {v:?}")));
                }
            }
        }
    }
    if let Some(path) = cfg.sync.as_ref().and_then(|s| s.path.as_ref()) {
        if !path.starts_with('/') {
            return Err(ConfigError::Validation("sync path must start with '/'".into()));
        }
    }
    Ok(())
}

impl Config {
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    pub fn theme(&self) -> Theme {
        let mut theme = Theme::default();
        if let Some(t) = self.theme.as_ref() {
            let pick = |v: &Option<String>| v.as_deref().and_then(parse_hex);
            if let Some(c) = pick(&t.background)    { theme.background = c; }
            if let Some(c) = pick(&t.digital_text)  { theme.digital_text = c; }
            if let Some(c) = pick(&t.primary_light) { theme.primary_light = c; }
        }
        theme
    }

    pub fn face_options(&self) -> FaceOptions {
        let defaults = FaceOptions::default();
        let face = self.face.clone().unwrap_or_default();
        FaceOptions {
            width: face.width.unwrap_or(defaults.width),
            height: face.height.unwrap_or(defaults.height),
            shape: self.window_insets().shape(),
            theme: self.theme(),
            dimensions: face.dimensions.unwrap_or_default(),
            interactive_update_ms: face.interactive_update_ms.unwrap_or(INTERACTIVE_UPDATE_RATE_MS),
        }
    }

    pub fn face_properties(&self) -> FaceProperties {
        FaceProperties {
            low_bit_ambient: self.face.as_ref().and_then(|f| f.low_bit_ambient).unwrap_or(false),
        }
    }

    pub fn window_insets(&self) -> WindowInsets {
        WindowInsets { is_round: self.face.as_ref().and_then(|f| f.round).unwrap_or(false) }
    }

    pub fn sync_path(&self) -> String {
        self.sync
            .as_ref()
            .and_then(|s| s.path.clone())
            .unwrap_or_else(|| WEARABLE_DATA_PATH.to_string())
    }

    pub fn sync_source(&self) -> Option<PathBuf> {
        self.sync.as_ref().and_then(|s| s.source.clone())
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.output
            .as_ref()
            .and_then(|o| o.snapshot.clone())
            .unwrap_or_else(|| PathBuf::from("sunshinewear.ppm"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::traits::ScreenShape;
    use std::io::Write;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("sunshinewear").chain(args.iter().copied()))
    }

    fn yaml_file(body: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(body.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_yaml_then_cli() {
        let f = yaml_file(
            "log_level: debug\nface:\n  width: 400\n  height: 400\n  round: true\n  dimensions:\n    y_offset_round: 120\ntheme:\n  background: '#101010'\n",
        );
        let path = f.path().to_str().unwrap();
        let cfg = load_with(&cli(&["--config", path, "--width", "454", "--low-bit-ambient", "true"])).unwrap();

        assert_eq!(cfg.log_level(), "debug");
        let options = cfg.face_options();
        assert_eq!(options.width, 454);
        assert_eq!(options.height, 400);
        assert_eq!(options.shape, ScreenShape::Round);
        assert_eq!(options.dimensions.y_offset_round, 120);
        assert_eq!(options.dimensions.x_offset_round, 25);
        assert_eq!(options.theme.background, embedded_graphics::pixelcolor::Rgb888::new(16, 16, 16));
        assert!(cfg.face_properties().low_bit_ambient);
        assert_eq!(cfg.sync_path(), "/wearable");
    }

    #[test]
    fn test_merge_keeps_unset_fields() {
        let mut dst = Config {
            face: Some(FaceConfig { width: Some(300), round: Some(true), ..Default::default() }),
            ..Default::default()
        };
        let src = Config {
            face: Some(FaceConfig { width: Some(200), ..Default::default() }),
            sync: Some(SyncConfig { path: Some("/weather".into()), source: None }),
            ..Default::default()
        };
        merge(&mut dst, src);
        let face = dst.face.unwrap();
        assert_eq!(face.width, Some(200));
        assert_eq!(face.round, Some(true));
        assert_eq!(dst.sync.unwrap().path.as_deref(), Some("/weather"));
    }

    #[test]
    fn test_validation() {
        let bad_colour = yaml_file("theme:\n  digital_text: white\n");
        let err = load_with(&cli(&["--config", bad_colour.path().to_str().unwrap()])).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        let zero = yaml_file("face:\n  interactive_update_ms: 0\n");
        assert!(load_with(&cli(&["--config", zero.path().to_str().unwrap()])).is_err());

        let relative = yaml_file("sync:\n  path: wearable\n");
        assert!(load_with(&cli(&["--config", relative.path().to_str().unwrap()])).is_err());

        let f = yaml_file("face:\n  width: 320\n");
        assert!(load_with(&cli(&["--config", f.path().to_str().unwrap(), "--height", "0"])).is_err());
    }

    #[test]
    fn test_missing_config_file() {
        let err = load_with(&cli(&["--config", "/nonexistent/sunshinewear.yaml"])).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.snapshot_path(), PathBuf::from("sunshinewear.ppm"));
        assert!(cfg.sync_source().is_none());
        assert_eq!(cfg.face_options().interactive_update_ms, 1000);
        assert_eq!(cfg.theme(), Theme::default());
    }
}
