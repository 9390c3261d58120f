use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use embedded_graphics::pixelcolor::Rgb888;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}, time::Duration};
use thiserror::Error;

use crate::display::color::hex_to_rgb;

const DEFAULT_ENDPOINT: &str = "https://api.github.com/graphql";
const DEFAULT_FLAT: Rgb888 = Rgb888::new(30, 200, 30);

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

/// Top-level app configuration as written in YAML. Every field is optional
/// so files and CLI flags can be layered over the defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub log_level: Option<String>,          // e.g., "info" | "debug"
    pub refresh_interval_secs: Option<u64>,
    pub poll_interval_ms: Option<u64>,
    /// keep today's count across a manual refresh (no alert for old news)
    pub keep_activity_on_reset: Option<bool>,

    pub render: Option<RenderConfig>,
    pub alert: Option<AlertConfig>,
    pub controls: Option<ControlsConfig>,
    pub github: Option<GithubConfig>,
    pub display: Option<DisplayConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RenderConfig {
    pub background_color: Option<String>,    // "rrggbb"
    pub flat_activity_color: Option<String>,
    pub total_gradient_steps: Option<u32>,
    pub gradient_b: Option<Vec<String>>,
    pub gradient_c: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AlertConfig {
    pub message: Option<String>,
    pub color: Option<String>,              // defaults to the flat activity color
    pub window_secs: Option<u64>,
    pub blink_on_secs: Option<u64>,
    pub blink_off_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ControlsConfig {
    pub refresh_gesture_ms: Option<u64>,
    pub brightness: Option<f32>,            // 0.0 - 1.0
    pub brightness_step: Option<f32>,
    pub volume: Option<f32>,
    pub volume_step: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GithubConfig {
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub token: Option<String>,
    pub endpoint: Option<String>,
    pub fetch_timeout_secs: Option<u64>,
    pub fetch_retries: Option<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DisplayConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub emulated: Option<bool>,
    pub scale: Option<u32>,                 // emulator window pixels per LED
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "contribmon", about = "GitHub contributions on an RGB matrix", version)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    /// Shorthand for --log-level debug
    #[arg(short = 'v', long, action = ArgAction::SetTrue)]
    pub debug: bool,
    /// GitHub login whose calendar is shown
    #[arg(short, long)]
    pub username: Option<String>,
    #[arg(long)]
    pub refresh_interval_secs: Option<u64>,
    /// Show the matrix in a desktop window
    #[arg(short, long, action = ArgAction::SetTrue)]
    pub emulated: bool,
    #[arg(long)]
    pub display_width: Option<u32>,
    #[arg(long)]
    pub display_height: Option<u32>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Fully resolved runtime settings, every default filled in
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub log_level: String,
    pub refresh_interval: Duration,
    pub poll_interval: Duration,
    pub keep_activity_on_reset: bool,
    pub render: RenderSettings,
    pub alert: AlertSettings,
    pub controls: ControlSettings,
    pub github: GithubSettings,
    pub display: DisplaySettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    pub background: Rgb888,
    pub flat_activity: Rgb888,
    pub total_gradient_steps: u32,
    pub gradient_b: Vec<Rgb888>,
    pub gradient_c: Vec<Rgb888>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlertSettings {
    pub message: String,
    pub color: Rgb888,
    pub window: Duration,
    pub blink_on: Duration,
    pub blink_off: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlSettings {
    pub refresh_gesture: Duration,
    pub brightness: f32,
    pub brightness_step: f32,
    pub volume: f32,
    pub volume_step: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GithubSettings {
    pub username: String,
    pub token: Option<String>,
    pub endpoint: String,
    pub timeout: Duration,
    pub retries: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySettings {
    pub width: u32,
    pub height: u32,
    pub emulated: bool,
    pub scale: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            refresh_interval: Duration::from_secs(30),
            poll_interval: Duration::from_millis(10),
            keep_activity_on_reset: false,
            render: RenderSettings::default(),
            alert: AlertSettings::default(),
            controls: ControlSettings::default(),
            github: GithubSettings::default(),
            display: DisplaySettings::default(),
        }
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            background: Rgb888::new(0, 0, 0),
            flat_activity: DEFAULT_FLAT,
            // one sweep across a year of weekly columns
            total_gradient_steps: 372,
            gradient_b: vec![Rgb888::new(255, 100, 100), Rgb888::new(40, 0, 255)],
            gradient_c: vec![
                Rgb888::new(255, 0, 0),
                Rgb888::new(255, 165, 0),
                Rgb888::new(255, 255, 0),
                Rgb888::new(0, 255, 0),
                Rgb888::new(0, 0, 255),
            ],
        }
    }
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            message: "NEW COMMIT".to_string(),
            color: DEFAULT_FLAT,
            window: Duration::from_secs(10),
            blink_on: Duration::from_secs(1),
            blink_off: Duration::from_secs(1),
        }
    }
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            refresh_gesture: Duration::from_millis(300),
            brightness: 0.5,
            brightness_step: 0.01,
            volume: 0.5,
            volume_step: 0.1,
        }
    }
}

impl Default for GithubSettings {
    fn default() -> Self {
        Self {
            username: String::new(),
            token: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(10),
            retries: 3,
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        // Galactic Unicorn
        Self { width: 53, height: 11, emulated: false, scale: 16 }
    }
}

/// Public entry point: parse CLI, read YAML, merge, validate.
pub fn load() -> Result<Settings, ConfigError> {
    let cli = Cli::parse();
    let cfg = load_from(&cli, std::env::var("GITHUB_TOKEN").ok())?;

    // 4) Validate
    let settings = cfg.resolve()?;

    if cli.dump_config {
        // Pretty YAML of effective config (token is never dumped)
        let s = serde_yaml::to_string(&cfg)?;
        println!("{s}");
        std::process::exit(0);
    }

    Ok(settings)
}

/// Layer defaults, YAML, environment and CLI into one `Config`
pub fn load_from(cli: &Cli, env_token: Option<String>) -> Result<Config, ConfigError> {
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
        log::debug!("using config {}", p.display());
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) token from the environment, then CLI overrides (highest precedence)
    apply_env_token(&mut cfg, env_token);
    apply_cli_overrides(&mut cfg, cli);
    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/contribmon/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/contribmon/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/contribmon.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["contribmon.yaml", "config.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    parse_yaml(&s)
}

pub fn parse_yaml(s: &str) -> Result<Config, ConfigError> {
    let cfg: Config = serde_yaml::from_str(s)?;
    Ok(cfg)
}

// Option-by-Option overwrite for flat groups
macro_rules! take_some {
    ($dst:expr, $src:expr, $($field:ident),+) => {
        $( if $src.$field.is_some() { $dst.$field = $src.$field; } )+
    };
}

/// Shallow merge `src` into `dst`, Option-by-Option.
pub fn merge(dst: &mut Config, src: Config) {
    // top-level
    take_some!(dst, src, log_level, refresh_interval_secs, poll_interval_ms, keep_activity_on_reset);

    merge_group(&mut dst.render, src.render, |d, s| {
        take_some!(d, s, background_color, flat_activity_color, total_gradient_steps, gradient_b, gradient_c);
    });
    merge_group(&mut dst.alert, src.alert, |d, s| {
        take_some!(d, s, message, color, window_secs, blink_on_secs, blink_off_secs);
    });
    merge_group(&mut dst.controls, src.controls, |d, s| {
        take_some!(d, s, refresh_gesture_ms, brightness, brightness_step, volume, volume_step);
    });
    merge_group(&mut dst.github, src.github, |d, s| {
        take_some!(d, s, username, token, endpoint, fetch_timeout_secs, fetch_retries);
    });
    merge_group(&mut dst.display, src.display, |d, s| {
        take_some!(d, s, width, height, emulated, scale);
    });
}

fn merge_group<T>(dst: &mut Option<T>, src: Option<T>, merge_fields: impl FnOnce(&mut T, T)) {
    match (dst.as_mut(), src) {
        (None, Some(s)) => *dst = Some(s),
        (Some(d), Some(s)) => merge_fields(d, s),
        _ => {}
    }
}

fn apply_env_token(cfg: &mut Config, env_token: Option<String>) {
    let Some(token) = env_token.filter(|t| !t.is_empty()) else { return };
    let github = cfg.github.get_or_insert_with(GithubConfig::default);
    if github.token.is_none() {
        github.token = Some(token);
    }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some()             { cfg.log_level = cli.log_level.clone(); }
    if cli.debug                           { cfg.log_level = Some("debug".to_string()); }
    if cli.refresh_interval_secs.is_some() { cfg.refresh_interval_secs = cli.refresh_interval_secs; }

    if cli.username.is_some() {
        cfg.github.get_or_insert_with(GithubConfig::default).username = cli.username.clone();
    }

    let any_display = cli.display_width.is_some() || cli.display_height.is_some() || cli.emulated;
    if any_display {
        let display = cfg.display.get_or_insert_with(DisplayConfig::default);
        if cli.display_width.is_some()  { display.width = cli.display_width; }
        if cli.display_height.is_some() { display.height = cli.display_height; }
        if cli.emulated                 { display.emulated = Some(true); }
    }
}

fn color_or(value: Option<&str>, default: Rgb888, key: &str) -> Result<Rgb888, ConfigError> {
    match value {
        Some(hex) => hex_to_rgb(hex).map_err(|e| ConfigError::Validation(format!("{}: {}", key, e))),
        None => Ok(default),
    }
}

fn stops_or(value: Option<&[String]>, default: &[Rgb888], key: &str) -> Result<Vec<Rgb888>, ConfigError> {
    let stops = match value {
        Some(hexes) => hexes
            .iter()
            .map(|h| color_or(Some(h.as_str()), Rgb888::new(0, 0, 0), key))
            .collect::<Result<Vec<_>, _>>()?,
        None => default.to_vec(),
    };
    if stops.len() < 2 {
        return Err(ConfigError::Validation(format!("{} needs at least 2 colors", key)));
    }
    Ok(stops)
}

fn unit_level(value: Option<f32>, default: f32, key: &str) -> Result<f32, ConfigError> {
    let v = value.unwrap_or(default);
    if (0.0..=1.0).contains(&v) {
        Ok(v)
    } else {
        Err(ConfigError::Validation(format!("{} must be within 0.0..=1.0", key)))
    }
}

fn non_zero<T: PartialEq + Default>(value: T, key: &str) -> Result<T, ConfigError> {
    if value == T::default() {
        Err(ConfigError::Validation(format!("{} must be > 0", key)))
    } else {
        Ok(value)
    }
}

impl Config {
    /// Fill defaults and check invariants (colors, ranges, required fields)
    pub fn resolve(&self) -> Result<Settings, ConfigError> {
        let d = Settings::default();
        let render = self.render.clone().unwrap_or_default();
        let alert = self.alert.clone().unwrap_or_default();
        let controls = self.controls.clone().unwrap_or_default();
        let github = self.github.clone().unwrap_or_default();
        let display = self.display.clone().unwrap_or_default();

        let flat_activity = color_or(render.flat_activity_color.as_deref(), d.render.flat_activity, "render.flat_activity_color")?;
        let render = RenderSettings {
            background: color_or(render.background_color.as_deref(), d.render.background, "render.background_color")?,
            flat_activity,
            total_gradient_steps: non_zero(
                render.total_gradient_steps.unwrap_or(d.render.total_gradient_steps),
                "render.total_gradient_steps",
            )?,
            gradient_b: stops_or(render.gradient_b.as_deref(), &d.render.gradient_b, "render.gradient_b")?,
            gradient_c: stops_or(render.gradient_c.as_deref(), &d.render.gradient_c, "render.gradient_c")?,
        };

        let alert = AlertSettings {
            message: alert.message.unwrap_or(d.alert.message),
            color: color_or(alert.color.as_deref(), flat_activity, "alert.color")?,
            window: alert.window_secs.map(Duration::from_secs).unwrap_or(d.alert.window),
            blink_on: alert.blink_on_secs.map(Duration::from_secs).unwrap_or(d.alert.blink_on),
            blink_off: alert.blink_off_secs.map(Duration::from_secs).unwrap_or(d.alert.blink_off),
        };

        let dc = &d.controls;
        let controls = ControlSettings {
            refresh_gesture: controls.refresh_gesture_ms.map(Duration::from_millis).unwrap_or(dc.refresh_gesture),
            brightness: unit_level(controls.brightness, dc.brightness, "controls.brightness")?,
            brightness_step: unit_level(controls.brightness_step, dc.brightness_step, "controls.brightness_step")?,
            volume: unit_level(controls.volume, dc.volume, "controls.volume")?,
            volume_step: unit_level(controls.volume_step, dc.volume_step, "controls.volume_step")?,
        };

        let username = github.username.unwrap_or_default();
        if username.trim().is_empty() {
            return Err(ConfigError::Validation("github.username is required".into()));
        }
        let github = GithubSettings {
            username,
            token: github.token,
            endpoint: github.endpoint.unwrap_or(d.github.endpoint),
            timeout: Duration::from_secs(non_zero(
                github.fetch_timeout_secs.unwrap_or(d.github.timeout.as_secs()),
                "github.fetch_timeout_secs",
            )?),
            retries: github.fetch_retries.unwrap_or(d.github.retries).max(1),
        };

        let display = DisplaySettings {
            width: non_zero(display.width.unwrap_or(d.display.width), "display.width")?,
            height: non_zero(display.height.unwrap_or(d.display.height), "display.height")?,
            emulated: display.emulated.unwrap_or(d.display.emulated),
            scale: display.scale.unwrap_or(d.display.scale).max(1),
        };

        Ok(Settings {
            log_level: self.log_level.clone().unwrap_or(d.log_level),
            refresh_interval: Duration::from_secs(non_zero(
                self.refresh_interval_secs.unwrap_or(d.refresh_interval.as_secs()),
                "refresh_interval_secs",
            )?),
            poll_interval: self.poll_interval_ms.map(Duration::from_millis).unwrap_or(d.poll_interval),
            keep_activity_on_reset: self.keep_activity_on_reset.unwrap_or(d.keep_activity_on_reset),
            render,
            alert,
            controls,
            github,
            display,
        })
    }
}
