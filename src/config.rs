use crate::events::AppEvent;
use async_channel::Sender;
use directories::ProjectDirs;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use palette::Srgb;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use strum::{Display as StrumDisplay, EnumString};
use thiserror::Error;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    SerializeDisplay,
    DeserializeFromStr,
    EnumString,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum LineCap {
    Butt,
    #[default]
    Round,
    Square,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown color '{0}', expected a color name or #rrggbb")]
pub struct ColorParseError(String);

/// An opaque sRGB color written as a CSS color name or `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, SerializeDisplay, DeserializeFromStr)]
pub struct Color(pub Srgb<u8>);

impl Color {
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self(Srgb::new(red, green, blue))
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with('#') {
            return s
                .parse::<Srgb<u8>>()
                .map(Self)
                .map_err(|_| ColorParseError(s.to_string()));
        }
        palette::named::from_str(&s.to_ascii_lowercase())
            .map(Self)
            .ok_or_else(|| ColorParseError(s.to_string()))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (r, g, b) = self.0.into_components();
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DialConfig {
    pub stroke_width: f64,
    /// Space kept between the arc and the sides of the dial area.
    pub margin: f64,
    pub knob_radius: f64,
    pub knob_inner_radius: f64,
    pub line_cap: LineCap,
    /// Share of the window height given to the image above the dial.
    pub image_region: f64,
}

impl Default for DialConfig {
    fn default() -> Self {
        Self {
            stroke_width: 20.0,
            margin: 40.0,
            knob_radius: 20.0,
            knob_inner_radius: 15.0,
            line_cap: LineCap::Round,
            image_region: 2.0 / 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ColorConfig {
    pub background: Color,
    pub track: Color,
    pub fill: Color,
    pub knob: Color,
    pub knob_center: Color,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            background: Color::rgb(0, 0, 0),
            track: Color::rgb(128, 128, 128),
            fill: Color::rgb(255, 165, 0),
            knob: Color::rgb(255, 165, 0),
            knob_center: Color::rgb(255, 255, 255),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ImageConfig {
    pub path: PathBuf,
    pub size: i32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("ghost.png"),
            size: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Use a wlr-layer-shell overlay when the compositor supports it.
    pub overlay: bool,
    pub close_on_complete: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            overlay: true,
            close_on_complete: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Config {
    pub dial: DialConfig,
    pub colors: ColorConfig,
    pub image: ImageConfig,
    pub window: WindowConfig,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Image size must be positive, got {0}")]
    InvalidImageSize(i32),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Config {
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.image.size <= 0 {
            return Err(ConfigError::InvalidImageSize(self.image.size));
        }
        Ok(self)
    }
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "unveil", "unveil").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&get_config_path()?)
}

pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let s = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix("UNVEIL")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    s.try_deserialize::<Config>()?.validate()
}

pub fn load_or_setup() -> Config {
    if let Ok(path) = get_config_path()
        && !path.exists()
    {
        match write_default_config() {
            Ok(path) => log::info!("Wrote default config to {}", path.display()),
            Err(e) => log::warn!("Failed to write default config: {}", e),
        }
    }

    match load_config() {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Using default config: {}", e);
            Config::default()
        }
    }
}

pub fn write_default_config() -> std::io::Result<PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

/// Resolves the image path: absolute paths as given, relative ones against
/// the config directory first, then the XDG data directories.
pub fn resolve_image_path(image: &ImageConfig) -> Option<PathBuf> {
    let config_path = get_config_path().ok();
    resolve_image_path_in(image, config_path.as_deref().and_then(Path::parent))
}

fn resolve_image_path_in(image: &ImageConfig, config_dir: Option<&Path>) -> Option<PathBuf> {
    if image.path.is_absolute() {
        return image.path.exists().then(|| image.path.clone());
    }

    config_dir
        .map(|dir| dir.join(&image.path))
        .filter(|p| p.exists())
        .or_else(|| xdg::BaseDirectories::with_prefix("unveil").find_data_file(&image.path))
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

/// Watches the config directory and sends `ConfigReload` whenever the
/// config file changes. Returns once the receiving side is gone.
pub async fn run_async_watcher(tx: Sender<AppEvent>) -> Result<(), ConfigError> {
    let config_path = get_config_path()?;
    let config_dir = config_path
        .parent()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .to_path_buf();
    fs_err::create_dir_all(&config_dir)?;

    let (bridge_tx, bridge_rx) = async_channel::unbounded();
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    )?;
    watcher.watch(&config_dir, RecursiveMode::NonRecursive)?;

    while let Ok(res) = bridge_rx.recv().await {
        let event: Event = match res {
            Ok(event) => event,
            Err(e) => {
                log::error!("{}", ConfigError::from(e));
                continue;
            }
        };

        if touches_config(&event, &config_path) && tx.send(AppEvent::ConfigReload).await.is_err() {
            break;
        }
    }
    Ok(())
}

fn touches_config(event: &Event, config_path: &Path) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|p| p == config_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_cap_deserialization() {
        let cases = vec![
            ("\"round\"", LineCap::Round),
            ("\"Round\"", LineCap::Round),
            ("\"BUTT\"", LineCap::Butt),
            ("\"square\"", LineCap::Square),
        ];

        for (json, expected) in cases {
            let deserialized: LineCap = serde_json::from_str(json).unwrap();
            assert_eq!(deserialized, expected);
        }

        assert!(serde_json::from_str::<LineCap>("\"pointy\"").is_err());
        assert_eq!(serde_json::to_string(&LineCap::Square).unwrap(), "\"square\"");
    }

    #[test]
    fn test_color_parsing() {
        let cases = vec![
            ("orange", Color::rgb(255, 165, 0)),
            ("Gray", Color::rgb(128, 128, 128)),
            ("white", Color::rgb(255, 255, 255)),
            ("#1a2B3c", Color::rgb(0x1a, 0x2b, 0x3c)),
            (" black ", Color::rgb(0, 0, 0)),
        ];

        for (text, expected) in cases {
            assert_eq!(text.parse::<Color>(), Ok(expected), "color {text:?}");
        }

        assert!("notacolor".parse::<Color>().is_err());
        assert!("#12345z".parse::<Color>().is_err());
    }

    #[test]
    fn test_color_serializes_as_hex() {
        assert_eq!(
            serde_json::to_string(&Color::rgb(255, 165, 0)).unwrap(),
            "\"#ffa500\""
        );
        let color: Color = serde_json::from_str("\"#ffa500\"").unwrap();
        assert_eq!(color, Color::rgb(255, 165, 0));
    }

    #[test]
    fn test_default_config_file_matches_defaults() {
        let parsed: Config = config::Config::builder()
            .add_source(config::File::from_str(
                DEFAULT_CONFIG,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(parsed.colors, ColorConfig::default());
        assert_eq!(parsed.image, ImageConfig::default());
        assert_eq!(parsed.window, WindowConfig::default());
        assert_eq!(parsed.dial.line_cap, LineCap::Round);
        assert_eq!(parsed.dial.stroke_width, 20.0);
        assert!((parsed.dial.image_region - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let parsed: Config = config::Config::builder()
            .add_source(config::File::from_str(
                "[dial]\nstroke_width = 12\n[colors]\nfill = \"#00ff00\"\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(parsed.dial.stroke_width, 12.0);
        assert_eq!(parsed.dial.margin, 40.0);
        assert_eq!(parsed.colors.fill, Color::rgb(0, 255, 0));
        assert_eq!(parsed.colors.track, Color::rgb(128, 128, 128));
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("unveil-{}-{}", name, std::process::id()));
        fs_err::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_env_overrides_file_values() {
        // SAFETY: no other test reads or writes this variable
        unsafe { std::env::set_var("UNVEIL_DIAL__KNOB_RADIUS", "12") };
        let config = load_config_from(Path::new("/nonexistent/unveil/config.toml"));
        unsafe { std::env::remove_var("UNVEIL_DIAL__KNOB_RADIUS") };

        assert_eq!(config.unwrap().dial.knob_radius, 12.0);
    }

    #[test]
    fn test_non_positive_image_size_is_rejected() {
        let dir = scratch_dir("image-size");
        for size in [0, -1, -200] {
            let path = dir.join(format!("size{}.toml", size));
            fs_err::write(&path, format!("[image]\nsize = {size}\n")).unwrap();
            assert!(matches!(
                load_config_from(&path),
                Err(ConfigError::InvalidImageSize(s)) if s == size
            ));
        }

        let path = dir.join("ok.toml");
        fs_err::write(&path, "[image]\nsize = 64\n").unwrap();
        assert_eq!(load_config_from(&path).unwrap().image.size, 64);
    }

    #[test]
    fn test_resolve_image_path() {
        let dir = scratch_dir("image-path");
        let file = dir.join("ghost.png");
        fs_err::write(&file, b"png").unwrap();

        let absolute = ImageConfig {
            path: file.clone(),
            size: 200,
        };
        assert_eq!(resolve_image_path_in(&absolute, None), Some(file.clone()));

        let missing = ImageConfig {
            path: dir.join("missing.png"),
            size: 200,
        };
        assert_eq!(resolve_image_path_in(&missing, Some(&dir)), None);

        let relative = ImageConfig::default();
        assert_eq!(resolve_image_path_in(&relative, Some(&dir)), Some(file));

        let unknown = ImageConfig {
            path: PathBuf::from("unveil-no-such-image-3f9c.png"),
            size: 200,
        };
        assert_eq!(resolve_image_path_in(&unknown, Some(&dir)), None);
    }

    #[test]
    fn test_watcher_only_reacts_to_config_file() {
        use notify::event::{AccessKind, CreateKind, ModifyKind};

        let config_path = PathBuf::from("/home/user/.config/unveil/config.toml");
        let modify = Event::new(EventKind::Modify(ModifyKind::Any)).add_path(config_path.clone());
        let create = Event::new(EventKind::Create(CreateKind::File)).add_path(config_path.clone());
        let access = Event::new(EventKind::Access(AccessKind::Any)).add_path(config_path.clone());
        let other = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/home/user/.config/unveil/ghost.png"));

        assert!(touches_config(&modify, &config_path));
        assert!(touches_config(&create, &config_path));
        assert!(!touches_config(&access, &config_path));
        assert!(!touches_config(&other, &config_path));
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let config = load_config_from(Path::new("/nonexistent/unveil/config.toml")).unwrap();
        assert_eq!(config.image, ImageConfig::default());
    }
}
