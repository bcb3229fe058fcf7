use std::{
    env, fs,
    path::{Path, PathBuf},
};

use clap::ValueEnum;
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};

use crate::{
    constants::{ICON_SETTINGS, MENU_DEFAULTS, WATCH_SETTINGS},
    error::{Error, Result},
};

/// Shape of the tracker's `list` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportingVariant {
    /// hamster 1.x: one comma-separated `label:valueh` totals line.
    One,
    /// hamster 2.x and later: per-category block after a dashed marker.
    Two,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Watch {
    #[default]
    Auto,
    Off,
    Command(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tracker_bin: String,
    pub days: u32,
    pub age_frequency_ranking: bool,
    pub use_description: bool,
    pub variant: ReportingVariant,
    pub menu_color: String,
    pub menu_size: u32,
    pub error_color: String,
    pub menu_width: usize,
    pub scale: f64,
    pub icon_file: Option<PathBuf>,
    pub no_activity: String,
    pub watch: Watch,

    #[serde(skip)]
    watch_fragment: String,
    #[serde(skip)]
    icon: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tracker_bin: "hamster".to_string(),
            days: 14,
            age_frequency_ranking: false,
            use_description: true,
            variant: ReportingVariant::Two,
            menu_color: MENU_DEFAULTS.color.to_string(),
            menu_size: MENU_DEFAULTS.size,
            error_color: MENU_DEFAULTS.error_color.to_string(),
            menu_width: MENU_DEFAULTS.width,
            scale: 1.0,
            icon_file: None,
            no_activity: MENU_DEFAULTS.no_activity.to_string(),
            watch: Watch::Auto,
            watch_fragment: String::new(),
            icon: None,
        }
    }
}

/// Command-line values layered over the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub days: Option<u32>,
    pub age_frequency: bool,
    pub no_description: bool,
    pub variant: Option<ReportingVariant>,
}

pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "hambar", "hambar").map(|dirs| dirs.config_dir().join("config.json"))
}

impl Config {
    /// Loads, overrides and validates the configuration. A missing file is
    /// not an error; a file that exists but does not parse is.
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let path = path.map(Path::to_path_buf).or_else(default_config_path);
        let config = match path {
            Some(p) if p.exists() => Self::from_file(&p)?,
            Some(p) => {
                log::debug!("no config at {}, using defaults", p.display());
                Self::default()
            }
            None => Self::default(),
        };
        config.with_overrides(overrides).validate()
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn with_overrides(mut self, overrides: &Overrides) -> Self {
        if let Some(days) = overrides.days {
            self.days = days;
        }
        if overrides.age_frequency {
            self.age_frequency_ranking = true;
        }
        if overrides.no_description {
            self.use_description = false;
        }
        if let Some(variant) = overrides.variant {
            self.variant = variant;
        }
        self
    }

    pub fn validate(mut self) -> Result<Self> {
        if self.days == 0 {
            return Err(Error::Config("days must be at least 1".to_string()));
        }
        if self.menu_width == 0 {
            return Err(Error::Config("menu_width must be at least 1".to_string()));
        }
        if !(self.scale > 0.0) {
            return Err(Error::Config(format!(
                "scale must be positive, got {}",
                self.scale
            )));
        }
        if self.tracker_bin.trim().is_empty() {
            return Err(Error::Config("tracker_bin must not be empty".to_string()));
        }
        if self.no_activity.is_empty() {
            return Err(Error::Config("no_activity must not be empty".to_string()));
        }

        self.watch_fragment = match &self.watch {
            Watch::Off => String::new(),
            Watch::Command(fragment) => fragment.clone(),
            Watch::Auto => auto_watch_fragment(),
        };

        if let Some(path) = &self.icon_file {
            let data = fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("cannot read icon {}: {}", path.display(), e))
            })?;
            self.icon = Some(data.trim().to_string());
        }

        Ok(self)
    }

    pub fn watch_fragment(&self) -> &str {
        &self.watch_fragment
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    /// `(height, width)` of the bar icon after DPI scaling.
    pub fn icon_dimensions(&self) -> (u32, u32) {
        (
            (ICON_SETTINGS.base_height * self.scale) as u32,
            (ICON_SETTINGS.base_width * self.scale) as u32,
        )
    }

    pub fn add_command(&self) -> String {
        match self.variant {
            ReportingVariant::Two => format!("{} add  {}", self.tracker_bin, self.watch_fragment()),
            ReportingVariant::One => format!("{} {}", self.tracker_bin, self.watch_fragment()),
        }
    }

    pub fn overview_command(&self) -> String {
        format!("{} overview {}", self.tracker_bin, self.watch_fragment())
    }

    pub fn stop_command(&self) -> String {
        format!("{} stop", self.tracker_bin)
    }

    pub fn start_command(&self, label: &str) -> String {
        format!("{} start \"{}\"", self.tracker_bin, label)
    }
}

fn auto_watch_fragment() -> String {
    if !on_path(WATCH_SETTINGS.program) {
        return String::new();
    }
    let Some(base) = BaseDirs::new() else {
        log::warn!("no home directory, change watch disabled");
        return String::new();
    };
    let db_path = base
        .data_dir()
        .join(WATCH_SETTINGS.db_dir)
        .join(WATCH_SETTINGS.db_file);
    let script = env::args()
        .next()
        .and_then(|arg0| {
            Path::new(&arg0)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "hambar".to_string());

    format!(
        "; {} \"{}\" -e modify ; touch {}/{}",
        WATCH_SETTINGS.program,
        db_path.display(),
        WATCH_SETTINGS.plugin_dir,
        script
    )
}

fn on_path(program: &str) -> bool {
    env::var_os("PATH")
        .map(|paths| env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
        .unwrap_or(false)
}
