pub const MENU_DEFAULTS: MenuDefaults = MenuDefaults {
    color: "#919191",
    size: 10,
    error_color: "#cc0000",
    width: 18,
    no_activity: "No activity",
};

pub const ICON_SETTINGS: IconSettings = IconSettings {
    base_height: 24.0,
    base_width: 30.0,
};

pub const HOST_MARKUP: HostMarkup = HostMarkup {
    separator: "---",
    submenu_prefix: "-- ",
    current_caption: "Current activity",
    recent_caption: "Recent activities",
    stop_label: "Stop Tracking",
    overview_label: "Show Overview",
    degraded_label: "hamster ⚠",
    monospace_open: "<span font_family='monospace'>",
    add_button: "<b>+</b></span>",
};

pub const WATCH_SETTINGS: WatchSettings = WatchSettings {
    program: "inotifywait",
    db_dir: "hamster-applet",
    db_file: "hamster.db",
    plugin_dir: "~/.config/argos",
};

pub const EXPORT_SHAPE: ExportShape = ExportShape {
    leading_lines: 1,
    trailing_lines: 2,
    fields: 7,
    date_len: 10,
};

pub const LISTING_MARKER: &str = "------";

pub struct MenuDefaults {
    pub color: &'static str,
    pub size: u32,
    pub error_color: &'static str,
    pub width: usize,
    pub no_activity: &'static str,
}

pub struct IconSettings {
    pub base_height: f64,
    pub base_width: f64,
}

pub struct HostMarkup {
    pub separator: &'static str,
    pub submenu_prefix: &'static str,
    pub current_caption: &'static str,
    pub recent_caption: &'static str,
    pub stop_label: &'static str,
    pub overview_label: &'static str,
    pub degraded_label: &'static str,
    pub monospace_open: &'static str,
    pub add_button: &'static str,
}

pub struct WatchSettings {
    pub program: &'static str,
    pub db_dir: &'static str,
    pub db_file: &'static str,
    pub plugin_dir: &'static str,
}

pub struct ExportShape {
    pub leading_lines: usize,
    pub trailing_lines: usize,
    pub fields: usize,
    pub date_len: usize,
}
