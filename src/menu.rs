use std::fmt;

use chrono::{Local, NaiveDate};
use itertools::Itertools;

use crate::{
    config::Config,
    constants::HOST_MARKUP,
    error::Error,
    gateway::Tracker,
    ranker::{ActivityRanker, RankOptions},
    status::CurrentStatus,
    totals::FooterTotals,
};

/// One line of argos/bitbar markup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MenuLine {
    Text(String),
    Separator,
    Icon {
        data: String,
        height: u32,
        width: u32,
    },
    Header {
        caption: String,
        size: u32,
        color: String,
    },
    Action {
        label: String,
        command: String,
        nested: bool,
    },
    Colored {
        text: String,
        color: String,
    },
}

impl fmt::Display for MenuLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuLine::Text(text) => write!(f, "{}", text),
            MenuLine::Separator => write!(f, "{}", HOST_MARKUP.separator),
            MenuLine::Icon {
                data,
                height,
                width,
            } => write!(
                f,
                " |image={} imageHeight={} imageWidth={}",
                data, height, width
            ),
            MenuLine::Header {
                caption,
                size,
                color,
            } => write!(f, "{} | size={} | color={}", caption, size, color),
            MenuLine::Action {
                label,
                command,
                nested,
            } => write!(
                f,
                "{}{} | terminal=false refresh=true bash='{}'",
                if *nested { HOST_MARKUP.submenu_prefix } else { "" },
                label,
                command
            ),
            MenuLine::Colored { text, color } => write!(f, "{} | color={}", text, color),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MenuDocument {
    pub lines: Vec<MenuLine>,
}

impl MenuDocument {
    pub fn push(&mut self, line: MenuLine) {
        self.lines.push(line);
    }
}

impl fmt::Display for MenuDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Start,
    CurrentTask,
    Header,
    RecentActivities,
    Footer,
    Done,
}

impl Stage {
    pub fn next(self) -> Self {
        match self {
            Stage::Start => Stage::CurrentTask,
            Stage::CurrentTask => Stage::Header,
            Stage::Header => Stage::RecentActivities,
            Stage::RecentActivities => Stage::Footer,
            Stage::Footer | Stage::Done => Stage::Done,
        }
    }
}

/// Builds the menu one stage at a time. Tracker failures turn into colored
/// error lines so the bar never ends up blank.
pub struct MenuComposer<'a, T: Tracker> {
    tracker: &'a T,
    config: &'a Config,
    today: NaiveDate,
    stage: Stage,
    status: Option<Result<CurrentStatus, Error>>,
    document: MenuDocument,
}

impl<'a, T: Tracker> MenuComposer<'a, T> {
    pub fn new(tracker: &'a T, config: &'a Config) -> Self {
        Self::for_day(tracker, config, Local::now().date_naive())
    }

    /// Composer whose export window ends on `today`.
    pub fn for_day(tracker: &'a T, config: &'a Config, today: NaiveDate) -> Self {
        Self {
            tracker,
            config,
            today,
            stage: Stage::Start,
            status: None,
            document: MenuDocument::default(),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Moves to the next stage and emits its lines.
    pub fn step(&mut self) -> Stage {
        self.stage = self.stage.next();
        match self.stage {
            Stage::CurrentTask => self.emit_current_task(),
            Stage::Header => self.emit_header(),
            Stage::RecentActivities => self.emit_recent(),
            Stage::Footer => self.emit_footer(),
            Stage::Start | Stage::Done => {}
        }
        self.stage
    }

    pub fn compose(mut self) -> MenuDocument {
        while self.stage() != Stage::Done {
            self.step();
        }
        self.document
    }

    fn emit_current_task(&mut self) {
        let status = CurrentStatus::query(self.tracker, &self.config.no_activity);
        let line = match (&status, self.config.icon()) {
            (Ok(_), Some(icon)) => {
                let (height, width) = self.config.icon_dimensions();
                MenuLine::Icon {
                    data: icon.to_string(),
                    height,
                    width,
                }
            }
            (Ok(status), None) => MenuLine::Text(status.label.clone()),
            (Err(e), _) => {
                log::warn!("current status unavailable: {}", e);
                MenuLine::Text(HOST_MARKUP.degraded_label.to_string())
            }
        };
        self.document.push(line);
        self.document.push(MenuLine::Separator);
        self.status = Some(status);
    }

    fn emit_header(&mut self) {
        let header = self.header(HOST_MARKUP.current_caption);
        self.document.push(header);

        let status = match &self.status {
            Some(Ok(status)) => status,
            Some(Err(e)) => {
                let line = self.error_line(e);
                self.document.push(line);
                return;
            }
            None => return,
        };

        let label = status.header_label();
        let padding = self
            .config
            .menu_width
            .saturating_sub(label.chars().count())
            .max(1);
        let active = status.active;

        self.document.push(MenuLine::Action {
            label: format!(
                "{}{}{}{}",
                HOST_MARKUP.monospace_open,
                label,
                " ".repeat(padding),
                HOST_MARKUP.add_button
            ),
            command: self.config.add_command(),
            nested: false,
        });
        if active {
            self.document.push(MenuLine::Action {
                label: HOST_MARKUP.stop_label.to_string(),
                command: self.config.stop_command(),
                nested: false,
            });
        }
    }

    fn emit_recent(&mut self) {
        let header = self.header(HOST_MARKUP.recent_caption);
        self.document.push(header);

        let ranker = ActivityRanker::new(self.tracker, RankOptions::from_config(self.config));
        match ranker.recent_activities_on(self.today) {
            Ok(labels) => {
                for label in labels {
                    let command = self.config.start_command(&label);
                    self.document.push(MenuLine::Action {
                        label,
                        command,
                        nested: true,
                    });
                }
            }
            Err(e) => {
                log::warn!("recent activities unavailable: {}", e);
                let line = self.error_line(&e);
                self.document.push(line);
            }
        }
    }

    fn emit_footer(&mut self) {
        self.document.push(MenuLine::Separator);
        self.document.push(MenuLine::Action {
            label: HOST_MARKUP.overview_label.to_string(),
            command: self.config.overview_command(),
            nested: false,
        });

        let totals = self
            .tracker
            .run("list", true)
            .and_then(|listing| self.config.variant.compute_totals(&listing));
        let line = match totals {
            Ok(totals) => self.totals_line(&totals),
            Err(e) => {
                log::warn!("totals unavailable: {}", e);
                self.error_line(&e)
            }
        };
        self.document.push(line);
    }

    fn header(&self, caption: &str) -> MenuLine {
        MenuLine::Header {
            caption: caption.to_string(),
            size: self.config.menu_size,
            color: self.config.menu_color.clone(),
        }
    }

    fn totals_line(&self, totals: &FooterTotals) -> MenuLine {
        let breakdown = if totals.breakdown.is_empty() {
            String::new()
        } else {
            format!("<small>({})</small>", totals.breakdown)
        };
        MenuLine::Colored {
            text: format!("<b>total</b>: {} {}", totals.total, breakdown),
            color: self.config.menu_color.clone(),
        }
    }

    fn error_line(&self, error: &Error) -> MenuLine {
        MenuLine::Colored {
            text: error_text(error),
            color: self.config.error_color.clone(),
        }
    }
}

/// Error message folded onto a single menu line. Tracker stderr can span
/// several lines and a stray `|` would start the parameter section.
pub fn error_text(error: &Error) -> String {
    error
        .to_string()
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .join(" ")
        .replace('|', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{ReportingVariant, Watch},
        gateway::fake::FakeTracker,
    };

    const ACTIVE: &str = "2026-10-16 09:12 Code@Work, refactor 0:35";
    const EXPORT: &str = "\
activity\tstart time\tend time\tduration minutes\tcategory\tdescription\ttags
Mail\t2026-10-15 08:00:00\t2026-10-15 08:30:00\t30\tWork\t\t
Code\t2026-10-14 09:00:00\t2026-10-14 10:00:00\t60\tWork\trefactor\turgent
Code\t2026-10-16 09:00:00\t2026-10-16 10:00:00\t60\tWork\trefactor\turgent
Total\t\t\t150\t\t\t
";
    const LISTING: &str = "\
Start  End    Duration   Activity
------ ------ ---------- ------------
09:00 - 10:00 (1h 0min) Code@Work, refactor
------------------------------
Work: 1h 30min
Total: 1h 30min
";

    fn config() -> Config {
        let mut config = Config::default();
        config.watch = Watch::Off;
        config.validate().unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn render(tracker: &FakeTracker, config: &Config) -> String {
        MenuComposer::for_day(tracker, config, today())
            .compose()
            .to_string()
    }

    #[test]
    fn test_stage_order() {
        let mut stage = Stage::Start;
        let mut seen = Vec::new();
        while stage != Stage::Done {
            stage = stage.next();
            seen.push(stage);
        }
        assert_eq!(
            seen,
            vec![
                Stage::CurrentTask,
                Stage::Header,
                Stage::RecentActivities,
                Stage::Footer,
                Stage::Done
            ]
        );
        assert_eq!(Stage::Done.next(), Stage::Done);
    }

    #[test]
    fn test_line_markup() {
        assert_eq!(MenuLine::Separator.to_string(), "---");
        assert_eq!(
            MenuLine::Header {
                caption: "Recent activities".to_string(),
                size: 10,
                color: "#919191".to_string(),
            }
            .to_string(),
            "Recent activities | size=10 | color=#919191"
        );
        assert_eq!(
            MenuLine::Icon {
                data: "AAAA".to_string(),
                height: 24,
                width: 30,
            }
            .to_string(),
            " |image=AAAA imageHeight=24 imageWidth=30"
        );
    }

    #[test]
    fn test_active_menu() {
        let tracker = FakeTracker::new()
            .with("current", ACTIVE)
            .with("export", EXPORT)
            .with("list", LISTING);

        let expected = "\
Code  0:35
---
Current activity | size=10 | color=#919191
<span font_family='monospace'>Code@Work         <b>+</b></span> | terminal=false refresh=true bash='hamster add  '
Stop Tracking | terminal=false refresh=true bash='hamster stop'
Recent activities | size=10 | color=#919191
-- Code@Work, refactor  #urgent | terminal=false refresh=true bash='hamster start \"Code@Work, refactor  #urgent\"'
-- Mail@Work | terminal=false refresh=true bash='hamster start \"Mail@Work\"'
---
Show Overview | terminal=false refresh=true bash='hamster overview '
<b>total</b>: 1h30m <small>(Work:1h30m)</small> | color=#919191
";
        assert_eq!(render(&tracker, &config()), expected);
        assert_eq!(
            tracker.calls.borrow().as_slice(),
            ["current", "export tsv 2026-10-02 2026-10-16", "list"]
        );
    }

    #[test]
    fn test_inactive_menu_has_no_stop_line() {
        let tracker = FakeTracker::new()
            .with("current", "No activity")
            .with("export", "header\n\n")
            .with("list", "a\nb\nTotal: 0h 0min");

        let out = render(&tracker, &config());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "No activity");
        assert_eq!(
            lines[3],
            "<span font_family='monospace'>No activity       <b>+</b></span> | terminal=false refresh=true bash='hamster add  '"
        );
        assert!(!out.contains("Stop Tracking"));
        assert_eq!(lines[4], "Recent activities | size=10 | color=#919191");
        assert_eq!(lines.last(), Some(&"<b>total</b>: 0h  | color=#919191"));
    }

    #[test]
    fn test_long_label_keeps_one_space() {
        let tracker = FakeTracker::new()
            .with("current", "2026-10-16 09:12 Extremely long activity name@Work 0:01")
            .with("export", "")
            .with("list", "a\nb\nTotal: 0h 1min");
        let out = render(&tracker, &config());
        assert!(out.contains("Extremely long activity name@Work 0:01 <b>+</b></span>"));
    }

    #[test]
    fn test_legacy_variant() {
        let mut config = config();
        config.variant = ReportingVariant::One;
        let tracker = FakeTracker::new()
            .with("current", "No activity")
            .with("export", "")
            .with("list", "Work: 1.5h, Home: 0.5h");
        let out = render(&tracker, &config);
        assert!(out.contains("bash='hamster '"));
        assert!(out.ends_with("<b>total</b>: 2h <small>(Work: 1.5h, Home: 0.5h)</small> | color=#919191\n"));
    }

    #[test]
    fn test_icon_replaces_bar_label() {
        let path = std::path::PathBuf::from(format!(
            "/tmp/hambar_menu_icon_{}.b64",
            std::process::id()
        ));
        std::fs::write(&path, "PHN2Zz4=").unwrap();
        let mut config = Config::default();
        config.icon_file = Some(path.clone());
        config.scale = 2.0;
        config.watch = Watch::Off;
        let config = config.validate().unwrap();
        let tracker = FakeTracker::new()
            .with("current", ACTIVE)
            .with("export", "")
            .with("list", "a\nb\nTotal: 0h 0min");

        let out = render(&tracker, &config);
        assert_eq!(
            out.lines().next(),
            Some(" |image=PHN2Zz4= imageHeight=48 imageWidth=60")
        );
        assert!(out.contains("Stop Tracking"));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_failed_export_degrades_recent_section() {
        let tracker = FakeTracker::new()
            .with("current", "No activity")
            .failing("export", "database locked")
            .with("list", "a\nb\nTotal: 0h 0min");

        let out = render(&tracker, &config());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[4], "Recent activities | size=10 | color=#919191");
        assert!(lines[5].contains("database locked"));
        assert!(lines[5].ends_with("| color=#cc0000"));
        assert_eq!(lines[6], "---");
    }

    #[test]
    fn test_multiline_tracker_error_stays_on_one_line() {
        let tracker = FakeTracker::new()
            .with("current", "No activity")
            .failing(
                "export",
                "Traceback (most recent call last):\n  File \"hamster\", line 1\nsqlite3.OperationalError: database is locked",
            )
            .with("list", "a\nb\nTotal: 0h 0min");

        let out = render(&tracker, &config());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[4], "Recent activities | size=10 | color=#919191");
        assert!(lines[5].starts_with("tracker command `export tsv 2026-10-02 2026-10-16` failed"));
        assert!(lines[5].ends_with(
            "Traceback (most recent call last): File \"hamster\", line 1 sqlite3.OperationalError: database is locked | color=#cc0000"
        ));
        assert_eq!(lines[6], "---");
        assert_eq!(out.matches("Traceback").count(), 1);
    }

    #[test]
    fn test_error_text_folds_lines_and_pipes() {
        let error = Error::gateway("list", "a\n\n  b | c  \n");
        assert_eq!(error_text(&error), "tracker command `list` failed: a b / c");
    }

    #[test]
    fn test_unreachable_tracker_still_renders_every_section() {
        let tracker = FakeTracker::new()
            .failing("current", "not installed")
            .failing("export", "not installed")
            .failing("list", "not installed");

        let doc = MenuComposer::for_day(&tracker, &config(), today()).compose();
        assert_eq!(doc.lines[0], MenuLine::Text("hamster ⚠".to_string()));
        assert_eq!(doc.lines[1], MenuLine::Separator);
        assert!(doc.lines.iter().any(|l| matches!(l, MenuLine::Header { caption, .. } if caption == "Recent activities")));
        assert!(!doc.lines.iter().any(|l| matches!(l, MenuLine::Action { label, .. } if label == "Stop Tracking")));
        let errors = doc
            .lines
            .iter()
            .filter(|l| matches!(l, MenuLine::Colored { color, .. } if color == "#cc0000"))
            .count();
        assert_eq!(errors, 3);
    }

    #[test]
    fn test_malformed_listing_degrades_footer() {
        let tracker = FakeTracker::new()
            .with("current", "No activity")
            .with("export", "")
            .with("list", "nonsense");
        let doc = MenuComposer::for_day(&tracker, &config(), today()).compose();
        assert!(matches!(
            doc.lines.last(),
            Some(MenuLine::Colored { color, .. }) if color == "#cc0000"
        ));
    }

    #[test]
    fn test_step_by_step() {
        let tracker = FakeTracker::new()
            .with("current", "No activity")
            .with("export", "")
            .with("list", "a\nb\nTotal: 0h 0min");
        let config = config();
        let mut composer = MenuComposer::for_day(&tracker, &config, today());
        assert_eq!(composer.stage(), Stage::Start);
        assert_eq!(composer.step(), Stage::CurrentTask);
        assert_eq!(tracker.calls.borrow().as_slice(), ["current"]);
        assert_eq!(composer.step(), Stage::Header);
        assert_eq!(tracker.calls.borrow().len(), 1);
        assert_eq!(composer.step(), Stage::RecentActivities);
        assert_eq!(composer.step(), Stage::Footer);
        assert_eq!(composer.step(), Stage::Done);
        assert_eq!(composer.step(), Stage::Done);
        assert_eq!(tracker.calls.borrow().len(), 3);
    }
}
