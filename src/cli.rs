use std::{io, path::PathBuf};

use clap::{CommandFactory, Parser, Subcommand};

use crate::{
    config::{Config, Overrides, ReportingVariant},
    constants::{HOST_MARKUP, MENU_DEFAULTS},
    error::{Error, Result},
    gateway::TrackerCli,
    menu::{MenuComposer, MenuDocument, MenuLine, error_text},
    ranker::{ActivityRanker, RankOptions},
};

#[derive(Parser, Debug)]
#[command(name = "hambar")]
#[command(about = "Hamster time tracking menu for argos and bitbar", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[arg(long, global = true, help = "Config file (JSON)")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Days to look back for recent activities")]
    pub days: Option<u32>,

    #[arg(
        long,
        global = true,
        help = "Rank recent activities by age and frequency"
    )]
    pub age_frequency: bool,

    #[arg(
        long,
        global = true,
        help = "Leave descriptions out of recent activities"
    )]
    pub no_description: bool,

    #[arg(long, global = true, value_enum, help = "hamster reporting format")]
    pub variant: Option<ReportingVariant>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(about = "Print the menu (default)")]
    Render,

    #[command(about = "Print ranked recent activities")]
    Recent,

    #[command(about = "Print the effective configuration")]
    Config,

    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(help = "Shell type (bash, zsh, fish)")]
        shell: String,
    },
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            days: self.days,
            age_frequency: self.age_frequency,
            no_description: self.no_description,
            variant: self.variant,
        }
    }
}

pub fn render(config: &Config) -> Result<()> {
    let tracker = TrackerCli::new(config.tracker_bin.clone());
    let document = MenuComposer::new(&tracker, config).compose();
    print!("{}", document);
    Ok(())
}

pub fn recent(config: &Config) -> Result<()> {
    let tracker = TrackerCli::new(config.tracker_bin.clone());
    let ranker = ActivityRanker::new(&tracker, RankOptions::from_config(config));
    for label in ranker.recent_activities()? {
        println!("{}", label);
    }
    Ok(())
}

pub fn show_config(config: &Config) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    println!("{}", json);
    Ok(())
}

pub fn print_completions(shell: &str) -> Result<()> {
    use clap_complete::Shell;
    let shell = match shell {
        "bash" => Shell::Bash,
        "zsh" => Shell::Zsh,
        "fish" => Shell::Fish,
        _ => {
            return Err(Error::Usage(format!(
                "Unsupported shell: {}. Use bash, zsh, or fish.",
                shell
            )));
        }
    };
    clap_complete::generate(shell, &mut Cli::command(), "hambar", &mut io::stdout());
    Ok(())
}

/// Markup shown when the menu cannot be built at all. The host has no
/// error channel besides stdout.
fn fatal_menu(error: &Error) -> MenuDocument {
    MenuDocument {
        lines: vec![
            MenuLine::Text(HOST_MARKUP.degraded_label.to_string()),
            MenuLine::Separator,
            MenuLine::Colored {
                text: error_text(error),
                color: MENU_DEFAULTS.error_color.to_string(),
            },
        ],
    }
}

pub fn run_cli() {
    let cli = Cli::parse();

    if let Some(Command::Completions { shell }) = &cli.command {
        if let Err(e) = print_completions(shell) {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
        return;
    }

    let config = match Config::load(cli.config.as_deref(), &cli.overrides()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            match cli.command {
                None | Some(Command::Render) => print!("{}", fatal_menu(&e)),
                _ => eprintln!("Error: {}", e),
            }
            std::process::exit(e.exit_code());
        }
    };

    let result = match cli.command {
        None | Some(Command::Render) => render(&config),
        Some(Command::Recent) => recent(&config),
        Some(Command::Config) => show_config(&config),
        Some(Command::Completions { .. }) => Ok(()),
    };
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}
