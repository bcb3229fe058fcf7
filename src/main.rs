mod cli;
mod config;
mod constants;
mod error;
mod gateway;
mod menu;
mod ranker;
mod status;
mod totals;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    cli::run_cli();
}
