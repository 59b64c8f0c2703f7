use std::io;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fern::colors::{Color, ColoredLevelConfig};

mod config;
mod console;
mod datetime;
mod done_command;
mod pause_command;
mod project;
mod projects_command;
mod start_command;
mod status_command;
mod store;
mod ticker;
mod timer_session;
mod timesheet;
mod watch_command;

use config::Config;
use console::{format_elapsed, ConsoleMarkdownList, ConsolePresenter};
use done_command::DoneCommand;
use pause_command::PauseCommand;
use projects_command::ProjectsCommand;
use start_command::{StartArgs, StartCommand};
use status_command::StatusCommand;
use store::RestTimesheetStore;
use watch_command::WatchCommand;

/// タイムシートサービスのタイマーを操作するCLIアプリケーション。
///
/// # Examples
/// ```
/// $ cargo run -- start --task "Write report" --project project1
/// $ cargo run -- status
/// ```
#[derive(Debug, Parser)]
#[clap(version, about)]
struct Args {
    #[clap(subcommand)]
    subcommand: SubCommands,
}

/// サブコマンドを表す列挙型。
#[derive(Debug, Subcommand)]
enum SubCommands {
    /// Start a new time entry or resume the paused one
    Start(StartArgs),
    /// Pause the running time entry
    Pause,
    /// Finish the active time entry
    Done,
    /// Show the active time entry
    Status,
    /// Keep re-rendering the elapsed time until Ctrl-C
    Watch,
    /// List projects to record entries against
    Projects,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logger().context("Failed to initialize the logger")?;

    let config = Config::load().context("Failed to load the configuration")?;
    let store = RestTimesheetStore::new(&config.api_url, &config.api_token);
    let stdout = io::stdout();
    let mut writer = stdout.lock();

    match args.subcommand {
        SubCommands::Start(start_args) => {
            let card = StartCommand::new(&store)
                .run(&config.user_id, start_args)
                .await?;
            ConsoleMarkdownList::new(&mut writer).show_timer(Some(&card))?;
        }
        SubCommands::Pause => {
            let card = PauseCommand::new(&store).run(&config.user_id).await?;
            ConsoleMarkdownList::new(&mut writer).show_timer(card.as_ref())?;
        }
        SubCommands::Done => match DoneCommand::new(&store).run(&config.user_id).await? {
            Some(total) => println!("Logged {} in total.", format_elapsed(total)),
            None => println!("No active time entry."),
        },
        SubCommands::Status => {
            let card = StatusCommand::new(&store).run(&config.user_id).await?;
            ConsoleMarkdownList::new(&mut writer).show_timer(card.as_ref())?;
        }
        SubCommands::Watch => {
            WatchCommand::new(&store)
                .run(&config.user_id, &mut writer)
                .await?;
        }
        SubCommands::Projects => {
            let projects = ProjectsCommand::new(&store).run(&config.user_id).await?;
            ConsoleMarkdownList::new(&mut writer).show_projects(&projects)?;
        }
    }

    Ok(())
}

/// ログ出力を初期化する。
fn setup_logger() -> Result<()> {
    let colors = ColoredLevelConfig::new()
        .info(Color::Green)
        .warn(Color::Yellow)
        .error(Color::Red);
    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%Y-%m-%dT%H:%M:%S"),
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .level(log::LevelFilter::Info)
        .chain(std::io::stderr())
        .apply()?;

    Ok(())
}
