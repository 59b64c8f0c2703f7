use std::io::Write;

use anyhow::{Context, Result};

use crate::project::Project;
use crate::store::TimesheetStore;
use crate::timer_session::{TimerSession, TimerState};

/// 経過秒数を表示用の文字列にする。
///
/// 1時間以上は`h:mm:ss`、1時間未満は`m:ss`の形式となる。
pub fn format_elapsed(total_seconds: i64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// タイマーの現在の状態を表示するためのビュー。
#[derive(Clone, Debug, PartialEq)]
pub struct TimerCard {
    pub task_name: String,
    pub project_id: Option<String>,
    pub elapsed: i64,
    pub paused: bool,
}

impl TimerCard {
    /// セッションの現在の状態から表示用のカードを作成する。
    ///
    /// Idleの場合は表示するものがないためNoneを返す。
    pub fn from_session<S: TimesheetStore>(session: &TimerSession<'_, S>) -> Option<Self> {
        match session.state() {
            TimerState::Idle => None,
            state => Some(Self {
                task_name: session.task_name().to_string(),
                project_id: session.selected_project().map(|id| id.to_string()),
                elapsed: session.compute_elapsed(),
                paused: matches!(state, TimerState::Paused { .. }),
            }),
        }
    }
}

/// Consoleにタイマーの状態を表示するためのtrait。
pub trait ConsolePresenter {
    /// タイマーカードを表示する。カードがない場合はその旨を表示する。
    fn show_timer(&mut self, card: Option<&TimerCard>) -> Result<()>;

    /// プロジェクト一覧を表示する。
    fn show_projects(&mut self, projects: &[Project]) -> Result<()>;
}

/// タイマーの状態をMarkdownのlist形式で表示する。
pub struct ConsoleMarkdownList<'a, W: Write> {
    writer: &'a mut W,
}

impl<'a, W: Write> ConsoleMarkdownList<'a, W> {
    /// 新しい`ConsoleMarkdownList`を返す。
    pub fn new(writer: &'a mut W) -> Self {
        Self { writer }
    }
}

impl<'a, W: Write> ConsolePresenter for ConsoleMarkdownList<'a, W> {
    fn show_timer(&mut self, card: Option<&TimerCard>) -> Result<()> {
        let card = match card {
            Some(card) => card,
            None => {
                writeln!(self.writer, "No active time entry.")
                    .context("Failed to write timer card")?;
                return Ok(());
            }
        };

        let project_str = card
            .project_id
            .as_ref()
            .map(|id| format!(" @{}", id))
            .unwrap_or_default();
        let state_str = if card.paused { "paused" } else { "running" };
        writeln!(
            self.writer,
            "- {}{}: {} ({})",
            card.task_name,
            project_str,
            format_elapsed(card.elapsed),
            state_str
        )
        .with_context(|| format!("Failed to write timer card: {:?}", card))?;

        Ok(())
    }

    fn show_projects(&mut self, projects: &[Project]) -> Result<()> {
        for project in projects {
            writeln!(self.writer, "- {}: {}", project.id, project.name)
                .with_context(|| format!("Failed to write project: {:?}", project))?;
        }

        Ok(())
    }
}
