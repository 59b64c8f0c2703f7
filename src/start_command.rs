use anyhow::{Context, Result};
use log::warn;

use crate::console::TimerCard;
use crate::store::TimesheetStore;
use crate::timer_session::{TimerSession, TimerState};

/// `start`サブコマンドの引数を表す構造体。
#[derive(Debug, clap::Args)]
pub struct StartArgs {
    #[clap(short = 't', long = "task", help = "Task name for a new time entry")]
    task: Option<String>,

    #[clap(
        short = 'p',
        long = "project",
        help = "Project id to record the entry against"
    )]
    project: Option<String>,

    #[clap(short = 'n', long = "notes", help = "Optional notes for a new time entry")]
    notes: Option<String>,
}

pub struct StartCommand<'a, T: TimesheetStore> {
    store: &'a T,
}

impl<'a, T: TimesheetStore> StartCommand<'a, T> {
    /// 新しい`StartCommand`を返す。
    pub fn new(store: &'a T) -> Self {
        Self { store }
    }

    /// `start`サブコマンドの処理を行う。
    ///
    /// アクティブなエントリーをストアから復元し、停止中であれば再開する。
    /// 存在しなければ引数のタスク名とプロジェクトで新しいエントリーを作成する。
    ///
    /// # Arguments
    ///
    /// * `user_id` - エントリーの所有者となるユーザー
    /// * `args` - `start`サブコマンドの引数
    pub async fn run(&self, user_id: &str, args: StartArgs) -> Result<TimerCard> {
        let mut session = TimerSession::new(self.store, user_id);
        session
            .initialize()
            .await
            .context("Failed to load the active timesheet entry")?;

        // 既存エントリーの再開時は入力を受け付けない
        if *session.state() != TimerState::Idle
            && (args.task.is_some() || args.project.is_some() || args.notes.is_some())
        {
            warn!("an active entry already exists, ignoring task and project arguments");
        }
        if let Some(task) = args.task {
            session.set_task_name(task);
        }
        if let Some(notes) = args.notes {
            session.set_notes(notes);
        }
        if let Some(project) = args.project {
            session.select_project(project);
        }

        session.start().await?;

        TimerCard::from_session(&session).context("Timer card is missing after start")
    }
}
