use anyhow::{Context, Result};

use crate::console::TimerCard;
use crate::store::TimesheetStore;
use crate::timer_session::{TimerSession, TimerState};

pub struct PauseCommand<'a, T: TimesheetStore> {
    store: &'a T,
}

impl<'a, T: TimesheetStore> PauseCommand<'a, T> {
    /// 新しい`PauseCommand`を返す。
    pub fn new(store: &'a T) -> Self {
        Self { store }
    }

    /// `pause`サブコマンドの処理を行う。
    ///
    /// アクティブなエントリーを復元して一時停止し、停止後のカードを返す。
    /// エントリーが存在しない場合はNoneを返す。
    pub async fn run(&self, user_id: &str) -> Result<Option<TimerCard>> {
        let mut session = TimerSession::new(self.store, user_id);
        session
            .initialize()
            .await
            .context("Failed to load the active timesheet entry")?;

        if *session.state() == TimerState::Idle {
            return Ok(None);
        }
        session.pause().await?;

        Ok(TimerCard::from_session(&session))
    }
}
