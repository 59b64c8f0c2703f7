use anyhow::{Context, Result};

use crate::console::TimerCard;
use crate::store::TimesheetStore;
use crate::timer_session::TimerSession;

pub struct StatusCommand<'a, T: TimesheetStore> {
    store: &'a T,
}

impl<'a, T: TimesheetStore> StatusCommand<'a, T> {
    /// 新しい`StatusCommand`を返す。
    pub fn new(store: &'a T) -> Self {
        Self { store }
    }

    /// `status`サブコマンドの処理を行う。
    ///
    /// アクティブなエントリーを復元し、現在の状態のカードを返す。
    /// エントリーが存在しない場合はNoneを返す。
    pub async fn run(&self, user_id: &str) -> Result<Option<TimerCard>> {
        let mut session = TimerSession::new(self.store, user_id);
        session
            .initialize()
            .await
            .context("Failed to load the active timesheet entry")?;

        Ok(TimerCard::from_session(&session))
    }
}
