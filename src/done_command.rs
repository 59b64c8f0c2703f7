use anyhow::{Context, Result};

use crate::store::TimesheetStore;
use crate::timer_session::{TimerSession, TimerState};

pub struct DoneCommand<'a, T: TimesheetStore> {
    store: &'a T,
}

impl<'a, T: TimesheetStore> DoneCommand<'a, T> {
    /// 新しい`DoneCommand`を返す。
    pub fn new(store: &'a T) -> Self {
        Self { store }
    }

    /// `done`サブコマンドの処理を行う。
    ///
    /// アクティブなエントリーを復元して終了状態として確定し、合計秒数を返す。
    /// エントリーが存在しない場合はNoneを返す。
    pub async fn run(&self, user_id: &str) -> Result<Option<i64>> {
        let mut session = TimerSession::new(self.store, user_id);
        session
            .initialize()
            .await
            .context("Failed to load the active timesheet entry")?;

        if *session.state() == TimerState::Idle {
            return Ok(None);
        }
        let total = session.done().await?;

        Ok(Some(total))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::DoneCommand;
    use crate::datetime::mock_datetime::set_mock_time;
    use crate::store::MockTimesheetStore;
    use crate::timesheet::{EntryPatch, TimesheetEntry};

    /// アクティブなエントリーがない場合に、ストアを更新せずNoneが返ることを確認する。
    #[tokio::test]
    async fn test_done_without_active_entry() {
        let mut store = MockTimesheetStore::new();
        store
            .expect_fetch_active_entry()
            .times(1)
            .returning(|_| Ok(None));
        store.expect_update_entry().times(0);
        let command = DoneCommand::new(&store);

        let total = command.run("user1").await.unwrap();

        assert!(total.is_none());
    }

    /// 停止中のエントリーが終了状態として確定され、合計秒数が返ることを確認する。
    #[tokio::test]
    async fn test_done_finishes_paused_entry() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        set_mock_time(t0);
        let mut store = MockTimesheetStore::new();
        store.expect_fetch_active_entry().times(1).returning(|_| {
            Ok(Some(TimesheetEntry {
                id: "entry1".to_string(),
                user_id: "user1".to_string(),
                project_id: Some("project1".to_string()),
                task_name: "Write report".to_string(),
                notes: "".to_string(),
                duration: 95,
                start_time: None,
                is_paused: true,
                is_active: true,
                end_time: None,
            }))
        });
        store
            .expect_update_entry()
            .times(1)
            .withf(move |entry_id: &str, patch: &EntryPatch| {
                entry_id == "entry1"
                    && patch.duration == Some(95)
                    && patch.end_time == Some(t0)
                    && patch.is_paused == Some(false)
                    && patch.is_active == Some(false)
            })
            .returning(|_, _| Ok(()));
        let command = DoneCommand::new(&store);

        let total = command.run("user1").await.unwrap();

        assert_eq!(total, Some(95));
    }
}
