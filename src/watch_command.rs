use std::io::Write;

use anyhow::{Context, Result};

use crate::console::{format_elapsed, ConsoleMarkdownList, ConsolePresenter, TimerCard};
use crate::store::TimesheetStore;
use crate::timer_session::TimerSession;

pub struct WatchCommand<'a, T: TimesheetStore> {
    store: &'a T,
}

impl<'a, T: TimesheetStore> WatchCommand<'a, T> {
    /// 新しい`WatchCommand`を返す。
    pub fn new(store: &'a T) -> Self {
        Self { store }
    }

    /// `watch`サブコマンドの処理を行う。
    ///
    /// 走行中のエントリーを復元した場合は、tickごとに経過時間を再描画し続け、
    /// Ctrl-Cで終了する。走行中でない場合は現在の状態を1度だけ表示する。
    pub async fn run<W: Write>(&self, user_id: &str, writer: &mut W) -> Result<()> {
        let mut session = TimerSession::new(self.store, user_id);
        session
            .initialize()
            .await
            .context("Failed to load the active timesheet entry")?;

        let mut receiver = match session.tick_receiver() {
            Some(receiver) => receiver,
            None => {
                let card = TimerCard::from_session(&session);
                let mut presenter = ConsoleMarkdownList::new(writer);
                return presenter.show_timer(card.as_ref());
            }
        };

        render_line(writer, session.task_name(), session.compute_elapsed())?;
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    writeln!(writer).context("Failed to write a line break")?;
                    break;
                }
                changed = receiver.changed() => {
                    // tickの供給が止まった場合は再描画を終える
                    if changed.is_err() {
                        break;
                    }
                    render_line(writer, session.task_name(), session.compute_elapsed())?;
                }
            }
        }

        Ok(())
    }
}

// 行頭に戻って同じ行を上書きする
fn render_line<W: Write>(writer: &mut W, task_name: &str, elapsed: i64) -> Result<()> {
    write!(writer, "\r- {}: {}", task_name, format_elapsed(elapsed))
        .context("Failed to write the elapsed time")?;
    writer.flush().context("Failed to flush the writer")?;

    Ok(())
}
