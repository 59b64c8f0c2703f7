use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use log::info;
use tokio::sync::watch;

use crate::datetime;
use crate::store::TimesheetStore;
use crate::ticker::Ticker;
use crate::timesheet::{EntryPatch, NewEntry};

/// タイマーの状態。
///
/// エントリーidと停止フラグの組み合わせではなく、とり得る状態だけを列挙する。
#[derive(Clone, Debug, PartialEq)]
pub enum TimerState {
    /// 記録対象のエントリーが存在しない。
    Idle,
    /// エントリーが存在し、`since`から始まる区間を記録中。
    Running {
        entry_id: String,
        accumulated: i64,
        since: DateTime<Utc>,
    },
    /// エントリーは存在するが、区間は記録していない。
    Paused { entry_id: String, accumulated: i64 },
}

/// ローカルのストップウォッチとストア上のアクティブなエントリーを同期させるセッション。
///
/// 1ユーザーのアクティブなエントリーは高々1件であり、`initialize`で取得した
/// エントリーからローカル状態を復元することで、プロセスをまたいで計測を継続できる。
/// すべての遷移は`&mut self`を取るため、操作が同時に重なることはない。
///
/// # Examples
///
/// ```
/// let mut session = TimerSession::new(&store, "user1");
/// session.initialize().await?;
/// session.start().await?;
/// ```
pub struct TimerSession<'a, S: TimesheetStore> {
    store: &'a S,
    user_id: String,
    task_name: String,
    notes: String,
    selected_project: Option<String>,
    state: TimerState,
    ticker: Option<Ticker>,
}

impl<'a, S: TimesheetStore> TimerSession<'a, S> {
    /// 新しいIdle状態の`TimerSession`を返す。
    ///
    /// # Arguments
    /// * `store` - タイムシートの永続化サービス
    /// * `user_id` - エントリーの所有者となるユーザー
    pub fn new(store: &'a S, user_id: &str) -> Self {
        Self {
            store,
            user_id: user_id.to_string(),
            task_name: String::new(),
            notes: String::new(),
            selected_project: None,
            state: TimerState::Idle,
            ticker: None,
        }
    }

    /// ストアからアクティブなエントリーを取得し、ローカル状態を復元する。
    ///
    /// エントリーが存在しない場合はIdleのままとなる。走行中のエントリーを
    /// 復元した場合はtickも再開する。複数回呼ばれる可能性があるため、
    /// 取得前に以前の状態とtickを必ず破棄する。
    pub async fn initialize(&mut self) -> Result<()> {
        self.reset();

        let entry = match self
            .store
            .fetch_active_entry(&self.user_id)
            .await
            .context("Failed to fetch the active timesheet entry")?
        {
            Some(entry) => entry,
            None => {
                info!("no active timesheet entry for user: {}", self.user_id);
                return Ok(());
            }
        };

        self.task_name = entry.task_name;
        self.notes = entry.notes;
        self.selected_project = entry.project_id;
        self.state = match entry.start_time {
            Some(since) if !entry.is_paused => {
                self.ticker = Some(Ticker::start());
                TimerState::Running {
                    entry_id: entry.id,
                    accumulated: entry.duration,
                    since,
                }
            }
            _ => TimerState::Paused {
                entry_id: entry.id,
                accumulated: entry.duration,
            },
        };
        info!("restored timesheet entry, state: {:?}", self.state);

        Ok(())
    }

    /// 現在の経過秒数を計算する。
    ///
    /// 走行中は確定済みの累積秒数に現在の区間の経過秒数を加えた値、
    /// 停止中は累積秒数そのものを返す。副作用はない。
    pub fn compute_elapsed(&self) -> i64 {
        match &self.state {
            TimerState::Running {
                accumulated, since, ..
            } => accumulated + (datetime::now() - *since).num_seconds(),
            TimerState::Paused { accumulated, .. } => *accumulated,
            TimerState::Idle => 0,
        }
    }

    /// タイマーを開始または再開する。
    ///
    /// Idleの場合は新しいエントリーをストアに作成し、採番されたidを保持する。
    /// Pausedの場合は既存エントリーの区間開始時刻だけを更新して再開する。
    /// いずれもストアへの書き込みが成功してからローカル状態を進め、tickを開始する。
    pub async fn start(&mut self) -> Result<()> {
        if self.task_name.is_empty() {
            bail!("Enter task name to start timer");
        }
        let project_id = match &self.selected_project {
            Some(project_id) => project_id.clone(),
            None => bail!("Select project to start timer"),
        };

        let now = datetime::now();
        match self.state.clone() {
            TimerState::Idle => {
                let entry = NewEntry {
                    user_id: self.user_id.clone(),
                    project_id,
                    task_name: self.task_name.clone(),
                    notes: self.notes.clone(),
                    duration: 0,
                    start_time: now,
                    is_paused: false,
                };
                let entry_id = self
                    .store
                    .create_entry(&entry)
                    .await
                    .context("Failed to create a timesheet entry")?;
                info!("started timesheet entry: {}", entry_id);
                self.state = TimerState::Running {
                    entry_id,
                    accumulated: 0,
                    since: now,
                };
            }
            TimerState::Paused {
                entry_id,
                accumulated,
            } => {
                let patch = EntryPatch {
                    start_time: Some(now),
                    is_paused: Some(false),
                    ..Default::default()
                };
                self.store
                    .update_entry(&entry_id, &patch)
                    .await
                    .context("Failed to resume the timesheet entry")?;
                info!("resumed timesheet entry: {}", entry_id);
                self.state = TimerState::Running {
                    entry_id,
                    accumulated,
                    since: now,
                };
            }
            TimerState::Running { .. } => bail!("Timer is already running"),
        }

        // 以前のtickが残っていればここで破棄される
        self.ticker = Some(Ticker::start());

        Ok(())
    }

    /// タイマーを一時停止する。
    ///
    /// 走行中の区間の経過秒数を累積に合算してストアへ書き込む。
    /// これが停止境界前に累積時間を確定させる唯一の経路であり、
    /// ストアとのずれは常に未確定の1区間分に収まる。
    /// 走行中でない場合は何もしない。
    pub async fn pause(&mut self) -> Result<()> {
        let (entry_id, elapsed) = match &self.state {
            TimerState::Running { entry_id, .. } => (entry_id.clone(), self.compute_elapsed()),
            _ => return Ok(()),
        };
        self.ticker = None;

        let patch = EntryPatch {
            duration: Some(elapsed),
            is_paused: Some(true),
            ..Default::default()
        };
        self.store
            .update_entry(&entry_id, &patch)
            .await
            .context("Failed to pause the timesheet entry")?;
        info!("paused timesheet entry: {} at {}s", entry_id, elapsed);

        self.state = TimerState::Paused {
            entry_id,
            accumulated: elapsed,
        };

        Ok(())
    }

    /// タイマーを終了し、エントリーを終了状態として確定する。
    ///
    /// 確定した合計秒数を返す。終了後のエントリーは変更されないため、
    /// ローカル状態は完全にリセットされ、次の`start`は新しいエントリーを作成する。
    /// エントリーが存在しない場合は何もしない。
    pub async fn done(&mut self) -> Result<i64> {
        let (entry_id, elapsed) = match &self.state {
            TimerState::Idle => return Ok(0),
            TimerState::Running { entry_id, .. } => (entry_id.clone(), self.compute_elapsed()),
            TimerState::Paused {
                entry_id,
                accumulated,
            } => (entry_id.clone(), *accumulated),
        };
        self.ticker = None;

        let patch = EntryPatch {
            duration: Some(elapsed),
            end_time: Some(datetime::now()),
            is_paused: Some(false),
            is_active: Some(false),
            ..Default::default()
        };
        self.store
            .update_entry(&entry_id, &patch)
            .await
            .context("Failed to finish the timesheet entry")?;
        info!("finished timesheet entry: {} with {}s", entry_id, elapsed);

        self.reset();

        Ok(elapsed)
    }

    /// タスク名を設定する。エントリーの開始後は変更できない。
    pub fn set_task_name(&mut self, task_name: String) {
        if self.state == TimerState::Idle {
            self.task_name = task_name;
        }
    }

    /// メモを設定する。エントリーの開始後は変更できない。
    pub fn set_notes(&mut self, notes: String) {
        if self.state == TimerState::Idle {
            self.notes = notes;
        }
    }

    /// 記録先のプロジェクトを選択する。エントリーの開始後は変更できない。
    pub fn select_project(&mut self, project_id: String) {
        if self.state == TimerState::Idle {
            self.selected_project = Some(project_id);
        }
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn task_name(&self) -> &str {
        &self.task_name
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn selected_project(&self) -> Option<&str> {
        self.selected_project.as_deref()
    }

    /// 走行中のtickの購読用チャネルを返す。走行中でない場合はNone。
    pub fn tick_receiver(&self) -> Option<watch::Receiver<u64>> {
        self.ticker.as_ref().map(|ticker| ticker.subscribe())
    }

    // ローカル状態を初期状態に戻し、tickを破棄する
    fn reset(&mut self) {
        self.ticker = None;
        self.state = TimerState::Idle;
        self.task_name.clear();
        self.notes.clear();
        self.selected_project = None;
    }
}
