use chrono::{DateTime, Utc};

/// ユーザーが記録する1件のタイムシートエントリー。
///
/// `start_time`は現在走っている区間の開始時刻を表し、一時停止中や終了後はNoneとなる。
/// `duration`はこれまでに確定した区間の累積秒数で、走行中の区間は含まない。
#[derive(Clone, Debug, PartialEq)]
pub struct TimesheetEntry {
    pub id: String,
    pub user_id: String,
    pub project_id: Option<String>,
    pub task_name: String,
    pub notes: String,
    pub duration: i64,
    pub start_time: Option<DateTime<Utc>>,
    pub is_paused: bool,
    pub is_active: bool,
    pub end_time: Option<DateTime<Utc>>,
}

/// タイムシートエントリーを新規作成するためのフィールド。
///
/// idはストア側で採番されるため含まない。
#[derive(Clone, Debug, PartialEq)]
pub struct NewEntry {
    pub user_id: String,
    pub project_id: String,
    pub task_name: String,
    pub notes: String,
    pub duration: i64,
    pub start_time: DateTime<Utc>,
    pub is_paused: bool,
}

/// タイムシートエントリーへの部分更新。
///
/// Noneのフィールドは更新対象に含めない。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntryPatch {
    pub duration: Option<i64>,
    pub start_time: Option<DateTime<Utc>>,
    pub is_paused: Option<bool>,
    pub is_active: Option<bool>,
    pub end_time: Option<DateTime<Utc>>,
}
