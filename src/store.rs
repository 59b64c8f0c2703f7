use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::info;
use reqwest::{header::CONTENT_TYPE, Client};
use serde::{Deserialize, Serialize};

use crate::project::Project;
use crate::timesheet::{EntryPatch, NewEntry, TimesheetEntry};

/// タイムシートの永続化サービスに対する操作を表すtrait。
///
/// ユーザーごとにアクティブなエントリーは高々1件であることをストア側が保証する。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TimesheetStore {
    /// ユーザーのアクティブなエントリーを1件取得する。存在しない場合はNoneを返す。
    async fn fetch_active_entry(&self, user_id: &str) -> Result<Option<TimesheetEntry>>;

    /// エントリーを新規作成し、採番されたidを返す。
    async fn create_entry(&self, entry: &NewEntry) -> Result<String>;

    /// エントリーに部分更新を適用する。
    async fn update_entry(&self, entry_id: &str, patch: &EntryPatch) -> Result<()>;

    /// ユーザーが参加しているプロジェクトの一覧を取得する。
    async fn fetch_projects(&self, user_id: &str) -> Result<Vec<Project>>;
}

/// タイムシートAPIのエントリーをデシリアライズするための構造体。
#[derive(Debug, Deserialize)]
struct ApiTimesheetEntry {
    id: String,
    user_id: String,
    project_id: Option<String>,
    task_name: String,
    notes: Option<String>,
    duration: Option<i64>,
    start_time: Option<DateTime<Utc>>,
    is_paused: Option<bool>,
    is_active: Option<bool>,
    end_time: Option<DateTime<Utc>>,
}

impl From<ApiTimesheetEntry> for TimesheetEntry {
    // 欠けているフィールドは停止中のエントリーとして扱える値で補う
    fn from(entry: ApiTimesheetEntry) -> Self {
        Self {
            id: entry.id,
            user_id: entry.user_id,
            project_id: entry.project_id,
            task_name: entry.task_name,
            notes: entry.notes.unwrap_or_default(),
            duration: entry.duration.unwrap_or(0),
            start_time: entry.start_time,
            is_paused: entry.is_paused.unwrap_or(true),
            is_active: entry.is_active.unwrap_or(true),
            end_time: entry.end_time,
        }
    }
}

/// タイムシートAPIのプロジェクト情報をデシリアライズするための構造体。
#[derive(Debug, Deserialize)]
struct ApiProject {
    id: String,
    name: String,
}

/// エントリー作成のレスポンスをデシリアライズするための構造体。
#[derive(Debug, Deserialize)]
struct CreatedEntry {
    id: String,
}

/// エントリー作成のリクエストボディ。
#[derive(Debug, Serialize)]
struct NewEntryBody<'a> {
    user_id: &'a str,
    project_id: &'a str,
    task_name: &'a str,
    notes: &'a str,
    duration: i64,
    start_time: DateTime<Utc>,
    is_paused: bool,
}

/// エントリー部分更新のリクエストボディ。
///
/// Noneのフィールドはリクエストに含めない。
#[derive(Debug, Serialize)]
struct EntryPatchBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_paused: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_time: Option<DateTime<Utc>>,
}

impl From<&EntryPatch> for EntryPatchBody {
    fn from(patch: &EntryPatch) -> Self {
        Self {
            duration: patch.duration,
            start_time: patch.start_time,
            is_paused: patch.is_paused,
            is_active: patch.is_active,
            end_time: patch.end_time,
        }
    }
}

/// タイムシートAPIと通信するための`TimesheetStore`実装。
///
/// # Examples
///
/// ```
/// let store = RestTimesheetStore::new(&config.api_url, &config.api_token);
/// let entry = store.fetch_active_entry("user1").await.unwrap();
/// ```
pub struct RestTimesheetStore {
    client: Client,
    api_url: String,
    api_token: String,
}

impl RestTimesheetStore {
    /// 新しい`RestTimesheetStore`を返す。
    pub fn new(api_url: &str, api_token: &str) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.to_string(),
            api_token: api_token.to_string(),
        }
    }
}

#[async_trait]
impl TimesheetStore for RestTimesheetStore {
    /// ユーザーの未終了かつアクティブなエントリーを問い合わせる。
    ///
    /// ストア側の問い合わせ形状により高々1件しか返らないが、念のため先頭のみを採用する。
    async fn fetch_active_entry(&self, user_id: &str) -> Result<Option<TimesheetEntry>> {
        let entries = self
            .client
            .get(format!("{}/timesheets", self.api_url))
            .basic_auth(&self.api_token, Some("api_token"))
            .header(CONTENT_TYPE, "application/json")
            .query(&[("user_id", user_id), ("active", "true"), ("limit", "1")])
            .send()
            .await
            .with_context(|| {
                format!("Failed to send request to timesheet API at {}", self.api_url)
            })?
            .error_for_status()
            .context("Request returned an error status")?
            .json::<Vec<ApiTimesheetEntry>>()
            .await
            .context("Failed to deserialize response")?;
        info!("number of active entries: {}", entries.len());

        Ok(entries.into_iter().next().map(TimesheetEntry::from))
    }

    async fn create_entry(&self, entry: &NewEntry) -> Result<String> {
        let body = NewEntryBody {
            user_id: &entry.user_id,
            project_id: &entry.project_id,
            task_name: &entry.task_name,
            notes: &entry.notes,
            duration: entry.duration,
            start_time: entry.start_time,
            is_paused: entry.is_paused,
        };
        let created = self
            .client
            .post(format!("{}/timesheets", self.api_url))
            .basic_auth(&self.api_token, Some("api_token"))
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .with_context(|| {
                format!("Failed to send request to timesheet API at {}", self.api_url)
            })?
            .error_for_status()
            .context("Request returned an error status")?
            .json::<CreatedEntry>()
            .await
            .context("Failed to deserialize response")?;
        info!("created timesheet entry: {}", created.id);

        Ok(created.id)
    }

    async fn update_entry(&self, entry_id: &str, patch: &EntryPatch) -> Result<()> {
        self.client
            .patch(format!("{}/timesheets/{}", self.api_url, entry_id))
            .basic_auth(&self.api_token, Some("api_token"))
            .header(CONTENT_TYPE, "application/json")
            .json(&EntryPatchBody::from(patch))
            .send()
            .await
            .with_context(|| {
                format!("Failed to send request to timesheet API at {}", self.api_url)
            })?
            .error_for_status()
            .context("Request returned an error status")?;

        Ok(())
    }

    async fn fetch_projects(&self, user_id: &str) -> Result<Vec<Project>> {
        let projects = self
            .client
            .get(format!("{}/projects", self.api_url))
            .basic_auth(&self.api_token, Some("api_token"))
            .header(CONTENT_TYPE, "application/json")
            .query(&[("user_id", user_id)])
            .send()
            .await
            .with_context(|| {
                format!("Failed to send request to timesheet API at {}", self.api_url)
            })?
            .error_for_status()
            .context("Request returned an error status")?
            .json::<Vec<ApiProject>>()
            .await
            .context("Failed to deserialize response")?;

        Ok(projects
            .into_iter()
            .map(|project| Project {
                id: project.id,
                name: project.name,
            })
            .collect())
    }
}
