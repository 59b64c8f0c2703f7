use anyhow::{Context, Result};

use crate::project::Project;
use crate::store::TimesheetStore;

pub struct ProjectsCommand<'a, T: TimesheetStore> {
    store: &'a T,
}

impl<'a, T: TimesheetStore> ProjectsCommand<'a, T> {
    /// 新しい`ProjectsCommand`を返す。
    pub fn new(store: &'a T) -> Self {
        Self { store }
    }

    /// `projects`サブコマンドの処理を行う。
    ///
    /// タイマーの記録先として選択できるプロジェクトの一覧を取得する。
    pub async fn run(&self, user_id: &str) -> Result<Vec<Project>> {
        let projects = self
            .store
            .fetch_projects(user_id)
            .await
            .context("Failed to retrieve projects")?;

        Ok(projects)
    }
}

#[cfg(test)]
mod tests {
    use super::ProjectsCommand;
    use crate::project::Project;
    use crate::store::MockTimesheetStore;

    /// 指定したユーザーのプロジェクト一覧が返ることを確認する。
    #[tokio::test]
    async fn test_projects() {
        let mut store = MockTimesheetStore::new();
        store
            .expect_fetch_projects()
            .times(1)
            .withf(|user_id: &str| user_id == "user1")
            .returning(|_| {
                Ok(vec![Project {
                    id: "project1".to_string(),
                    name: "Website".to_string(),
                }])
            });
        let command = ProjectsCommand::new(&store);

        let projects = command.run("user1").await.unwrap();

        assert_eq!(
            projects,
            vec![Project {
                id: "project1".to_string(),
                name: "Website".to_string(),
            }]
        );
    }
}
