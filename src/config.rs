use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// タイムシートAPIへ接続するための設定。
///
/// 環境変数から読み込む。API tokenのみ、環境変数が未設定の場合は
/// 設定ディレクトリのtokenファイルを代わりに利用する。
pub struct Config {
    pub api_url: String,
    pub api_token: String,
    pub user_id: String,
}

impl Config {
    /// 環境変数から設定を読み込む。
    ///
    /// # Examples
    ///
    /// ```
    /// let config = Config::load().unwrap();
    /// ```
    pub fn load() -> Result<Self> {
        let api_url = env::var("TIMESHEET_API_URL").context("TIMESHEET_API_URL must be set")?;
        let api_token = match env::var("TIMESHEET_API_TOKEN") {
            Ok(token) => token,
            Err(_) => read_token_file()
                .context("TIMESHEET_API_TOKEN must be set or a token file must exist")?,
        };
        let user_id = env::var("TIMESHEET_USER_ID").context("TIMESHEET_USER_ID must be set")?;

        Ok(Self {
            api_url,
            api_token,
            user_id,
        })
    }
}

/// 設定ディレクトリのtokenファイルからAPI tokenを読み込む。
fn read_token_file() -> Result<String> {
    let path = token_file_path().context("Failed to resolve the config directory")?;
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read token file: {}", path.display()))?;

    Ok(trim_token(&content))
}

fn token_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tsheet").join("token"))
}

// エディタで保存したファイルは末尾に改行が入るため取り除く
fn trim_token(content: &str) -> String {
    content.trim().to_string()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::trim_token;

    /// tokenファイルの内容から余分な空白が取り除かれることを確認する。
    #[rstest]
    #[case::plain("token1", "token1")]
    #[case::trailing_newline("token1\n", "token1")]
    #[case::surrounding_whitespace("  token1 \n", "token1")]
    fn test_trim_token(#[case] content: &str, #[case] expected: &str) {
        assert_eq!(trim_token(content), expected);
    }
}
