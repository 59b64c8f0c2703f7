use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// 走行中の経過時間表示を更新するための定期トリガー。
///
/// バックグラウンドタスクが1秒ごとにtick番号をwatchチャネルへ発行する。
/// tick自体はリモートI/Oを行わず、購読側に再描画を促すだけである。
/// dropするとタスクを中断し、放置されたタイマーが残らないようにする。
pub struct Ticker {
    handle: JoinHandle<()>,
    receiver: watch::Receiver<u64>,
}

impl Ticker {
    /// 1秒周期の新しい`Ticker`を開始する。
    pub fn start() -> Self {
        Self::with_period(Duration::from_secs(1))
    }

    /// 指定した周期の新しい`Ticker`を開始する。
    pub fn with_period(period: Duration) -> Self {
        let (sender, receiver) = watch::channel(0u64);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // intervalの初回は即時に発火するため読み捨てる
            interval.tick().await;
            loop {
                interval.tick().await;
                sender.send_modify(|count| *count += 1);
            }
        });

        Self { handle, receiver }
    }

    /// tickの購読用チャネルを返す。
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.receiver.clone()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
