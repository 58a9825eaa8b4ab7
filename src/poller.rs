//! 两路后台轮询 — 仓库检查与 AUR 检查各占一个任务
//!
//! 每个轮询任务独占一条容量为 1 的结果通道；消费方没取走上一条
//! 结果时，下一个 tick 的发送会阻塞，相当于天然的背压。

use crate::aur::{AurClient, AurPackage};
use crate::config::Config;
use crate::pacman::{self, CheckMode};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;

/// 单次轮询的产出。
///
/// Report 携带本轮完整结果，空列表表示"确认没有更新"；Idle 表示
/// 本轮没有新数据，消费方应原样保留该来源上一次的结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollResult {
    Report(Vec<String>),
    Idle,
}

/// 慢节奏检查的节拍状态：Due 表示本 tick 执行真实检查，Waiting
/// 倒数剩余的空转 tick 数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cadence {
    Due,
    Waiting(u64),
}

impl Cadence {
    /// 本轮处理完后的下一个状态；sync_every 是两次真实检查之间的
    /// tick 数（≥ 1，由配置校验保证）
    fn next(self, sync_every: u64) -> Cadence {
        match self {
            Cadence::Due if sync_every > 1 => Cadence::Waiting(sync_every - 1),
            Cadence::Due => Cadence::Due,
            Cadence::Waiting(1) => Cadence::Due,
            Cadence::Waiting(n) => Cadence::Waiting(n - 1),
        }
    }
}

/// 启动仓库更新轮询任务，返回其结果通道。
///
/// 每个 tick 都执行一次真实检查：每 sync_every 个 tick 做一次联网
/// 同步检查（首个 tick 即同步），其余 tick 只读本地缓存。因此每个
/// tick 都发送 Report，从不发送 Idle。
pub fn spawn_pacman_poller(config: &Config) -> mpsc::Receiver<PollResult> {
    let (tx, rx) = mpsc::channel(1);
    let interval = Duration::from_secs(config.interval);
    let sync_every = config.sync_every_ticks();

    tokio::spawn(async move {
        let mut ticks_since_sync = sync_every;
        loop {
            let mode = if ticks_since_sync >= sync_every {
                ticks_since_sync = 0;
                CheckMode::Sync
            } else {
                CheckMode::NoSync
            };
            log::debug!("仓库检查 tick, mode={:?}", mode);

            let updates =
                match tokio::task::spawn_blocking(move || pacman::check_updates(mode)).await {
                    Ok(updates) => updates,
                    Err(e) => vec![format!("checkupdates failed: {}", e)],
                };
            if tx.send(PollResult::Report(updates)).await.is_err() {
                break;
            }

            tokio::time::sleep(interval).await;
            ticks_since_sync += 1;
        }
    });
    rx
}

/// 启动 AUR 轮询任务，返回其结果通道。
///
/// 与仓库轮询保持同一快节奏 tick，但只在到期 tick 做真实的网络
/// 工作，其余 tick 发送 Idle 哨兵让消费方保留旧值。
pub fn spawn_aur_poller(config: &Config) -> mpsc::Receiver<PollResult> {
    let (tx, rx) = mpsc::channel(1);
    let interval = Duration::from_secs(config.interval);
    let sync_every = config.sync_every_ticks();

    tokio::spawn(async move {
        let client = AurClient::new();
        let mut cadence = Cadence::Due;
        loop {
            let result = match cadence {
                Cadence::Due => {
                    log::debug!("AUR 检查到期 tick");
                    PollResult::Report(refresh_aur(&client).await)
                }
                Cadence::Waiting(_) => PollResult::Idle,
            };
            cadence = cadence.next(sync_every);
            if tx.send(result).await.is_err() {
                break;
            }

            tokio::time::sleep(interval).await;
        }
    });
    rx
}

/// 一次完整的 AUR 刷新：列出本地外部包 → 批量查询 → 版本比对。
///
/// 任何一步失败都折叠成单行诊断信息，下一个到期 tick 即是重试；
/// 本地没有外部包时返回单行提示而不是空列表。
async fn refresh_aur(client: &AurClient) -> Vec<String> {
    let local = match tokio::task::spawn_blocking(pacman::list_foreign).await {
        Ok(Ok(local)) => local,
        Ok(Err(e)) => {
            log::warn!("pacman -Qm 失败: {}", e);
            return vec![format!("Error running pacman -Qm: {}", e)];
        }
        Err(e) => return vec![format!("Error running pacman -Qm: {}", e)],
    };
    if local.is_empty() {
        return vec!["Nothing from aur installed".to_string()];
    }

    let names: Vec<String> = local.keys().cloned().collect();
    match client.query_info(&names).await {
        Ok(remote) => diff_updates(&local, &remote),
        Err(e) => {
            log::warn!("AUR RPC 查询失败: {}", e);
            vec![format!("Error querying AUR API: {}", e)]
        }
    }
}

/// 远端版本与本地记录不一致的包生成更新行；远端未收录的包静默跳过
fn diff_updates(local: &HashMap<String, String>, remote: &[AurPackage]) -> Vec<String> {
    remote
        .iter()
        .filter_map(|pkg| {
            let installed = local.get(&pkg.name)?;
            (installed != &pkg.version)
                .then(|| format!("aur/{} {} -> {}", pkg.name, installed, pkg.version))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(name: &str, version: &str) -> AurPackage {
        AurPackage {
            name: name.to_string(),
            version: version.to_string(),
        }
    }

    #[test]
    fn cadence_counts_down_then_recurs() {
        let mut cadence = Cadence::Due;
        cadence = cadence.next(3);
        assert_eq!(cadence, Cadence::Waiting(2));
        cadence = cadence.next(3);
        assert_eq!(cadence, Cadence::Waiting(1));
        cadence = cadence.next(3);
        assert_eq!(cadence, Cadence::Due);
    }

    #[test]
    fn cadence_of_one_is_always_due() {
        assert_eq!(Cadence::Due.next(1), Cadence::Due);
    }

    #[test]
    fn diff_reports_only_changed_versions() {
        let mut local = HashMap::new();
        local.insert("paru".to_string(), "2.0.3-1".to_string());
        local.insert("yay".to_string(), "12.3.5-1".to_string());
        let remote = vec![package("paru", "2.0.4-1"), package("yay", "12.3.5-1")];

        assert_eq!(
            diff_updates(&local, &remote),
            vec!["aur/paru 2.0.3-1 -> 2.0.4-1".to_string()]
        );
    }

    #[test]
    fn diff_follows_remote_order() {
        let mut local = HashMap::new();
        local.insert("a".to_string(), "1".to_string());
        local.insert("b".to_string(), "1".to_string());
        let remote = vec![package("b", "2"), package("a", "2")];

        assert_eq!(
            diff_updates(&local, &remote),
            vec!["aur/b 1 -> 2".to_string(), "aur/a 1 -> 2".to_string()]
        );
    }

    #[test]
    fn diff_ignores_records_without_local_entry() {
        let local = HashMap::new();
        let remote = vec![package("paru", "2.0.4-1")];
        assert!(diff_updates(&local, &remote).is_empty());
    }
}
