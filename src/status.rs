//! 合并两路轮询结果并向 stdout 推送 JSON 状态

use crate::config::Config;
use crate::format::{self, FormatOptions};
use crate::poller::PollResult;
use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use tokio::sync::mpsc;

/// 状态栏 class / alt 字段的取值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum State {
    #[serde(rename = "has-updates")]
    HasUpdates,
    #[serde(rename = "updated")]
    Updated,
}

/// 推送给状态栏的单条 JSON 状态
#[derive(Debug, Clone, Serialize)]
pub struct Status {
    pub text: String,
    pub tooltip: String,
    pub class: State,
    pub alt: State,
}

impl Status {
    /// 启动时的占位状态，首轮检查完成前显示
    fn checking() -> Self {
        Status {
            text: "0".to_string(),
            tooltip: "Checking for updates...".to_string(),
            class: State::HasUpdates,
            alt: State::HasUpdates,
        }
    }
}

/// 结果来源，对应两个独立的轮询任务
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Pacman,
    Aur,
}

/// 合并视图：每个来源各保留最近一次 Report 的内容
#[derive(Debug, Default)]
pub struct MergeState {
    pacman: Vec<String>,
    aur: Vec<String>,
}

impl MergeState {
    /// 处理一条轮询产出。Idle 哨兵不动对应槽位；Report 整体替换，
    /// 空列表同样替换，用于清掉该来源已失效的旧条目。
    pub fn apply(&mut self, source: Source, result: PollResult) {
        let PollResult::Report(list) = result else {
            return;
        };
        match source {
            Source::Pacman => self.pacman = list,
            Source::Aur => self.aur = list,
        }
    }

    /// 以当前两个槽位生成要推送的状态，pacman 条目在前。
    /// raw-output 与 no-color 同时开启时行文本原样输出。
    pub fn render(&self, opts: &FormatOptions) -> Status {
        let mut merged: Vec<String> =
            self.pacman.iter().chain(self.aur.iter()).cloned().collect();
        if merged.is_empty() {
            return Status {
                text: String::new(),
                tooltip: "All packages are up to date".to_string(),
                class: State::Updated,
                alt: State::Updated,
            };
        }

        if !(opts.raw_output && opts.no_color) {
            format::format_updates(&mut merged, opts);
        }
        Status {
            text: merged.len().to_string(),
            tooltip: merged.join("\n"),
            class: State::HasUpdates,
            alt: State::HasUpdates,
        }
    }
}

/// 编码一条状态并写入 stdout。编码或写入失败视为协议断流，
/// 直接以退出码 2 结束进程。
fn emit(out: &mut impl Write, status: &Status) {
    let encoded = match serde_json::to_string(status) {
        Ok(encoded) => encoded,
        Err(e) => {
            log::error!("状态编码失败: {}", e);
            std::process::exit(2);
        }
    };
    if writeln!(out, "{}", encoded).and_then(|_| out.flush()).is_err() {
        std::process::exit(2);
    }
}

/// 合并-推送主循环：哪个来源先到就处理哪个，每收到一条就重新
/// 推送完整状态，推送节奏由"任一来源 tick 了"驱动而非内容变化。
pub async fn run_merge_loop(
    config: &Config,
    mut pacman_rx: mpsc::Receiver<PollResult>,
    mut aur_rx: Option<mpsc::Receiver<PollResult>>,
) -> Result<()> {
    let opts = config.format_options();
    let mut stdout = std::io::stdout();
    let mut state = MergeState::default();

    emit(&mut stdout, &Status::checking());

    loop {
        let (source, received) = tokio::select! {
            received = pacman_rx.recv() => (Source::Pacman, received),
            received = recv_aur(&mut aur_rx) => (Source::Aur, received),
        };
        let Some(result) = received else {
            anyhow::bail!("轮询任务已退出，结果通道关闭");
        };

        state.apply(source, result);
        emit(&mut stdout, &state.render(&opts));
    }
}

/// skip-aur 时没有 AUR 通道，用挂起的 future 让 select 永远
/// 走不到这一支
async fn recv_aur(rx: &mut Option<mpsc::Receiver<PollResult>>) -> Option<PollResult> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
