//! 外部包管理命令封装 — checkupdates 与 pacman -Qm

use anyhow::Result;
use std::collections::HashMap;
use std::process::{Command, Output};

/// 仓库检查模式：Sync 先从镜像刷新本地数据库，NoSync 只读已同步的缓存
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckMode {
    Sync,
    NoSync,
}

/// checkupdates 的约定退出码：检查成功且没有任何更新
const EXIT_NO_UPDATES: i32 = 2;

/// 检查仓库更新，返回待显示的更新行。
///
/// 失败不向上传播：退出码 2 视为"无更新"的空结果，其余失败折叠成
/// 单行诊断信息混入结果，调用方的轮询照常继续。
pub fn check_updates(mode: CheckMode) -> Vec<String> {
    let mut cmd = Command::new("checkupdates");
    if mode == CheckMode::NoSync {
        cmd.arg("--nosync");
    }
    cmd.arg("--nocolor");

    match cmd.output() {
        Ok(output) => parse_check_output(output),
        Err(e) => {
            log::error!("checkupdates 启动失败: {}", e);
            vec![format!("checkupdates failed: {}", e)]
        }
    }
}

/// 把 checkupdates 的进程输出归类为更新行列表
fn parse_check_output(output: Output) -> Vec<String> {
    if output.status.success() {
        return String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.to_string())
            .collect();
    }
    if output.status.code() == Some(EXIT_NO_UPDATES) {
        return Vec::new();
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let detail = stderr
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("")
        .trim()
        .to_string();
    log::warn!(
        "checkupdates 退出异常 (code={:?}): {}",
        output.status.code(),
        detail
    );
    if detail.is_empty() {
        vec![format!(
            "checkupdates failed: exit code {:?}",
            output.status.code()
        )]
    } else {
        vec![format!("checkupdates failed: {}", detail)]
    }
}

/// 列出非官方仓库安装的包（pacman -Qm），返回 名称 → 本地版本
pub fn list_foreign() -> Result<HashMap<String, String>> {
    let output = Command::new("pacman").args(["-Qm"]).output()?;
    if !output.status.success() {
        anyhow::bail!("pacman -Qm exited with code {:?}", output.status.code());
    }
    Ok(parse_foreign(&String::from_utf8_lossy(&output.stdout)))
}

/// 解析 `name version` 行；不足两列的行跳过
fn parse_foreign(output: &str) -> HashMap<String, String> {
    let mut packages = HashMap::new();
    for line in output.lines() {
        let mut fields = line.split_whitespace();
        if let (Some(name), Some(version)) = (fields.next(), fields.next()) {
            packages.insert(name.to_string(), version.to_string());
        }
    }
    packages
}
