//! 启动配置 — 命令行参数叠加可选的配置文件

use anyhow::Result;
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::format::{FormatOptions, PALETTE_SIZE};

/// 命令行参数；未指定的项回落到配置文件，再回落到内置默认值
#[derive(Parser, Debug, Default)]
#[command(
    name = "updatebar",
    version,
    about = "Streams pacman/AUR update availability as JSON for status bar widgets"
)]
pub struct Cli {
    /// Seconds between update checks
    #[arg(long)]
    pub interval: Option<u64>,

    /// Seconds between database-syncing update checks
    #[arg(long = "interval-sync")]
    pub interval_sync: Option<u64>,

    /// Skip checking for AUR updates
    #[arg(long = "skip-aur")]
    pub skip_aur: bool,

    /// Disable formatting tooltip text into columns
    #[arg(long = "raw-output")]
    pub raw_output: bool,

    /// Disable coloring packages by version category
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Color for major version updates (hex, no leading '#')
    #[arg(long = "color-major")]
    pub color_major: Option<String>,

    /// Color for minor version updates
    #[arg(long = "color-minor")]
    pub color_minor: Option<String>,

    /// Color for patch version updates
    #[arg(long = "color-patch")]
    pub color_patch: Option<String>,

    /// Color for pre-release version updates
    #[arg(long = "color-pre")]
    pub color_pre: Option<String>,

    /// Color for any other version update
    #[arg(long = "color-other")]
    pub color_other: Option<String>,
}

/// 配置文件内容（~/.config/updatebar/config.toml），所有键可省略
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    interval: Option<u64>,
    interval_sync: Option<u64>,
    skip_aur: Option<bool>,
    raw_output: Option<bool>,
    no_color: Option<bool>,
    color_major: Option<String>,
    color_minor: Option<String>,
    color_patch: Option<String>,
    color_pre: Option<String>,
    color_other: Option<String>,
}

/// 进程级不可变配置，启动时构造一次，显式传给各组件
#[derive(Debug, Clone)]
pub struct Config {
    pub interval: u64,
    pub interval_sync: u64,
    pub skip_aur: bool,
    pub raw_output: bool,
    pub no_color: bool,
    pub colors: [String; PALETTE_SIZE],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval: 10,
            interval_sync: 600,
            skip_aur: false,
            raw_output: false,
            no_color: false,
            colors: [
                "f7768e".to_string(), // major
                "ff9e64".to_string(), // minor
                "e0af68".to_string(), // patch
                "9ece6a".to_string(), // pre
                "7dcfff".to_string(), // other
            ],
        }
    }
}

impl Config {
    /// 解析命令行并叠加默认路径下的配置文件
    pub fn load(cli: Cli) -> Result<Self> {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let path = PathBuf::from(home).join(".config/updatebar/config.toml");
        Self::load_from(cli, &path)
    }

    fn load_from(cli: Cli, path: &Path) -> Result<Self> {
        let file = if path.exists() {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        } else {
            FileConfig::default()
        };
        Ok(Self::resolve(cli, file))
    }

    /// 优先级：命令行 > 配置文件 > 内置默认值
    fn resolve(cli: Cli, file: FileConfig) -> Self {
        let defaults = Config::default();
        let [major, minor, patch, pre, other] = defaults.colors;
        Config {
            interval: cli.interval.or(file.interval).unwrap_or(defaults.interval),
            interval_sync: cli
                .interval_sync
                .or(file.interval_sync)
                .unwrap_or(defaults.interval_sync),
            skip_aur: cli.skip_aur || file.skip_aur.unwrap_or(false),
            raw_output: cli.raw_output || file.raw_output.unwrap_or(false),
            no_color: cli.no_color || file.no_color.unwrap_or(false),
            colors: [
                cli.color_major.or(file.color_major).unwrap_or(major),
                cli.color_minor.or(file.color_minor).unwrap_or(minor),
                cli.color_patch.or(file.color_patch).unwrap_or(patch),
                cli.color_pre.or(file.color_pre).unwrap_or(pre),
                cli.color_other.or(file.color_other).unwrap_or(other),
            ],
        }
    }

    /// 校验节奏参数组合；错误信息用于退出前的 stdout 提示
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.interval == 0 || self.interval_sync < 10 || self.interval_sync < self.interval {
            return Err(
                "`interval` and `interval-sync` must be greater than 0 and 9 respectively \
                 and `interval-sync` must be greater or equal to `interval`."
                    .to_string(),
            );
        }
        Ok(())
    }

    /// 慢节奏（联网同步）间隔折算成快节奏 tick 数
    pub fn sync_every_ticks(&self) -> u64 {
        self.interval_sync / self.interval
    }

    /// 派生格式化开关与调色板
    pub fn format_options(&self) -> FormatOptions {
        FormatOptions {
            raw_output: self.raw_output,
            no_color: self.no_color,
            palette: self.colors.clone(),
        }
    }
}
