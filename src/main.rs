mod aur;
mod config;
mod format;
mod pacman;
mod poller;
mod status;

use anyhow::Result;
use clap::Parser;
use config::{Cli, Config};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = Config::load(Cli::parse())?;
    if let Err(msg) = config.validate() {
        // 参数组合错误按协议打印到 stdout 并以 1 退出
        println!("{}", msg);
        std::process::exit(1);
    }

    log::info!(
        "启动轮询: interval={}s interval-sync={}s skip-aur={}",
        config.interval,
        config.interval_sync,
        config.skip_aur
    );

    let pacman_rx = poller::spawn_pacman_poller(&config);
    let aur_rx = (!config.skip_aur).then(|| poller::spawn_aur_poller(&config));

    status::run_merge_loop(&config, pacman_rx, aur_rx).await
}
