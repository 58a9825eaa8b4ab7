//! AUR RPC 客户端 — 一次请求批量查询远端包版本

use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;

const AUR_RPC_URL: &str = "https://aur.archlinux.org/rpc/";

/// RPC v5 info 查询的响应体，只关心 results 列表
#[derive(Debug, Deserialize)]
struct InfoResponse {
    results: Vec<AurPackage>,
}

/// AUR 侧的单个包记录（RPC 字段名是大写开头）
#[derive(Debug, Clone, Deserialize)]
pub struct AurPackage {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Version")]
    pub version: String,
}

pub struct AurClient {
    client: Client,
    base_url: String,
}

impl AurClient {
    pub fn new() -> Self {
        Self::with_base_url(AUR_RPC_URL)
    }

    /// 测试用：把查询指向本地 mock 服务
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// 查询整批包名的远端记录，一个 `arg[]` 参数对应一个包。
    /// AUR 未收录的包不会出现在 results 里，由调用方自行忽略。
    pub async fn query_info(&self, names: &[String]) -> Result<Vec<AurPackage>> {
        let mut request = self
            .client
            .get(&self.base_url)
            .query(&[("v", "5"), ("type", "info")]);
        for name in names {
            request = request.query(&[("arg[]", name.as_str())]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            anyhow::bail!(
                "AUR API returned status code {}",
                response.status().as_u16()
            );
        }

        let info: InfoResponse = response.json().await?;
        Ok(info.results)
    }
}
