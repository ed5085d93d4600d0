use crate::domain::model::{CommandOutput, ImageName, RunRequest};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// 容器引擎的最小介面：檢查映像、執行一次性 container
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    async fn image_exists(&self, image: &ImageName) -> Result<bool>;
    async fn run(&self, request: &RunRequest) -> Result<CommandOutput>;
}

/// 量測單一模組 import 耗時；`Ok(None)` 代表模組無法載入
#[async_trait]
pub trait ModuleImporter: Send + Sync {
    async fn time_import(&self, module: &str) -> Result<Option<Duration>>;
}
