use anyhow::Result;

use exam_paper_eval::utils::logging;
use exam_paper_eval::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置：有 config.toml 就用它，否则读环境变量
    let config = if std::path::Path::new("config.toml").exists() {
        Config::from_toml_file("config.toml")?
    } else {
        Config::from_env()
    };

    // 初始化并运行应用
    App::initialize(config).await?.run().await?;

    Ok(())
}
