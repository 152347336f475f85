use anyhow::Result;
use resume_extract::{logger, App, Config};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    logger::init(config.verbose_logging);

    // 命令行参数：待处理的简历文件
    let paths: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    if paths.is_empty() {
        eprintln!("用法: resume_extract <简历文件>...");
        eprintln!("支持的格式: .pdf .docx .txt");
        return Ok(());
    }

    // 初始化并运行应用
    let app = App::initialize(config)?;
    app.run(paths).await?;

    Ok(())
}
