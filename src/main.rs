use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result};
use secrecy::ExposeSecret;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::prelude::*;

use discord_relay::config::Config;
use discord_relay::relay::{Relay, RelaySettings};
use discord_relay::webhook::{redact_url, HttpWebhookSink};

#[derive(Parser)]
#[command(
    name = "discord-relay",
    about = "把 Discord 消息和评分反应转发到 webhook",
    version
)]
struct Cli {
    /// 配置文件路径（默认 ~/.discord-relay/config.toml）
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// 连接 Discord Gateway 并开始转发（默认）
    Run,
    /// 校验配置并打印生效的设置
    Check,
    /// 初始化配置文件
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing()?;

    let cli = Cli::parse();
    let config_path = match cli.config {
        Some(path) => path,
        None => Config::config_path()?,
    };

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_relay(&config_path).await?,
        Commands::Check => run_check(&config_path)?,
        Commands::Init => run_init(&config_path)?,
    }

    Ok(())
}

/// 加载并校验配置；任何错误都以非零码退出
fn load_config(config_path: &Path) -> Result<Config> {
    let config = Config::load_from_path(config_path).wrap_err("加载配置失败")?;
    config.validate().wrap_err("配置校验失败")?;
    Ok(config)
}

async fn run_relay(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    for warning in config.warnings() {
        warn!("{}", warning);
    }

    let sink = HttpWebhookSink::new(Duration::from_secs(config.webhooks.timeout_secs))?;
    let relay = Arc::new(Relay::new(
        RelaySettings::from_config(&config),
        Arc::new(sink),
    ));

    #[cfg(feature = "discord")]
    return discord_relay::channels::discord::run_discord(&config, relay).await;

    #[cfg(not(feature = "discord"))]
    {
        drop(relay);
        color_eyre::eyre::bail!("未启用 discord feature，无法连接 Gateway");
    }
}

fn run_check(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let settings = RelaySettings::from_config(&config);
    let or_unset = |v: &Option<String>| v.clone().unwrap_or_else(|| "(未设置)".to_string());

    println!("配置文件: {}", config_path.display());
    println!(
        "token: {}",
        match &config.discord.token {
            Some(t) => format!("已设置（{} 字符，已隐藏）", t.expose_secret().len()),
            None => "(未设置)".to_string(),
        }
    );
    println!("guild: {}", or_unset(&settings.guild_id));
    println!("source channel: {}", or_unset(&settings.source_channel_id));
    println!("rating channel: {}", or_unset(&settings.rating_channel_id));
    // webhook 路径通常带密钥，和 token 一样打码
    let or_unset_url = |v: &Option<String>| {
        v.as_deref()
            .map(redact_url)
            .unwrap_or_else(|| "(未设置)".to_string())
    };
    println!("source webhook: {}", or_unset_url(&settings.source_url));
    println!("rating webhook: {}", or_unset_url(&settings.rating_url));
    println!("转发 bot 消息: {}", settings.include_bot_messages);
    println!("POST 超时: {}s", config.webhooks.timeout_secs);

    for warning in config.warnings() {
        println!("⚠️  {}", warning);
    }

    Ok(())
}

fn run_init(config_path: &Path) -> Result<()> {
    if Config::write_default(config_path)? {
        println!("已创建配置文件: {}", config_path.display());
        println!("请编辑该文件填写 Bot Token 和 webhook URL。");
    } else {
        println!("配置文件已存在: {}", config_path.display());
        println!("如需重新初始化，请先删除该文件。");
    }
    Ok(())
}

/// 获取日志目录: ~/.discord-relay/logs/
fn log_dir() -> Result<PathBuf> {
    let base_dirs = directories::BaseDirs::new()
        .ok_or_else(|| color_eyre::eyre::eyre!("无法获取 home 目录"))?;
    Ok(base_dirs.home_dir().join(".discord-relay").join("logs"))
}

/// 初始化 tracing: stderr 输出 info+，日志文件输出 debug+
fn init_tracing() -> Result<()> {
    let log_dir = log_dir()?;
    std::fs::create_dir_all(&log_dir)
        .wrap_err_with(|| format!("创建日志目录失败: {}", log_dir.display()))?;

    // 文件日志: 按天滚动
    let file_appender = tracing_appender::rolling::daily(&log_dir, "discord-relay.log");
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("discord_relay=debug")),
        );

    // stderr: 服务进程，info 级别足够看到每次转发
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(tracing_subscriber::EnvFilter::new(
            "discord_relay=info,serenity=warn,warn",
        ));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .init();

    Ok(())
}
