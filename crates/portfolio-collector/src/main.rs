//! Portfolio status collector CLI.

use chrono::Local;
use clap::{Parser, Subcommand};
use portfolio_collector::modules::{self, OutputFormat, ViewConfig};
use portfolio_collector::CollectorConfig;
use portfolio_data::{NotionClient, SnapshotStore, YahooProbe};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "portfolio-collector")]
#[command(about = "Portfolio Status Collector", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// 로그 형식 (text, json)
    #[arg(long, default_value = "text")]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// 원격 DB를 조회해 로컬 스냅샷으로 저장
    Sync,

    /// 저장된 스냅샷의 종목을 probe하고 활성 상태 반영
    Probe,

    /// 전체 워크플로우 실행 (동기화 → probe)
    RunAll,

    /// 데몬 모드: 주기적으로 전체 워크플로우 실행
    Daemon,

    /// 저장된 스냅샷 출력
    View {
        /// 스냅샷 파일 경로
        #[arg(long, env = "SNAPSHOT_PATH", default_value = "portfolio.json")]
        path: PathBuf,

        /// 출력 형식 (table, csv, json)
        #[arg(long, default_value = "table")]
        format: String,

        /// 출력 파일 경로 (없으면 stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // 로깅 초기화
    let json = cli.log_format.eq_ignore_ascii_case("json");
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "portfolio_collector={level},portfolio_data={level}",
                    level = cli.log_level
                )
                .into()
            }),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();

    // 명령 실행
    match cli.command {
        Commands::Sync => {
            let (_, client, store) = connect()?;
            let (_, stats) = modules::sync_portfolio(&client, &store).await?;
            stats.log_summary("포트폴리오 동기화");
        }
        Commands::Probe => {
            let (config, client, store) = connect()?;
            let probe = YahooProbe::new()?;
            let series = config.series_writer(Local::now());
            let (_, stats) =
                modules::probe_portfolio(&store, &probe, &client, &series, &config.probe).await?;
            stats.log_summary("상태 probe");
        }
        Commands::RunAll => {
            let (config, client, store) = connect()?;
            tracing::info!("=== 전체 워크플로우 시작 ===");

            let probe = YahooProbe::new()?;
            let series = config.series_writer(Local::now());
            modules::run_all(&client, &probe, &store, &series, &config.probe).await?;

            tracing::info!("=== 전체 워크플로우 완료 ===");
        }
        Commands::Daemon => {
            let (config, client, store) = connect()?;
            tracing::info!(
                "=== 데몬 모드 시작 (주기: {}분) ===",
                config.daemon.interval_minutes
            );

            let probe = YahooProbe::new()?;
            let mut interval = tokio::time::interval(config.daemon.interval());
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("종료 신호 수신, 데몬 종료 중...");
                        break;
                    }
                    _ = interval.tick() => {
                        tracing::info!("=== 워크플로우 실행 시작 ===");

                        let series = config.series_writer(Local::now());
                        if let Err(e) =
                            modules::run_all(&client, &probe, &store, &series, &config.probe).await
                        {
                            tracing::error!("워크플로우 실패: {}", e);
                        }

                        tracing::info!(
                            "=== 워크플로우 완료, 다음 실행: {}분 후 ===",
                            config.daemon.interval_minutes
                        );
                    }
                }
            }
        }
        Commands::View {
            path,
            format,
            output,
        } => {
            let config = ViewConfig {
                path,
                format: OutputFormat::parse(&format)?,
                output,
            };
            modules::view_snapshot(&config)?;
            return Ok(());
        }
    }

    tracing::info!("Portfolio Collector 종료");

    Ok(())
}

/// 설정 로드 후 원격 클라이언트와 스냅샷 저장소 준비.
fn connect() -> Result<(CollectorConfig, NotionClient, SnapshotStore), Box<dyn std::error::Error>> {
    tracing::info!("Portfolio Collector 시작");

    let config = CollectorConfig::from_env()?;
    tracing::debug!(
        database_id = %config.notion.database_id,
        snapshot = %config.storage.snapshot_path.display(),
        "설정 로드 완료"
    );

    let client = NotionClient::new(config.notion_config())?;
    let store = config.snapshot_store();
    Ok((config, client, store))
}
