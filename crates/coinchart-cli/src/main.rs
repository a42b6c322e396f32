//! 차트 분석 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 전체 지표 분석 (표 형식)
//! coinchart analyze -i data/btc_1h.csv -s BTC/USDT
//!
//! # 일부 지표만 JSON으로 출력
//! coinchart analyze -i data/btc_1h.json --only sma,supertrend,zigzag -f json -o report.json
//!
//! # 적용된 설정 확인 (파일 + COINCHART__* 환경 변수)
//! coinchart config -c config/default.toml
//!
//! # 지원 지표 목록
//! coinchart indicators
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use coinchart_cli::commands::analyze::{parse_kinds, run_analyze, AnalyzeConfig};
use coinchart_cli::commands::show_config::{render_config, render_indicators, ConfigSection};
use coinchart_cli::commands::{write_output, OutputFormat};
use coinchart_core::{init_logging, AppConfig, LogConfig};

#[derive(Parser)]
#[command(name = "coinchart")]
#[command(about = "Chart analysis CLI - 캔들 데이터 기술적 분석", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 (기본: config/default.toml, 없으면 내장 기본값)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 캔들 파일 분석
    Analyze {
        /// 캔들 파일 (.json 또는 .csv)
        #[arg(short, long)]
        input: String,

        /// 출력 형식 (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,

        /// 계산할 지표 (쉼표 구분, 예: sma,supertrend,zigzag)
        #[arg(long)]
        only: Option<String>,

        /// 보고서에 표시할 심볼
        #[arg(short, long)]
        symbol: Option<String>,

        /// 출력 파일 경로 (지정하지 않으면 stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// 적용된 설정 출력 (TOML)
    Config {
        /// 섹션 (all, logging, analysis)
        #[arg(long, default_value = "all")]
        section: String,
    },

    /// 지원 지표 목록
    Indicators,
}

fn load_app_config(path: Option<&str>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::load_default()?,
    };
    Ok(config)
}

fn main() -> Result<()> {
    // .env 파일은 선택 사항
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let app = load_app_config(cli.config.as_deref())?;

    init_logging(LogConfig::from_settings(&app.logging))
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    match cli.command {
        Commands::Analyze {
            input,
            format,
            only,
            symbol,
            output,
        } => {
            let config = AnalyzeConfig {
                input,
                format: OutputFormat::parse(&format)?,
                only: only.as_deref().map(parse_kinds).transpose()?.unwrap_or_default(),
                symbol,
                output,
            };

            match run_analyze(&app, &config) {
                Ok(report) => {
                    info!(
                        indicators = report.outputs.len(),
                        bias = %report.overall_bias(),
                        "Analysis finished"
                    );
                }
                Err(e) => {
                    error!("Analysis failed: {:#}", e);
                    return Err(e);
                }
            }
        }

        Commands::Config { section } => {
            let section = ConfigSection::parse(&section)?;
            write_output(&render_config(&app, section)?, None)?;
        }

        Commands::Indicators => {
            write_output(&render_indicators(), None)?;
        }
    }

    Ok(())
}
