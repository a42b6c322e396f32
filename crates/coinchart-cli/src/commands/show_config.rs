//! 설정/지표 목록 출력.

use anyhow::{Context, Result};
use coinchart_analytics::IndicatorKind;
use coinchart_core::AppConfig;

/// 출력할 설정 섹션.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    All,
    Logging,
    Analysis,
}

impl ConfigSection {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "logging" => Ok(Self::Logging),
            "analysis" => Ok(Self::Analysis),
            _ => Err(anyhow::anyhow!(
                "Invalid section: {}. Use: all, logging, analysis",
                s
            )),
        }
    }
}

/// 적용된 설정을 TOML로 만듭니다.
pub fn render_config(app: &AppConfig, section: ConfigSection) -> Result<String> {
    match section {
        ConfigSection::All => Ok(app.to_toml()?),
        ConfigSection::Logging => {
            toml::to_string_pretty(&app.logging).context("Failed to serialize logging config")
        }
        ConfigSection::Analysis => {
            toml::to_string_pretty(&app.analysis).context("Failed to serialize analysis config")
        }
    }
}

/// 지원하는 지표 목록.
pub fn render_indicators() -> String {
    let mut output = format!("{:<20} {}\n", "ID", "NAME");
    output.push_str(&"-".repeat(40));
    output.push('\n');
    for kind in IndicatorKind::ALL {
        output.push_str(&format!("{:<20} {}\n", kind.id(), kind.display_name()));
    }
    output.push_str(&format!("\nTotal: {} indicators", IndicatorKind::ALL.len()));
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_analysis_section() {
        let toml = render_config(&AppConfig::default(), ConfigSection::Analysis).unwrap();

        assert!(toml.contains("[bollinger]"));
        assert!(!toml.contains("[logging]"));
    }

    #[test]
    fn test_render_indicators_lists_all() {
        let listing = render_indicators();

        assert!(listing.contains("super_trend"));
        assert!(listing.contains("range_statistics"));
        assert!(listing.ends_with("Total: 17 indicators"));
    }
}
