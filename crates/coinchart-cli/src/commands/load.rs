//! 캔들 파일 로딩.
//!
//! - JSON: 캔들 배열 또는 `{ "symbol": ..., "candles": [...] }` 객체 (`timestamp`는 epoch ms)
//! - CSV: 헤더 `timestamp,open,high,low,close,volume`
//!   (`timestamp`는 epoch 초/밀리초, RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD` 중 하나)

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use coinchart_core::{Candle, CandleSeries, ChartError};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// 초 단위와 밀리초 단위를 구분하는 경계 (약 5138년의 초 값).
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// 로드된 캔들과 파일에 포함된 심볼.
#[derive(Debug, Clone)]
pub struct LoadedCandles {
    pub symbol: Option<String>,
    pub series: CandleSeries,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CandleFile {
    Plain(Vec<Candle>),
    Wrapped {
        #[serde(default)]
        symbol: Option<String>,
        candles: Vec<Candle>,
    },
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: String,
    #[serde(with = "rust_decimal::serde::str")]
    open: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    high: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    low: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    close: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    volume: Decimal,
}

/// 확장자로 형식을 판단하여 파일을 로드합니다.
pub fn load_candles<P: AsRef<Path>>(path: P) -> Result<LoadedCandles> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open candle file: {}", path.display()))?;

    let loaded = match extension.as_str() {
        "json" => parse_json(file),
        "csv" => parse_csv(file).map(|series| LoadedCandles { symbol: None, series }),
        other => bail!("Unsupported candle file extension: '{}'. Use .json or .csv", other),
    }
    .with_context(|| format!("Failed to load candles from {}", path.display()))?;

    info!(
        path = %path.display(),
        candles = loaded.series.len(),
        "Candles loaded"
    );
    Ok(loaded)
}

/// JSON 캔들 파일을 파싱합니다.
pub fn parse_json<R: Read>(reader: R) -> Result<LoadedCandles> {
    let file: CandleFile = serde_json::from_reader(reader).map_err(ChartError::from)?;
    let (symbol, candles) = match file {
        CandleFile::Plain(candles) => (None, candles),
        CandleFile::Wrapped { symbol, candles } => (symbol, candles),
    };
    let series = CandleSeries::new(candles).map_err(ChartError::from)?;
    Ok(LoadedCandles { symbol, series })
}

/// CSV 캔들 파일을 파싱합니다.
pub fn parse_csv<R: Read>(reader: R) -> Result<CandleSeries> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut candles = Vec::new();
    for (row_index, record) in reader.deserialize::<CsvRow>().enumerate() {
        // 헤더가 1행이므로 데이터는 2행부터
        let line = row_index + 2;
        let row = record.with_context(|| format!("Invalid CSV row at line {}", line))?;
        let timestamp = parse_timestamp(&row.timestamp)
            .with_context(|| format!("Invalid timestamp '{}' at line {}", row.timestamp, line))?;
        candles.push(Candle::new(timestamp, row.open, row.high, row.low, row.close, row.volume));
    }

    debug!(rows = candles.len(), "CSV parsed");
    Ok(CandleSeries::new(candles).map_err(ChartError::from)?)
}

/// 타임스탬프 문자열을 해석합니다.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(epoch) = s.parse::<i64>() {
        return if epoch.abs() >= MILLIS_THRESHOLD {
            Utc.timestamp_millis_opt(epoch).single()
        } else {
            Utc.timestamp_opt(epoch, 0).single()
        };
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();

        assert_eq!(parse_timestamp("1704164645"), Some(expected));
        assert_eq!(parse_timestamp("1704164645000"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-02T03:04:05Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-02 03:04:05"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-01-02"),
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_parse_csv() {
        let data = "timestamp,open,high,low,close,volume\n\
                    2024-01-01,100,110,95,105,1000\n\
                    2024-01-02, 105, 112, 101, 108, 1500\n";
        let series = parse_csv(data.as_bytes()).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.last().unwrap().close, dec!(108));
    }

    #[test]
    fn test_parse_csv_rejects_invalid_ohlc() {
        let data = "timestamp,open,high,low,close,volume\n\
                    1,100,99,95,98,10\n";
        let err = parse_csv(data.as_bytes()).unwrap_err();

        assert!(err.to_string().contains("캔들 0"));
    }

    #[test]
    fn test_parse_json_plain_and_wrapped() {
        let plain = r#"[
            {"timestamp": 1700000000000, "open": "1", "high": "2", "low": "0.5", "close": "1.5", "volume": "10"},
            {"timestamp": 1700003600000, "open": "1.5", "high": "2.5", "low": "1", "close": "2", "volume": "12"}
        ]"#;
        let loaded = parse_json(plain.as_bytes()).unwrap();
        assert_eq!(loaded.series.len(), 2);
        assert!(loaded.symbol.is_none());

        let wrapped = format!(r#"{{"symbol": "BTC/USDT", "candles": {}}}"#, plain);
        let loaded = parse_json(wrapped.as_bytes()).unwrap();
        assert_eq!(loaded.symbol.as_deref(), Some("BTC/USDT"));
    }

    #[test]
    fn test_parse_json_rejects_non_monotonic_timestamps() {
        let data = r#"[
            {"timestamp": 2000, "open": "1", "high": "1", "low": "1", "close": "1", "volume": "1"},
            {"timestamp": 1000, "open": "1", "high": "1", "low": "1", "close": "1", "volume": "1"}
        ]"#;

        assert!(parse_json(data.as_bytes()).is_err());
    }
}
