use isahc::{config::Configurable, prelude::*, HttpClient};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration as StdDuration, SystemTime};
use tokio::time::sleep;

use chrono::NaiveDate;

use crate::models::{DailyQuote, PipelineConfig, Ticker};
use crate::utils::compact_date;

const BASE_URL: &str = "https://api.jquants.com/v1/";
const MAX_RETRIES: u32 = 5;

#[derive(Debug)]
pub enum JquantsError {
    Http(isahc::Error),
    Serialization(serde_json::Error),
    Auth(String),
    InvalidResponse(String),
    RateLimit,
    NoData,
}

impl From<isahc::Error> for JquantsError {
    fn from(error: isahc::Error) -> Self {
        JquantsError::Http(error)
    }
}

impl From<serde_json::Error> for JquantsError {
    fn from(error: serde_json::Error) -> Self {
        JquantsError::Serialization(error)
    }
}

impl std::fmt::Display for JquantsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JquantsError::Http(e) => write!(f, "HTTP error: {}", e),
            JquantsError::Serialization(e) => write!(f, "Serialization error: {}", e),
            JquantsError::Auth(s) => write!(f, "Authentication error: {}", s),
            JquantsError::InvalidResponse(s) => write!(f, "Invalid response: {}", s),
            JquantsError::RateLimit => write!(f, "Rate limit exceeded"),
            JquantsError::NoData => write!(f, "No data available"),
        }
    }
}

impl std::error::Error for JquantsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            JquantsError::Http(e) => Some(e),
            JquantsError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

/// One annual filing, numeric fields already coerced from the API's
/// string-or-null representation. A field that did not parse is None;
/// the row itself is never dropped for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialStatement {
    pub disclosed_date: String,
    pub type_of_document: String,
    pub net_sales: Option<f64>,
    pub operating_profit: Option<f64>,
    pub profit: Option<f64>,
    pub equity: Option<f64>,
    pub equity_to_asset_ratio: Option<f64>,
    pub eps: Option<f64>,
    pub issued_shares: Option<f64>,
}

/// J-Quants API client.
///
/// Owns the HTTP connection, the bearer token, and a sliding-window rate
/// limiter. All methods degrade transient failures into typed errors the
/// pipeline maps to "no data for this ticker"; a single ticker's failure
/// never aborts a run.
pub struct JquantsClient {
    client: HttpClient,
    base_url: String,
    id_token: String,
    rate_limit_per_minute: u32,
    request_timestamps: Vec<SystemTime>,
}

impl JquantsClient {
    /// Build a client from config, exchanging the refresh token for an
    /// ID token when none was supplied directly.
    pub async fn connect(config: &PipelineConfig) -> Result<Self, JquantsError> {
        let client = HttpClient::builder()
            .timeout(StdDuration::from_secs(30))
            .build()?;

        let id_token = match (&config.id_token, &config.refresh_token) {
            (Some(token), _) => token.clone(),
            (None, Some(refresh_token)) => Self::refresh_id_token(&client, refresh_token).await?,
            (None, None) => {
                return Err(JquantsError::Auth(
                    "JQUANTS_ID_TOKEN or JQUANTS_REFRESH_TOKEN must be set".to_string(),
                ))
            }
        };

        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
            id_token,
            rate_limit_per_minute: config.rate_limit_per_minute,
            request_timestamps: Vec::new(),
        })
    }

    /// Opaque refresh-token exchange. The token never leaves this client.
    async fn refresh_id_token(
        client: &HttpClient,
        refresh_token: &str,
    ) -> Result<String, JquantsError> {
        let url = format!("{}token/auth_refresh?refreshtoken={}", BASE_URL, refresh_token);
        let mut response = client.post_async(&url, ()).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(JquantsError::Auth(format!(
                "token refresh failed with status {}",
                status.as_u16()
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| JquantsError::InvalidResponse(format!("token response body: {}", e)))?;
        let data: Value = serde_json::from_str(&text)?;

        data.get("idToken")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| JquantsError::Auth("token refresh response carried no idToken".to_string()))
    }

    /// Sliding-window rate limiting over the last 60 seconds
    async fn enforce_rate_limit(&mut self) {
        let current_time = SystemTime::now();

        self.request_timestamps.retain(|&timestamp| {
            current_time
                .duration_since(timestamp)
                .unwrap_or(StdDuration::from_secs(0))
                < StdDuration::from_secs(60)
        });

        if self.request_timestamps.len() >= self.rate_limit_per_minute as usize {
            if let Some(&oldest_request) = self.request_timestamps.first() {
                let wait_time = StdDuration::from_secs(60)
                    - current_time
                        .duration_since(oldest_request)
                        .unwrap_or(StdDuration::from_secs(0));
                if !wait_time.is_zero() {
                    sleep(wait_time + StdDuration::from_millis(100)).await;
                }
            }
        }

        self.request_timestamps.push(current_time);
    }

    /// GET with bounded exponential-backoff retries. 403/429/5xx retry,
    /// other client errors fail fast.
    async fn get_json(&mut self, path_and_query: &str) -> Result<Value, JquantsError> {
        let url = format!("{}{}", self.base_url, path_and_query);
        let mut last_error: Option<String> = None;

        for attempt in 0..MAX_RETRIES {
            self.enforce_rate_limit().await;

            if attempt > 0 {
                let delay =
                    StdDuration::from_secs_f64(2.0_f64.powi(attempt as i32 - 1) + rand::random::<f64>());
                let delay = delay.min(StdDuration::from_secs(60));
                let reason = last_error.as_deref().unwrap_or("unknown error");
                tracing::info!(
                    "J-Quants retry backoff: attempt {}/{} - reason: {}, waiting {:.1}s before retry",
                    attempt + 1,
                    MAX_RETRIES,
                    reason,
                    delay.as_secs_f64()
                );
                sleep(delay).await;
            }

            let request = isahc::Request::builder()
                .uri(&url)
                .method("GET")
                .header("Accept", "application/json")
                .header("Authorization", format!("Bearer {}", self.id_token))
                .body(())
                .map_err(|e| JquantsError::InvalidResponse(format!("Request build error: {}", e)))?;

            match self.client.send_async(request).await {
                Ok(mut response) => {
                    let status = response.status();

                    if status.is_success() {
                        match response.text().await {
                            Ok(text) => match serde_json::from_str::<Value>(&text) {
                                Ok(data) => return Ok(data),
                                Err(e) => {
                                    last_error = Some(format!("JSON parse error: {}", e));
                                    continue;
                                }
                            },
                            Err(e) => {
                                last_error = Some(format!("Response body error: {}", e));
                                continue;
                            }
                        }
                    } else if status == 429 {
                        last_error = Some("Too Many Requests (429) - rate limited".to_string());
                        continue;
                    } else if status == 403 {
                        last_error = Some("Forbidden (403) - rate limit or token expiry".to_string());
                        continue;
                    } else if status.is_server_error() {
                        last_error = Some(format!("Server error ({})", status.as_u16()));
                        continue;
                    } else {
                        // Remaining 4xx are request problems, not transient
                        return Err(JquantsError::InvalidResponse(format!(
                            "Client error ({}) - not retryable",
                            status.as_u16()
                        )));
                    }
                }
                Err(e) => {
                    last_error = Some(format!("Network error: {}", e));
                    continue;
                }
            }
        }

        Err(JquantsError::InvalidResponse(format!(
            "Max retries exceeded - {}",
            last_error.unwrap_or_else(|| "unknown error".to_string())
        )))
    }

    /// Daily OHLCV rows for one ticker, sorted by date, duplicate dates
    /// resolved last-wins. Unparseable price fields become NaN sentinels.
    pub async fn daily_quotes(
        &mut self,
        code: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyQuote>, JquantsError> {
        let path = format!(
            "prices/daily_quotes?code={}&from={}&to={}",
            code,
            compact_date(from),
            compact_date(to)
        );
        let data = self.get_json(&path).await?;

        let rows = data
            .get("daily_quotes")
            .and_then(|v| v.as_array())
            .ok_or(JquantsError::NoData)?;
        if rows.is_empty() {
            return Err(JquantsError::NoData);
        }

        let mut quotes: Vec<DailyQuote> = rows.iter().filter_map(parse_quote_row).collect();
        if quotes.is_empty() {
            return Err(JquantsError::NoData);
        }

        quotes.sort_by_key(|quote| quote.date);
        dedup_last_wins(&mut quotes);

        Ok(quotes)
    }

    /// Universe listing, optionally filtered by market segment name
    pub async fn listed_tickers(&mut self, segment: Option<&str>) -> Result<Vec<Ticker>, JquantsError> {
        let data = self.get_json("listed/info").await?;

        let rows = data
            .get("info")
            .and_then(|v| v.as_array())
            .ok_or(JquantsError::NoData)?;

        let tickers: Vec<Ticker> = rows
            .iter()
            .filter_map(|row| {
                let code = row.get("Code")?.as_str()?;
                let name = row.get("CompanyName")?.as_str()?;
                let market = row.get("MarketCodeName").and_then(|v| v.as_str()).unwrap_or("");
                Some(Ticker::new(code, name, market))
            })
            .filter(|ticker| segment.map_or(true, |wanted| ticker.segment == wanted))
            .collect();

        if tickers.is_empty() {
            return Err(JquantsError::NoData);
        }
        Ok(tickers)
    }

    /// Last three annual filings for one ticker, oldest first.
    /// Falls back to all filing types when no annual rows exist.
    pub async fn annual_statements(
        &mut self,
        code: &str,
    ) -> Result<Vec<FinancialStatement>, JquantsError> {
        let path = format!("fins/statements?code={}", code);
        let data = self.get_json(&path).await?;

        let rows = data
            .get("statements")
            .and_then(|v| v.as_array())
            .ok_or(JquantsError::NoData)?;
        if rows.is_empty() {
            return Err(JquantsError::NoData);
        }

        let statements: Vec<FinancialStatement> = rows.iter().map(parse_statement_row).collect();
        Ok(select_annual(statements))
    }
}

/// Parse one daily_quotes row. Returns None only when the date itself is
/// missing or malformed; bad price fields become NaN instead.
fn parse_quote_row(row: &Value) -> Option<DailyQuote> {
    let date_str = row.get("Date")?.as_str()?;
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()?;

    Some(DailyQuote::new(
        date,
        num_or_nan(row.get("Open")),
        num_or_nan(row.get("High")),
        num_or_nan(row.get("Low")),
        num_or_nan(row.get("Close")),
        opt_num(row.get("Volume")).map(|v| v.max(0.0) as u64).unwrap_or(0),
    ))
}

fn parse_statement_row(row: &Value) -> FinancialStatement {
    FinancialStatement {
        disclosed_date: row
            .get("DisclosedDate")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string(),
        type_of_document: row
            .get("TypeOfDocument")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string(),
        net_sales: opt_num(row.get("NetSales")),
        operating_profit: opt_num(row.get("OperatingProfit")),
        profit: opt_num(row.get("Profit")),
        equity: opt_num(row.get("Equity")),
        equity_to_asset_ratio: opt_num(row.get("EquityToAssetRatio")),
        eps: opt_num(row.get("EarningsPerShare")),
        issued_shares: opt_num(row.get(
            "NumberOfIssuedAndOutstandingSharesAtTheEndOfFiscalYearIncludingTreasuryStock",
        )),
    }
}

/// Keep annual filings when any exist, sort by disclosure date, take the
/// last three (oldest first in the result)
fn select_annual(statements: Vec<FinancialStatement>) -> Vec<FinancialStatement> {
    let mut annual: Vec<FinancialStatement> = statements
        .iter()
        .filter(|statement| statement.type_of_document.contains("Annual"))
        .cloned()
        .collect();
    if annual.is_empty() {
        annual = statements;
    }

    annual.sort_by(|a, b| a.disclosed_date.cmp(&b.disclosed_date));
    let skip = annual.len().saturating_sub(3);
    annual.split_off(skip)
}

/// Numeric coercion with a NaN sentinel for missing/unparseable values
fn num_or_nan(value: Option<&Value>) -> f64 {
    opt_num(value).unwrap_or(f64::NAN)
}

/// The API serializes numbers both natively and as strings; nulls and
/// empty strings mean absent
fn opt_num(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if !s.trim().is_empty() => s.trim().parse().ok(),
        _ => None,
    }
}

/// Duplicate dates are not expected upstream, but when present the
/// last-sorted row wins
fn dedup_last_wins(quotes: &mut Vec<DailyQuote>) {
    quotes.reverse();
    quotes.dedup_by(|a, b| a.date == b.date);
    quotes.reverse();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_quote_row() {
        let row = json!({
            "Date": "2025-09-26",
            "Open": "990.0",
            "High": 1020.5,
            "Low": 985.0,
            "Close": "1010",
            "Volume": 154000
        });
        let quote = parse_quote_row(&row).unwrap();
        assert_eq!(quote.date, NaiveDate::from_ymd_opt(2025, 9, 26).unwrap());
        assert_eq!(quote.open, 990.0);
        assert_eq!(quote.high, 1020.5);
        assert_eq!(quote.volume, 154000);
    }

    #[test]
    fn test_parse_quote_row_null_high_becomes_nan() {
        let row = json!({
            "Date": "2025-09-26",
            "Open": 990.0,
            "High": null,
            "Low": 985.0,
            "Close": 1010.0,
            "Volume": null
        });
        let quote = parse_quote_row(&row).unwrap();
        assert!(quote.high.is_nan());
        assert_eq!(quote.volume, 0);
    }

    #[test]
    fn test_parse_quote_row_bad_date_is_dropped() {
        let row = json!({"Date": "not-a-date", "High": 100.0});
        assert!(parse_quote_row(&row).is_none());
    }

    #[test]
    fn test_parse_statement_row_coerces_strings() {
        let row = json!({
            "DisclosedDate": "2025-05-10",
            "TypeOfDocument": "FYFinancialStatements_Consolidated_Annual",
            "NetSales": "5400000000",
            "OperatingProfit": "",
            "Profit": "310000000",
            "Equity": null,
            "EquityToAssetRatio": "0.55",
            "EarningsPerShare": "54.2"
        });
        let statement = parse_statement_row(&row);
        assert_eq!(statement.net_sales, Some(5.4e9));
        assert_eq!(statement.operating_profit, None);
        assert_eq!(statement.equity, None);
        assert_eq!(statement.equity_to_asset_ratio, Some(0.55));
        assert_eq!(statement.eps, Some(54.2));
    }

    #[test]
    fn test_select_annual_prefers_annual_and_keeps_last_three() {
        let make = |date: &str, doc: &str| FinancialStatement {
            disclosed_date: date.to_string(),
            type_of_document: doc.to_string(),
            net_sales: None,
            operating_profit: None,
            profit: None,
            equity: None,
            equity_to_asset_ratio: None,
            eps: None,
            issued_shares: None,
        };

        let statements = vec![
            make("2022-05-10", "Annual"),
            make("2023-05-10", "1Q"),
            make("2023-05-12", "Annual"),
            make("2024-05-10", "Annual"),
            make("2025-05-09", "Annual"),
        ];
        let selected = select_annual(statements);
        assert_eq!(selected.len(), 3);
        assert_eq!(selected[0].disclosed_date, "2023-05-12");
        assert_eq!(selected[2].disclosed_date, "2025-05-09");
    }

    #[test]
    fn test_select_annual_falls_back_to_all_rows() {
        let make = |date: &str| FinancialStatement {
            disclosed_date: date.to_string(),
            type_of_document: "2Q".to_string(),
            net_sales: None,
            operating_profit: None,
            profit: None,
            equity: None,
            equity_to_asset_ratio: None,
            eps: None,
            issued_shares: None,
        };
        let selected = select_annual(vec![make("2024-08-01"), make("2024-11-01")]);
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn test_dedup_last_wins() {
        let date = NaiveDate::from_ymd_opt(2025, 9, 26).unwrap();
        let mut quotes = vec![
            DailyQuote::new(date, 1.0, 1.0, 1.0, 1.0, 1),
            DailyQuote::new(date, 2.0, 2.0, 2.0, 2.0, 2),
        ];
        dedup_last_wins(&mut quotes);
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].close, 2.0);
    }
}
