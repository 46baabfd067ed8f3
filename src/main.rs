use anyhow::Result;
use clap::Parser;
use reqwest::Method;
use std::io::Write;
use std::time::Duration;
use vetch::{ParamValue, RequestData, ResponseData, ResponseType, Vetch, VetchOptions, VetchResponse};

/// vetch - issue one HTTP request through the SDK request wrapper
///
/// Prints the decoded body. Exits non-zero when the response status is
/// outside 2xx, the request times out or the connection fails.
///
/// Examples:
///   vetch https://api.example.com/v2/status
///   vetch -X POST -d '{"name":"demo"}' --base-url https://api.example.com /v2/items
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Request URL, appended to the base URL if one is set
    #[arg(value_name = "URL")]
    url: String,

    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    method: Method,

    /// Base URL prepended to URL (also via VETCH_BASE_URL)
    #[arg(long = "base-url", env = "VETCH_BASE_URL", value_name = "URL")]
    base_url: Option<String>,

    /// Request header as "Name: value", repeatable
    #[arg(short = 'H', long = "header", value_name = "HEADER", value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// Query parameter as "key=value", repeatable; a repeated key sends every value
    #[arg(short = 'q', long = "param", value_name = "PARAM", value_parser = parse_param)]
    params: Vec<(String, String)>,

    /// Request body; JSON objects and arrays are sent as application/json
    #[arg(short = 'd', long)]
    data: Option<String>,

    /// How to decode the response: json, text or stream
    #[arg(short = 't', long = "response-type", default_value = "json")]
    response_type: ResponseType,

    /// Timeout in milliseconds (also via VETCH_TIMEOUT)
    #[arg(long, env = "VETCH_TIMEOUT", value_name = "MS")]
    timeout: Option<u64>,

    /// Text appended to the user-agent (also via VETCH_USER_AGENT)
    #[arg(long = "user-agent-suffix", env = "VETCH_USER_AGENT")]
    user_agent_suffix: Option<String>,

    /// Print the status line and response headers before the body
    #[arg(short = 'i', long)]
    include: bool,
}

impl Cli {
    fn options(&self) -> VetchOptions {
        let mut options = VetchOptions::new()
            .url(&self.url)
            .method(self.method.clone())
            .response_type(self.response_type);

        if let Some(base_url) = &self.base_url {
            options = options.base_url(base_url);
        }
        for (name, value) in &self.headers {
            options = options.header(name, value);
        }
        options = options.params(group_params(&self.params));
        if let Some(data) = &self.data {
            options.data = Some(parse_data(data));
        }
        if let Some(ms) = self.timeout {
            options = options.timeout(Duration::from_millis(ms));
        }
        if let Some(suffix) = &self.user_agent_suffix {
            options = options.append_user_agent(suffix);
        }
        options
    }
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once(':')
        .ok_or_else(|| format!("Invalid header '{}', expected \"Name: value\"", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("Invalid header '{}', name is empty", s));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid param '{}', expected \"key=value\"", s))?;
    Ok((key.to_string(), value.to_string()))
}

/// Collapses repeated keys into one multi-valued param, keeping first-seen order.
fn group_params(pairs: &[(String, String)]) -> Vec<(String, ParamValue)> {
    let mut grouped: Vec<(String, ParamValue)> = Vec::new();
    for (key, value) in pairs {
        match grouped.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => {
                let mut values = match std::mem::replace(slot, ParamValue::Multiple(Vec::new())) {
                    ParamValue::Single(first) => vec![first],
                    ParamValue::Multiple(values) => values,
                };
                values.push(value.clone());
                *slot = ParamValue::Multiple(values);
            }
            None => grouped.push((key.clone(), ParamValue::Single(value.clone()))),
        }
    }
    grouped
}

/// JSON objects and arrays are sent as JSON, anything else as-is.
fn parse_data(data: &str) -> RequestData {
    match serde_json::from_str::<serde_json::Value>(data) {
        Ok(value @ (serde_json::Value::Object(_) | serde_json::Value::Array(_))) => {
            RequestData::Json(value)
        }
        _ => RequestData::from(data),
    }
}

fn print_response(response: &VetchResponse, include: bool) -> Result<()> {
    let mut out = std::io::stdout().lock();

    if include {
        writeln!(out, "{} {}", response.status, response.status_text)?;
        for (name, value) in &response.headers {
            writeln!(out, "{}: {}", name, value)?;
        }
        writeln!(out)?;
    }

    match &response.data {
        ResponseData::Json(value) => writeln!(out, "{}", serde_json::to_string_pretty(value)?)?,
        ResponseData::Text(text) => writeln!(out, "{}", text)?,
        ResponseData::Binary(bytes) => out.write_all(bytes)?,
    }
    out.flush()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let vetch = Vetch::new();
    let response = vetch.request(cli.options()).await?;
    print_response(&response, cli.include)?;

    Ok(())
}
