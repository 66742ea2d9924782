// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! kcis CLI - KCIS Detention System portal client
//!
//! Thin command-line front end over the kcis_api library.

use std::env;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context};
use kcis_api::{ApiConfig, KcisClient, Payload, DSAI_PATH};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("kcis_api=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let (config, args) = match parse_options(env::args().skip(1).collect()) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("{:#}", e);
            return ExitCode::from(1);
        }
    };

    let Some(command) = args.first() else {
        print_usage();
        return ExitCode::from(1);
    };

    let result = match command.as_str() {
        "probe" => match args.get(1) {
            Some(account) => probe(account, &config).await,
            None => usage_error("kcis probe <account>"),
        },
        "get" => match args.get(1) {
            Some(account) => {
                let path = args.get(2).map(String::as_str).unwrap_or(DSAI_PATH);
                get(account, path, config).await
            }
            None => usage_error("kcis get <account> [path]"),
        },
        "post" => match (args.get(1), args.get(2)) {
            (Some(account), Some(path)) => post(account, path, &args[3..], config).await,
            _ => usage_error("kcis post <account> <path> [key=value...]"),
        },
        "download" => match (args.get(1), args.get(2), args.get(3)) {
            (Some(account), Some(path), Some(dest)) => {
                download(account, path, dest, config).await
            }
            _ => usage_error("kcis download <account> <path> <dest>"),
        },
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(ExitCode::SUCCESS)
        }
        "--version" | "-v" | "version" => {
            println!("kcis {}", kcis_api::VERSION);
            Ok(ExitCode::SUCCESS)
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            Ok(ExitCode::from(1))
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"kcis - KCIS Detention System portal client

USAGE:
    kcis [OPTIONS] <COMMAND>

COMMANDS:
    probe <account>                      Check whether the account session is valid
    get <account> [path]                 GET a portal page (default {dsai})
    post <account> <path> [key=value..]  POST a urlencoded form
    download <account> <path> <dest>     Save a portal file to <dest>
    help                                 Show this help message
    version                              Show version information

OPTIONS:
    --base-url <url>        Portal address (default https://portal.kcisec.com/)
    --cookie-path <path>    Session cookie path scope (default /DSAI/)
    --timeout <secs>        Request timeout in seconds

Set RUST_LOG=kcis_api=debug for request tracing.
"#,
        dsai = DSAI_PATH
    );
}

fn usage_error(usage: &str) -> anyhow::Result<ExitCode> {
    eprintln!("Usage: {}", usage);
    Ok(ExitCode::from(1))
}

/// Split global options from positional arguments
fn parse_options(args: Vec<String>) -> anyhow::Result<(ApiConfig, Vec<String>)> {
    let mut config = ApiConfig::new();
    let mut positional = Vec::new();
    let mut iter = args.into_iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--base-url" => {
                let value = iter.next().context("--base-url needs a value")?;
                config = config
                    .with_base_url(&value)
                    .with_context(|| format!("invalid --base-url {}", value))?;
            }
            "--cookie-path" => {
                let value = iter.next().context("--cookie-path needs a value")?;
                config = config.cookie_path(value);
            }
            "--timeout" => {
                let value = iter.next().context("--timeout needs a value")?;
                let secs: u64 = value
                    .parse()
                    .with_context(|| format!("invalid --timeout {}", value))?;
                config = config.timeout(Duration::from_secs(secs));
            }
            _ => positional.push(arg),
        }
    }

    Ok((config, positional))
}

fn parse_fields(fields: &[String]) -> anyhow::Result<Payload> {
    if fields.is_empty() {
        return Ok(Payload::Empty);
    }

    let mut pairs = Vec::with_capacity(fields.len());
    for field in fields {
        let Some((key, value)) = field.split_once('=') else {
            bail!("form field must be key=value: {}", field);
        };
        pairs.push((key.to_string(), value.to_string()));
    }
    Ok(Payload::Form(pairs))
}

async fn probe(account: &str, config: &ApiConfig) -> anyhow::Result<ExitCode> {
    if KcisClient::probe_account(account, config).await {
        println!("Session valid");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("Session invalid");
        Ok(ExitCode::from(1))
    }
}

async fn get(account: &str, path: &str, config: ApiConfig) -> anyhow::Result<ExitCode> {
    let client = KcisClient::with_config(account, config)?;
    let body = client
        .get(path)
        .await
        .with_context(|| format!("GET {} failed", path))?;
    println!("{}", body);
    Ok(ExitCode::SUCCESS)
}

async fn post(
    account: &str,
    path: &str,
    fields: &[String],
    config: ApiConfig,
) -> anyhow::Result<ExitCode> {
    let payload = parse_fields(fields)?;
    let client = KcisClient::with_config(account, config)?;
    let body = client
        .post(path, &payload)
        .await
        .with_context(|| format!("POST {} failed", path))?;
    println!("{}", body);
    Ok(ExitCode::SUCCESS)
}

async fn download(
    account: &str,
    path: &str,
    dest: &str,
    config: ApiConfig,
) -> anyhow::Result<ExitCode> {
    let client = KcisClient::with_config(account, config)?;
    let written = client
        .download(path, dest)
        .await
        .with_context(|| format!("download {} failed", path))?;
    println!("Saved {} bytes to {}", written, dest);
    Ok(ExitCode::SUCCESS)
}
