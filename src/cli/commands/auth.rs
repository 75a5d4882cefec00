use anyhow::{anyhow, Context};
use clap::Subcommand;
use serde_json::{json, Value};

use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::config;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Log in and print the issued token")]
    Login {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password (read from stdin if not provided)")]
        password: Option<String>,
        #[arg(long, default_value = "http://localhost:8080", help = "Server base URL")]
        server: String,
    },
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login {
            username,
            password,
            server,
        } => {
            let password = match password {
                Some(p) => p,
                None => read_password()?,
            };
            login(&server, &username, &password, output_format).await
        }
    }
}

fn read_password() -> anyhow::Result<String> {
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin().read_line(&mut line).context("Failed to read password")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

async fn login(server: &str, username: &str, password: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let url = format!("{}/api/login", server.trim_end_matches('/'));
    let response = reqwest::Client::new()
        .post(&url)
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .with_context(|| format!("Failed to reach {}", url))?;

    let status = response.status();
    let header = &config::config().security.auth_header;
    let token = response
        .headers()
        .get(header.as_str())
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response.text().await.unwrap_or_default();

    if !status.is_success() {
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
            .unwrap_or(body);
        output_error(&output_format, &format!("Login failed ({}): {}", status, message), None)?;
        return Err(anyhow!("login rejected with status {}", status));
    }

    let token = token.ok_or_else(|| anyhow!("Server response carried no {} header", header))?;
    let must_change_password = serde_json::from_str::<Value>(&body)
        .ok()
        .is_some_and(|v| v.pointer("/_links/change-password").is_some());

    let message = if must_change_password {
        format!("Logged in as {} (password expired, change it before continuing)", username)
    } else {
        format!("Logged in as {}", username)
    };

    output_success(
        &output_format,
        &message,
        Some(json!({ "token": token, "password_expired": must_change_password })),
    )?;
    if matches!(output_format, OutputFormat::Text) {
        println!("{}", token);
    }
    Ok(())
}
