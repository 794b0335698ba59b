use inquire::{Password, PasswordDisplayMode, Text};
use serde::Deserialize;
use serde_json::json;

use super::credentials::{Credentials, delete_credentials, load_credentials, save_credentials};
use super::http_client::ApiClient;

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

fn normalize_server_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');

    // Strip a trailing API path to avoid duplication when constructing request URLs
    let url = url.trim_end_matches("/api").trim_end_matches('/');

    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }

    // Default to http:// for localhost/127.0.0.1, https:// for others
    if url.starts_with("localhost") || url.starts_with("127.0.0.1") {
        format!("http://{url}")
    } else {
        format!("https://{url}")
    }
}

fn required_text(
    label: &str,
    value: Option<String>,
    flag: &str,
    non_interactive: bool,
) -> anyhow::Result<String> {
    match value {
        Some(v) if v.trim().is_empty() => anyhow::bail!("{label} cannot be empty"),
        Some(v) => Ok(v),
        None if non_interactive => anyhow::bail!("{flag} is required in non-interactive mode"),
        None => Ok(Text::new(&format!("{label}:"))
            .with_validator(|input: &str| {
                if input.trim().is_empty() {
                    Ok(inquire::validator::Validation::Invalid(
                        "A value is required".into(),
                    ))
                } else {
                    Ok(inquire::validator::Validation::Valid)
                }
            })
            .prompt()?),
    }
}

pub fn run_auth_login(
    server: Option<String>,
    name: Option<String>,
    password: Option<String>,
    non_interactive: bool,
) -> anyhow::Result<()> {
    let server = required_text("Server URL", server, "--server", non_interactive)?;
    let name = required_text("Name", name, "--name", non_interactive)?;

    let password = match password {
        Some(p) => p,
        None if non_interactive => {
            anyhow::bail!("--password is required in non-interactive mode")
        }
        None => Password::new("Password:")
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt()?,
    };

    let server_url = normalize_server_url(&server);
    let client = ApiClient::anonymous(&server_url)?;
    let resp: LoginResponse = client.post(
        "/users/login",
        &json!({ "name": name, "password": password }),
    )?;

    save_credentials(&Credentials {
        server_url: server_url.clone(),
        token: resp.token,
    })?;

    println!();
    println!("Logged in to {server_url} as {name}");
    println!();

    Ok(())
}

pub fn run_auth_logout() -> anyhow::Result<()> {
    // Revoke the token server-side when we still can
    if let Ok(creds) = load_credentials() {
        let revoked = ApiClient::new(&creds).and_then(|client| client.post_text("/users/logout"));
        if let Err(e) = revoked {
            tracing::warn!("Could not revoke token on {}: {e}", creds.server_url);
        }
    }

    if delete_credentials()? {
        println!();
        println!("Logged out successfully.");
        println!();
    } else {
        println!();
        println!("No credentials found.");
        println!();
    }
    Ok(())
}
