// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `login`, `logout`, `whoami` and `refresh` commands.

use std::io::BufRead;

use portal_auth::Credentials;
use portal_core::{AuthRedirect, Session};

use crate::cli::{LoginArgs, OutputFormat, WhoamiArgs};
use crate::error::{BinError, BinResult};
use crate::runtime::PortalRuntime;

/// Signs in and prints where the user lands.
pub async fn login(runtime: &PortalRuntime, args: LoginArgs) -> BinResult<()> {
    let password = match (args.password, args.password_stdin) {
        (_, true) => read_password_line(std::io::stdin().lock())?,
        (Some(password), false) => password,
        (None, false) => {
            return Err(BinError::usage(
                "a password is required: pass -p <password> or --password-stdin",
            ));
        }
    };

    let session = runtime
        .manager()
        .login(Credentials::new(args.username, password))
        .await?;

    let target = AuthRedirect::evaluate_with_return_to(
        &runtime.manager().snapshot(),
        args.return_to.as_deref(),
    )
    .map(|redirect| redirect.path)
    .unwrap_or_else(|| session.home_path().to_string());

    println!("Signed in as {}", describe(&session));
    println!("{target}");
    Ok(())
}

/// Signs out. Succeeds even when no one is signed in.
pub async fn logout(runtime: &PortalRuntime) -> BinResult<()> {
    let manager = runtime.manager();
    manager.init();
    let was_signed_in = manager.session().is_some();
    manager.logout().await;

    if was_signed_in {
        println!("Signed out");
    } else {
        println!("Not signed in");
    }
    Ok(())
}

/// Prints the signed-in user.
pub async fn whoami(runtime: &PortalRuntime, args: WhoamiArgs) -> BinResult<()> {
    let ctx = runtime.start(args.offline).await;
    let session = match ctx.session() {
        Some(session) if ctx.is_authenticated() => session,
        _ => return Err(BinError::not_signed_in()),
    };

    match args.format {
        OutputFormat::Text => {
            println!("User:        {}", describe(session));
            println!("Email:       {}", session.email());
            if let Some(full_name) = &session.profile().full_name {
                println!("Name:        {full_name}");
            }
            println!("Base role:   {}", session.base_role_name().unwrap_or("-"));
            println!("Roles:       {}", join_or_dash(session.roles().to_vec()));
            println!("Permissions: {}", join_or_dash(session.permissions().to_sorted_vec()));
            println!("Home:        {}", session.home_path());
            println!(
                "Expires:     {}",
                session
                    .token_expires_at()
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| "-".to_string())
            );
            println!("State:       {}", ctx.state());
        }
        OutputFormat::Json => {
            let profile = session.profile();
            let output = serde_json::json!({
                "state": ctx.state().as_str(),
                "home": session.home_path(),
                "user": {
                    "username": profile.username,
                    "email": profile.email,
                    "fullName": profile.full_name,
                    "roles": profile.roles.to_vec(),
                    "permissions": profile.permissions.to_sorted_vec(),
                    "baseRole": profile.base_role,
                    "tokenExpiresAt": profile.token_expires_at.map(|t| t.to_rfc3339()),
                },
            });
            print_json(&output)?;
        }
    }
    Ok(())
}

/// Exchanges the refresh token for a new access token.
pub async fn refresh(runtime: &PortalRuntime) -> BinResult<()> {
    let manager = runtime.manager();
    manager.init();
    let session = manager.refresh().await?;

    match session.token_expires_at() {
        Some(expires) => println!("Token refreshed, expires {}", expires.to_rfc3339()),
        None => println!("Token refreshed"),
    }
    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

fn describe(session: &Session) -> String {
    match session.base_role_name() {
        Some(role) => format!("{} ({role})", session.username()),
        None => session.username().to_string(),
    }
}

fn join_or_dash(items: Vec<String>) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

pub(crate) fn print_json(value: &serde_json::Value) -> BinResult<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| BinError::runtime(format!("failed to render JSON: {e}")))?;
    println!("{rendered}");
    Ok(())
}

fn read_password_line(mut input: impl BufRead) -> BinResult<String> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        return Err(BinError::usage("no password on stdin"));
    }
    Ok(password.to_string())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use portal_core::UserProfile;

    #[test]
    fn test_read_password_line() {
        let input = std::io::Cursor::new("s3cret pass\nignored\n");
        assert_eq!(read_password_line(input).unwrap(), "s3cret pass");

        let input = std::io::Cursor::new("\r\n");
        assert!(matches!(read_password_line(input), Err(BinError::Usage(_))));
    }

    #[test]
    fn test_describe() {
        let profile = UserProfile::new("dr.kim", "kim@clinic.example").with_base_role("MANAGER");
        let session = Session::from_profile("t", profile);
        assert_eq!(describe(&session), "dr.kim (MANAGER)");

        let session = Session::from_profile("t", UserProfile::new("lee", "lee@clinic.example"));
        assert_eq!(describe(&session), "lee");
    }

    #[test]
    fn test_join_or_dash() {
        assert_eq!(join_or_dash(vec![]), "-");
        assert_eq!(join_or_dash(vec!["A".into(), "B".into()]), "A, B");
    }
}
