//! Sign-in, registration and logout.

use std::path::Path;

use anyhow::{bail, Result};

use eduplatform_core::model::{LoginRequest, RegisterRequest, User};

use super::{prompt_password, App};

fn password_or_prompt(password: Option<String>) -> Result<String> {
    let password = match password {
        Some(p) => p,
        None => prompt_password("Password")?,
    };
    if password.is_empty() {
        bail!("password must not be empty");
    }
    Ok(password)
}

fn welcome(user: &User) {
    println!("Signed in as {} <{}>", user.full_name, user.email);
}

pub async fn register(
    config_path: Option<&Path>,
    email: String,
    full_name: String,
    password: Option<String>,
) -> Result<()> {
    let mut app = App::open(config_path)?;
    let password = password_or_prompt(password)?;
    let user = app
        .session
        .register(&RegisterRequest {
            email,
            password,
            full_name,
            learning_preferences: None,
        })
        .await
        .map_err(anyhow::Error::new)?;
    welcome(&user);
    Ok(())
}

pub async fn login(
    config_path: Option<&Path>,
    email: String,
    password: Option<String>,
) -> Result<()> {
    let mut app = App::open(config_path)?;
    let password = password_or_prompt(password)?;
    let user = app
        .session
        .login(&LoginRequest { email, password })
        .await
        .map_err(anyhow::Error::new)?;
    welcome(&user);
    Ok(())
}

pub async fn google(config_path: Option<&Path>, id_token: &str) -> Result<()> {
    let mut app = App::open(config_path)?;
    let user = app
        .session
        .login_with_google(id_token)
        .await
        .map_err(anyhow::Error::new)?;
    welcome(&user);
    Ok(())
}

pub fn logout(config_path: Option<&Path>) -> Result<()> {
    let mut app = App::open(config_path)?;
    app.session.logout();
    println!("Logged out.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_password_skips_the_prompt() {
        assert_eq!(password_or_prompt(Some("hunter2".into())).unwrap(), "hunter2");
    }

    #[test]
    fn empty_password_is_rejected() {
        let err = password_or_prompt(Some(String::new())).unwrap_err();
        assert!(err.to_string().contains("password must not be empty"));
    }
}
