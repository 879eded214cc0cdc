//! Account commands.

use anyhow::Result;
use colored::Colorize;

use nestling_models::user::{LoginRequest, SignupRequest};

use super::{Context, prompt};

pub async fn signup(ctx: &Context) -> Result<()> {
    let email = prompt("Email")?;
    let nickname = prompt("Nickname")?;
    let password = rpassword::prompt_password("Password: ")?;

    let response = ctx
        .auth()
        .signup(&SignupRequest {
            email,
            password,
            nickname,
        })
        .await?;
    println!("Account created. Signed in as {}.", response.user.nickname.bold());
    Ok(())
}

pub async fn login(ctx: &Context) -> Result<()> {
    let email = prompt("Email")?;
    let password = rpassword::prompt_password("Password: ")?;

    let response = ctx.auth().login(&LoginRequest { email, password }).await?;
    println!("Signed in as {}.", response.user.nickname.bold());
    Ok(())
}

pub fn logout(ctx: &Context) -> Result<()> {
    ctx.auth().logout();
    println!("Signed out.");
    Ok(())
}

pub async fn whoami(ctx: &Context) -> Result<()> {
    let user = ctx.auth().me().await?;
    println!("{} <{}> ({})", user.nickname.bold(), user.email, user.role);
    Ok(())
}
