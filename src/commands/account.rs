// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{bail, Result};

use super::{print_notice, prompt_line, AppContext};
use crate::auth::AuthProvider;
use crate::config::{self, REMEMBER_EMAIL};
use crate::errors::TrackerError;
use crate::session::{self, Dashboard, Notice, Session};
use crate::utils::{fmt_money, pretty_table};
use crate::validation::{password_strength, LoginForm, SignupForm};

fn password_arg(sub: &clap::ArgMatches, id: &str, label: &str) -> Result<String> {
    match sub.get_one::<String>(id) {
        Some(p) => Ok(p.clone()),
        None => prompt_line(label),
    }
}

pub fn signup_form_from(sub: &clap::ArgMatches, password: String, confirm: String) -> SignupForm {
    SignupForm {
        name: sub.get_one::<String>("name").cloned().unwrap_or_default(),
        email: sub.get_one::<String>("email").cloned().unwrap_or_default(),
        password,
        confirm_password: confirm,
        accepted_terms: sub.get_flag("accept-terms"),
    }
}

pub async fn signup(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let password = password_arg(sub, "password", "Password: ")?;
    let confirm = match sub.get_one::<String>("confirm") {
        Some(c) => c.clone(),
        None if sub.get_one::<String>("password").is_some() => password.clone(),
        None => prompt_line("Confirm password: ")?,
    };
    let (score, label) = password_strength(&password);
    println!("Password strength: {} ({}/5)", label, score);

    let form = signup_form_from(sub, password, confirm);
    match session::register(&ctx.auth, ctx.store.as_ref(), &form).await {
        Ok((identity, notice)) => {
            print_notice(&notice);
            println!("Signed in as {}", identity.email);
            Ok(())
        }
        Err(errs) => {
            for e in &errs {
                print_notice(&Notice::from_error(e));
            }
            bail!("signup failed with {} error(s)", errs.len())
        }
    }
}

pub async fn login(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let remembered = {
        let conn = ctx.lock_conn()?;
        config::get_setting(&conn, REMEMBER_EMAIL)?
    };
    let email = match (sub.get_one::<String>("email"), remembered) {
        (Some(e), _) => e.clone(),
        (None, Some(r)) => {
            println!("Email: {}", r);
            r
        }
        (None, None) => prompt_line("Email: ")?,
    };
    let password = password_arg(sub, "password", "Password: ")?;
    let mut form = LoginForm::new(email, password);

    let dash = session::login(&ctx.auth, ctx.store(), &mut form).await?;
    {
        let conn = ctx.lock_conn()?;
        if sub.get_flag("remember") {
            config::set_setting(&conn, REMEMBER_EMAIL, &form.email)?;
        } else {
            config::clear_setting(&conn, REMEMBER_EMAIL)?;
        }
    }
    let s = dash.session()?;
    print_notice(&Notice::success(format!(
        "Login successful! Welcome, {}",
        s.profile.name
    )));
    Ok(())
}

pub async fn logout(ctx: &AppContext) -> Result<()> {
    match open_dashboard(ctx).await? {
        Some(dash) => dash.logout(&ctx.auth).await?,
        None => ctx.auth.sign_out().await?,
    }
    print_notice(&Notice::success("Signed out"));
    Ok(())
}

async fn open_dashboard(ctx: &AppContext) -> Result<Option<Dashboard>> {
    match Dashboard::restore(&ctx.auth, ctx.store()).await {
        Ok(d) => Ok(Some(d)),
        Err(TrackerError::NotSignedIn) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub async fn whoami(ctx: &AppContext) -> Result<()> {
    let Some(identity) = ctx.auth.current_identity() else {
        return Err(TrackerError::NotSignedIn.into());
    };
    let s = Session::open(ctx.store.as_ref(), identity).await?;
    let budget = if s.budget().is_zero() {
        "not set".to_string()
    } else {
        fmt_money(&s.budget(), s.currency())
    };
    println!(
        "{}",
        pretty_table(
            &["Name", "Email", "Currency", "Monthly budget"],
            vec![vec![
                s.profile.name.clone(),
                s.profile.email.clone(),
                s.currency().to_string(),
                budget,
            ]],
        )
    );
    Ok(())
}
