use super::App;
use crate::output;
use anyhow::{Context, Result, bail};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use std::io::{self, BufRead, IsTerminal, Write};
use taskdeck_core::auth::{Credentials, ProfileUpdate, Registration};
use taskdeck_core::validation::{validate_login, validate_profile_update, validate_registration};

/// Profile flags as given on the command line.
pub struct ProfileInput {
    pub email: Option<String>,
    pub username: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
}

impl ProfileInput {
    fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.username.is_none()
            && self.current_password.is_none()
            && self.new_password.is_none()
            && self.confirm_password.is_none()
    }
}

pub async fn login(app: &App, username: Option<String>, password: Option<String>) -> Result<()> {
    let username = match username {
        Some(username) => username,
        None => prompt("Username or email: ")?,
    };
    let password = match password {
        Some(password) => password,
        None => prompt_secret("Password: ")?,
    };

    let credentials = Credentials::new(username.trim(), password);
    validate_login(&credentials)?;
    app.session.login(&credentials).await?;

    let user = app.require_user().await?;
    println!("Welcome back, {}!", user.username);
    Ok(())
}

pub async fn register(
    app: &App,
    email: String,
    username: String,
    password: Option<String>,
) -> Result<()> {
    let (password, confirm) = match password {
        Some(password) => (password.clone(), password),
        None => (
            prompt_secret("Password: ")?,
            prompt_secret("Confirm password: ")?,
        ),
    };
    if password != confirm {
        bail!("Passwords do not match");
    }

    let registration = Registration {
        email: email.trim().to_string(),
        username: username.trim().to_string(),
        password,
    };
    validate_registration(&registration)?;
    app.session.register(&registration).await?;

    match app.session.current_user().await {
        Some(user) => println!("Account created. Logged in as {}.", user.username),
        None => println!("Account created. Run `taskdeck login` to sign in."),
    }
    Ok(())
}

pub async fn logout(app: &App) -> Result<()> {
    app.session.logout().await;
    println!("Logged out.");
    Ok(())
}

pub async fn whoami(app: &App) -> Result<()> {
    let user = app.require_user().await?;
    if app.json {
        return output::print_json(&user);
    }
    println!("{} <{}> (id {})", user.username, user.email, user.id);
    Ok(())
}

/// Shows the profile, or updates it when any flag is given.
pub async fn profile(app: &App, input: ProfileInput) -> Result<()> {
    let user = app.require_user().await?;
    if input.is_empty() {
        if app.json {
            return output::print_json(&user);
        }
        println!("Username: {}", user.username);
        println!("Email:    {}", user.email);
        return Ok(());
    }

    let update = ProfileUpdate {
        email: input.email.filter(|e| *e != user.email),
        username: input.username.filter(|u| *u != user.username),
        current_password: input.current_password,
        new_password: input.new_password,
    };
    validate_profile_update(&update, input.confirm_password.as_deref())?;
    if update == ProfileUpdate::default() {
        println!("Nothing to update.");
        return Ok(());
    }

    let updated = app.session.update_profile(&update).await?;
    if app.json {
        return output::print_json(&updated);
    }
    println!("Profile updated: {} <{}>", updated.username, updated.email);
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    let mut stdout = io::stdout();
    write!(stdout, "{}", label)?;
    stdout.flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Reads a line without echoing it. Falls back to [`prompt`] when stdin is
/// not a terminal, so piped input still works.
fn prompt_secret(label: &str) -> Result<String> {
    if !io::stdin().is_terminal() {
        return prompt(label);
    }

    let mut stdout = io::stdout();
    write!(stdout, "{}", label)?;
    stdout.flush()?;

    terminal::enable_raw_mode()?;
    let secret = read_secret();
    terminal::disable_raw_mode()?;
    writeln!(stdout)?;

    secret?.context("Cancelled")
}

fn read_secret() -> io::Result<Option<String>> {
    let mut secret = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match apply_key(&mut secret, key) {
            KeyOutcome::Pending => {}
            KeyOutcome::Submit => return Ok(Some(secret)),
            KeyOutcome::Cancel => return Ok(None),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum KeyOutcome {
    Pending,
    Submit,
    Cancel,
}

fn apply_key(secret: &mut String, key: KeyEvent) -> KeyOutcome {
    match (key.code, key.modifiers) {
        (KeyCode::Enter, _) => KeyOutcome::Submit,
        (KeyCode::Esc, _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => KeyOutcome::Cancel,
        (KeyCode::Backspace, _) => {
            secret.pop();
            KeyOutcome::Pending
        }
        (KeyCode::Char(c), m) if !m.contains(KeyModifiers::CONTROL) => {
            secret.push(c);
            KeyOutcome::Pending
        }
        _ => KeyOutcome::Pending,
    }
}
