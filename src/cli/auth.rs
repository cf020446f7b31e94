use std::io::BufRead;

use colored::Colorize;
use zeroize::Zeroize;

use crate::cli::open_storage;
use crate::error::{Result, TallyError};
use crate::models::Credentials;
use crate::session::{AuthGate, SessionFlag, SessionState, INVALID_CREDENTIALS};
use crate::settings::Settings;

fn read_line(stdin: &mut impl BufRead) -> Result<String> {
    let mut line = String::new();
    stdin.read_line(&mut line)?;
    let value = line.trim_end_matches(['\r', '\n']).to_string();
    line.zeroize();
    Ok(value)
}

pub fn login(settings: &Settings, username: Option<String>, password_stdin: bool) -> Result<()> {
    let storage = open_storage(settings)?;
    let gate = AuthGate::new(SessionFlag::default_location());

    let mut stdin = std::io::stdin().lock();
    let username = match username {
        Some(u) => u,
        None => {
            eprint!("Username: ");
            read_line(&mut stdin)?
        }
    };
    let password = if password_stdin {
        read_line(&mut stdin)?
    } else {
        rpassword::prompt_password("Password: ")?
    };

    let mut credentials = Credentials { username, password };
    let state = gate.login(&storage, &credentials);
    credentials.password.zeroize();

    match state? {
        SessionState::LoggedIn => {
            println!("{} Logged in as {}", "\u{2713}".green(), credentials.username.bold());
            Ok(())
        }
        SessionState::LoggedOut => Err(TallyError::Other(INVALID_CREDENTIALS.to_string())),
    }
}

pub fn logout() -> Result<()> {
    let gate = AuthGate::new(SessionFlag::default_location());
    let was_logged_in = gate.state() == SessionState::LoggedIn;
    gate.logout()?;
    if was_logged_in {
        println!("Logged out.");
    } else {
        println!("Not logged in.");
    }
    Ok(())
}
