use std::{error::Error, io, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;

use fintrack_rs::{PasswordHash, User, ValidatedPassword, get_user_by_username, update_password};

/// A utility for changing the password for a registered user.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The username of the account to reset.
    #[arg(long)]
    username: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let db_path = Path::new(&args.db_path);
    validate_db_path(db_path);

    println!("Loading user from {db_path:#?}");
    let conn = Connection::open(db_path)?;
    let user = get_user(&args.username, &conn);
    println!("Resetting password for {} ({})", user.username, user.email);

    let Some(password_hash) = get_new_password_hash(&user) else {
        return Ok(());
    };

    update_password(user.id, &password_hash, &conn)?;
    println!("Password updated successfully!");

    Ok(())
}

fn get_user(username: &str, conn: &Connection) -> User {
    match get_user_by_username(username, conn) {
        Ok(user) => user,
        Err(error) => {
            print_error(format!("Could not get the user \"{username}\": {error}"));
            exit(1);
        }
    }
}

fn validate_db_path(db_path: &Path) {
    match db_path.extension() {
        None => {
            print_error("Database path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            print_error("Database path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if !db_path.is_file() {
        print_error(format!("File does not exist at {db_path:#?}!"));
        exit(1);
    }
}

fn prompt_password(prompt: &str) -> Option<String> {
    match rpassword::prompt_password(prompt) {
        Ok(string) => Some(string),
        Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => None,
        Err(error) => {
            print_error(format!("Could not read password from stdin: {error}"));
            None
        }
    }
}

fn get_new_password_hash(user: &User) -> Option<PasswordHash> {
    loop {
        println!();

        let first_password = prompt_password("Enter a new password: ")?;
        let second_password = prompt_password("Enter the same password again: ")?;

        let password = match ValidatedPassword::new_confirmed(
            &first_password,
            &second_password,
            &[&user.username, &user.email],
        ) {
            Ok(password) => password,
            Err(error) => {
                print_error(error);
                continue;
            }
        };

        match PasswordHash::new(password, PasswordHash::DEFAULT_COST) {
            Ok(password_hash) => return Some(password_hash),
            Err(error) => print_error(format!("Could not hash password: {error}. Try again.")),
        }
    }
}

fn print_error(error: impl ToString) {
    eprintln!(
        "\x1b[31;1m{}\x1b[0m",
        capitalise_first_char(&error.to_string())
    )
}

/// From https://crates.io/crates/capitalize
fn capitalise_first_char(string: &str) -> String {
    let mut chars = string.chars();
    let Some(first) = chars.next() else {
        return String::with_capacity(0);
    };
    first.to_uppercase().chain(chars).collect()
}
