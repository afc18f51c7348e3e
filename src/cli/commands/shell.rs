//! Interactive shell
//!
//! Keeps one orchestrator (and session) alive across commands: fill in the
//! form field by field, save, edit, delete and export, with the list re-rendered
//! after every change.

use crate::adapters::identity::Role;
use crate::cli::commands::records::print_details;
use crate::cli::context::{exit, load, print_notice, Registry};
use crate::config::secret_string;
use crate::core::export::render_table;
use crate::core::orchestrator::{Outcome, ViewMode};
use crate::domain::{Field, PatientId};
use clap::Args;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Commands:
  list                         reload and show all patients
  show <id>                    show one patient
  set <field> <value>          fill a form field (name, birth-date, height, weight)
  form                         show the form and its errors
  save                         create, or update the record being edited
  edit <id>                    load a patient into the form
  cancel                       clear the form
  delete <id>                  delete a patient
  export [file]                write the list as a spreadsheet
  print [file]                 write a printable page of the list
  login <email> <password>     sign in
  register <email> <password> [role]
  reset-password <email>
  logout | whoami | help | quit";

/// Arguments for the shell command
#[derive(Args, Debug)]
pub struct ShellArgs {}

/// One parsed shell line
#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Empty,
    Help,
    List,
    Show(PatientId),
    Set(Field, String),
    Form,
    Save,
    Edit(PatientId),
    Cancel,
    Delete(PatientId),
    Export(Option<PathBuf>),
    Print(Option<PathBuf>),
    Login { email: String, password: String },
    Register { email: String, password: String, role: Role },
    ResetPassword(String),
    Logout,
    Whoami,
    Quit,
}

/// Parses one input line
pub fn parse_line(line: &str) -> Result<ShellCommand, String> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    let id = || -> Result<PatientId, String> {
        match args.as_slice() {
            [id] => id.parse(),
            _ => Err(format!("usage: {verb} <id>")),
        }
    };
    let path = || args.first().map(PathBuf::from);

    match verb.to_lowercase().as_str() {
        "" => Ok(ShellCommand::Empty),
        "help" | "?" => Ok(ShellCommand::Help),
        "list" | "ls" => Ok(ShellCommand::List),
        "show" => id().map(ShellCommand::Show),
        "set" => {
            let (field, value) = rest
                .split_once(char::is_whitespace)
                .map(|(f, v)| (f, v.trim()))
                .unwrap_or((rest, ""));
            if field.is_empty() {
                return Err("usage: set <field> <value>".to_string());
            }
            Ok(ShellCommand::Set(field.parse()?, value.to_string()))
        }
        "form" => Ok(ShellCommand::Form),
        "save" | "submit" => Ok(ShellCommand::Save),
        "edit" => id().map(ShellCommand::Edit),
        "cancel" => Ok(ShellCommand::Cancel),
        "delete" | "rm" => id().map(ShellCommand::Delete),
        "export" => Ok(ShellCommand::Export(path())),
        "print" => Ok(ShellCommand::Print(path())),
        "login" => match args.as_slice() {
            [email, password] => Ok(ShellCommand::Login {
                email: email.to_string(),
                password: password.to_string(),
            }),
            _ => Err("usage: login <email> <password>".to_string()),
        },
        "register" => match args.as_slice() {
            [email, password] => Ok(ShellCommand::Register {
                email: email.to_string(),
                password: password.to_string(),
                role: Role::User,
            }),
            [email, password, role] => Ok(ShellCommand::Register {
                email: email.to_string(),
                password: password.to_string(),
                role: role.parse()?,
            }),
            _ => Err("usage: register <email> <password> [user|admin]".to_string()),
        },
        "reset-password" => match args.as_slice() {
            [email] => Ok(ShellCommand::ResetPassword(email.to_string())),
            _ => Err("usage: reset-password <email>".to_string()),
        },
        "logout" => Ok(ShellCommand::Logout),
        "whoami" => Ok(ShellCommand::Whoami),
        "quit" | "exit" | "q" => Ok(ShellCommand::Quit),
        other => Err(format!("unknown command '{other}', type 'help'")),
    }
}

impl ShellArgs {
    /// Execute the shell command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };
        let mut registry = match Registry::connect(config) {
            Ok(r) => r,
            Err(code) => return Ok(code),
        };

        if let Some(ref gate) = registry.auth {
            let mut session = gate.subscribe();
            tokio::spawn(async move {
                while session.changed().await.is_ok() {
                    match session.borrow_and_update().as_ref() {
                        Some(s) => tracing::info!(uid = %s.uid, role = %s.role, "Session started"),
                        None => tracing::info!("Session ended"),
                    }
                }
            });
        }

        println!(
            "Patient registry ({} backend). Type 'help' for commands.",
            registry.view.backend_name()
        );
        if registry.config.requires_auth() {
            println!("Sign in with: login <email> <password>");
        } else {
            show_list(&mut registry).await;
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            prompt(&registry);
            let Some(line) = lines.next_line().await? else {
                println!();
                break;
            };

            let command = match parse_line(&line) {
                Ok(c) => c,
                Err(e) => {
                    println!("⚠️  {e}");
                    continue;
                }
            };
            if command == ShellCommand::Quit {
                break;
            }
            run(&mut registry, command).await;
        }

        if let Some(ref gate) = registry.auth {
            gate.sign_out();
        }
        Ok(exit::OK)
    }
}

fn prompt(registry: &Registry) {
    let user = registry
        .auth
        .as_ref()
        .and_then(|gate| gate.current())
        .map(|s| format!("{} ", s.email))
        .unwrap_or_default();
    let mode = match registry.view.mode() {
        ViewMode::Idle => String::new(),
        mode => format!("[{mode}] "),
    };
    print!("{user}{mode}registry> ");
    let _ = std::io::stdout().flush();
}

/// True if record views are open to the current user
fn has_access(registry: &Registry) -> bool {
    if !registry.config.requires_auth() {
        return true;
    }
    match registry.auth.as_ref().map(|gate| gate.require_verified()) {
        Some(Ok(_)) => true,
        Some(Err(e)) => {
            println!("🔒 {e}. Use 'login <email> <password>'.");
            false
        }
        None => {
            println!("🔒 No identity provider configured");
            false
        }
    }
}

async fn show_list(registry: &mut Registry) {
    let outcome = registry.view.refresh().await;
    if outcome.is_success() {
        print!("{}", render_table(registry.view.rows()));
    } else {
        print_notice(&outcome);
    }
}

async fn run(registry: &mut Registry, command: ShellCommand) {
    match command {
        ShellCommand::Empty | ShellCommand::Quit => {}
        ShellCommand::Help => println!("{HELP}"),
        ShellCommand::List => {
            if has_access(registry) {
                show_list(registry).await;
            }
        }
        ShellCommand::Show(id) => {
            if has_access(registry) {
                match registry.view.details(&id).await {
                    Outcome::Details(row) => print_details(&row),
                    other => print_notice(&other),
                }
            }
        }
        ShellCommand::Set(field, value) => {
            let report = registry.view.set_field(field, &value);
            match report.error_for(field) {
                Some(error) => println!("   {field}: {error}"),
                None => println!("   {field}: ok"),
            }
        }
        ShellCommand::Form => print_form(registry),
        ShellCommand::Save => {
            if has_access(registry) {
                let outcome = registry.view.submit().await;
                finish_mutation(registry, &outcome);
            }
        }
        ShellCommand::Edit(id) => {
            if has_access(registry) {
                let outcome = registry.view.begin_edit(&id).await;
                print_notice(&outcome);
                if outcome.is_success() {
                    print_form(registry);
                }
            }
        }
        ShellCommand::Cancel => print_notice(&registry.view.cancel()),
        ShellCommand::Delete(id) => {
            if has_access(registry) {
                let outcome = registry.view.delete(&id).await;
                finish_mutation(registry, &outcome);
            }
        }
        ShellCommand::Export(path) => {
            if has_access(registry) {
                let path = path.unwrap_or_else(|| PathBuf::from(&registry.config.export.csv_path));
                print_notice(&registry.view.export(&path));
            }
        }
        ShellCommand::Print(path) => {
            if has_access(registry) {
                let path =
                    path.unwrap_or_else(|| PathBuf::from(&registry.config.export.print_path));
                print_notice(
                    &registry
                        .view
                        .print(&path, &registry.config.export.print_title),
                );
            }
        }
        ShellCommand::Login { email, password } => {
            let Some(ref gate) = registry.auth else {
                println!("🔒 No identity provider configured");
                return;
            };
            let signed_in = gate.sign_in(&email, &secret_string(password)).await;
            match signed_in {
                Ok(session) => {
                    println!("✅ Signed in as {} ({})", session.email, session.role);
                    if session.role.is_admin() {
                        println!("   Administrator access");
                    }
                    show_list(registry).await;
                }
                Err(e) => println!("❌ {e}"),
            }
        }
        ShellCommand::Register {
            email,
            password,
            role,
        } => {
            let Some(ref gate) = registry.auth else {
                println!("🔒 No identity provider configured");
                return;
            };
            match gate.register(&email, &secret_string(password), role).await {
                Ok(()) => println!("✅ Account created; confirm the emailed link, then log in"),
                Err(e) => println!("❌ {e}"),
            }
        }
        ShellCommand::ResetPassword(email) => {
            let Some(ref gate) = registry.auth else {
                println!("🔒 No identity provider configured");
                return;
            };
            match gate.send_password_reset(&email).await {
                Ok(()) => println!("✅ Password reset email sent"),
                Err(e) => println!("❌ {e}"),
            }
        }
        ShellCommand::Logout => {
            if let Some(ref gate) = registry.auth {
                gate.sign_out();
            }
            registry.view.cancel();
            println!("Signed out");
        }
        ShellCommand::Whoami => match registry.auth.as_ref().and_then(|g| g.current()) {
            Some(session) => println!("{} ({})", session.email, session.role),
            None => println!("Not signed in"),
        },
    }
}

fn finish_mutation(registry: &Registry, outcome: &Outcome) {
    print_notice(outcome);
    if matches!(
        outcome,
        Outcome::Saved { .. } | Outcome::Updated { .. } | Outcome::Deleted { .. }
    ) {
        print!("{}", render_table(registry.view.rows()));
    }
}

fn print_form(registry: &Registry) {
    let draft = registry.view.draft();
    let report = registry.view.report();
    println!("Form ({}):", registry.view.mode());
    for field in Field::ALL {
        let text = draft.field_text(field);
        let text = if text.is_empty() { "-" } else { text.as_str() };
        match report.error_for(field) {
            Some(error) => println!("  {:<11} {:<20} ⚠️  {error}", field.as_str(), text),
            None => println!("  {:<11} {}", field.as_str(), text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_line("  ").unwrap(), ShellCommand::Empty);
        assert_eq!(parse_line("LIST").unwrap(), ShellCommand::List);
        assert_eq!(parse_line("save").unwrap(), ShellCommand::Save);
        assert_eq!(parse_line("exit").unwrap(), ShellCommand::Quit);
    }

    #[test]
    fn test_parse_set_keeps_spaces_in_value() {
        assert_eq!(
            parse_line("set name Ivan  Petrov").unwrap(),
            ShellCommand::Set(Field::Name, "Ivan  Petrov".to_string())
        );
        assert_eq!(
            parse_line("set birth-date 1980-05-17").unwrap(),
            ShellCommand::Set(Field::BirthDate, "1980-05-17".to_string())
        );
        assert_eq!(
            parse_line("set height").unwrap(),
            ShellCommand::Set(Field::Height, String::new())
        );
        assert!(parse_line("set").is_err());
        assert!(parse_line("set age 40").is_err());
    }

    #[test]
    fn test_parse_id_commands() {
        assert_eq!(
            parse_line("edit 7").unwrap(),
            ShellCommand::Edit(PatientId::from(7))
        );
        assert_eq!(
            parse_line("delete abc").unwrap(),
            ShellCommand::Delete(PatientId::new("abc").unwrap())
        );
        assert!(parse_line("show").is_err());
        assert!(parse_line("show 1 2").is_err());
    }

    #[test]
    fn test_parse_account_commands() {
        assert_eq!(
            parse_line("register a@example.com pw123456 admin").unwrap(),
            ShellCommand::Register {
                email: "a@example.com".to_string(),
                password: "pw123456".to_string(),
                role: Role::Admin,
            }
        );
        assert!(parse_line("login a@example.com").is_err());
        assert_eq!(
            parse_line("export out.csv").unwrap(),
            ShellCommand::Export(Some(PathBuf::from("out.csv")))
        );
        assert_eq!(parse_line("print").unwrap(), ShellCommand::Print(None));
    }

    #[test]
    fn test_parse_unknown_command() {
        assert!(parse_line("frobnicate").unwrap_err().contains("unknown command"));
    }
}
