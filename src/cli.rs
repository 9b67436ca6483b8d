use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::login_flow::{EdgeUserRole, LoginFlowInputs};

#[derive(Debug, Parser)]
#[command(name = "ualogin", about = "Account-linking login and session bootstrap")]
pub struct Cli {
    /// Path to config file (default: ./config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print which login flow an account combination selects
    Classify(FlowFlags),
    /// Run the login screen for an email
    Login(LoginArgs),
    /// Restore the saved session
    Relogin,
    /// End the session and clear local state
    Logout,
}

/// Which accounts exist for the entered email.
#[derive(Debug, Clone, Default, Args)]
pub struct FlowFlags {
    #[arg(long)]
    pub has_edge_account: bool,
    #[arg(long)]
    pub has_ua_account: bool,
    #[arg(long)]
    pub ua_account_in_edge: bool,
    #[arg(long)]
    pub edge_account_in_ua: bool,
    /// Role of the legacy account (CLIENT, TRAINER, ...)
    #[arg(long)]
    pub edge_user_role: Option<String>,
}

impl FlowFlags {
    pub fn inputs(&self) -> LoginFlowInputs {
        LoginFlowInputs {
            has_edge_account: self.has_edge_account,
            has_ua_account: self.has_ua_account,
            ua_account_in_edge: self.ua_account_in_edge,
            edge_account_in_ua: self.edge_account_in_ua,
            edge_user_role: self.edge_user_role.as_deref().map(EdgeUserRole::parse),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct LoginArgs {
    /// Defaults to the last remembered email
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub remember_me: bool,
    /// Accept terms and privacy policy when registering
    #[arg(long)]
    pub accept_terms: bool,
    /// Start the forgot-password action instead of signing in
    #[arg(long)]
    pub forgot_password: bool,
    /// Deep link to open once signed in
    #[arg(long)]
    pub deep_link: Option<String>,
    #[command(flatten)]
    pub flow: FlowFlags,
}

impl Cli {
    pub fn command_or_default(&self) -> Command {
        self.command.clone().unwrap_or(Command::Relogin)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Command};
    use crate::domain::login_flow::EdgeUserRole;

    #[test]
    fn defaults_to_relogin_when_command_is_missing() {
        let cli = Cli::parse_from(["ualogin"]);

        assert!(matches!(cli.command_or_default(), Command::Relogin));
    }

    #[test]
    fn parses_login_with_flow_flags() {
        let cli = Cli::parse_from([
            "ualogin",
            "login",
            "--email",
            "coach@example.com",
            "--has-ua-account",
            "--ua-account-in-edge",
            "--remember-me",
            "--config",
            "custom.toml",
        ]);

        let Command::Login(args) = cli.command_or_default() else {
            panic!("expected login command");
        };
        assert_eq!(args.email.as_deref(), Some("coach@example.com"));
        assert!(args.remember_me);
        assert!(!args.accept_terms);
        assert!(args.flow.has_ua_account && args.flow.ua_account_in_edge);
        assert_eq!(
            cli.config
                .as_deref()
                .map(|p| p.to_string_lossy().to_string()),
            Some("custom.toml".to_owned())
        );
    }

    #[test]
    fn classify_maps_role_flag() {
        let cli = Cli::parse_from(["ualogin", "classify", "--edge-user-role", "CLIENT"]);

        let Command::Classify(flags) = cli.command_or_default() else {
            panic!("expected classify command");
        };
        assert_eq!(flags.inputs().edge_user_role, Some(EdgeUserRole::Client));
        assert!(!flags.inputs().has_edge_account);
    }
}
