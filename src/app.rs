use anyhow::{bail, Result};

use crate::{
    api,
    cli::{Cli, Command, FlowFlags, LoginArgs},
    domain::{
        self,
        login_flow::{classify, UnclassifiedLoginFlow},
    },
    infra::{self, error::AppError},
    ui::{
        self,
        login_screen::{run_login_screen, show_view, ScreenOutcome, MAX_PASSWORD_ATTEMPTS},
        terminal::{Prompter, StdTerminal},
    },
    usecases::{self, bootstrap, context::AppContext, login_flow::LoginController},
};

pub fn run(cli: Cli) -> Result<()> {
    tracing::debug!(
        ui = ui::module_name(),
        domain = domain::module_name(),
        api = api::module_name(),
        usecases = usecases::module_name(),
        infra = infra::module_name(),
        "module boundaries loaded"
    );

    let command = cli.command_or_default();
    if let Command::Classify(flags) = &command {
        let line = classify_line(flags)?;
        println!("{line}");
        return Ok(());
    }

    let (context, _log_guard) = bootstrap::bootstrap(cli.config.as_deref())?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(AppError::Runtime)?;

    runtime.block_on(execute(&context, command, &StdTerminal))
}

fn classify_line(flags: &FlowFlags) -> Result<String, UnclassifiedLoginFlow> {
    classify(&flags.inputs()).map(|flow| flow.as_label().to_owned())
}

async fn execute(context: &AppContext, command: Command, terminal: &dyn Prompter) -> Result<()> {
    match command {
        Command::Classify(flags) => {
            terminal.print_line(&classify_line(&flags)?)?;
        }
        Command::Login(args) => login(context, args, terminal).await?,
        Command::Relogin => {
            let version = context.config.api.version.clone();
            match context.actions.relogin(&version).await {
                Some(session) => {
                    context
                        .actions
                        .register_for_push(&session.id, session.role.as_str(), None)
                        .await;
                    terminal.print_line(&format!("Signed in as {}", session.email))?;
                }
                None => terminal.print_line("No active session. Run `ualogin login` to sign in.")?,
            }
        }
        Command::Logout => {
            let confirmed = context.actions.logout().await;
            if confirmed {
                terminal.print_line("Logged out.")?;
            } else {
                terminal.print_line("Logged out locally; the server did not confirm.")?;
            }
        }
    }

    Ok(())
}

async fn login(context: &AppContext, args: LoginArgs, terminal: &dyn Prompter) -> Result<()> {
    if let Some(link) = args.deep_link {
        context.deep_link.select(link);
    }

    let Some(params) = context.screen_params(args.email, args.remember_me, args.flow.inputs())
    else {
        bail!("no email given and none remembered; pass --email");
    };

    let mut controller = LoginController::open(params, context.screen_deps())?;
    controller.on_focus();
    if args.accept_terms {
        controller.set_terms_accepted(true);
    }

    if args.forgot_password {
        controller.forgot_password().await;
        if !controller.view().one_line_message {
            show_view(terminal, controller.view())?;
        }
        return Ok(());
    }

    let outcome = run_login_screen(
        &mut controller,
        terminal,
        context.alerts.as_ref(),
        MAX_PASSWORD_ATTEMPTS,
    )
    .await?;
    tracing::info!(?outcome, flow = controller.flow().as_label(), "login screen closed");

    match outcome {
        ScreenOutcome::SignedIn(_) => {
            if let Some(session) = context.actions.store().current_user() {
                context
                    .actions
                    .register_for_push(&session.id, session.role.as_str(), None)
                    .await;
                terminal.print_line(&format!("Signed in as {}", session.email))?;
            }
        }
        ScreenOutcome::HandedOff => {
            if let Some(destination) = context.navigator.take_last() {
                tracing::debug!(?destination, "login handed off");
            }
            terminal.print_line("Finish the account step above to complete sign in.")?;
        }
        ScreenOutcome::TermsDeclined => {
            terminal.print_line("The updated terms must be accepted to continue.")?;
        }
        ScreenOutcome::Blocked | ScreenOutcome::Abandoned => {
            terminal.print_line("Login not completed.")?;
        }
    }

    Ok(())
}
