use std::io;

use crate::{
    domain::view_state::LoginViewState,
    ui::terminal::Prompter,
    usecases::{
        contracts::{AlertPresenter, HomeRole},
        login_flow::{LoginController, SubmitOutcome},
    },
};

pub const MAX_PASSWORD_ATTEMPTS: usize = 3;

const TERMS_CONFIRM_TITLE: &str = "Updated terms";
const TERMS_CONFIRM_MESSAGE: &str = "Do you accept the updated terms and privacy policy?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenOutcome {
    SignedIn(HomeRole),
    HandedOff,
    TermsDeclined,
    Blocked,
    Abandoned,
}

/// Prompts for the password until the controller leaves the screen or the
/// attempts run out.
pub async fn run_login_screen(
    controller: &mut LoginController,
    terminal: &dyn Prompter,
    alerts: &dyn AlertPresenter,
    max_attempts: usize,
) -> io::Result<ScreenOutcome> {
    show_view(terminal, controller.view())?;

    for _ in 0..max_attempts {
        let Some(password) = terminal.prompt_secret("Password: ")? else {
            return Ok(ScreenOutcome::Abandoned);
        };
        if !controller.update_password(password) {
            terminal.print_line("Password is required.")?;
            continue;
        }

        match controller.submit().await {
            SubmitOutcome::SignedIn(role) => return Ok(ScreenOutcome::SignedIn(role)),
            SubmitOutcome::HandedOff => return Ok(ScreenOutcome::HandedOff),
            SubmitOutcome::Blocked => return Ok(ScreenOutcome::Blocked),
            SubmitOutcome::AwaitingTerms => {
                if !alerts.confirm(TERMS_CONFIRM_TITLE, TERMS_CONFIRM_MESSAGE) {
                    return Ok(ScreenOutcome::TermsDeclined);
                }
                return Ok(controller
                    .resume_after_terms()
                    .map_or(ScreenOutcome::Abandoned, ScreenOutcome::SignedIn));
            }
            SubmitOutcome::Rejected => show_view(terminal, controller.view())?,
        }
    }

    tracing::info!(
        flow = controller.flow().as_label(),
        max_attempts,
        "password attempts exhausted"
    );
    Ok(ScreenOutcome::Abandoned)
}

pub fn show_view(terminal: &dyn Prompter, view: &LoginViewState) -> io::Result<()> {
    if view.one_line_message {
        terminal.print_line(&format!("{} ({})", view.title, view.message))
    } else {
        terminal.print_line(&view.title)?;
        terminal.print_line(&view.message)
    }
}
