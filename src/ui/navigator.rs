use std::sync::{Arc, Mutex};

use crate::{
    infra::contracts::ExternalOpener,
    ui::terminal::Prompter,
    usecases::contracts::{Destination, Navigator},
};

/// Prints each navigation and opens web pages externally. The last
/// destination is kept so the command driving the screen can react to it.
pub struct TerminalNavigator<P> {
    terminal: P,
    opener: Arc<dyn ExternalOpener>,
    last: Mutex<Option<Destination>>,
}

impl<P: Prompter> TerminalNavigator<P> {
    pub fn new(terminal: P, opener: Arc<dyn ExternalOpener>) -> Self {
        Self {
            terminal,
            opener,
            last: Mutex::new(None),
        }
    }

    pub fn take_last(&self) -> Option<Destination> {
        self.last.lock().ok().and_then(|mut last| last.take())
    }

    fn show(&self, line: &str) {
        if let Err(error) = self.terminal.print_line(line) {
            tracing::warn!(code = "UI_NAV_WRITE_FAILED", error = %error, "navigation not shown");
        }
    }
}

impl<P: Prompter> Navigator for TerminalNavigator<P> {
    fn navigate(&self, destination: Destination) {
        tracing::debug!(?destination, "navigate");
        self.show(&describe(&destination));

        if let Destination::WebView { uri, .. } = &destination {
            if let Err(error) = self.opener.open(uri) {
                tracing::warn!(code = "UI_OPEN_FAILED", error = %error, "web page not opened");
                self.show(&format!("Open {uri} in your browser."));
            }
        }

        if let Ok(mut last) = self.last.lock() {
            *last = Some(destination);
        }
    }

    fn go_back(&self) {
        tracing::debug!("navigate back");
        if let Ok(mut last) = self.last.lock() {
            *last = None;
        }
    }
}

/// One-line description of where the app went.
pub fn describe(destination: &Destination) -> String {
    match destination {
        Destination::TermsAndConditions {
            update_privacy: true,
        } => "-> Updated terms and conditions and privacy policy".to_owned(),
        Destination::TermsAndConditions {
            update_privacy: false,
        } => "-> Updated terms and conditions".to_owned(),
        Destination::PrivacyPolicy => "-> Updated privacy policy".to_owned(),
        Destination::ChangePassword { email, .. } => {
            format!("-> Choose a new password for {email}")
        }
        Destination::LinkAccount { email, .. } => format!("-> Link your account {email}"),
        Destination::WebView { title, uri } => format!("-> {title}: {uri}"),
        Destination::DeepLink(link) => format!("-> {link}"),
        Destination::Home { role, user_id } => {
            format!("-> Home ({}) for user {user_id}", role.as_str())
        }
    }
}
