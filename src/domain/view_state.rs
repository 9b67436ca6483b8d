use super::login_flow::LoginFlow;

pub const TRY_AGAIN_TITLE: &str = "Try again";
pub const EDGE_PASSWORD_HINT: &str = "Please enter the password used for your EDGE account";
pub const PASSWORD_RESET_TITLE: &str = "Password Reset";
pub const PASSWORD_RESET_MESSAGE: &str = "Check your email for further instructions";

/// Transient state of the login screen. Rebuilt every time the screen mounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginViewState {
    pub email: String,
    pub password: String,
    pub validation_passed: bool,
    pub is_loading: bool,
    pub title: String,
    pub message: String,
    pub one_line_message: bool,
    pub remember_me: bool,
    pub terms_accepted: bool,
    pub resetting_password: bool,
}

impl LoginViewState {
    pub fn new(flow: LoginFlow, email: impl Into<String>, remember_me: bool) -> Self {
        let email = email.into();
        let title = match flow {
            LoginFlow::UaLogin | LoginFlow::UaRegistration => "Enter your UA password",
            _ => "Enter password",
        };

        Self {
            message: email.clone(),
            email,
            password: String::new(),
            validation_passed: false,
            is_loading: false,
            title: title.to_owned(),
            one_line_message: true,
            remember_me,
            terms_accepted: false,
            resetting_password: false,
        }
    }

    pub fn set_password(&mut self, password: impl Into<String>) -> bool {
        self.password = password.into();
        self.validation_passed = !self.password.is_empty();
        self.validation_passed
    }

    pub fn submit_enabled(&self, flow: LoginFlow) -> bool {
        self.validation_passed && (flow != LoginFlow::UaRegistration || self.terms_accepted)
    }

    /// Clears the entered password after a rejected attempt.
    pub fn reject_password(&mut self) {
        self.is_loading = false;
        self.password.clear();
        self.validation_passed = false;
    }

    pub fn show_message(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.title = title.into();
        self.message = message.into();
        self.one_line_message = false;
    }
}
