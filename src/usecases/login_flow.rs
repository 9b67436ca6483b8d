use std::sync::Arc;

use crate::{
    domain::{
        deep_link::DeepLinkSlot,
        login_flow::{
            classify, LoginFlow, LoginFlowInputs, UnclassifiedLoginFlow, LEGACY_CLIENT_API_VERSION,
        },
        password_policy::meets_ua_requirements,
        session::Session,
        view_state::{
            LoginViewState, EDGE_PASSWORD_HINT, PASSWORD_RESET_MESSAGE, PASSWORD_RESET_TITLE,
            TRY_AGAIN_TITLE,
        },
    },
    infra::secrets::mask_email,
    usecases::{
        contracts::{
            AlertPresenter, ApiError, Credentials, Destination, HomeRole, LoginPreferenceStore,
            Navigator, TermsStatus,
        },
        session_actions::SessionActions,
    },
};

const ERROR_TITLE: &str = "Error";
const UNCLASSIFIED_MESSAGE: &str = "Something went wrong, please try again.";
const ACCEPT_TERMS_PROMPT: &str = "Please accept our terms and conditions and privacy policy.";
const RESET_CONFIRM_TITLE: &str = "Reset Password?";
const RESET_CONFIRM_MESSAGE: &str = "You'll receive an email to reset your password.";
const RECOVERY_PAGE_TITLE: &str = "Password Recovery";

/// What the screen is opened with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginScreenParams {
    pub email: String,
    pub remember_me: bool,
    pub inputs: LoginFlowInputs,
}

/// Collaborators of the login screen.
#[derive(Clone)]
pub struct LoginScreenDeps {
    pub actions: Arc<SessionActions>,
    pub navigator: Arc<dyn Navigator>,
    pub alerts: Arc<dyn AlertPresenter>,
    pub preferences: Arc<dyn LoginPreferenceStore>,
    pub deep_link: DeepLinkSlot,
    pub password_recovery_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Refused before reaching the backend.
    Blocked,
    /// Failure shown to the user; the screen stays open.
    Rejected,
    /// Waiting on a terms/privacy acceptance screen.
    AwaitingTerms,
    /// Moved to the change-password or link-account flow.
    HandedOff,
    SignedIn(HomeRole),
}

struct PendingLogin {
    session: Session,
    ua_registration: bool,
}

/// Drives one visit of the login screen through the flow selected for it.
pub struct LoginController {
    flow: LoginFlow,
    view: LoginViewState,
    deps: LoginScreenDeps,
    pending: Option<PendingLogin>,
}

impl LoginController {
    /// Classifies the inputs and prepares the screen. An unclassifiable
    /// combination shows a blocking error and navigates back.
    pub fn open(
        params: LoginScreenParams,
        deps: LoginScreenDeps,
    ) -> Result<Self, UnclassifiedLoginFlow> {
        let flow = match classify(&params.inputs) {
            Ok(flow) => flow,
            Err(error) => {
                tracing::error!(
                    code = "LOGIN_FLOW_UNCLASSIFIED",
                    details = %error,
                    "login screen opened with unsupported account combination"
                );
                deps.alerts.alert(ERROR_TITLE, UNCLASSIFIED_MESSAGE);
                deps.navigator.go_back();
                return Err(error);
            }
        };
        tracing::info!(
            flow = flow.as_label(),
            email = %mask_email(&params.email),
            "login flow selected"
        );

        Ok(Self {
            flow,
            view: LoginViewState::new(flow, params.email, params.remember_me),
            deps,
            pending: None,
        })
    }

    pub fn flow(&self) -> LoginFlow {
        self.flow
    }

    pub fn view(&self) -> &LoginViewState {
        &self.view
    }

    pub fn on_focus(&self) {
        self.deps
            .actions
            .services()
            .analytics
            .log_event("screen_view", &[("screen_name", "login")]);
    }

    pub fn update_password(&mut self, password: impl Into<String>) -> bool {
        self.view.set_password(password)
    }

    /// Registration has no remember-me control.
    pub fn toggle_remember_me(&mut self) {
        if self.flow != LoginFlow::UaRegistration {
            self.view.remember_me = !self.view.remember_me;
        }
    }

    pub fn set_terms_accepted(&mut self, accepted: bool) {
        self.view.terms_accepted = accepted;
    }

    pub fn submit_enabled(&self) -> bool {
        self.view.submit_enabled(self.flow)
    }

    pub async fn submit(&mut self) -> SubmitOutcome {
        tracing::debug!(flow = self.flow.as_label(), "login submitted");
        match self.flow {
            LoginFlow::ClientLogin => self.login(false, LEGACY_CLIENT_API_VERSION).await,
            LoginFlow::UaLogin => {
                let version = self.deps.actions.api_version().to_owned();
                self.login(false, &version).await
            }
            LoginFlow::UaRegistration => self.create_account_with_ua().await,
            LoginFlow::UaMigration | LoginFlow::UaLink => self.verify_edge_password().await,
        }
    }

    /// Continues after the user went through a terms or privacy screen.
    pub fn resume_after_terms(&mut self) -> Option<HomeRole> {
        let pending = self.pending.take()?;
        Some(self.handle_logged_in_user(&pending.session, pending.ua_registration))
    }

    pub async fn forgot_password(&mut self) {
        if !self.flow.resets_password_by_email() {
            self.deps.navigator.navigate(Destination::WebView {
                title: RECOVERY_PAGE_TITLE.to_owned(),
                uri: self.deps.password_recovery_url.clone(),
            });
            return;
        }

        if self
            .deps
            .alerts
            .confirm(RESET_CONFIRM_TITLE, RESET_CONFIRM_MESSAGE)
        {
            self.reset_password().await;
        }
    }

    async fn reset_password(&mut self) {
        self.view.resetting_password = true;
        let api = Arc::clone(&self.deps.actions.services().api);

        match api.create_password_reset_request(&self.view.email).await {
            Ok(()) => self
                .view
                .show_message(PASSWORD_RESET_TITLE, PASSWORD_RESET_MESSAGE),
            Err(error) => {
                tracing::warn!(code = error.code(), "password reset request failed");
                self.deps.alerts.alert(ERROR_TITLE, &error.to_string());
            }
        }

        self.view.resetting_password = false;
    }

    fn credentials(&self) -> Credentials {
        Credentials::new(self.view.email.clone(), self.view.password.clone())
    }

    async fn login(&mut self, ua_registration: bool, version: &str) -> SubmitOutcome {
        self.view.is_loading = true;
        let credentials = self.credentials();
        let actions = Arc::clone(&self.deps.actions);

        let session = match actions.login(&credentials, version).await {
            Ok(session) => session,
            Err(error) => return self.reject_with(&error),
        };
        self.persist_login_preference();

        match actions.services().api.check_terms().await {
            Ok(status) => self.after_terms_check(session, ua_registration, status),
            Err(error) => self.reject_with(&error),
        }
    }

    async fn create_account_with_ua(&mut self) -> SubmitOutcome {
        if !self.view.terms_accepted {
            self.deps.alerts.alert(ACCEPT_TERMS_PROMPT, "");
            return SubmitOutcome::Blocked;
        }

        self.view.is_loading = true;
        let credentials = self.credentials();
        let api = Arc::clone(&self.deps.actions.services().api);

        if let Err(error) = api
            .register_trainer_with_ua_account(&credentials, true)
            .await
        {
            return self.reject_with(&error);
        }

        let version = self.deps.actions.api_version().to_owned();
        self.login(true, &version).await
    }

    /// Checks the legacy password without creating a session. A wrong
    /// password and an unreachable backend produce the same message.
    async fn verify_edge_password(&mut self) -> SubmitOutcome {
        self.view.is_loading = true;
        let credentials = self.credentials();
        let api = Arc::clone(&self.deps.actions.services().api);

        match api.verify_edge_credentials(&credentials).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::info!(flow = self.flow.as_label(), "edge password rejected");
                return self.ask_for_edge_password_again();
            }
            Err(error) => {
                tracing::warn!(
                    code = error.code(),
                    flow = self.flow.as_label(),
                    "edge password verification unavailable"
                );
                return self.ask_for_edge_password_again();
            }
        }

        if self.flow == LoginFlow::UaLink {
            self.view.is_loading = false;
            self.deps.navigator.navigate(Destination::LinkAccount {
                email: self.view.email.clone(),
                remember_me: self.view.remember_me,
            });
            return SubmitOutcome::HandedOff;
        }

        if meets_ua_requirements(&self.view.password) {
            return self.create_new_ua_account().await;
        }

        self.view.is_loading = false;
        self.deps.navigator.navigate(Destination::ChangePassword {
            email: self.view.email.clone(),
            password: self.view.password.clone(),
            remember_me: self.view.remember_me,
        });
        SubmitOutcome::HandedOff
    }

    async fn create_new_ua_account(&mut self) -> SubmitOutcome {
        let result = self.migrate_and_login().await;
        self.view.is_loading = false;

        match result {
            Ok((session, status)) => self.after_terms_check(session, false, status),
            Err(error) => {
                tracing::warn!(code = error.code(), "edge account migration failed");
                self.deps.alerts.alert(ERROR_TITLE, &error.to_string());
                SubmitOutcome::Rejected
            }
        }
    }

    async fn migrate_and_login(&self) -> Result<(Session, TermsStatus), ApiError> {
        let credentials = self.credentials();
        let actions = Arc::clone(&self.deps.actions);
        let api = &actions.services().api;

        api.migrate_edge_account_to_ua(&credentials).await?;
        let version = actions.api_version().to_owned();
        let session = actions.login(&credentials, &version).await?;
        self.persist_login_preference();
        let status = api.check_terms().await?;

        Ok((session, status))
    }

    fn after_terms_check(
        &mut self,
        session: Session,
        ua_registration: bool,
        status: TermsStatus,
    ) -> SubmitOutcome {
        let destination = if status.requires_tc_update {
            Destination::TermsAndConditions {
                update_privacy: status.requires_pp_update,
            }
        } else if status.requires_pp_update {
            Destination::PrivacyPolicy
        } else {
            let role = self.handle_logged_in_user(&session, ua_registration);
            return SubmitOutcome::SignedIn(role);
        };

        tracing::info!(?destination, "updated terms must be accepted before continuing");
        self.pending = Some(PendingLogin {
            session,
            ua_registration,
        });
        self.deps.navigator.navigate(destination);
        SubmitOutcome::AwaitingTerms
    }

    fn handle_logged_in_user(&mut self, session: &Session, ua_registration: bool) -> HomeRole {
        let analytics = Arc::clone(&self.deps.actions.services().analytics);
        if ua_registration {
            analytics.log_event(
                "ua_signup",
                &[("email", self.view.email.as_str()), ("user_role", "trainer")],
            );
        }
        self.view.is_loading = false;

        analytics.set_user_property(
            "LevelOfSubscription",
            &session.subscription_tier(chrono::Utc::now()),
        );
        let role = if session.is_trainer() {
            HomeRole::Trainer
        } else if session.is_walk_in_client() {
            HomeRole::WalkIn
        } else {
            HomeRole::Client
        };
        analytics.log_event("login", &[("user_role", role.as_str())]);
        analytics.set_user_property("role", role.as_str());

        let destination = match self.deps.deep_link.take() {
            Some(link) => Destination::DeepLink(link),
            None => Destination::Home {
                role,
                user_id: session.id.clone(),
            },
        };
        tracing::info!(user_id = %session.id, role = role.as_str(), "routing signed-in user");
        self.deps.navigator.navigate(destination);

        role
    }

    fn persist_login_preference(&self) {
        if let Err(error) = self
            .deps
            .preferences
            .update_login_preferences(self.view.remember_me, &self.view.email)
        {
            tracing::warn!(
                code = "LOGIN_PREFERENCE_WRITE_FAILED",
                error = %error,
                "failed to persist login preference, continuing"
            );
        }
    }

    fn reject_with(&mut self, error: &ApiError) -> SubmitOutcome {
        self.view.reject_password();
        self.handle_auth_error(error);
        SubmitOutcome::Rejected
    }

    fn ask_for_edge_password_again(&mut self) -> SubmitOutcome {
        self.view.reject_password();
        self.view.show_message(TRY_AGAIN_TITLE, EDGE_PASSWORD_HINT);
        SubmitOutcome::Rejected
    }

    fn handle_auth_error(&mut self, error: &ApiError) {
        tracing::warn!(code = error.code(), flow = self.flow.as_label(), "authentication failed");
        match error {
            ApiError::Structured {
                title,
                description: Some(description),
            } => self.view.show_message(title.clone(), description.clone()),
            ApiError::Structured {
                title,
                description: None,
            } => self.view.title = title.clone(),
            ApiError::Message(message) => self.deps.alerts.alert(ERROR_TITLE, message),
            ApiError::Transport(_) | ApiError::Decode(_) => {
                self.deps.alerts.alert(ERROR_TITLE, &error.to_string())
            }
        }
    }
}
