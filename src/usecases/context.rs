use std::sync::Arc;

use crate::{
    domain::{deep_link::DeepLinkSlot, login_flow::LoginFlowInputs},
    infra::{config::AppConfig, preferences::FileLoginPreferences, storage_layout::StorageLayout},
    ui::{navigator::TerminalNavigator, terminal::StdTerminal},
    usecases::{
        contracts::AlertPresenter,
        login_flow::{LoginScreenDeps, LoginScreenParams},
        session_actions::SessionActions,
    },
};

pub struct AppContext {
    pub config: AppConfig,
    pub layout: StorageLayout,
    pub actions: Arc<SessionActions>,
    pub alerts: Arc<dyn AlertPresenter>,
    pub navigator: Arc<TerminalNavigator<StdTerminal>>,
    pub preferences: Arc<FileLoginPreferences>,
    pub deep_link: DeepLinkSlot,
}

impl AppContext {
    pub fn screen_deps(&self) -> LoginScreenDeps {
        LoginScreenDeps {
            actions: Arc::clone(&self.actions),
            navigator: self.navigator.clone(),
            alerts: Arc::clone(&self.alerts),
            preferences: self.preferences.clone(),
            deep_link: self.deep_link.clone(),
            password_recovery_url: self.config.links.password_recovery_url.clone(),
        }
    }

    /// Screen parameters for `email`, falling back to the remembered address.
    pub fn screen_params(
        &self,
        email: Option<String>,
        remember_me: bool,
        inputs: LoginFlowInputs,
    ) -> Option<LoginScreenParams> {
        let remembered = self.preferences.remembered_email();
        let remember_me = remember_me || (email.is_none() && remembered.is_some());
        let email = email.or(remembered)?;

        Some(LoginScreenParams {
            email,
            remember_me,
            inputs,
        })
    }
}
