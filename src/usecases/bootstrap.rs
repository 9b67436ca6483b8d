use std::{path::Path, sync::Arc};

use tracing_appender::non_blocking::WorkerGuard;

use crate::{
    api::{
        chat::LoggingChatClient, http::HttpSessionApi, push::LocalPushRegistrar,
        telemetry::{TracingAnalytics, TracingCrashReporter},
    },
    domain::{deep_link::DeepLinkSlot, session_store::SessionStore},
    infra::{
        self,
        config::{AppConfig, DeviceConfig, FileConfigAdapter},
        contracts::{ConfigAdapter, ExternalOpener},
        error::AppError,
        opener::SystemOpener,
        preferences::FileLoginPreferences,
        storage_layout::StorageLayout,
    },
    ui::{
        navigator::TerminalNavigator,
        terminal::{StdTerminal, TerminalAlerts},
    },
    usecases::{
        chat_session::ChatSessionGate,
        context::AppContext,
        contracts::AlertPresenter,
        session_actions::{DeviceProfile, SessionActions, SessionServices, SessionSettings},
    },
};

/// Loads config, installs logging and wires every adapter. The returned guard
/// flushes the log file on drop.
pub fn bootstrap(
    config_path: Option<&Path>,
) -> anyhow::Result<(AppContext, Option<WorkerGuard>)> {
    let config = FileConfigAdapter::new(config_path).load()?;
    let guard = infra::logging::init(&config.logging)?;

    let layout = StorageLayout::resolve()?;
    layout.ensure_dirs()?;

    Ok((build_context(config, layout, Arc::new(SystemOpener))?, guard))
}

pub fn build_context(
    config: AppConfig,
    layout: StorageLayout,
    opener: Arc<dyn ExternalOpener>,
) -> Result<AppContext, AppError> {
    let api = HttpSessionApi::new(&config.api, layout.session_token_file())?;
    let alerts: Arc<dyn AlertPresenter> = Arc::new(TerminalAlerts::new(StdTerminal));

    let services = SessionServices {
        api: Arc::new(api),
        analytics: Arc::new(TracingAnalytics::default()),
        crash: Arc::new(TracingCrashReporter),
        push: Arc::new(LocalPushRegistrar::new(config.device.is_emulator)),
        chat: Arc::new(ChatSessionGate::new(Arc::new(LoggingChatClient::default()))),
        alerts: Arc::clone(&alerts),
    };
    let settings = SessionSettings {
        api_version: config.api.version.clone(),
        chat_enabled: config.features.chat_enabled,
        device: device_profile(&config.device),
    };

    tracing::debug!(
        api_version = %settings.api_version,
        chat_enabled = settings.chat_enabled,
        platform = settings.device.platform.as_str(),
        "session services composed"
    );

    Ok(AppContext {
        actions: Arc::new(SessionActions::new(services, SessionStore::new(), settings)),
        alerts,
        navigator: Arc::new(TerminalNavigator::new(StdTerminal, opener)),
        preferences: Arc::new(FileLoginPreferences::new(layout.login_preferences_file())),
        deep_link: DeepLinkSlot::new(),
        layout,
        config,
    })
}

fn device_profile(device: &DeviceConfig) -> DeviceProfile {
    DeviceProfile {
        platform: device.platform,
        brand: device.brand.clone(),
        model: device.model.clone(),
        os_version: device.os_version.clone(),
        app_version: device.app_version.clone(),
        build_number: device.build_number.clone(),
        bundle_id: device.bundle_id.clone(),
        device_uuid: device.device_uuid.clone(),
    }
}
