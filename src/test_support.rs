use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard},
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Map;

use crate::{
    domain::{
        deep_link::DeepLinkSlot,
        session::{ClientUser, Role, Session},
        session_store::SessionStore,
    },
    usecases::{
        chat_session::ChatSessionGate,
        contracts::{
            AlertPresenter, Analytics, ApiError, ChatClient, ChatUser, CrashReporter, CrashUser,
            Credentials, Destination, DeviceRegistration, LoginPreferenceStore, Navigator,
            Platform, PushRegistrar, PushSubscriptionStatus, SessionApi, TermsStatus,
        },
        login_flow::LoginScreenDeps,
        session_actions::{DeviceProfile, SessionActions, SessionServices, SessionSettings},
    },
};

static ENV_LOCK: Mutex<()> = Mutex::new(());

pub fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().expect("env lock should not be poisoned")
}

pub fn sample_session(id: &str, role: Role) -> Session {
    Session {
        id: id.to_owned(),
        email: format!("{id}@example.com"),
        full_name: format!("User {id}"),
        client_user: matches!(role, Role::Client).then(ClientUser::default),
        role,
        avatar_url: None,
        subscription_expiration_date: None,
        purchased_product_ids: Vec::new(),
        subscription_level: None,
        extra: Map::new(),
    }
}

/// Ordered record of every call made on the fakes sharing it.
#[derive(Clone, Debug, Default)]
pub struct CallLog {
    inner: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn push(&self, call: impl Into<String>) {
        self.inner.lock().expect("call log lock").push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().expect("call log lock").clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|entry| *entry == call).count()
    }

    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|entry| entry.starts_with(prefix))
            .count()
    }

    pub fn position(&self, call: &str) -> Option<usize> {
        self.calls().iter().position(|entry| entry == call)
    }
}

pub struct FakeApi {
    log: CallLog,
    login_result: Mutex<Option<Result<Session, ApiError>>>,
    relogin_result: Mutex<Result<Session, ApiError>>,
    logout_result: Mutex<Result<bool, ApiError>>,
    verify_result: Mutex<Result<bool, ApiError>>,
    migrate_result: Mutex<Result<(), ApiError>>,
    register_result: Mutex<Result<(), ApiError>>,
    terms_result: Mutex<Result<TermsStatus, ApiError>>,
    reset_result: Mutex<Result<(), ApiError>>,
    chat_token: Mutex<Result<Option<String>, ApiError>>,
    devices: Mutex<Vec<DeviceRegistration>>,
}

impl FakeApi {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            login_result: Mutex::new(None),
            relogin_result: Mutex::new(Ok(sample_session("u-1", Role::Trainer))),
            logout_result: Mutex::new(Ok(true)),
            verify_result: Mutex::new(Ok(true)),
            migrate_result: Mutex::new(Ok(())),
            register_result: Mutex::new(Ok(())),
            terms_result: Mutex::new(Ok(TermsStatus::default())),
            reset_result: Mutex::new(Ok(())),
            chat_token: Mutex::new(Ok(Some("chat-token".to_owned()))),
            devices: Mutex::new(Vec::new()),
        }
    }

    pub fn set_login(&self, result: Result<Session, ApiError>) {
        *self.login_result.lock().expect("login lock") = Some(result);
    }

    pub fn set_relogin(&self, result: Result<Session, ApiError>) {
        *self.relogin_result.lock().expect("relogin lock") = result;
    }

    pub fn set_logout(&self, result: Result<bool, ApiError>) {
        *self.logout_result.lock().expect("logout lock") = result;
    }

    pub fn set_verify(&self, result: Result<bool, ApiError>) {
        *self.verify_result.lock().expect("verify lock") = result;
    }

    pub fn set_migrate(&self, result: Result<(), ApiError>) {
        *self.migrate_result.lock().expect("migrate lock") = result;
    }

    pub fn set_register(&self, result: Result<(), ApiError>) {
        *self.register_result.lock().expect("register lock") = result;
    }

    pub fn set_terms(&self, result: Result<TermsStatus, ApiError>) {
        *self.terms_result.lock().expect("terms lock") = result;
    }

    pub fn set_reset(&self, result: Result<(), ApiError>) {
        *self.reset_result.lock().expect("reset lock") = result;
    }

    pub fn set_chat_token(&self, result: Result<Option<String>, ApiError>) {
        *self.chat_token.lock().expect("chat token lock") = result;
    }

    pub fn devices(&self) -> Vec<DeviceRegistration> {
        self.devices.lock().expect("devices lock").clone()
    }
}

#[async_trait]
impl SessionApi for FakeApi {
    async fn login(&self, credentials: &Credentials, version: &str) -> Result<Session, ApiError> {
        self.log.push(format!("api.login:{version}"));
        match self.login_result.lock().expect("login lock").clone() {
            Some(result) => result,
            None => {
                let mut session = sample_session("u-1", Role::Trainer);
                session.email = credentials.email.clone();
                Ok(session)
            }
        }
    }

    async fn relogin(&self, version: &str) -> Result<Session, ApiError> {
        self.log.push(format!("api.relogin:{version}"));
        self.relogin_result.lock().expect("relogin lock").clone()
    }

    async fn logout(&self) -> Result<bool, ApiError> {
        self.log.push("api.logout");
        self.logout_result.lock().expect("logout lock").clone()
    }

    async fn verify_edge_credentials(&self, _credentials: &Credentials) -> Result<bool, ApiError> {
        self.log.push("api.verify_edge_credentials");
        self.verify_result.lock().expect("verify lock").clone()
    }

    async fn migrate_edge_account_to_ua(&self, _credentials: &Credentials) -> Result<(), ApiError> {
        self.log.push("api.migrate_edge_account_to_ua");
        self.migrate_result.lock().expect("migrate lock").clone()
    }

    async fn register_trainer_with_ua_account(
        &self,
        _credentials: &Credentials,
        accepted_terms: bool,
    ) -> Result<(), ApiError> {
        self.log
            .push(format!("api.register_trainer_with_ua_account:{accepted_terms}"));
        self.register_result.lock().expect("register lock").clone()
    }

    async fn check_terms(&self) -> Result<TermsStatus, ApiError> {
        self.log.push("api.check_terms");
        self.terms_result.lock().expect("terms lock").clone()
    }

    async fn create_password_reset_request(&self, email: &str) -> Result<(), ApiError> {
        self.log.push(format!("api.create_password_reset_request:{email}"));
        self.reset_result.lock().expect("reset lock").clone()
    }

    async fn chat_token(&self) -> Result<Option<String>, ApiError> {
        self.log.push("api.chat_token");
        self.chat_token.lock().expect("chat token lock").clone()
    }

    async fn default_avatar_image_url(&self) -> Result<String, ApiError> {
        self.log.push("api.default_avatar_image_url");
        Ok("https://cdn.example.com/default-avatar.png".to_owned())
    }

    async fn register_for_push(&self, device: &DeviceRegistration) -> Result<(), ApiError> {
        self.log.push("api.register_for_push");
        self.devices.lock().expect("devices lock").push(device.clone());
        Ok(())
    }
}

/// Records the session-store label seen at every call so tests can check
/// that telemetry only ever observes an already-updated store.
#[derive(Default)]
struct StoreObserver {
    store: Mutex<Option<SessionStore>>,
    seen: Mutex<Vec<&'static str>>,
}

impl StoreObserver {
    fn observe(&self, store: SessionStore) {
        *self.store.lock().expect("observer lock") = Some(store);
    }

    fn record(&self) {
        if let Some(store) = self.store.lock().expect("observer lock").as_ref() {
            self.seen
                .lock()
                .expect("observer lock")
                .push(store.snapshot().as_label());
        }
    }

    fn seen(&self) -> Vec<&'static str> {
        self.seen.lock().expect("observer lock").clone()
    }
}

pub struct FakeAnalytics {
    log: CallLog,
    observer: StoreObserver,
}

impl FakeAnalytics {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            observer: StoreObserver::default(),
        }
    }

    pub fn observe_store(&self, store: SessionStore) {
        self.observer.observe(store);
    }

    pub fn store_states_seen(&self) -> Vec<&'static str> {
        self.observer.seen()
    }

    fn record(&self, call: String) {
        self.observer.record();
        self.log.push(call);
    }
}

impl Analytics for FakeAnalytics {
    fn set_user(&self, user_id: &str) {
        self.record(format!("analytics.set_user:{user_id}"));
    }

    fn set_user_property(&self, key: &str, value: &str) {
        self.record(format!("analytics.set_user_property:{key}={value}"));
    }

    fn log_event(&self, name: &str, props: &[(&str, &str)]) {
        let rendered = props
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(",");
        self.record(format!("analytics.log_event:{name}:{rendered}"));
    }

    fn track(&self, event: &str) {
        self.record(format!("analytics.track:{event}"));
    }

    fn flush(&self) {
        self.record("analytics.flush".to_owned());
    }

    fn reset(&self) {
        self.record("analytics.reset".to_owned());
    }
}

pub struct FakeCrash {
    log: CallLog,
    observer: StoreObserver,
}

impl FakeCrash {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            observer: StoreObserver::default(),
        }
    }

    pub fn observe_store(&self, store: SessionStore) {
        self.observer.observe(store);
    }

    pub fn store_states_seen(&self) -> Vec<&'static str> {
        self.observer.seen()
    }
}

impl CrashReporter for FakeCrash {
    fn set_user_context(&self, user: Option<CrashUser>) {
        self.observer.record();
        match user {
            Some(user) => self
                .log
                .push(format!("crash.set_user_context:{}:{}", user.id, user.email)),
            None => self.log.push("crash.set_user_context:none"),
        }
    }
}

pub struct FakePush {
    log: CallLog,
    emulator: bool,
    status: PushSubscriptionStatus,
    tags: Mutex<BTreeMap<String, String>>,
}

impl FakePush {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            emulator: false,
            status: PushSubscriptionStatus {
                push_token: Some("push-token".to_owned()),
                player_id: Some("player-1".to_owned()),
            },
            tags: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn emulator(mut self) -> Self {
        self.emulator = true;
        self
    }

    pub fn without_token(mut self) -> Self {
        self.status.push_token = None;
        self
    }

    pub fn tags(&self) -> BTreeMap<String, String> {
        self.tags.lock().expect("tags lock").clone()
    }
}

#[async_trait]
impl PushRegistrar for FakePush {
    async fn is_emulator(&self) -> bool {
        self.log.push("push.is_emulator");
        self.emulator
    }

    fn request_permission(&self) {
        self.log.push("push.request_permission");
    }

    fn set_subscription(&self, enabled: bool) {
        self.log.push(format!("push.set_subscription:{enabled}"));
    }

    fn send_tags(&self, tags: &BTreeMap<String, String>) {
        self.log.push("push.send_tags");
        self.tags
            .lock()
            .expect("tags lock")
            .extend(tags.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    fn delete_tag(&self, key: &str) {
        self.log.push(format!("push.delete_tag:{key}"));
        self.tags.lock().expect("tags lock").remove(key);
    }

    fn set_external_user_id(&self, user_id: &str) {
        self.log.push(format!("push.set_external_user_id:{user_id}"));
    }

    fn remove_external_user_id(&self) {
        self.log.push("push.remove_external_user_id");
    }

    async fn subscription_status(&self) -> PushSubscriptionStatus {
        self.log.push("push.subscription_status");
        self.status.clone()
    }
}

pub struct FakeChat {
    log: CallLog,
    connected: Mutex<Vec<ChatUser>>,
    fail_connect: bool,
}

impl FakeChat {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            connected: Mutex::new(Vec::new()),
            fail_connect: false,
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    pub fn connected_users(&self) -> Vec<ChatUser> {
        self.connected.lock().expect("chat lock").clone()
    }
}

#[async_trait]
impl ChatClient for FakeChat {
    async fn connect_user(&self, user: &ChatUser, _token: &str) -> Result<()> {
        self.log.push(format!("chat.connect_user:{}", user.id));
        if self.fail_connect {
            return Err(anyhow!("chat socket closed"));
        }
        self.connected.lock().expect("chat lock").push(user.clone());
        Ok(())
    }

    async fn disconnect(&self) {
        self.log.push("chat.disconnect");
    }

    async fn add_device(&self, _token: &str, push_provider: &str) -> Result<()> {
        self.log.push(format!("chat.add_device:{push_provider}"));
        Ok(())
    }
}

pub struct FakeNavigator {
    log: CallLog,
    destinations: Mutex<Vec<Destination>>,
}

impl FakeNavigator {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            destinations: Mutex::new(Vec::new()),
        }
    }

    pub fn destinations(&self) -> Vec<Destination> {
        self.destinations.lock().expect("nav lock").clone()
    }
}

impl Navigator for FakeNavigator {
    fn navigate(&self, destination: Destination) {
        self.log.push("nav.navigate");
        self.destinations.lock().expect("nav lock").push(destination);
    }

    fn go_back(&self) {
        self.log.push("nav.go_back");
    }
}

pub struct FakeAlerts {
    log: CallLog,
    confirm_answer: bool,
    shown: Mutex<Vec<(String, String)>>,
}

impl FakeAlerts {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            confirm_answer: true,
            shown: Mutex::new(Vec::new()),
        }
    }

    pub fn declining(mut self) -> Self {
        self.confirm_answer = false;
        self
    }

    pub fn alerts(&self) -> Vec<(String, String)> {
        self.shown.lock().expect("alerts lock").clone()
    }
}

impl AlertPresenter for FakeAlerts {
    fn alert(&self, title: &str, message: &str) {
        self.log.push(format!("alert:{title}"));
        self.shown
            .lock()
            .expect("alerts lock")
            .push((title.to_owned(), message.to_owned()));
    }

    fn confirm(&self, title: &str, _message: &str) -> bool {
        self.log.push(format!("confirm:{title}"));
        self.confirm_answer
    }
}

pub struct FakePreferences {
    log: CallLog,
    fail: bool,
    saved: Mutex<Vec<(bool, String)>>,
}

impl FakePreferences {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            fail: false,
            saved: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn saved(&self) -> Vec<(bool, String)> {
        self.saved.lock().expect("prefs lock").clone()
    }
}

impl LoginPreferenceStore for FakePreferences {
    fn update_login_preferences(&self, remember_me: bool, email: &str) -> Result<()> {
        self.log.push("prefs.update");
        if self.fail {
            return Err(anyhow!("preferences file is read-only"));
        }
        self.saved
            .lock()
            .expect("prefs lock")
            .push((remember_me, email.to_owned()));
        Ok(())
    }
}

/// Fully wired session actions and screen collaborators over fakes that
/// share one call log.
pub struct Harness {
    pub log: CallLog,
    pub api: Arc<FakeApi>,
    pub analytics: Arc<FakeAnalytics>,
    pub crash: Arc<FakeCrash>,
    pub push: Arc<FakePush>,
    pub chat: Arc<FakeChat>,
    pub alerts: Arc<FakeAlerts>,
    pub navigator: Arc<FakeNavigator>,
    pub preferences: Arc<FakePreferences>,
    pub store: SessionStore,
    pub deep_link: DeepLinkSlot,
    pub actions: Arc<SessionActions>,
}

impl Harness {
    pub const API_VERSION: &'static str = "v2.0";
    pub const RECOVERY_URL: &'static str = "https://accounts.example.com/recover";

    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn with_chat() -> Self {
        Self::builder().chat_enabled().build()
    }

    pub fn builder() -> HarnessBuilder {
        HarnessBuilder::default()
    }

    pub fn screen_deps(&self) -> LoginScreenDeps {
        LoginScreenDeps {
            actions: Arc::clone(&self.actions),
            navigator: self.navigator.clone(),
            alerts: self.alerts.clone(),
            preferences: self.preferences.clone(),
            deep_link: self.deep_link.clone(),
            password_recovery_url: Self::RECOVERY_URL.to_owned(),
        }
    }
}

#[derive(Default)]
pub struct HarnessBuilder {
    chat_enabled: bool,
    ios: bool,
    emulator: bool,
    without_push_token: bool,
    failing_preferences: bool,
    declining_confirms: bool,
}

impl HarnessBuilder {
    pub fn chat_enabled(mut self) -> Self {
        self.chat_enabled = true;
        self
    }

    pub fn ios(mut self) -> Self {
        self.ios = true;
        self
    }

    pub fn emulator(mut self) -> Self {
        self.emulator = true;
        self
    }

    pub fn without_push_token(mut self) -> Self {
        self.without_push_token = true;
        self
    }

    pub fn failing_preferences(mut self) -> Self {
        self.failing_preferences = true;
        self
    }

    pub fn declining_confirms(mut self) -> Self {
        self.declining_confirms = true;
        self
    }

    pub fn build(self) -> Harness {
        let log = CallLog::default();
        let store = SessionStore::new();

        let api = Arc::new(FakeApi::new(log.clone()));
        let analytics = Arc::new(FakeAnalytics::new(log.clone()));
        analytics.observe_store(store.clone());
        let crash = Arc::new(FakeCrash::new(log.clone()));
        crash.observe_store(store.clone());

        let mut push = FakePush::new(log.clone());
        if self.emulator {
            push = push.emulator();
        }
        if self.without_push_token {
            push = push.without_token();
        }
        let push = Arc::new(push);

        let chat = Arc::new(FakeChat::new(log.clone()));
        let navigator = Arc::new(FakeNavigator::new(log.clone()));
        let mut alerts = FakeAlerts::new(log.clone());
        if self.declining_confirms {
            alerts = alerts.declining();
        }
        let alerts = Arc::new(alerts);
        let mut preferences = FakePreferences::new(log.clone());
        if self.failing_preferences {
            preferences = preferences.failing();
        }
        let preferences = Arc::new(preferences);

        let services = SessionServices {
            api: api.clone(),
            analytics: analytics.clone(),
            crash: crash.clone(),
            push: push.clone(),
            chat: Arc::new(ChatSessionGate::new(chat.clone())),
            alerts: alerts.clone(),
        };
        let settings = SessionSettings {
            api_version: Harness::API_VERSION.to_owned(),
            chat_enabled: self.chat_enabled,
            device: DeviceProfile {
                platform: if self.ios {
                    Platform::Ios
                } else {
                    Platform::Android
                },
                brand: "Acme".to_owned(),
                model: "Phone 9".to_owned(),
                os_version: "17.2".to_owned(),
                app_version: "3.4.0".to_owned(),
                build_number: "812".to_owned(),
                bundle_id: "com.example.trainer".to_owned(),
                device_uuid: "device-1".to_owned(),
            },
        };

        Harness {
            log,
            actions: Arc::new(SessionActions::new(services, store.clone(), settings)),
            api,
            analytics,
            crash,
            push,
            chat,
            alerts,
            navigator,
            preferences,
            store,
            deep_link: DeepLinkSlot::new(),
        }
    }
}
