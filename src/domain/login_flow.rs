use std::fmt;

/// API behaviour version pinned for client logins. Must stay exactly this literal.
pub const LEGACY_CLIENT_API_VERSION: &str = "v1.7";

/// Role of the legacy ("Edge") account, when one exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeUserRole {
    Client,
    Trainer,
    Other(String),
}

impl EdgeUserRole {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "CLIENT" => Self::Client,
            "TRAINER" => Self::Trainer,
            other => Self::Other(other.to_owned()),
        }
    }
}

/// Navigation inputs describing which accounts exist for the entered email.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoginFlowInputs {
    pub has_edge_account: bool,
    pub has_ua_account: bool,
    pub ua_account_in_edge: bool,
    pub edge_account_in_ua: bool,
    pub edge_user_role: Option<EdgeUserRole>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFlow {
    ClientLogin,
    UaLogin,
    UaRegistration,
    UaMigration,
    UaLink,
}

impl LoginFlow {
    pub fn as_label(self) -> &'static str {
        match self {
            Self::ClientLogin => "CLIENT_LOGIN",
            Self::UaLogin => "UA_LOGIN",
            Self::UaRegistration => "UA_REGISTRATION",
            Self::UaMigration => "UA_MIGRATION",
            Self::UaLink => "UA_LINK",
        }
    }

    /// Flows that first check the legacy password out-of-band.
    pub fn verifies_edge_password(self) -> bool {
        matches!(self, Self::UaMigration | Self::UaLink)
    }

    /// Flows whose "forgot password" goes through a backend reset email
    /// rather than the UA recovery page.
    pub fn resets_password_by_email(self) -> bool {
        matches!(self, Self::UaMigration | Self::UaLink | Self::ClientLogin)
    }
}

impl fmt::Display for LoginFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// The one input combination no flow covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnclassifiedLoginFlow {
    pub inputs: LoginFlowInputs,
}

impl fmt::Display for UnclassifiedLoginFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no login flow for has_edge={} has_ua={} ua_in_edge={} edge_in_ua={}",
            self.inputs.has_edge_account,
            self.inputs.has_ua_account,
            self.inputs.ua_account_in_edge,
            self.inputs.edge_account_in_ua
        )
    }
}

impl std::error::Error for UnclassifiedLoginFlow {}

/// Picks the flow for the given inputs. First matching rule wins.
pub fn classify(inputs: &LoginFlowInputs) -> Result<LoginFlow, UnclassifiedLoginFlow> {
    let LoginFlowInputs {
        has_edge_account: edge,
        has_ua_account: ua,
        ua_account_in_edge: ua_in_edge,
        edge_account_in_ua: edge_in_ua,
        ref edge_user_role,
    } = *inputs;

    if matches!(edge_user_role, Some(EdgeUserRole::Client)) {
        return Ok(LoginFlow::ClientLogin);
    }
    if ua && ua_in_edge {
        return Ok(LoginFlow::UaLogin);
    }
    if ua && !ua_in_edge && !edge {
        return Ok(LoginFlow::UaRegistration);
    }
    if !ua && edge && !edge_in_ua {
        return Ok(LoginFlow::UaMigration);
    }
    if ua && edge && !ua_in_edge && !edge_in_ua {
        return Ok(LoginFlow::UaLink);
    }

    Err(UnclassifiedLoginFlow {
        inputs: inputs.clone(),
    })
}
