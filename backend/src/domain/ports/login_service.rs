//! Driving port for authentication.
//!
//! Handlers only need a stable [`UserId`] for the caller. Identity providers
//! live behind [`LoginService`]; the fixture implementation knows a handful
//! of development accounts.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Error, LoginCredentials, UserId};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user id.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error>;
}

/// Development account known to [`FixtureLoginService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixtureAccount {
    /// Login name.
    pub username: &'static str,
    /// Password accepted for the account.
    pub password: &'static str,
    /// Stable identifier issued on login.
    pub user_id: UserId,
}

/// Accounts accepted by [`FixtureLoginService`].
pub const FIXTURE_ACCOUNTS: [FixtureAccount; 2] = [
    FixtureAccount {
        username: "alice",
        password: "password",
        user_id: UserId::from_uuid(Uuid::from_u128(0x5a1c_e000_0000_4000_8000_0000_0000_0001)),
    },
    FixtureAccount {
        username: "bob",
        password: "password",
        user_id: UserId::from_uuid(Uuid::from_u128(0xb0b0_0000_0000_4000_8000_0000_0000_0002)),
    },
];

/// In-memory authenticator for development and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLoginService;

#[async_trait]
impl LoginService for FixtureLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        FIXTURE_ACCOUNTS
            .iter()
            .find(|account| {
                account.username == credentials.username()
                    && account.password == credentials.password()
            })
            .map(|account| account.user_id)
            .ok_or_else(|| Error::unauthorized("invalid credentials"))
    }
}

/// Authenticator that refuses every login.
///
/// Wired in when no identity provider is configured for a deployment that
/// must not accept the fixture accounts.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledLoginService;

#[async_trait]
impl LoginService for DisabledLoginService {
    async fn authenticate(&self, _credentials: &LoginCredentials) -> Result<UserId, Error> {
        Err(Error::unauthorized("login is disabled on this deployment"))
    }
}
