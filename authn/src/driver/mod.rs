// III-IV
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Business logic for user authentication.
//!
//! Access tokens are stateless: they are HS256-signed JWTs that carry the identity of the user and
//! an expiration time.  There is no server-side record of issued tokens, so expiration is the only
//! way a token stops being valid.

use crate::model::{AccessToken, Session, User, UserId};
use derivative::Derivative;
use journeyhub_core::clocks::Clock;
use journeyhub_core::db::Db;
use journeyhub_core::driver::{DriverError, DriverResult};
use journeyhub_core::env::{get_optional_var, get_required_var};
use journeyhub_core::model::EmailAddress;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::warn;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use uuid::Uuid;

mod login;
mod register;
#[cfg(any(test, feature = "testutils"))]
pub mod testutils;

/// Default value for the `TOKEN_MAX_AGE` setting when not specified.
const DEFAULT_TOKEN_MAX_AGE_SECONDS: u64 = 24 * 60 * 60;

/// Largest value accepted for the `TOKEN_MAX_AGE` setting.
const MAX_TOKEN_MAX_AGE_SECONDS: u64 = 365 * 24 * 60 * 60;

/// Configuration options for the authentication driver.
#[derive(Clone, Derivative)]
#[derivative(Debug)]
#[cfg_attr(test, derive(PartialEq))]
pub struct AuthnOptions {
    /// Secret used to sign and verify access tokens.
    #[derivative(Debug = "ignore")]
    pub jwt_secret: String,

    /// The amount of time an access token is valid for since issuance.
    pub token_max_age: Duration,
}

impl AuthnOptions {
    /// Creates a new set of options with the given `jwt_secret` and default values for the rest.
    pub fn new<S: Into<String>>(jwt_secret: S) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_max_age: Duration::from_secs(DEFAULT_TOKEN_MAX_AGE_SECONDS),
        }
    }

    /// Creates a new set of options from environment variables.
    pub fn from_env(prefix: &str) -> Result<Self, String> {
        let jwt_secret = get_required_var::<String>(prefix, "JWT_SECRET")?;
        if jwt_secret.is_empty() {
            return Err(format!("{}_JWT_SECRET cannot be empty", prefix));
        }
        let token_max_age = get_optional_var::<Duration>(prefix, "TOKEN_MAX_AGE")?
            .unwrap_or_else(|| Duration::from_secs(DEFAULT_TOKEN_MAX_AGE_SECONDS));
        if token_max_age > Duration::from_secs(MAX_TOKEN_MAX_AGE_SECONDS) {
            return Err(format!(
                "{}_TOKEN_MAX_AGE cannot be longer than {} days",
                prefix,
                MAX_TOKEN_MAX_AGE_SECONDS / (24 * 60 * 60)
            ));
        }
        Ok(Self { jwt_secret, token_max_age })
    }
}

/// Claims carried by an access token.
#[derive(Debug, Deserialize, Serialize)]
struct Claims {
    /// Subject of the token: the user identifier.
    sub: String,

    /// User identifier, duplicated from `sub` for clients that look for this claim name.
    nameid: String,

    /// Email address of the user at issuance time.
    email: String,

    /// Random identifier of this token.
    jti: String,

    /// Issuance time in seconds since the epoch.
    iat: i64,

    /// Expiration time in seconds since the epoch.
    exp: i64,
}

/// A freshly-issued access token along with its expiration time.
#[derive(Debug)]
pub struct IssuedToken {
    /// The signed token.
    token: AccessToken,

    /// The instant at which the token stops being valid.
    expiration: OffsetDateTime,
}

impl IssuedToken {
    /// Returns the signed token.
    pub fn token(&self) -> &AccessToken {
        &self.token
    }

    /// Returns the instant at which the token stops being valid.
    pub fn expiration(&self) -> OffsetDateTime {
        self.expiration
    }

    /// Consumes the issued token and returns the signed token.
    pub fn take_token(self) -> AccessToken {
        self.token
    }
}

/// Business logic.
///
/// The public operations exposed by the driver are all "one shot": they start and commit a
/// transaction, so it's incorrect for the caller to use two separate calls.  For this reason,
/// these operations consume the driver in an attempt to minimize the possibility of executing
/// two operations.
#[derive(Clone)]
pub struct AuthnDriver {
    /// The database that the driver uses for persistence.
    db: Arc<dyn Db + Send + Sync>,

    /// Clock instance to obtain the current time.
    clock: Arc<dyn Clock + Send + Sync>,

    /// Authentication realm to return to requests.
    realm: &'static str,

    /// Options for the authentication driver.
    opts: AuthnOptions,
}

impl AuthnDriver {
    /// Creates a new driver backed by the given dependencies.
    pub fn new(
        db: Arc<dyn Db + Send + Sync>,
        clock: Arc<dyn Clock + Send + Sync>,
        realm: &'static str,
        opts: AuthnOptions,
    ) -> Self {
        Self { db, clock, realm, opts }
    }

    /// Gets the authentication realm.
    pub fn realm(&self) -> &'static str {
        self.realm
    }

    /// Issues a new signed token for `user`, valid from now until the configured maximum age.
    pub(crate) fn issue_token(&self, user: &User) -> DriverResult<IssuedToken> {
        let issued_at = self.clock.now_utc_secs();
        let expiration = time::Duration::try_from(self.opts.token_max_age)
            .ok()
            .and_then(|max_age| issued_at.checked_add(max_age))
            .ok_or_else(|| {
                DriverError::BackendError("Token maximum age is out of range".to_owned())
            })?;

        let claims = Claims {
            sub: user.id().to_string(),
            nameid: user.id().to_string(),
            email: user.email().as_str().to_owned(),
            jti: Uuid::new_v4().to_string(),
            iat: issued_at.unix_timestamp(),
            exp: expiration.unix_timestamp(),
        };

        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.opts.jwt_secret.as_bytes()),
        )
        .map_err(|e| DriverError::BackendError(format!("Failed to sign token: {}", e)))?;

        Ok(IssuedToken { token: AccessToken::new(token)?, expiration })
    }

    /// Decodes the session in `token` and validates it, returning the identity of its owner.
    pub fn get_session(&self, token: &AccessToken) -> DriverResult<Session> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = jsonwebtoken::decode::<Claims>(
            token.as_str(),
            &DecodingKey::from_secret(self.opts.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| {
            warn!("Rejecting access token: {}", e);
            DriverError::Unauthorized("Invalid access token".to_owned())
        })?;
        let claims = data.claims;

        let expiration = OffsetDateTime::from_unix_timestamp(claims.exp)
            .map_err(|_| DriverError::Unauthorized("Invalid access token".to_owned()))?;
        if self.clock.now_utc() >= expiration {
            return Err(DriverError::Unauthorized("Token expired; please log in again".to_owned()));
        }

        let user_id = UserId::parse(&claims.nameid)
            .map_err(|e| DriverError::Unauthorized(format!("Invalid access token: {}", e)))?;
        let email = EmailAddress::new(claims.email)
            .map_err(|e| DriverError::Unauthorized(format!("Invalid access token: {}", e)))?;
        Ok(Session::new(user_id, email))
    }
}
