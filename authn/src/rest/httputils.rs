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

//! Utilities to deal with HTTP authorization.

use crate::model::AccessToken;
use http::header::HeaderMap;
use journeyhub_core::rest::{RestError, RestResult, get_unique_header};

/// Validates that the `Authorization` HTTP header contains a textual payload for the
/// `exp_scheme` scheme and returns it.
fn get_authorization_header<'a>(
    headers: &'a HeaderMap,
    exp_scheme: &'static str,
    exp_realm: &'static str,
) -> RestResult<&'a str> {
    let authz = match get_unique_header(headers, "Authorization") {
        Ok(Some(value)) => value,
        Ok(None) => {
            return Err(RestError::Unauthorized {
                scheme: exp_scheme,
                realm: exp_realm,
                message: "Missing Authorization header".to_owned(),
            });
        }
        Err(e) => {
            return Err(RestError::Unauthorized {
                scheme: exp_scheme,
                realm: exp_realm,
                message: e.to_string(),
            });
        }
    };

    let authz = match authz.to_str() {
        Ok(value) => value,
        Err(e) => {
            return Err(RestError::Unauthorized {
                scheme: exp_scheme,
                realm: exp_realm,
                message: format!("Bad encoding in Authorization header: {}", e),
            });
        }
    };

    let mut fields = authz.splitn(2, ' ');
    let scheme = match fields.next() {
        Some(s) if !s.is_empty() => s,
        _ => {
            return Err(RestError::Unauthorized {
                scheme: exp_scheme,
                realm: exp_realm,
                message: "Bad Authorization header: missing scheme".to_owned(),
            });
        }
    };
    let payload = match fields.next() {
        Some(s) => s,
        None => {
            return Err(RestError::Unauthorized {
                scheme: exp_scheme,
                realm: exp_realm,
                message: "Bad Authorization header: missing payload".to_owned(),
            });
        }
    };
    assert!(fields.next().is_none());

    if scheme != exp_scheme {
        return Err(RestError::Unauthorized {
            scheme: exp_scheme,
            realm: exp_realm,
            message: "Unsupported scheme".to_owned(),
        });
    }

    Ok(payload)
}

/// Checks if the request has an authorization header.
pub fn has_bearer_auth(headers: &HeaderMap, exp_realm: &'static str) -> RestResult<bool> {
    match get_unique_header(headers, "Authorization") {
        Ok(Some(_)) => Ok(true),
        Ok(None) => Ok(false),
        Err(e) => Err(RestError::Unauthorized {
            scheme: "Bearer",
            realm: exp_realm,
            message: e.to_string(),
        }),
    }
}

/// Assumes that the `headers` contain a bearer access token and extracts it.
pub fn get_bearer_auth(headers: &HeaderMap, exp_realm: &'static str) -> RestResult<AccessToken> {
    let payload = get_authorization_header(headers, "Bearer", exp_realm)?;
    match AccessToken::new(payload) {
        Ok(token) => Ok(token),
        Err(e) => Err(RestError::Unauthorized {
            scheme: "Bearer",
            realm: exp_realm,
            message: e.to_string(),
        }),
    }
}
