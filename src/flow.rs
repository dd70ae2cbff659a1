// Copyright (C) 2025 Kevin Exton
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use crate::account::errors::AccountError;
use crate::account::models::Registration;
use crate::account_manager::AccountManager;
use crate::session::Session;
use crate::trip_service::{TripError, TripPlan, TripService};
use crate::validate::{is_valid_password, is_valid_phone};

/// Active tab of the unauthenticated view, addressable via `?tab=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Login,
    Register,
}

impl Tab {
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("register") => Tab::Register,
            _ => Tab::Login,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum LoginOutcome {
    /// Session is now Authenticated; carries the first name for the
    /// welcome message.
    LoggedIn { firstname: String },
    /// Generic outcome; wrong identifier and wrong password are never
    /// distinguished.
    InvalidCredentials,
}

#[derive(Debug, PartialEq)]
pub enum RegisterOutcome {
    /// Account created; the UI switches to the login tab and does not
    /// auto-authenticate.
    Created,
    Duplicate,
    /// Both validators run regardless of the other's result, so the form
    /// can surface both errors at once.
    Invalid { bad_phone: bool, bad_password: bool },
}

#[derive(Debug, PartialEq)]
pub enum ResetOutcome {
    Updated,
    MissingIdentifier,
    WeakPassword,
    PasswordMismatch,
    UnknownIdentifier,
}

#[derive(Debug)]
pub enum GenerateOutcome {
    Plan(TripPlan),
    NotAuthenticated,
    MissingInput,
    /// The completion backend failed; the request is safe to retry.
    ServiceUnavailable,
}

/// Top-level orchestration between the unauthenticated flow (login,
/// register, reset) and the authenticated flow (itinerary requests).
/// Operates on an explicit [`Session`] value owned by the hosting layer.
pub struct FlowController {
    accounts: AccountManager,
    trips: TripService,
}

impl FlowController {
    pub fn new(accounts: AccountManager, trips: TripService) -> Self {
        Self { accounts, trips }
    }

    /// `Anonymous -> Authenticated` on success; on failure the session
    /// stays Anonymous with the failed-login flag set for the next render.
    pub fn login(
        &self,
        session: &mut Session,
        identifier: &str,
        password: &str,
    ) -> Result<LoginOutcome, AccountError> {
        match self.accounts.login(identifier, password)? {
            Some(account) => {
                session.log_in(&account.username);
                Ok(LoginOutcome::LoggedIn { firstname: account.firstname })
            }
            None => {
                session.mark_login_failed();
                Ok(LoginOutcome::InvalidCredentials)
            }
        }
    }

    /// Registration requires BOTH the phone and the password validator to
    /// pass before the account manager is invoked.
    pub fn register(&self, reg: &Registration) -> Result<RegisterOutcome, AccountError> {
        let bad_phone = !is_valid_phone(&reg.mobile);
        let bad_password = !is_valid_password(&reg.password);
        if bad_phone || bad_password {
            return Ok(RegisterOutcome::Invalid { bad_phone, bad_password });
        }

        match self.accounts.register(reg) {
            Ok(_) => Ok(RegisterOutcome::Created),
            Err(AccountError::Duplicate) => Ok(RegisterOutcome::Duplicate),
            Err(e) => Err(e),
        }
    }

    pub fn show_reset_panel(&self, session: &mut Session, show: bool) {
        session.show_reset_panel = show;
    }

    /// Confirm a password reset. On success the reset panel is cleared;
    /// every rejection leaves it showing with an inline message.
    pub fn confirm_reset(
        &self,
        session: &mut Session,
        identifier: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<ResetOutcome, AccountError> {
        if identifier.is_empty() {
            return Ok(ResetOutcome::MissingIdentifier);
        }
        if !is_valid_password(new_password) {
            return Ok(ResetOutcome::WeakPassword);
        }
        if new_password != confirm_password {
            return Ok(ResetOutcome::PasswordMismatch);
        }
        if !self.accounts.identifier_exists(identifier)? {
            return Ok(ResetOutcome::UnknownIdentifier);
        }

        self.accounts.reset_password(identifier, new_password)?;
        session.show_reset_panel = false;
        Ok(ResetOutcome::Updated)
    }

    /// `Authenticated -> Anonymous`.
    pub fn logout(&self, session: &mut Session) {
        session.log_out();
    }

    /// Run the itinerary orchestration. No session transition; the flow is
    /// gated on the authenticated state.
    pub async fn generate(
        &self,
        session: &Session,
        city: &str,
        interests: &str,
    ) -> GenerateOutcome {
        if !session.logged_in {
            return GenerateOutcome::NotAuthenticated;
        }

        match self.trips.plan_trip(city, interests).await {
            Ok(plan) => GenerateOutcome::Plan(plan),
            Err(TripError::MissingInput) => GenerateOutcome::MissingInput,
            Err(TripError::Completion(e)) => {
                tracing::warn!(error = %e, "itinerary generation failed");
                GenerateOutcome::ServiceUnavailable
            }
        }
    }
}
