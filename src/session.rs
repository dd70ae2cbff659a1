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

/// Transient per-client session state.
///
/// An explicit value passed into and mutated by controller operations; the
/// hosting HTTP layer keys one per connected client. Invariant: `username`
/// is non-empty if and only if `logged_in` is true.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub logged_in: bool,
    pub username: String,
    /// Whether the password-reset panel is showing (Anonymous sub-state).
    pub show_reset_panel: bool,
    /// Set on a failed login, consumed once by the next render.
    login_failed: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log_in(&mut self, username: &str) {
        debug_assert!(!username.is_empty());
        self.logged_in = true;
        self.username = username.to_string();
        self.login_failed = false;
        self.show_reset_panel = false;
    }

    /// Return to the Anonymous state, discarding all sub-state.
    pub fn log_out(&mut self) {
        *self = Session::new();
    }

    /// Whether the session is indistinguishable from a fresh one. Hosting
    /// layers need not retain an empty session between requests.
    pub fn is_empty(&self) -> bool {
        !self.logged_in && !self.show_reset_panel && !self.login_failed
    }

    pub fn mark_login_failed(&mut self) {
        self.login_failed = true;
    }

    /// Read and clear the failed-login flag. The warning renders exactly
    /// once after a failed attempt.
    pub fn take_login_failed(&mut self) -> bool {
        std::mem::take(&mut self.login_failed)
    }
}
