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
//! Append-only log of itinerary requests and their aggregated results.
//!
//! One timestamped line per request, no rotation. This is an application
//! artifact, distinct from the tracing-based diagnostic logs.

use chrono::Utc;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

pub struct InteractionLogger {
    file: Mutex<File>,
}

impl InteractionLogger {
    pub fn open<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file: Mutex::new(file) })
    }

    /// Append one combined entry. A write failure is reported via tracing
    /// and never propagated to the caller.
    pub fn log(&self, request: &str, response: &str) {
        let line = format!(
            "{} - INFO - User Input: {} | Response: {}\n",
            Utc::now().format("%Y-%m-%d %H:%M:%S"),
            request,
            response
        );
        let mut file = self.file.lock().expect("interaction log mutex poisoned");
        if let Err(e) = file.write_all(line.as_bytes()) {
            tracing::warn!(error = %e, "failed to append interaction log entry");
        }
    }
}
