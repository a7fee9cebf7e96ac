// SPDX-License-Identifier: GPL-3.0-only

//! Permission screen handlers
//!
//! Asks for camera and microphone access. A denied answer sends the user to
//! the system settings; the prompt stays up until both are granted, then the
//! camera screen replaces it.

use crate::app::AppModel;
use crate::app::state::{Screen, Task};
use crate::backends::camera::{PermissionKind, PermissionStatus};
use tracing::{debug, info, warn};

impl AppModel {
    pub(crate) fn handle_request_permission(&mut self, kind: PermissionKind) -> Task {
        let status = self.permissions.get(kind);
        if status.is_authorized() {
            debug!(permission = kind.display_name(), "Already authorized");
            return Task::none();
        }
        info!(permission = kind.display_name(), %status, "Requesting permission");
        Task::RequestPermission(kind)
    }

    pub(crate) fn handle_permission_resolved(
        &mut self,
        kind: PermissionKind,
        status: PermissionStatus,
    ) -> Task {
        self.permissions.set(kind, status);
        info!(permission = kind.display_name(), %status, "Permission resolved");

        let settings = match status {
            PermissionStatus::Denied => Task::OpenSettings,
            PermissionStatus::Restricted => {
                warn!(
                    permission = kind.display_name(),
                    "Permission restricted by policy"
                );
                Task::none()
            }
            PermissionStatus::Authorized | PermissionStatus::NotDetermined => Task::none(),
        };

        Task::batch([settings, self.navigate_if_ready()])
    }

    /// Replace the permissions screen with the camera once everything is
    /// granted. There is no way back.
    fn navigate_if_ready(&mut self) -> Task {
        if self.screen != Screen::Permissions || !self.permissions.all_authorized() {
            return Task::none();
        }
        info!("All permissions granted, opening camera");
        self.screen = Screen::Camera;
        self.sync_button_enabled()
    }
}
