//! UI flags. Local state only, no request lifecycle.

use serde::{Deserialize, Serialize};

use crate::models::NotificationKind;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub visible: bool,
    pub message: String,
    pub kind: NotificationKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UiData {
    pub night_mode: bool,
    pub search_bar_visible: bool,
    pub notification: Notification,
    pub global_loading: bool,
}

impl Default for UiData {
    fn default() -> Self {
        UiData {
            night_mode: true,
            search_bar_visible: false,
            notification: Notification::default(),
            global_loading: false,
        }
    }
}

impl UiData {
    pub fn toggle_night_mode(&mut self) {
        self.night_mode = !self.night_mode;
    }

    pub fn notify(&mut self, message: String, kind: NotificationKind) {
        self.notification = Notification {
            visible: true,
            message,
            kind,
        };
    }

    /// Hides the toast but keeps its last text
    pub fn hide_notification(&mut self) {
        self.notification.visible = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_notifications() {
        let mut ui = UiData::default();
        assert!(ui.night_mode);
        ui.toggle_night_mode();
        assert!(!ui.night_mode);

        ui.notify("Paiement réussi".into(), NotificationKind::Success);
        assert!(ui.notification.visible);
        ui.hide_notification();
        assert!(!ui.notification.visible);
        assert_eq!(ui.notification.message, "Paiement réussi");
    }
}
