//! UI actions and error modeling for the announcement board controller.

use shared::error::{BoardError, ErrorCode};

/// What the user asked for during one frame. Form contents are read from
/// the controller when the action is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    SelectUser(String),
    EnterMain,
    Logout,
    AddAnnouncement,
    UpdateAnnouncement,
    Refresh,
}

impl UiAction {
    pub fn name(&self) -> &'static str {
        match self {
            UiAction::SelectUser(_) => "select_user",
            UiAction::EnterMain => "enter_main",
            UiAction::Logout => "logout",
            UiAction::AddAnnouncement => "add_announcement",
            UiAction::UpdateAnnouncement => "update_announcement",
            UiAction::Refresh => "refresh",
        }
    }

    pub fn context(&self) -> UiErrorContext {
        match self {
            UiAction::SelectUser(_) | UiAction::EnterMain | UiAction::Logout => {
                UiErrorContext::Login
            }
            UiAction::AddAnnouncement => UiErrorContext::AddAnnouncement,
            UiAction::UpdateAnnouncement => UiErrorContext::UpdateAnnouncement,
            UiAction::Refresh => UiErrorContext::Refresh,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    Startup,
    Login,
    AddAnnouncement,
    UpdateAnnouncement,
    Refresh,
}

/// An error waiting to be shown in the modal dialog.
#[derive(Debug, Clone)]
pub struct UiError {
    code: ErrorCode,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_board_error(context: UiErrorContext, err: &BoardError) -> Self {
        Self {
            code: err.code(),
            context,
            message: err.to_string(),
        }
    }

    pub fn title(&self) -> &'static str {
        self.code.title()
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
