//! Applies UI actions to the session controller.

use crate::controller::events::{UiAction, UiError};
use crate::controller::session::SessionController;

pub fn dispatch_action(controller: &mut SessionController, action: UiAction) -> Result<(), UiError> {
    let action_name = action.name();
    let context = action.context();
    tracing::debug!(action = action_name, state = ?controller.state(), "applying ui action");

    let result = match action {
        UiAction::SelectUser(name) => controller.select_user(&name),
        UiAction::EnterMain => controller.enter_main(),
        UiAction::Logout => {
            controller.logout();
            Ok(())
        }
        UiAction::AddAnnouncement => {
            let msg = controller.form().new_msg.clone();
            controller.add_announcement(&msg)
        }
        UiAction::UpdateAnnouncement => {
            let form = controller.form();
            let (raw_id, msg) = (form.update_id.clone(), form.update_msg.clone());
            controller.update_announcement(&raw_id, &msg)
        }
        UiAction::Refresh => controller.refresh(),
    };

    result.map_err(|err| {
        tracing::warn!(action = action_name, code = ?err.code(), error = %err, "action failed");
        UiError::from_board_error(context, &err)
    })
}
