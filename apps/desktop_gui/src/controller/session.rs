//! Session state and the operations behind every button on the board.

use shared::{
    domain::{parse_announcement_id, Announcement, Screen},
    error::{BoardError, BoardResult},
};
use storage::AnnouncementStore;
use tokio::runtime::Runtime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    LoggedIn,
}

impl SessionState {
    pub fn screen(self) -> Screen {
        match self {
            SessionState::LoggedOut => Screen::Login,
            SessionState::LoggedIn => Screen::Main,
        }
    }
}

/// Text typed into the main screen's inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInputs {
    pub new_msg: String,
    pub update_id: String,
    pub update_msg: String,
}

/// Owns the store and the session. Store calls block the calling thread on
/// the controller's current-thread runtime.
pub struct SessionController {
    store: Box<dyn AnnouncementStore>,
    runtime: Runtime,
    store_closed: bool,
    allowed_authors: Vec<String>,
    selected_author: String,
    state: SessionState,
    announcements: Vec<Announcement>,
    form: FormInputs,
    status: String,
}

impl SessionController {
    pub fn new(
        runtime: Runtime,
        store: Box<dyn AnnouncementStore>,
        allowed_authors: Vec<String>,
    ) -> BoardResult<Self> {
        let Some(first) = allowed_authors.first().cloned() else {
            return Err(BoardError::Config(
                "allowed_authors must name at least one author".into(),
            ));
        };
        Ok(Self {
            store,
            runtime,
            store_closed: false,
            allowed_authors,
            selected_author: first,
            state: SessionState::LoggedOut,
            announcements: Vec::new(),
            form: FormInputs::default(),
            status: "Not logged in".to_string(),
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn screen(&self) -> Screen {
        self.state.screen()
    }

    pub fn allowed_authors(&self) -> &[String] {
        &self.allowed_authors
    }

    pub fn selected_author(&self) -> &str {
        &self.selected_author
    }

    pub fn announcements(&self) -> &[Announcement] {
        &self.announcements
    }

    pub fn form(&self) -> &FormInputs {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormInputs {
        &mut self.form
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn select_user(&mut self, name: &str) -> BoardResult<()> {
        if !self.allowed_authors.iter().any(|author| author == name) {
            return Err(BoardError::validation(format!(
                "'{name}' is not one of the allowed users"
            )));
        }
        self.selected_author = name.to_string();
        Ok(())
    }

    /// Switches to the main screen and loads the list. A failed load is
    /// returned, but the switch still happens.
    pub fn enter_main(&mut self) -> BoardResult<()> {
        if self.state == SessionState::LoggedOut {
            self.state = SessionState::LoggedIn;
            tracing::info!(author = %self.selected_author, "entered main screen");
        }
        self.refresh()
    }

    pub fn logout(&mut self) {
        if self.state == SessionState::LoggedIn {
            tracing::info!(author = %self.selected_author, "logged out");
        }
        self.state = SessionState::LoggedOut;
        self.form = FormInputs::default();
        self.announcements.clear();
        self.status = "Signed out".to_string();
    }

    pub fn refresh(&mut self) -> BoardResult<()> {
        let rows = self.runtime.block_on(self.store.list_all())?;
        self.status = format!("Loaded {} announcements", rows.len());
        self.announcements = rows;
        Ok(())
    }

    pub fn add_announcement(&mut self, msg: &str) -> BoardResult<()> {
        self.require_logged_in()?;
        if msg.is_empty() {
            return Err(BoardError::validation("Enter a message!"));
        }

        let id = self
            .runtime
            .block_on(self.store.insert(&self.selected_author, msg))?;
        self.refresh()?;
        self.form.new_msg.clear();
        self.status = match id {
            Some(id) => format!("Added announcement #{id}"),
            None => "Added announcement".to_string(),
        };
        Ok(())
    }

    pub fn update_announcement(&mut self, raw_id: &str, msg: &str) -> BoardResult<()> {
        self.require_logged_in()?;
        let id = parse_announcement_id(raw_id)
            .ok_or_else(|| BoardError::validation("Enter a valid ID (a number)!"))?;
        if msg.is_empty() {
            return Err(BoardError::validation("Enter a message!"));
        }

        let affected = self
            .runtime
            .block_on(self.store.update(id, &self.selected_author, msg))?;
        if affected == 0 {
            return Err(BoardError::NotFound(id));
        }
        self.refresh()?;
        self.form.update_id.clear();
        self.form.update_msg.clear();
        self.status = format!("Updated announcement #{id}");
        Ok(())
    }

    /// Closes the store connection. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if self.store_closed {
            return;
        }
        self.store_closed = true;
        self.runtime.block_on(self.store.close());
    }

    fn require_logged_in(&self) -> BoardResult<()> {
        match self.state {
            SessionState::LoggedIn => Ok(()),
            SessionState::LoggedOut => Err(BoardError::validation("Choose a user first")),
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
