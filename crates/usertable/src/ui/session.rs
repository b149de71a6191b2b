//! Drives the UI state through API calls.

use tracing::debug;

use super::state::{Event, FormFields, FormMode, UiState};
use crate::client::ApiClient;

/// One user's view of the table.
///
/// Every mutation is followed by a full re-fetch of the list. Failures are
/// recorded in the state's status and never retried.
#[derive(Debug)]
pub struct Session {
    client: ApiClient,
    state: UiState,
}

impl Session {
    /// Start a session with an empty view.
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: UiState::default(),
        }
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> &UiState {
        &self.state
    }

    fn dispatch(&mut self, event: Event) {
        debug!(?event, "UI event");
        self.state = std::mem::take(&mut self.state).apply(event);
    }

    /// Fetch the full list.
    pub async fn refresh(&mut self) {
        self.dispatch(Event::LoadStarted);
        match self.client.list().await {
            Ok(users) => self.dispatch(Event::Loaded(users)),
            Err(e) => self.dispatch(Event::Failed(e.to_string())),
        }
    }

    /// Show another page of the already fetched list.
    pub fn select_page(&mut self, page: usize) {
        self.dispatch(Event::PageSelected(page));
    }

    /// Replace the form contents.
    pub fn edit_form(&mut self, form: FormFields) {
        self.dispatch(Event::FormEdited(form));
    }

    /// Close the status message.
    pub fn dismiss_status(&mut self) {
        self.dispatch(Event::StatusDismissed);
    }

    /// Fetch a user and switch the form into update mode for it.
    pub async fn begin_edit(&mut self, id: &str) {
        match self.client.get(id).await {
            Ok(user) => self.dispatch(Event::EditLoaded(user)),
            Err(e) => self.dispatch(Event::Failed(e.to_string())),
        }
    }

    /// Submit the form: create in create mode, update in edit mode.
    pub async fn submit(&mut self) {
        self.dispatch(Event::StatusDismissed);
        let input = self.state.form.to_input();

        let result = match &self.state.form_mode {
            FormMode::Create => self.client.create(&input).await.map(Event::Created),
            FormMode::Edit { id } => self.client.update(id, &input).await.map(Event::Updated),
        };

        match result {
            Ok(event) => {
                self.dispatch(event);
                self.refresh().await;
            }
            Err(e) => self.dispatch(Event::Failed(e.to_string())),
        }
    }

    /// Fetch a user so the delete confirmation can name it.
    pub async fn request_delete(&mut self, id: &str) {
        match self.client.get(id).await {
            Ok(user) => self.dispatch(Event::DeleteRequested(user)),
            Err(e) => self.dispatch(Event::Failed(e.to_string())),
        }
    }

    /// Dismiss the delete confirmation.
    pub fn cancel_delete(&mut self) {
        self.dispatch(Event::DeleteCancelled);
    }

    /// Delete the user awaiting confirmation, if any.
    pub async fn confirm_delete(&mut self) {
        let Some(id) = self.state.pending_delete.as_ref().map(|u| u.id.clone()) else {
            return;
        };
        match self.client.delete(&id).await {
            Ok(()) => {
                self.dispatch(Event::Deleted);
                self.refresh().await;
            }
            Err(e) => self.dispatch(Event::Failed(e.to_string())),
        }
    }
}
