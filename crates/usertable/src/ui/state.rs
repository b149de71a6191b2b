//! UI state and its transitions.

use crate::user::{User, UserInput};

/// Number of rows shown per page.
pub const PAGE_SIZE: usize = 5;

/// Where the list view is in its load cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing has been loaded yet, or the last load failed before any data arrived.
    #[default]
    Idle,
    /// A list fetch is in flight.
    Loading,
    /// The list has been fetched and is on screen.
    Rendered,
}

/// Which submit action the form offers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormMode {
    /// Submitting creates a new user.
    #[default]
    Create,
    /// Submitting updates the user with this id.
    Edit {
        /// Id of the user being edited.
        id: String,
    },
}

/// Raw form contents, exactly as typed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormFields {
    /// Name input.
    pub name: String,
    /// Age input; validated by the server.
    pub age: String,
    /// Mobile input.
    pub mobile: String,
}

impl FormFields {
    /// Convenience constructor.
    #[must_use]
    pub fn new(name: impl Into<String>, age: impl Into<String>, mobile: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            age: age.into(),
            mobile: mobile.into(),
        }
    }

    /// Populate the form from a stored user.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self::new(user.name.clone(), user.age.to_string(), user.mobile.clone())
    }

    /// The request body this form submits.
    #[must_use]
    pub fn to_input(&self) -> UserInput {
        UserInput {
            name: Some(self.name.clone().into()),
            age: Some(self.age.clone().into()),
            mobile: Some(self.mobile.clone().into()),
        }
    }
}

/// A dismissible status message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// The last action succeeded.
    Success(String),
    /// The last action failed; the text is the server message.
    Error(String),
}

/// Something that happened: a user action or a completed network call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A full list fetch was issued.
    LoadStarted,
    /// The full list arrived.
    Loaded(Vec<User>),
    /// A page number was clicked.
    PageSelected(usize),
    /// The form inputs changed.
    FormEdited(FormFields),
    /// The user picked for editing was fetched.
    EditLoaded(User),
    /// A create request succeeded.
    Created(User),
    /// An update request succeeded.
    Updated(User),
    /// The user picked for deletion was fetched; confirmation is pending.
    DeleteRequested(User),
    /// The confirmation dialog was dismissed.
    DeleteCancelled,
    /// The delete request succeeded.
    Deleted,
    /// A request failed with this message.
    Failed(String),
    /// The status message was closed.
    StatusDismissed,
}

/// Everything the view shows. Each event produces a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    /// Load cycle of the list.
    pub phase: Phase,
    /// Full list as last fetched.
    pub users: Vec<User>,
    /// Current page, 1-based.
    pub page: usize,
    /// Create or edit.
    pub form_mode: FormMode,
    /// Form contents.
    pub form: FormFields,
    /// User awaiting delete confirmation.
    pub pending_delete: Option<User>,
    /// Status message, if not dismissed.
    pub status: Option<Status>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            users: Vec::new(),
            page: 1,
            form_mode: FormMode::Create,
            form: FormFields::default(),
            pending_delete: None,
            status: None,
        }
    }
}

impl UiState {
    /// Compute the state that follows `event`.
    #[must_use]
    pub fn apply(self, event: Event) -> Self {
        match event {
            Event::LoadStarted => Self {
                phase: Phase::Loading,
                ..self
            },
            // The current page is kept, even if it no longer has rows.
            Event::Loaded(users) => Self {
                phase: Phase::Rendered,
                users,
                ..self
            },
            Event::PageSelected(page) if page >= 1 && page <= self.page_count() => {
                Self { page, ..self }
            }
            Event::PageSelected(_) => self,
            Event::FormEdited(form) => Self { form, ..self },
            Event::EditLoaded(user) => Self {
                form: FormFields::from_user(&user),
                form_mode: FormMode::Edit { id: user.id },
                ..self
            },
            Event::Created(user) => Self {
                status: Some(Status::Success(format!(
                    "User created with Name: {}",
                    user.name
                ))),
                form: FormFields::default(),
                form_mode: FormMode::Create,
                ..self
            },
            Event::Updated(user) => Self {
                status: Some(Status::Success(format!(
                    "User updated with Name: {}",
                    user.name
                ))),
                form: FormFields::default(),
                form_mode: FormMode::Create,
                ..self
            },
            Event::DeleteRequested(user) => Self {
                pending_delete: Some(user),
                ..self
            },
            Event::DeleteCancelled => Self {
                pending_delete: None,
                ..self
            },
            Event::Deleted => Self {
                pending_delete: None,
                status: Some(Status::Success("User deleted successfully.".to_string())),
                ..self
            },
            Event::Failed(message) => Self {
                phase: if self.phase == Phase::Loading {
                    Phase::Idle
                } else {
                    self.phase
                },
                status: Some(Status::Error(message)),
                ..self
            },
            Event::StatusDismissed => Self {
                status: None,
                ..self
            },
        }
    }

    /// Number of pages needed for the full list.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.users.len().div_ceil(PAGE_SIZE)
    }

    /// Rows on the current page.
    #[must_use]
    pub fn page_users(&self) -> &[User] {
        let start = (self.page.saturating_sub(1) * PAGE_SIZE).min(self.users.len());
        let end = (start + PAGE_SIZE).min(self.users.len());
        &self.users[start..end]
    }
}
