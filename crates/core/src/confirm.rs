//! Confirmation dialog state gating destructive actions.

/// Presentational model of a confirmation dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmDialog {
    message: String,
    confirm_label: String,
    cancel_label: String,
    loading: bool,
}

impl ConfirmDialog {
    /// Default confirm button label.
    pub const DEFAULT_CONFIRM_LABEL: &'static str = "Delete";
    /// Default cancel button label.
    pub const DEFAULT_CANCEL_LABEL: &'static str = "Cancel";
    /// Confirm label shown while the action runs.
    pub const LOADING_LABEL: &'static str = "Deleting...";

    /// Dialog with the default labels.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            confirm_label: Self::DEFAULT_CONFIRM_LABEL.to_string(),
            cancel_label: Self::DEFAULT_CANCEL_LABEL.to_string(),
            loading: false,
        }
    }

    /// Override both button labels.
    #[must_use]
    pub fn with_labels(mut self, confirm: impl Into<String>, cancel: impl Into<String>) -> Self {
        self.confirm_label = confirm.into();
        self.cancel_label = cancel.into();
        self
    }

    /// Message shown to the user.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Confirm button label; reads "Deleting..." while loading.
    #[must_use]
    pub fn confirm_label(&self) -> &str {
        if self.loading {
            Self::LOADING_LABEL
        } else {
            &self.confirm_label
        }
    }

    /// Cancel button label.
    #[must_use]
    pub fn cancel_label(&self) -> &str {
        &self.cancel_label
    }

    /// Whether the confirmed action is running.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Both buttons are disabled while loading.
    #[must_use]
    pub fn buttons_enabled(&self) -> bool {
        !self.loading
    }

    /// Set the loading flag.
    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }
}

/// A dialog paired with the item it would act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation<T> {
    dialog: ConfirmDialog,
    candidate: T,
}

impl<T> Confirmation<T> {
    /// Open a confirmation for `candidate`.
    #[must_use]
    pub fn new(message: impl Into<String>, candidate: T) -> Self {
        Self {
            dialog: ConfirmDialog::new(message),
            candidate,
        }
    }

    /// The dialog model.
    #[must_use]
    pub fn dialog(&self) -> &ConfirmDialog {
        &self.dialog
    }

    /// The pending item.
    #[must_use]
    pub fn candidate(&self) -> &T {
        &self.candidate
    }

    /// Mark the action as running and hand out the candidate.
    ///
    /// Returns `None` when the action is already running.
    pub fn begin(&mut self) -> Option<&T> {
        if self.dialog.loading {
            return None;
        }
        self.dialog.loading = true;
        Some(&self.candidate)
    }

    /// Whether the dialog may be dismissed. Cancel is ignored while loading.
    #[must_use]
    pub fn can_cancel(&self) -> bool {
        !self.dialog.loading
    }
}
