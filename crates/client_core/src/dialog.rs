/// Open/closed state of the "add new item" dialog together with its draft name.
///
/// The dialog never talks to the store; the controller reads the draft on submit and
/// calls [`AddDialog::complete_submit`] once the add succeeded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddDialog {
    state: DialogState,
    draft: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DialogState {
    #[default]
    Closed,
    Open,
}

impl AddDialog {
    pub fn state(&self) -> DialogState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == DialogState::Open
    }

    pub fn open(&mut self) {
        self.state = DialogState::Open;
    }

    /// Dismisses the dialog. The draft is kept for the next time it opens.
    pub fn close(&mut self) {
        self.state = DialogState::Closed;
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    pub(crate) fn complete_submit(&mut self) {
        self.draft.clear();
        self.state = DialogState::Closed;
    }
}
