//! Upload Form State
//!
//! Plain state machine behind the generate form. Generic over the file
//! handle so it can be driven without a browser; the page uses
//! `web_sys::File`.

pub const NO_FILE_ALERT: &str = "Please upload your GA Input Excel file first!";
pub const IDLE_LABEL: &str = "Generate Schedule";
pub const BUSY_LABEL: &str = "Processing...";

#[derive(Clone, Debug, PartialEq)]
pub struct SelectedFile<F> {
    pub name: String,
    pub size: f64,
    pub handle: F,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting,
}

/// What to send to `POST /generate_schedule`
#[derive(Clone, Debug, PartialEq)]
pub struct SubmitRequest<F> {
    pub file: F,
    pub trimester: u8,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UploadForm<F> {
    file: Option<SelectedFile<F>>,
    trimester: u8,
    phase: Phase,
    highlighted: bool,
}

impl<F> Default for UploadForm<F> {
    fn default() -> Self {
        Self {
            file: None,
            trimester: 1,
            phase: Phase::Idle,
            highlighted: false,
        }
    }
}

impl<F: Clone> UploadForm<F> {
    /// Picker and drop both land here; `None` is an emptied picker
    pub fn select(&mut self, file: Option<SelectedFile<F>>) {
        self.file = file;
    }

    pub fn drag_over(&mut self) {
        self.highlighted = true;
    }

    pub fn drag_leave(&mut self) {
        self.highlighted = false;
    }

    /// Keeps the first dropped file; an empty drop changes nothing else
    pub fn drop_files(&mut self, files: Vec<SelectedFile<F>>) {
        self.highlighted = false;
        if let Some(first) = files.into_iter().next() {
            self.select(Some(first));
        }
    }

    /// Values outside 1..=3 are ignored
    pub fn set_trimester(&mut self, trimester: u8) {
        if (1..=3).contains(&trimester) {
            self.trimester = trimester;
        }
    }

    /// Start a submission, or the alert to show when no file is selected
    pub fn begin_submit(&mut self) -> Result<SubmitRequest<F>, &'static str> {
        let file = self.file.as_ref().ok_or(NO_FILE_ALERT)?;
        let request = SubmitRequest {
            file: file.handle.clone(),
            trimester: self.trimester,
        };
        self.phase = Phase::Submitting;
        Ok(request)
    }

    /// Back to idle whatever happened; a failure becomes the alert text
    pub fn finish<T>(&mut self, result: Result<T, String>) -> Result<T, String> {
        self.phase = Phase::Idle;
        result.map_err(|message| format!("Error: {}", message))
    }

    pub fn display_name(&self) -> String {
        self.file
            .as_ref()
            .map(|f| format!("Selected: {}", f.name))
            .unwrap_or_default()
    }

    pub fn trimester(&self) -> u8 {
        self.trimester
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == Phase::Submitting
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    pub fn button_label(&self) -> &'static str {
        match self.phase {
            Phase::Idle => IDLE_LABEL,
            Phase::Submitting => BUSY_LABEL,
        }
    }
}
