use std::path::PathBuf;

/// Maximum number of log lines kept in the status panel.
const MAX_LOG_LINES: usize = 200;

/// UI-only state; everything about the image and boxes lives in the controller.
#[derive(Default)]
pub struct UIState {
    pub file_path: Option<PathBuf>,
    /// A file is being decoded on the loader thread.
    pub loading: bool,
    pub log_messages: Vec<String>,
    pub show_about: bool,
}

impl UIState {
    pub fn add_log(&mut self, msg: String) {
        self.log_messages.push(msg);
        if self.log_messages.len() > MAX_LOG_LINES {
            let excess = self.log_messages.len() - MAX_LOG_LINES;
            self.log_messages.drain(..excess);
        }
    }
}
