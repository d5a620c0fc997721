#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    Spin,
    ClearHistory,
    ConfigReload,
}

impl AppEvent {
    /// Parses one line of the command socket protocol.
    pub fn from_command(line: &str) -> Option<Self> {
        match line.trim() {
            "spin" => Some(Self::Spin),
            "clear-history" => Some(Self::ClearHistory),
            "reload" => Some(Self::ConfigReload),
            _ => None,
        }
    }

    pub fn as_command(self) -> &'static str {
        match self {
            Self::Spin => "spin",
            Self::ClearHistory => "clear-history",
            Self::ConfigReload => "reload",
        }
    }
}
