/// Kind of an expanded occurrence without any model dependencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccurrenceKind {
    Regular,
    Exception,
}

impl OccurrenceKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Exception => "exception",
        }
    }

    #[must_use]
    pub const fn is_exception(self) -> bool {
        matches!(self, Self::Exception)
    }
}

impl std::fmt::Display for OccurrenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
