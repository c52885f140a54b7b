use crate::model::Location;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Error,
    Warning,
}

#[derive(Clone, Debug)]
pub struct Diag {
    pub level: Level,
    pub message: String,
    pub location: Location,
}

#[derive(Default, Debug)]
pub struct Diagnostics {
    diags: Vec<Diag>,
}

impl Diagnostics {
    pub fn push<S: Into<String>>(&mut self, level: Level, location: Location, message: S) {
        self.diags.push(Diag {
            level,
            message: message.into(),
            location,
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diags.iter().any(|d| d.level == Level::Error)
    }

    pub fn into_vec(self) -> Vec<Diag> {
        self.diags
    }
}
