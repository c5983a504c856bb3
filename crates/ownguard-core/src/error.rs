use std::fmt;
use std::io;

/// Failure of a check. Findings are never errors; they are issues.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("operation was canceled")]
    Canceled,

    #[error("`{command}` failed ({status}): {stderr}")]
    Git {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Multiple(#[from] MultiError),
}

impl CheckError {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        CheckError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, CheckError::Canceled)
    }

    /// Keep both failures, flattening nested aggregates.
    pub fn combine(self, other: CheckError) -> CheckError {
        let mut all = MultiError::default();
        all.push(self);
        all.push(other);
        CheckError::Multiple(all)
    }
}

/// One or more independent errors, rendered together.
#[derive(Debug, Default)]
pub struct MultiError {
    errors: Vec<CheckError>,
}

impl MultiError {
    pub fn push(&mut self, error: CheckError) {
        match error {
            CheckError::Multiple(nested) => self.errors.extend(nested.errors),
            other => self.errors.push(other),
        }
    }

    pub fn errors(&self) -> &[CheckError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok(())` when empty, the single error when one, the aggregate otherwise.
    pub fn into_result(mut self) -> Result<(), CheckError> {
        match self.errors.len() {
            0 => Ok(()),
            1 => Err(self.errors.remove(0)),
            _ => Err(CheckError::Multiple(self)),
        }
    }
}

impl fmt::Display for MultiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let [only] = self.errors.as_slice() {
            return write!(f, "1 error occurred:\n\t* {only}");
        }
        write!(f, "{} errors occurred:", self.errors.len())?;
        for err in &self.errors {
            write!(f, "\n\t* {err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for MultiError {}
