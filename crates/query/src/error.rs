use std::error::Error;
use std::fmt::{Display, Formatter};


/// The query ran fine, but no rows matched the given filter.
/// A semantic "no data" signal, not a fault.
#[derive(Debug)]
pub struct NotExist;


impl Display for NotExist {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "no rows exist for the given filter")
    }
}


impl Error for NotExist {}


/// Caller-supplied arguments violate an operation precondition.
#[derive(Debug)]
pub struct ValidationError {
    pub message: String
}


impl ValidationError {
    pub fn new<S: ToString>(message: S) -> Self {
        Self {
            message: message.to_string()
        }
    }
}


impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ValidationError: {}", self.message)
    }
}


impl Error for ValidationError {}
