//! Fault containment at feature boundaries.
//!
//! Everything that runs feature-supplied code (bus listeners, dispatcher
//! fan-out, lifecycle hooks, catalog factories) goes through [`contain`] so
//! an error or a panic is turned into a value the caller logs and moves past.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

/// Why a contained call did not complete.
#[derive(Debug)]
pub enum Fault {
    /// The call returned an error.
    Error(anyhow::Error),
    /// The call panicked; the payload message is kept when it is a string.
    Panic(String),
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::Error(err) => write!(f, "{err:#}"),
            Fault::Panic(msg) => write!(f, "panicked: {msg}"),
        }
    }
}

impl std::error::Error for Fault {}

/// Run `call`, converting both `Err` and panics into a [`Fault`].
pub fn contain<R>(call: impl FnOnce() -> anyhow::Result<R>) -> Result<R, Fault> {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(Fault::Error(err)),
        Err(payload) => Err(Fault::Panic(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
