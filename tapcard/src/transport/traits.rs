// tapcard/src/transport/traits.rs

use crate::error::TransportError;
use crate::protocol::{Command, Response};

/// Exchange one command APDU for one response APDU.
///
/// Blocking from the caller's point of view. Calls are sequential: `&mut
/// self` rules out a second exchange while one is outstanding. A non-success
/// status word is returned as a normal response.
pub trait ApduTransport {
    /// Send `command` and wait for its response.
    fn exchange(&mut self, command: &Command) -> Result<Response, TransportError>;
}

impl<T: ApduTransport + ?Sized> ApduTransport for Box<T> {
    fn exchange(&mut self, command: &Command) -> Result<Response, TransportError> {
        (**self).exchange(command)
    }
}
