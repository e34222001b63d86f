/*!
Hand-off point for a completed handshake's shared secret.

What a sink does with the secret (persist it, feed a keying daemon,
derive further keys) is up to the implementor.
*/

use crate::core::crypto::types::SharedSecret;
use crate::core::error::Result;

/// Consumer of a derived shared secret
pub trait SecretSink {
    /// Take ownership of the secret. It is zeroized when the sink drops it.
    fn accept(&mut self, shared_secret: SharedSecret) -> Result<()>;
}

impl<S: SecretSink + ?Sized> SecretSink for &mut S {
    fn accept(&mut self, shared_secret: SharedSecret) -> Result<()> {
        (**self).accept(shared_secret)
    }
}

impl<S: SecretSink + ?Sized> SecretSink for Box<S> {
    fn accept(&mut self, shared_secret: SharedSecret) -> Result<()> {
        (**self).accept(shared_secret)
    }
}
