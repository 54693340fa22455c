use std::{error::Error, future::Future};

use tokio::io::{AsyncRead, AsyncWrite};

use super::{
    ProtocolError,
    framing::{read_message, write_message},
    messages::{SaslCommand, SaslReply},
};

/// Carries SASL commands to the server and brings its replies back.
///
/// Implement this over whatever the server actually speaks (for a database
/// driver, its command encoding); [`JsonFrameTransport`] is the stock
/// implementation used by tests and simple peers.
pub trait SaslTransport {
    type Error: Error + Send + Sync + 'static;

    fn send(&mut self, command: &SaslCommand) -> impl Future<Output = Result<(), Self::Error>>;

    fn receive(&mut self) -> impl Future<Output = Result<SaslReply, Self::Error>>;
}

/// Length-prefixed JSON frames over a byte stream.
#[derive(Debug)]
pub struct JsonFrameTransport<S> {
    stream: S,
}

impl<S> JsonFrameTransport<S> {
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S> SaslTransport for JsonFrameTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    type Error = ProtocolError;

    async fn send(&mut self, command: &SaslCommand) -> Result<(), ProtocolError> {
        write_message(&mut self.stream, command).await
    }

    async fn receive(&mut self) -> Result<SaslReply, ProtocolError> {
        read_message(&mut self.stream).await
    }
}
