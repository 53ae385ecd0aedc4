/// Errors that can occur in the transport layer.
///
/// WebSocket-level failures are wrapped in `std::io::Error` so the error
/// type stays independent of which transport features are compiled in.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Binding the listening socket failed.
    #[error("bind failed: {0}")]
    Bind(#[source] std::io::Error),

    /// Accepting a connection or its upgrade handshake failed.
    #[error("accept failed: {0}")]
    Accept(#[source] std::io::Error),

    /// Sending a frame failed; the connection is gone.
    #[error("send failed: {0}")]
    Send(#[source] std::io::Error),

    /// Receiving a frame failed.
    #[error("receive failed: {0}")]
    Receive(#[source] std::io::Error),
}
