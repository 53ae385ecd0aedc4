//! Integration tests for the WebSocket transport, running a real
//! listener and a real tungstenite client over the loopback interface.

#[cfg(feature = "websocket")]
mod websocket {
    use futures_util::{SinkExt, StreamExt};
    use hokm_transport::WsListener;
    use tokio_tungstenite::tungstenite::Message;

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    async fn connect_client(addr: std::net::SocketAddr) -> ClientWs {
        let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .expect("client should connect");
        ws
    }

    /// Binds on an OS-assigned port and pairs up a server-side
    /// connection with a client stream.
    async fn accepted_pair() -> (hokm_transport::WsConnection, ClientWs) {
        let mut listener = WsListener::bind("127.0.0.1:0").await.expect("should bind");
        let addr = listener.local_addr().expect("should have an address");
        let accept = tokio::spawn(async move { listener.accept().await });
        let client = connect_client(addr).await;
        let conn = accept
            .await
            .expect("accept task should complete")
            .expect("should accept");
        (conn, client)
    }

    #[tokio::test]
    async fn test_text_flows_both_directions() {
        let (conn, mut client) = accepted_pair().await;
        let (mut tx, mut rx) = conn.split();

        tx.send_text("hello from server".into())
            .await
            .expect("send should succeed");
        let msg = client.next().await.unwrap().unwrap();
        assert_eq!(msg.into_text().unwrap().as_str(), "hello from server");

        client
            .send(Message::Text("hello from client".into()))
            .await
            .unwrap();
        let got = rx.recv_text().await.expect("recv should succeed");
        assert_eq!(got.as_deref(), Some("hello from client"));
    }

    #[tokio::test]
    async fn test_binary_utf8_is_accepted_as_text() {
        let (conn, mut client) = accepted_pair().await;
        let (_tx, mut rx) = conn.split();

        client
            .send(Message::Binary(b"{\"type\":\"Disconnect\"}".to_vec().into()))
            .await
            .unwrap();
        let got = rx.recv_text().await.unwrap();
        assert_eq!(got.as_deref(), Some("{\"type\":\"Disconnect\"}"));
    }

    #[tokio::test]
    async fn test_ping_frames_are_skipped() {
        let (conn, mut client) = accepted_pair().await;
        let (_tx, mut rx) = conn.split();

        client
            .send(Message::Ping(b"keepalive".to_vec().into()))
            .await
            .unwrap();
        client.send(Message::Text("after ping".into())).await.unwrap();

        let got = rx.recv_text().await.unwrap();
        assert_eq!(got.as_deref(), Some("after ping"));
    }

    #[tokio::test]
    async fn test_client_close_yields_none() {
        let (conn, mut client) = accepted_pair().await;
        let (_tx, mut rx) = conn.split();

        client.close(None).await.unwrap();
        assert!(rx.recv_text().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sender_works_while_receiver_is_parked() {
        let (conn, mut client) = accepted_pair().await;
        let (mut tx, mut rx) = conn.split();

        // Park the receiver on a read, then push frames out through
        // the sender half. If send needed the receiver's lock this
        // would deadlock.
        let reader = tokio::spawn(async move { rx.recv_text().await });
        for i in 0..3 {
            tx.send_text(format!("frame {i}")).await.unwrap();
        }
        for i in 0..3 {
            let msg = client.next().await.unwrap().unwrap();
            assert_eq!(msg.into_text().unwrap().as_str(), format!("frame {i}"));
        }

        client.send(Message::Text("done".into())).await.unwrap();
        let got = reader.await.unwrap().unwrap();
        assert_eq!(got.as_deref(), Some("done"));
    }

    #[tokio::test]
    async fn test_connection_ids_are_unique() {
        let (a, _ca) = accepted_pair().await;
        let (b, _cb) = accepted_pair().await;
        assert_ne!(a.id(), b.id());
    }
}
