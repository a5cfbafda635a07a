//! Integration tests for the WebSocket transport.
//!
//! These spin up a real listener on an OS-assigned port and drive it
//! with a `tokio-tungstenite` client.

#[cfg(feature = "websocket")]
mod websocket {
    use std::sync::Arc;
    use std::time::Duration;

    use bingo_transport::{
        Connection, Pending, Transport, TransportError, WebSocketConnection, WebSocketTransport,
    };
    use futures_util::{SinkExt, StreamExt};
    use tokio_tungstenite::tungstenite::Message;

    type ClientWs =
        tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

    /// Binds on port 0, connects one client, and returns both ends.
    async fn pair() -> (WebSocketConnection, ClientWs) {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("bound address");

        let server = tokio::spawn(async move {
            let pending = transport.accept().await.expect("should accept");
            pending
                .upgrade(Duration::from_secs(5))
                .await
                .expect("should upgrade")
        });
        let (client, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .expect("client should connect");
        let conn = server.await.expect("accept task");
        (conn, client)
    }

    #[tokio::test]
    async fn test_websocket_accept_and_send_receive() {
        let (server_conn, mut client_ws) = pair().await;
        assert!(server_conn.id().into_inner() > 0);
        assert!(server_conn.peer_addr().ip().is_loopback());

        server_conn
            .send(br#"{"event":"error"}"#)
            .await
            .expect("send should succeed");
        let msg = client_ws.next().await.unwrap().unwrap();
        assert!(msg.is_text(), "UTF-8 payloads go out as text frames");
        assert_eq!(msg.into_data().as_ref(), br#"{"event":"error"}"#);

        client_ws
            .send(Message::Text("hello from client".into()))
            .await
            .unwrap();
        let received = server_conn
            .recv()
            .await
            .expect("recv should succeed")
            .expect("should have data");
        assert_eq!(received, b"hello from client");

        server_conn.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn test_websocket_non_utf8_goes_out_as_binary() {
        let (server_conn, mut client_ws) = pair().await;
        server_conn.send(&[0xff, 0x00, 0xfe]).await.unwrap();
        let msg = client_ws.next().await.unwrap().unwrap();
        assert!(msg.is_binary());
        assert_eq!(msg.into_data().as_ref(), &[0xff, 0x00, 0xfe]);
    }

    #[tokio::test]
    async fn test_websocket_recv_returns_none_on_client_close() {
        let (server_conn, mut client_ws) = pair().await;
        client_ws.send(Message::Close(None)).await.unwrap();

        let result = server_conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }

    #[tokio::test]
    async fn test_send_does_not_wait_for_pending_recv() {
        let (server_conn, mut client_ws) = pair().await;
        let server_conn = Arc::new(server_conn);

        // Park a reader on the connection; the client sends nothing yet.
        let reader = {
            let conn = Arc::clone(&server_conn);
            tokio::spawn(async move { conn.recv().await })
        };
        tokio::task::yield_now().await;

        tokio::time::timeout(Duration::from_secs(2), server_conn.send(b"broadcast"))
            .await
            .expect("send must not block behind recv")
            .expect("send should succeed");
        let msg = client_ws.next().await.unwrap().unwrap();
        assert_eq!(msg.into_data().as_ref(), b"broadcast");

        client_ws.send(Message::Text("late".into())).await.unwrap();
        let got = reader.await.unwrap().unwrap();
        assert_eq!(got.as_deref(), Some(&b"late"[..]));
    }

    #[tokio::test]
    async fn test_silent_peer_does_not_block_accept() {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("bound address");

        // Connects over TCP and never sends the upgrade request.
        let _silent = tokio::net::TcpStream::connect(addr).await.unwrap();
        let silent = transport.accept().await.expect("tcp accept");
        assert!(silent.peer_addr().ip().is_loopback());

        let client = tokio::spawn(async move {
            tokio_tungstenite::connect_async(format!("ws://{addr}")).await
        });
        let next = tokio::time::timeout(Duration::from_secs(2), transport.accept())
            .await
            .expect("second accept must not wait on the silent peer")
            .expect("tcp accept");
        let conn = next
            .upgrade(Duration::from_secs(5))
            .await
            .expect("second peer upgrades");
        assert!(conn.id().into_inner() > 0);
        assert!(client.await.unwrap().is_ok());

        let err = silent
            .upgrade(Duration::from_millis(100))
            .await
            .err()
            .expect("silent peer times out");
        assert!(matches!(err, TransportError::Handshake(_)));
    }
}
