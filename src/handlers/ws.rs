use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info};
use tokio::sync::mpsc;

use crate::handlers::relay::RelaySession;
use crate::{ConnId, SharedState};

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<SharedState>) -> Response {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

async fn handle_connection(socket: WebSocket, state: SharedState) {
    let conn_id: ConnId = uuid::Uuid::new_v4().to_string();
    debug!("WebSocket connection {} established", conn_id);

    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut session = RelaySession::new(conn_id.clone(), tx.clone());

    loop {
        tokio::select! {
            msg_opt = ws_receiver.next() => {
                let text = match msg_opt {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                        Ok(text) => text,
                        Err(_) => continue,
                    },
                    // tungstenite answers pings itself.
                    Some(Ok(Message::Ping(_))) => continue,
                    Some(Ok(Message::Close(_))) => {
                        info!("Client closed connection");
                        break;
                    }
                    Some(Ok(Message::Pong(_))) => continue,
                    Some(Err(e)) => {
                        error!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                };
                let outcome = session.handle_text(&text, &state.registry).await;
                debug!("{} <- {:?}", conn_id, outcome);
            }
            _ = &mut send_task => break,
        }
    }

    session.close(&state.registry).await;
    send_task.abort();
}
