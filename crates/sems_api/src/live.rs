//! WebSocket transport for live station updates.

use axum::{
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use sems_core::StationSnapshot;
use sems_engine::{Engine, PushError, SnapshotSink, encode_snapshot};
use tracing::debug;

use crate::AppState;

/// Sending half of a socket, one JSON text frame per snapshot.
struct WsSink(SplitSink<WebSocket, Message>);

impl SnapshotSink for WsSink {
    async fn push(&mut self, snapshot: StationSnapshot) -> Result<(), PushError> {
        let text = encode_snapshot(&snapshot)?;
        self.0
            .send(Message::Text(text.into()))
            .await
            .map_err(|_| PushError::Disconnected)
    }
}

/// Upgrade to a live feed of one station
pub async fn station_live(
    State(app_state): State<AppState>,
    Path(station_id): Path<String>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| stream_station(socket, app_state.engine, station_id))
}

async fn stream_station(socket: WebSocket, engine: Engine, station_id: String) {
    let (sender, mut receiver) = socket.split();

    // Clients never need to talk on this channel; reading only detects close.
    let closed = async move {
        while let Some(message) = receiver.next().await {
            match message {
                Ok(Message::Close(_)) => break,
                Err(error) => {
                    debug!("WebSocket receive error: {}", error);
                    break;
                }
                _ => {}
            }
        }
    };

    engine
        .run_subscriber(&station_id, WsSink(sender), closed)
        .await;
}
