//! The server-list status listener.
//!
//! Speaks just enough of the wire protocol to answer pings: handshake,
//! status request/response and the echo ping. Play-state sessions are the
//! session layer's concern, not this binary's.

use std::io::Cursor;

use basalt_protocol::{ConnectionState, DecodeError, Frame, ReadFrom, VarInt, WriteTo};
use tokio::net::{TcpListener, TcpStream};

/// Protocol version reported in the status payload.
const PROTOCOL_VERSION: i32 = 5;

/// Static status info the listener serves.
#[derive(Debug, Clone)]
pub struct StatusInfo {
    /// Server list description line.
    pub motd: String,
    /// Player cap.
    pub max_players: i32,
    /// Online player count.
    pub online_players: i32,
}

impl StatusInfo {
    fn to_json(&self) -> String {
        serde_json::json!({
            "version": { "name": "1.7.10", "protocol": PROTOCOL_VERSION },
            "players": { "max": self.max_players, "online": self.online_players },
            "description": { "text": self.motd },
        })
        .to_string()
    }
}

/// Accept loop: handles each connection until the socket closes.
pub async fn run_listener(bind: &str, info: StatusInfo) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind).await?;
    log::info!("status listener on {bind}");
    loop {
        let (stream, peer) = listener.accept().await?;
        let info = info.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, &info).await {
                log::debug!("status session with {peer} ended: {e}");
            }
        });
    }
}

async fn handle_connection(mut stream: TcpStream, info: &StatusInfo) -> Result<(), DecodeError> {
    // Handshake: id 0 with protocol, address, port, next state.
    let handshake = Frame::read_async(&mut stream).await?;
    if handshake.id != 0 {
        return Err(DecodeError::UnknownPacketId {
            id: handshake.id,
            state: ConnectionState::Handshaking.id(),
        });
    }
    let mut payload = Cursor::new(handshake.payload.as_slice());
    let _protocol = VarInt::read(&mut payload)?;
    let _address = String::read(&mut payload)?;
    let _port = u16::read(&mut payload)?;
    let next_state = VarInt::read(&mut payload)?.0;

    let Some(state) = ConnectionState::from_id(next_state) else {
        return Err(DecodeError::UnknownPacketId {
            id: next_state,
            state: ConnectionState::Handshaking.id(),
        });
    };
    if !state.is_handshake_target() || state != ConnectionState::Status {
        // Login is refused here; the status listener only serves pings.
        return Ok(());
    }

    loop {
        let frame = Frame::read_async(&mut stream).await?;
        match frame.id {
            0 => {
                // Status request → JSON response.
                let mut payload = Vec::new();
                info.to_json().as_str().write(&mut payload)?;
                Frame::new(0, payload).write_async(&mut stream).await?;
            }
            1 => {
                // Ping → echo the client's payload back.
                Frame::new(1, frame.payload).write_async(&mut stream).await?;
                return Ok(());
            }
            other => {
                return Err(DecodeError::UnknownPacketId {
                    id: other,
                    state: ConnectionState::Status.id(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_json_shape() {
        let info = StatusInfo {
            motd: String::from("A Basalt Server"),
            max_players: 20,
            online_players: 0,
        };
        let json = info.to_json();
        assert!(json.contains("\"protocol\":5"));
        assert!(json.contains("A Basalt Server"));
    }
}
