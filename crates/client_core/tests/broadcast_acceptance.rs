use std::sync::{Arc, Mutex, Weak};

use client_core::{
    config::UiSettings,
    console::ConsoleLog,
    listener::UiListener,
    transport::{pump_outbound, relay_inbound, ChannelSocket, SocketSlot},
    Broadcast,
};
use futures::{stream, StreamExt};
use serde_json::{json, Value};
use shared::{
    domain::{MainContent, SocketCloseEvent, SocketOpenEvent},
    protocol::CommandEnvelope,
};
use tokio_tungstenite::tungstenite::Message;

/// Switches the main panel when the peer reports a running flow.
struct FlowTracker {
    bus: Weak<Broadcast>,
}

impl UiListener for FlowTracker {
    fn on_socket_message(&self, kind: &str, _data: &Value) -> anyhow::Result<()> {
        if kind == "flow_started" {
            if let Some(bus) = self.bus.upgrade() {
                bus.set_main_content(MainContent::FlowExecution);
            }
        }
        Ok(())
    }
}

#[derive(Default)]
struct Panel {
    panels: Mutex<Vec<MainContent>>,
    connected: Mutex<Vec<String>>,
    closed: Mutex<Vec<SocketCloseEvent>>,
}

impl UiListener for Panel {
    fn on_main_content_changed(&self, content: MainContent) -> anyhow::Result<()> {
        self.panels.lock().expect("panels").push(content);
        Ok(())
    }

    fn on_socket_connected(&self, event: &SocketOpenEvent) -> anyhow::Result<()> {
        self.connected.lock().expect("connected").push(event.url.clone());
        Ok(())
    }

    fn on_socket_closed(&self, event: &SocketCloseEvent) -> anyhow::Result<()> {
        self.closed.lock().expect("closed").push(event.clone());
        Ok(())
    }
}

#[tokio::test]
async fn command_round_trip_through_connection_plumbing_acceptance() {
    let settings = UiSettings {
        dark_theme: true,
        ..UiSettings::default()
    };
    let console = Arc::new(ConsoleLog::with_capacity(settings.console_capacity));
    let slot = Arc::new(SocketSlot::new());
    let bus = Arc::new(Broadcast::with_state(
        settings.initial_state(),
        console.clone(),
        slot.clone(),
    ));
    assert!(bus.is_dark());

    let panel = Arc::new(Panel::default());
    bus.register(panel.clone());
    bus.register(Arc::new(FlowTracker {
        bus: Arc::downgrade(&bus),
    }));

    // Sending before a connection exists is dropped and logged.
    bus.send_socket_message("start_flow", json!({"flow": "registration"}));
    assert_eq!(console.error_count(), 1);

    let (socket, outbound) = ChannelSocket::channel();
    slot.install(Arc::new(socket));
    bus.on_socket_connected(&SocketOpenEvent {
        url: "ws://127.0.0.1:49100/".to_string(),
    });

    bus.send_socket_message("start_flow", json!({"flow": "registration", "ue_count": 2}));
    bus.send_socket_message("stop_flow", json!({}));

    // Dropping the installed socket ends the writer queue.
    slot.clear();
    let (writer, written) = futures::channel::mpsc::unbounded::<Message>();
    let count = pump_outbound(outbound, writer).await.expect("pump");
    assert_eq!(count, 2);

    let envelopes: Vec<CommandEnvelope> = written
        .map(|frame| match frame {
            Message::Text(text) => serde_json::from_str(&text).expect("envelope"),
            other => panic!("unexpected frame {other:?}"),
        })
        .collect()
        .await;
    assert_eq!(envelopes[0].cmd, "start_flow");
    assert_eq!(envelopes[0].args["ue_count"], json!(2));
    assert_eq!(envelopes[1].cmd, "stop_flow");
    assert!(envelopes[1].args.is_empty());

    let inbound = stream::iter(vec![
        Ok(Message::Text(r#"{"type":"flow_started","data":{"flow":"registration"}}"#.to_string())),
        Ok(Message::Close(None)),
    ]);
    let summary = relay_inbound(inbound, &bus).await;
    assert_eq!(summary.messages, 1);

    assert_eq!(bus.main_content(), MainContent::FlowExecution);
    assert_eq!(
        *panel.panels.lock().expect("panels"),
        vec![MainContent::FlowExecution]
    );
    assert_eq!(
        *panel.connected.lock().expect("connected"),
        vec!["ws://127.0.0.1:49100/".to_string()]
    );
    assert_eq!(panel.closed.lock().expect("closed").len(), 1);
    assert_eq!(console.error_count(), 1);
}
