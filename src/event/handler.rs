use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::warn;

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Terminal input and a steady tick, merged onto one channel
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    _tx: mpsc::UnboundedSender<Event>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let event_tx = tx.clone();

        tokio::spawn(async move {
            let mut reader = EventStream::new();
            let mut ticker = tokio::time::interval(tick_rate);

            loop {
                let event = tokio::select! {
                    _ = ticker.tick() => Event::Tick,
                    next = reader.next() => match next {
                        // Release/repeat events would double every key on some terminals
                        Some(Ok(CrosstermEvent::Key(key))) if key.kind == KeyEventKind::Press => {
                            Event::Key(key)
                        }
                        Some(Ok(CrosstermEvent::Resize(_, _))) => Event::Resize,
                        Some(Ok(_)) => continue,
                        Some(Err(e)) => {
                            warn!("Failed to read terminal event: {}", e);
                            continue;
                        }
                        None => break,
                    },
                };
                if event_tx.send(event).is_err() {
                    break;
                }
            }
        });

        Self { rx, _tx: tx }
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}
