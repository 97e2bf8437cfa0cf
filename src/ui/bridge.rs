/// Connects the review loop to the iced window.
///
/// The loop runs inside a subscription stream on iced's tokio executor.
/// Each iteration it emits `SessionEvent::Show` and then waits on a key
/// channel that the window feeds from its keyboard subscription.

use async_trait::async_trait;
use iced::futures::channel::mpsc;
use iced::futures::{SinkExt, Stream, StreamExt};
use iced::stream;
use std::sync::Arc;

use crate::config::Settings;
use crate::error::ReviewError;
use crate::review::{self, Panel, Presenter};
use crate::state::data::{KeyPress, Tally};

/// Events sent from the review loop to the window
#[derive(Debug)]
pub enum SessionEvent {
    /// Where the window should send captured keys
    Ready(mpsc::Sender<KeyPress>),
    /// Replace the shown panels and wait for a key
    Show(Vec<Panel>),
    /// The loop stopped (queue empty or fatal error)
    Finished(Result<Tally, ReviewError>),
}

/// Presenter that hands panels to the window and awaits the reviewer's key
pub struct ChannelPresenter {
    events: mpsc::Sender<SessionEvent>,
    keys: mpsc::Receiver<KeyPress>,
}

impl ChannelPresenter {
    pub fn new(events: mpsc::Sender<SessionEvent>, keys: mpsc::Receiver<KeyPress>) -> Self {
        Self { events, keys }
    }
}

#[async_trait]
impl Presenter for ChannelPresenter {
    async fn present(&mut self, panels: Vec<Panel>) -> Result<KeyPress, ReviewError> {
        self.events
            .send(SessionEvent::Show(panels))
            .await
            .map_err(|_| ReviewError::display("review window closed"))?;

        self.keys
            .next()
            .await
            .ok_or_else(|| ReviewError::display("review window closed before a key was pressed"))
    }
}

/// Stream running one full review session
pub fn run_session(settings: Arc<Settings>) -> impl Stream<Item = SessionEvent> {
    stream::channel(4, move |mut output: mpsc::Sender<SessionEvent>| async move {
        let (keys_tx, keys_rx) = mpsc::channel(1);
        if output.send(SessionEvent::Ready(keys_tx)).await.is_err() {
            return;
        }

        let mut presenter = ChannelPresenter::new(output.clone(), keys_rx);
        let outcome = review::launch(&settings, &mut presenter).await;

        let _ = output.send(SessionEvent::Finished(outcome)).await;
    })
}
