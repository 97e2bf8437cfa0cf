use anyhow::Context;
use clap::Parser;
use iced::futures::channel::mpsc;
use iced::widget::{column, container, text, Row};
use iced::{keyboard, window, Alignment, Element, Length, Subscription, Task, Theme};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod assets;
mod config;
mod error;
mod overlay;
mod review;
mod state;
mod ui;

use config::{Args, Settings, Variant};
use error::ReviewError;
use state::data::{KeyPress, Tally};
use ui::bridge::{self, SessionEvent};
use ui::viewer::{self, PanelView};

/// Where the session result is left for `main` once the window closes
type Outcome = Arc<Mutex<Option<Result<Tally, ReviewError>>>>;

/// Main application state
struct Approver {
    settings: Arc<Settings>,
    /// Panels of the record under review (empty while loading)
    panels: Vec<PanelView>,
    /// Key channel into the review loop
    keys: Option<mpsc::Sender<KeyPress>>,
    /// Status message to display to the reviewer
    status: String,
    /// The reviewer asked to close the window; waiting for the loop to stop
    closing: bool,
    outcome: Outcome,
}

/// Application messages (events)
#[derive(Debug)]
enum Message {
    /// Progress from the review loop
    Session(SessionEvent),
    /// The reviewer pressed a key
    KeyPressed(KeyPress),
    /// The reviewer tried to close the window
    CloseRequested(window::Id),
}

impl Approver {
    fn new(settings: Arc<Settings>, outcome: Outcome) -> (Self, Task<Message>) {
        (
            Approver {
                settings,
                panels: Vec::new(),
                keys: None,
                status: "Connecting...".to_string(),
                closing: false,
                outcome,
            },
            Task::none(),
        )
    }

    fn title(&self) -> String {
        match self.settings.review.variant {
            Variant::Location => "Location Approver".to_string(),
            Variant::Poster => "Poster Approver".to_string(),
        }
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Session(SessionEvent::Ready(keys)) => {
                if self.closing {
                    // Dropping the sender ends the session at its first key wait
                    drop(keys);
                    return Task::none();
                }
                self.keys = Some(keys);
                self.status = "Looking for pending submissions...".to_string();
                Task::none()
            }
            Message::Session(SessionEvent::Show(panels)) => {
                self.panels = panels.into_iter().map(PanelView::from).collect();
                self.status =
                    "Press 'y' to approve, 'n' to reject, or any other key to skip".to_string();
                Task::none()
            }
            Message::Session(SessionEvent::Finished(result)) => {
                self.panels.clear();
                let result = match result {
                    // The loop noticed the closed window, not a failure
                    Err(ReviewError::Display { .. }) if self.closing => None,
                    other => Some(other),
                };
                if let Ok(mut slot) = self.outcome.lock() {
                    *slot = result;
                }
                iced::exit()
            }
            Message::CloseRequested(_) => {
                if self.closing {
                    warn!("Closing again, not waiting for the database shutdown");
                    return iced::exit();
                }

                info!("Window closed, stopping the review session...");
                self.closing = true;
                self.keys = None;
                self.panels.clear();
                self.status = "Closing...".to_string();
                Task::none()
            }
            Message::KeyPressed(key) => {
                // Keys only count while a record is on screen
                if self.panels.is_empty() {
                    return Task::none();
                }

                if let Some(keys) = self.keys.as_mut() {
                    if let Err(e) = keys.try_send(key) {
                        warn!("Review loop is not listening for keys: {}", e);
                    }
                }

                // Close this record's viewports before the next one loads
                self.panels.clear();
                self.status = "Loading next submission...".to_string();
                Task::none()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        let status = text(&self.status).size(16);

        if self.panels.is_empty() {
            return container(status)
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x(Length::Fill)
                .center_y(Length::Fill)
                .into();
        }

        let panels = Row::with_children(self.panels.iter().map(viewer::panel::<Message>))
            .spacing(10)
            .height(Length::Fill);

        column![panels, status]
            .spacing(10)
            .padding(10)
            .align_x(Alignment::Center)
            .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            Subscription::run_with_id(
                "review-session",
                bridge::run_session(self.settings.clone()),
            )
            .map(Message::Session),
            keyboard::on_key_press(|key, _modifiers| {
                viewer::key_press(&key).map(Message::KeyPressed)
            }),
            window::close_requests().map(Message::CloseRequested),
        ])
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> anyhow::Result<()> {
    // MONGODB_URI usually lives in a .env next to (or above) the working directory
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "submission_approver=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Ok(path) = &dotenv {
        info!("Loaded environment from {}", path.display());
    }

    let args = Args::parse();
    let settings = Arc::new(Settings::from_args(args).context("Invalid configuration")?);
    info!(
        "Reviewing {}.{}",
        settings.database.database, settings.database.collection
    );

    let outcome: Outcome = Arc::new(Mutex::new(None));
    let app_outcome = outcome.clone();

    iced::application(Approver::title, Approver::update, Approver::view)
        .subscription(Approver::subscription)
        .theme(Approver::theme)
        .centered()
        // Close requests go through `update` so the database client is shut down
        .exit_on_close_request(false)
        .run_with(move || Approver::new(settings, app_outcome))
        .map_err(ReviewError::from)
        .context("Could not open the review window")?;

    let finished = outcome.lock().ok().and_then(|mut slot| slot.take());
    match finished {
        Some(Ok(tally)) => {
            info!("🏁 Session complete: {}", tally);
            Ok(())
        }
        Some(Err(err)) => Err(err).context("Review session failed"),
        None => {
            info!("Review window closed before the queue was empty");
            Ok(())
        }
    }
}
