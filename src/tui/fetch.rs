use crate::api::ApiClient;
use crate::config::LocationConfig;
use crate::location;
use crate::tui::state::{ApiEvent, Request, Response, Ticket};
use std::sync::mpsc;
use tokio::runtime::Handle;

/// Runs page requests on the runtime and posts each reply back to the UI
/// loop as an [`ApiEvent`].
pub struct Fetcher {
    handle: Handle,
    client: ApiClient,
    location: LocationConfig,
    tx: mpsc::Sender<ApiEvent>,
}

impl Fetcher {
    pub fn new(
        handle: Handle,
        client: ApiClient,
        location: LocationConfig,
        tx: mpsc::Sender<ApiEvent>,
    ) -> Self {
        Self {
            handle,
            client,
            location,
            tx,
        }
    }

    pub fn dispatch(&self, ticket: Ticket, request: Request) {
        let client = self.client.clone();
        let location = self.location.clone();
        let tx = self.tx.clone();

        tracing::debug!("dispatch {:?} for {:?}", request, ticket);

        self.handle.spawn(async move {
            let response = match request {
                Request::BotTelemetry => Response::BotTelemetry(client.fetch_bot_telemetry().await),
                Request::AgriNews => Response::AgriNews(client.fetch_agri_news().await),
                Request::WeatherNews => Response::WeatherNews(client.fetch_weather_news().await),
                Request::DetectAnimal { image_base64 } => {
                    Response::Detection(client.detect_animal(&image_base64).await)
                }
                Request::Locate => Response::Location(location::locate(location).await),
            };
            // The UI may already be gone on shutdown.
            let _ = tx.send(ApiEvent { ticket, response });
        });
    }
}
