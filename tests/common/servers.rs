//! Mock homework API and Telegram Bot API servers

use homework_bot::{Config, Credentials, HomeworkPoller, PracticumClient, TelegramBot};
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Token the mock API expects
pub const API_TOKEN: &str = "practicum-token";
/// Token the mock bot API expects in its path
pub const BOT_TOKEN: &str = "123:bot-token";
/// Chat every message must be addressed to
pub const CHAT_ID: &str = "42";

/// Path of the statuses endpoint on the mock API
pub const STATUSES_PATH: &str = "/api/user_api/homework_statuses/";

/// Both collaborators, running locally
pub struct MockServers {
    /// Homework API
    pub api: MockServer,
    /// Telegram Bot API
    pub bot: MockServer,
}

impl MockServers {
    /// Start both servers; the bot accepts every message
    pub async fn start() -> Self {
        let api = MockServer::start().await;
        let bot = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("/bot{BOT_TOKEN}/sendMessage")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"ok": true, "result": {"message_id": 1}})),
            )
            .mount(&bot)
            .await;

        Self { api, bot }
    }

    /// Make the homework API answer every request with `template`
    pub async fn answer_with(&self, template: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(STATUSES_PATH))
            .and(header("Authorization", format!("OAuth {API_TOKEN}").as_str()))
            .respond_with(template)
            .mount(&self.api)
            .await;
    }

    /// Make the homework API answer every request with `body`
    pub async fn answer_json(&self, body: Value) {
        self.answer_with(ResponseTemplate::new(200).set_body_json(body))
            .await;
    }

    /// Configuration pointing at both mock servers
    pub fn config(&self) -> Config {
        let mut config = Config::new(Credentials {
            practicum_token: API_TOKEN.to_string(),
            telegram_token: BOT_TOKEN.to_string(),
            telegram_chat_id: CHAT_ID.to_string(),
        });
        config.endpoint = format!("{}{STATUSES_PATH}", self.api.uri());
        config.telegram_api_base = self.bot.uri();
        config
    }

    /// Poller wired to both mock servers, starting at `cursor`
    pub fn poller(&self, cursor: i64) -> HomeworkPoller<PracticumClient, TelegramBot> {
        let config = self.config();
        HomeworkPoller::new(
            PracticumClient::new(&config).expect("API client should build"),
            TelegramBot::new(&config).expect("bot should build"),
            &config,
        )
        .with_cursor(cursor)
    }

    /// Texts of every message the bot API received, in order
    pub async fn sent_messages(&self) -> Vec<String> {
        self.bot
            .received_requests()
            .await
            .expect("request recording is enabled")
            .iter()
            .map(|request| {
                let body: Value = request.body_json().expect("sendMessage body is JSON");
                assert_eq!(body["chat_id"], CHAT_ID, "message sent to the wrong chat");
                body["text"].as_str().unwrap_or_default().to_string()
            })
            .collect()
    }

    /// `from_date` of every request the homework API received, in order
    pub async fn requested_cursors(&self) -> Vec<String> {
        self.api
            .received_requests()
            .await
            .expect("request recording is enabled")
            .iter()
            .filter_map(|request| {
                request
                    .url
                    .query_pairs()
                    .find(|(key, _)| key == "from_date")
                    .map(|(_, value)| value.into_owned())
            })
            .collect()
    }
}
