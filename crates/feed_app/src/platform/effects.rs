use std::sync::mpsc;
use std::thread;

use feed_core::{Effect, FeedError, Msg};
use feed_engine::{EngineCommands, EngineEvent, EngineHandle, FetchError};
use feed_logging::{feed_debug, feed_info};

use super::app::Input;
use super::persistence::{AppSettings, SettingsStore};

/// Executes effects the engine or the settings file handle and hands the
/// rest back to the loop that owns the state.
pub struct EffectRunner {
    commands: EngineCommands,
    store: SettingsStore,
    settings: AppSettings,
}

impl EffectRunner {
    pub fn start(
        engine: EngineHandle,
        store: SettingsStore,
        settings: AppSettings,
        input_tx: mpsc::Sender<Input>,
    ) -> Self {
        let (commands, events) = engine.into_parts();
        thread::spawn(move || {
            while let Some(event) = events.recv() {
                if input_tx.send(Input::Engine(event_to_msg(event))).is_err() {
                    break;
                }
            }
            feed_debug!("Engine event pump stopped");
        });
        Self {
            commands,
            store,
            settings,
        }
    }

    pub fn run(&mut self, effects: Vec<Effect>) -> Vec<Effect> {
        let mut presentation = Vec::new();
        for effect in effects {
            match effect {
                Effect::FetchPosts { token, query } => {
                    feed_info!("FetchPosts {} page={}", token, query.page);
                    self.commands.fetch_posts(token, query);
                }
                Effect::FetchPost { token, id } => self.commands.fetch_post(token, id),
                Effect::EnrichPost { token, post } => self.commands.enrich_post(token, post),
                Effect::FetchComments {
                    token,
                    post_id,
                    page_count,
                    page_size,
                } => self
                    .commands
                    .fetch_comments(token, post_id, page_count, page_size),
                Effect::SaveConfig(config) => {
                    self.settings.feed = config;
                    self.store.save(&self.settings);
                }
                other @ (Effect::PostsReady | Effect::OperationFinished { .. }) => {
                    presentation.push(other)
                }
            }
        }
        presentation
    }

    pub fn shutdown(&self) {
        self.commands.shutdown();
    }
}

fn transport(err: FetchError) -> FeedError {
    FeedError::Transport(err.to_string())
}

pub(crate) fn event_to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::PostsFetched { token, result } => Msg::PostsPageFetched {
            token,
            result: result.map_err(transport),
        },
        EngineEvent::PostFetched { token, result } => Msg::PostDetailFetched {
            token,
            result: result.map_err(transport),
        },
        EngineEvent::CommentsFetched { token, result } => Msg::CommentsFetched {
            token,
            result: result.map_err(transport),
        },
        EngineEvent::PostEnriched { token, post } => Msg::PostEnriched { token, post },
    }
}

#[cfg(test)]
mod tests {
    use feed_core::{update, AppState, Effect, FeedError, Msg};
    use feed_engine::{EngineEvent, FailureKind, FetchError};

    use super::event_to_msg;

    #[test]
    fn fetch_errors_become_transport_errors() {
        let (_, effects) = update(AppState::new(), Msg::RetrieveMorePosts);
        let Some(Effect::FetchPosts { token, .. }) = effects.into_iter().next() else {
            panic!("listing requested");
        };
        let err = FetchError::new(FailureKind::HttpStatus(502), "Bad Gateway");

        let msg = event_to_msg(EngineEvent::PostsFetched {
            token,
            result: Err(err.clone()),
        });

        assert_eq!(
            msg,
            Msg::PostsPageFetched {
                token,
                result: Err(FeedError::Transport(err.to_string())),
            }
        );
    }
}
