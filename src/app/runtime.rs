use rand::Rng;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{App, AppEvent, Effect, ViewState};

/// Drives an [`App`] from the inbound event channel.
///
/// Events are handled strictly one at a time. Scheduled events are re-injected
/// through a weak sender, so once every external sender is gone the loop ends
/// and pending timers fire into nothing. Timers are never cancelled: a late
/// completion still overwrites whatever the view shows at that point.
pub struct Controller<R, F> {
    app: App<R>,
    events: mpsc::Receiver<AppEvent>,
    feedback: mpsc::WeakSender<AppEvent>,
    publish: F,
}

impl<R, F> Controller<R, F>
where
    R: Rng,
    F: FnMut(&ViewState),
{
    pub fn new(
        app: App<R>,
        sender: &mpsc::Sender<AppEvent>,
        events: mpsc::Receiver<AppEvent>,
        publish: F,
    ) -> Self {
        Self {
            app,
            events,
            feedback: sender.downgrade(),
            publish,
        }
    }

    pub async fn run(mut self) -> App<R> {
        (self.publish)(self.app.view());
        while let Some(event) = self.events.recv().await {
            debug!(?event, "handling event");
            for effect in self.app.handle(event) {
                self.apply(effect);
            }
        }
        debug!("event channel closed; controller stopping");
        self.app
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::Render => (self.publish)(self.app.view()),
            Effect::Schedule { after, event } => {
                let feedback = self.feedback.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(after).await;
                    match feedback.upgrade() {
                        Some(sender) => {
                            if sender.send(event).await.is_err() {
                                warn!("controller stopped before timer fired");
                            }
                        }
                        None => debug!("dropping timer event after shutdown"),
                    }
                });
            }
        }
    }
}
